//! Depth-first descent over the type graph reachable from one target field.
//!
//! A target with arguments surfaces each argument as a top-level property;
//! a target without arguments surfaces the fields of its return type. Every
//! composite type reached along the way gets a shared definition, entered at
//! most once per walk.
pub mod guard;

use tracing::{debug, trace, warn};

use crate::document::Document;
use crate::ir::Property;
use crate::lower;
use crate::schema::{FieldDefinition, FieldType, Kind, SchemaDocument};

pub use guard::CycleGuard;

pub struct Walker<'a> {
    schema: &'a SchemaDocument,
    document: &'a mut Document,
    guard: CycleGuard,
}

/// Walk `target` into `document` with a fresh cycle guard.
pub fn walk(schema: &SchemaDocument, document: &mut Document, target: &FieldDefinition) {
    Walker::new(schema, document).walk(target);
}

impl<'a> Walker<'a> {
    pub fn new(schema: &'a SchemaDocument, document: &'a mut Document) -> Self {
        Self { schema, document, guard: CycleGuard::new() }
    }

    pub fn walk(mut self, target: &FieldDefinition) {
        debug!(target = %target.name, arguments = target.arguments.len(), "walking");
        if target.arguments.is_empty() {
            self.walk_return_type(target);
        } else {
            self.walk_arguments(target);
        }
    }

    fn walk_return_type(&mut self, target: &FieldDefinition) {
        let schema = self.schema;
        let Some(def) = schema.lookup(&target.ty.name).filter(|d| d.kind.is_composite()) else {
            warn!(target = %target.name, ty = %target.ty, "return type is not a composite type");
            return;
        };
        self.define(&def.name);
        for field in &def.fields {
            if let Some(property) = self.lower(&field.name, &field.ty) {
                self.document.add_property(&field.name, property, field.ty.non_null);
            }
        }
    }

    fn walk_arguments(&mut self, target: &FieldDefinition) {
        let schema = self.schema;
        for arg in &target.arguments {
            let Some(property) = self.lower(&arg.name, &arg.ty) else { continue };
            self.define(&arg.ty.name);
            self.document.add_property(&arg.name, property, arg.ty.non_null);

            // input object fields double as the resource's own properties
            let Some(input) = schema.lookup(&arg.ty.name) else { continue };
            if input.kind != Kind::InputObject || arg.ty.list {
                continue;
            }
            for field in &input.fields {
                if let Some(property) = self.lower(&field.name, &field.ty) {
                    let required = arg.ty.non_null && field.ty.non_null;
                    self.document.add_property(&field.name, property, required);
                }
            }
        }
    }

    /// Register and emit the definition for `name`, recursing into whatever
    /// its fields or members reference. Scalars and built-ins are inline and
    /// never defined.
    fn define(&mut self, name: &str) {
        let schema = self.schema;
        let Some(def) = schema.lookup(name) else { return };
        if !def.kind.is_composite() {
            return;
        }
        if self.guard.register(name) {
            trace!(ty = name, "already entered");
            return;
        }
        let mut body = match lower::lower_definition(def) {
            Ok(body) => body,
            Err(error) => {
                warn!(ty = name, %error, "skipping definition");
                return;
            }
        };
        match def.kind {
            Kind::Object | Kind::Interface | Kind::InputObject => {
                for field in &def.fields {
                    let Some(property) = self.lower(&field.name, &field.ty) else { continue };
                    body.push_field(&field.name, property, field.ty.non_null);
                    self.define(&field.ty.name);
                }
            }
            Kind::Union => {
                for member in &def.members {
                    self.define(member);
                }
            }
            Kind::Enum | Kind::Scalar | Kind::Basic => {}
        }
        self.document.add_definition(name, body);
    }

    fn lower(&self, field: &str, ty: &FieldType) -> Option<Property> {
        let def = self.schema.resolve(ty);
        match lower::lower_field(&def, ty) {
            Ok(property) => Some(property),
            Err(error) => {
                warn!(field, ty = %ty, %error, "skipping field");
                None
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
