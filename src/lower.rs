//! Lower a resolved type definition to a [`Property`].
//!
//! Two entry points, both pure:
//! - [`lower_field`] builds the node placed where a field or argument is used;
//! - [`lower_definition`] builds the body stored once under `definitions`.
//!
//! Composite types are referenced at the usage site; enums and unions inline
//! their values / arms, scalars and built-ins are always inline.
use thiserror::Error;

use crate::ir::{Item, Property};
use crate::schema::{FieldType, Kind, TypeDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("enum `{0}` declares no values")]
    EmptyEnum(String),
    #[error("union `{0}` declares no member types")]
    EmptyUnion(String),
    #[error("union `{0}` cannot be used as a list element")]
    UnionArray(String),
}

/// Property for a usage site of `def` wrapped as `ty`.
///
/// List-ness comes from the wrapper alone. Non-null does not change the shape;
/// callers record it in the parent's `required` list.
pub fn lower_field(def: &TypeDefinition, ty: &FieldType) -> Result<Property, BuildError> {
    if ty.list {
        return lower_array(def);
    }
    match def.kind {
        Kind::Enum => enum_property(def),
        Kind::Scalar => Ok(Property::inline(&def.name, def.kind, "string")),
        Kind::Object | Kind::Interface | Kind::InputObject => Ok(Property::reference(&def.name, def.kind)),
        Kind::Union => union_property(def),
        Kind::Basic => Ok(Property::inline(&def.name, def.kind, basic_json_type(&def.name))),
    }
}

/// Body of the shared definition for `def`. Object-like bodies come back
/// empty; the walker attaches their fields.
pub fn lower_definition(def: &TypeDefinition) -> Result<Property, BuildError> {
    match def.kind {
        Kind::Enum => enum_property(def),
        Kind::Scalar => Ok(Property::inline(&def.name, def.kind, "string")),
        Kind::Object | Kind::Interface | Kind::InputObject => Ok(Property::object(&def.name, def.kind)),
        Kind::Union => {
            let mut p = union_property(def)?;
            p.additional_properties = Some(false);
            Ok(p)
        }
        Kind::Basic => Ok(Property::inline(&def.name, def.kind, basic_json_type(&def.name))),
    }
}

/// JSON type for a GraphQL built-in (or undeclared) type name.
pub fn basic_json_type(name: &str) -> String {
    match name {
        "Float" => "number".into(),
        "Int" => "integer".into(),
        "ID" => "string".into(),
        "Boolean" => "boolean".into(),
        other => other.to_lowercase(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn lower_array(def: &TypeDefinition) -> Result<Property, BuildError> {
    let item = match def.kind {
        Kind::Basic => Item::typed(basic_json_type(&def.name)),
        Kind::Scalar => Item::typed("string"),
        Kind::Enum | Kind::Object | Kind::Interface | Kind::InputObject => Item::reference(&def.name),
        Kind::Union => return Err(BuildError::UnionArray(def.name.clone())),
    };
    Ok(Property::array(&def.name, def.kind, item))
}

fn enum_property(def: &TypeDefinition) -> Result<Property, BuildError> {
    if def.enum_values.is_empty() {
        return Err(BuildError::EmptyEnum(def.name.clone()));
    }
    let mut p = Property::inline(&def.name, def.kind, "string");
    p.enum_ = def.enum_values.clone();
    Ok(p)
}

fn union_property(def: &TypeDefinition) -> Result<Property, BuildError> {
    if def.members.is_empty() {
        return Err(BuildError::EmptyUnion(def.name.clone()));
    }
    let mut p = Property::inline(&def.name, def.kind, "object");
    p.any_of = def.members.iter().map(|m| Item::reference(m)).collect();
    Ok(p)
}

// ------------------------------- Tests ------------------------------------ //
