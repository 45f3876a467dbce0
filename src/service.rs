//! Group lifecycle mutations into resources and emit one document each.
use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::document::{Document, Handler};
use crate::schema::{FieldDefinition, InputValue, SchemaDocument};
use crate::walk;

/// Top-level key the tagging block points at.
pub const TAGS_KEY: &str = "Tags";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    Create,
    Update,
    Delete,
}

/// One lifecycle mutation, remembered with the schema it was read from.
#[derive(Debug, Clone)]
struct Slot<'s> {
    field: FieldDefinition,
    schema: &'s SchemaDocument,
}

#[derive(Debug, Clone)]
pub struct Service<'s> {
    name: String,
    slots: BTreeMap<Lifecycle, Slot<'s>>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceGrouper<'s> {
    services: IndexMap<String, Service<'s>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Lifecycle {
    /// Walk order within one resource.
    pub const ORDER: [Lifecycle; 3] = [Lifecycle::Create, Lifecycle::Update, Lifecycle::Delete];

    /// Substring that marks a mutation name.
    pub fn marker(self) -> &'static str {
        match self {
            Lifecycle::Create => "Create",
            Lifecycle::Update => "Update",
            Lifecycle::Delete => "Delete",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Create => "create",
            Lifecycle::Update => "update",
            Lifecycle::Delete => "delete",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource name and lifecycle of a mutation: `widgetCreate` → `("widget", Create)`.
///
/// Every marker is stripped from the name; the first one found picks the lifecycle.
pub fn service_name(field: &str) -> Option<(String, Lifecycle)> {
    let lifecycle = Lifecycle::ORDER.into_iter().find(|lc| field.contains(lc.marker()))?;
    let name = Lifecycle::ORDER
        .into_iter()
        .fold(field.to_string(), |name, lc| name.replace(lc.marker(), ""));
    Some((name, lifecycle))
}

impl<'s> Service<'s> {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), slots: BTreeMap::new() }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn lifecycles(&self) -> impl Iterator<Item = Lifecycle> + '_ {
        self.slots.keys().copied()
    }

    pub fn mutation(&self, lifecycle: Lifecycle) -> Option<&FieldDefinition> {
        self.slots.get(&lifecycle).map(|slot| &slot.field)
    }

    /// Walk create, update and delete into one document and fill its metadata.
    pub fn emit(&self, config: &TranslateConfig) -> Document {
        let mut doc = Document::new(config.type_name(&self.name));
        for (lifecycle, slot) in &self.slots {
            debug!(service = %self.name, %lifecycle, mutation = %slot.field.name, "walking lifecycle");
            walk::walk(slot.schema, &mut doc, &slot.field);
        }
        doc.dedup_required();

        let resource = config.resource(&self.name);
        doc.description = resource
            .and_then(|r| r.description.clone())
            .or_else(|| self.slots.values().find_map(|s| s.field.description.clone()))
            .unwrap_or_default();
        if let Some(resource) = resource {
            doc.source_url = resource.source_url.clone();
            doc.primary_identifier = resource.primary_identifier.clone();
            doc.read_only_properties = resource.read_only_properties.clone();
            doc.handlers = resource
                .handlers
                .iter()
                .map(|(name, permissions)| (name.clone(), Handler { permissions: permissions.clone() }))
                .collect();
        }
        for lifecycle in self.lifecycles() {
            doc.handlers.entry(lifecycle.as_str().to_string()).or_default();
        }
        doc.tag_with(TAGS_KEY);

        info!(
            type_name = %doc.type_name,
            properties = doc.properties().len(),
            definitions = doc.definitions().len(),
            "emitted document"
        );
        for dangling in doc.dangling_references() {
            warn!(type_name = %doc.type_name, reference = %dangling, "unresolved reference");
        }
        doc
    }
}

impl<'s> ServiceGrouper<'s> {
    pub fn new() -> Self { Self::default() }

    /// File `field` under its resource. Returns the resource name, or `None`
    /// when the name carries no lifecycle marker.
    pub fn add(&mut self, schema: &'s SchemaDocument, field: &FieldDefinition) -> Option<&str> {
        let Some((name, lifecycle)) = service_name(&field.name) else {
            warn!(mutation = %field.name, "no create/update/delete marker, ignoring");
            return None;
        };
        let slot = Slot { field: with_entity_tags(schema, field), schema };
        let service = self.services.entry(name.clone()).or_insert_with(|| Service::new(name));
        if let Some(previous) = service.slots.insert(lifecycle, slot) {
            warn!(
                service = %service.name,
                %lifecycle,
                replaced = %previous.field.name,
                by = %field.name,
                "lifecycle slot replaced"
            );
        }
        Some(&service.name)
    }

    pub fn services(&self) -> impl Iterator<Item = &Service<'s>> {
        self.services.values()
    }

    pub fn get(&self, name: &str) -> Option<&Service<'s>> {
        self.services.get(name)
    }
}

/// Translate a single field (typically a query) into its own document.
pub fn translate(
    schema: &SchemaDocument,
    config: &TranslateConfig,
    field: &FieldDefinition,
) -> Document {
    let mut doc = Document::new(config.type_name(&field.name));
    walk::walk(schema, &mut doc, field);
    doc.dedup_required();
    doc.description = field.description.clone().unwrap_or_default();
    doc.tag_with(TAGS_KEY);
    info!(type_name = %doc.type_name, properties = doc.properties().len(), "emitted document");
    doc
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Copy of `field` with a `tags` argument shaped like `Entity.tags`, when the
/// schema has one and the field does not.
fn with_entity_tags(schema: &SchemaDocument, field: &FieldDefinition) -> FieldDefinition {
    let mut field = field.clone();
    if field.argument("tags").is_some() {
        return field;
    }
    let Some(tags) = schema.lookup("Entity").and_then(|entity| entity.field("tags")) else {
        return field;
    };
    debug!(mutation = %field.name, ty = %tags.ty, "injecting tags argument");
    field.arguments.push(InputValue {
        name: tags.name.clone(),
        description: tags.description.clone(),
        ty: tags.ty.clone(),
    });
    field
}

// ------------------------------- Tests ------------------------------------ //
