//! The translation unit: shared definitions plus top-level properties.
//!
//! Once a name is in `definitions` or `properties` it is only ever changed
//! through the merge rules here; walkers hand over finished values.
use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ir::{property_key, Property, DEFINITIONS_PREFIX};

/// Property key that holds a resource's own property bag; never merged into.
const RESERVED_KEY: &str = "Properties";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub type_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    definitions: BTreeMap<String, Property>,
    properties: IndexMap<String, Property>,
    pub additional_properties: bool,
    required: Vec<String>,
    pub read_only_properties: Vec<String>,
    pub primary_identifier: Vec<String>,
    pub handlers: BTreeMap<String, Handler>,
    pub tagging: Tagging,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Handler {
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tagging {
    pub taggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_property: Option<String>,
}

/// What an insertion did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// Keys copied into an existing definition.
    Merged(Vec<String>),
    Unchanged,
    Conflict(MergeConflict),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeConflict {
    #[error("`{key}` is already `{existing}`, refusing `{incoming}`")]
    TypeMismatch { key: String, existing: String, incoming: String },
    #[error("`{key}` is a reference on one side only")]
    ReferenceMismatch { key: String },
    #[error("reference to missing definition `{0}`")]
    DanglingReference(String),
}

impl Document {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), ..Self::default() }
    }

    pub fn definitions(&self) -> &BTreeMap<String, Property> { &self.definitions }
    pub fn definition(&self, name: &str) -> Option<&Property> { self.definitions.get(name) }
    pub fn properties(&self) -> &IndexMap<String, Property> { &self.properties }
    /// Top-level property by its output key (`Name`, not `name`).
    pub fn property(&self, key: &str) -> Option<&Property> { self.properties.get(key) }
    pub fn required(&self) -> &[String] { &self.required }

    /// Insert a shared definition, or fold its fields into the one already
    /// registered under `name`.
    pub fn add_definition(&mut self, name: &str, body: Property) -> MergeOutcome {
        if self.definitions.contains_key(name) {
            return self.merge_fields(name, &body);
        }
        self.definitions.insert(name.to_string(), body);
        MergeOutcome::Inserted
    }

    /// Insert a top-level property under the capitalized `name`.
    ///
    /// On collision: inline vs inline must agree on `type`; inline vs
    /// reference is refused; two references of the same shape to different
    /// definitions merge the incoming definition's fields into the existing
    /// one. An array counts as a reference when its items are one.
    pub fn add_property(&mut self, name: &str, incoming: Property, required: bool) -> MergeOutcome {
        let key = property_key(name);
        if required {
            self.required.push(key.clone());
        }
        let Some(existing) = self.properties.get(&key) else {
            self.properties.insert(key, incoming);
            return MergeOutcome::Inserted;
        };
        let same_shape = existing.type_ == incoming.type_;
        match (existing.referenced(), incoming.referenced()) {
            (Some(_), None) | (None, Some(_)) => conflict(MergeConflict::ReferenceMismatch { key }),
            _ if !same_shape => conflict(MergeConflict::TypeMismatch {
                key,
                existing: shape(existing).to_string(),
                incoming: shape(&incoming).to_string(),
            }),
            (None, None) => MergeOutcome::Unchanged,
            (Some(into), Some(from)) if into == from => MergeOutcome::Unchanged,
            (Some(into), Some(from)) => {
                let into = into.to_string();
                let Some(source) = self.definitions.get(from).cloned() else {
                    return conflict(MergeConflict::DanglingReference(from.to_string()));
                };
                self.merge_fields(&into, &source)
            }
        }
    }

    /// Drop repeated top-level required keys, keeping first occurrences.
    pub fn dedup_required(&mut self) {
        let mut seen = HashSet::new();
        self.required.retain(|key| seen.insert(key.clone()));
    }

    /// `$ref`s anywhere in the document that name no definition.
    pub fn dangling_references(&self) -> Vec<String> {
        let missing: BTreeSet<&str> = self
            .properties
            .values()
            .chain(self.definitions.values())
            .flat_map(Property::references)
            .filter(|r| {
                r.strip_prefix(DEFINITIONS_PREFIX)
                    .is_none_or(|name| !self.definitions.contains_key(name))
            })
            .collect();
        missing.into_iter().map(String::from).collect()
    }

    /// Mark the document taggable when the top-level `key` property exists,
    /// pointing `tagProperty` at the definition it references.
    pub fn tag_with(&mut self, key: &str) {
        let Some(tags) = self.properties.get(key) else {
            self.tagging = Tagging::default();
            return;
        };
        let target = tags.ref_.clone().or_else(|| tags.items.as_ref().and_then(|i| i.ref_.clone()));
        self.tagging = Tagging { taggable: true, tag_property: target };
    }

    /// Output file name: `NewRelic::Observability::Dashboard` →
    /// `newrelic-observability-dashboard.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.type_name.to_lowercase().replace("::", "-").replace(':', "-"))
    }

    fn merge_fields(&mut self, into: &str, source: &Property) -> MergeOutcome {
        let Some(existing) = self.definitions.get_mut(into) else {
            return conflict(MergeConflict::DanglingReference(into.to_string()));
        };
        let mut added = Vec::new();
        for (key, child) in &source.properties {
            if key == RESERVED_KEY {
                debug!(definition = into, "skipping reserved key during merge");
                continue;
            }
            match existing.properties.get(key) {
                Some(current) if current == child => {}
                Some(_) => warn!(definition = into, key = %key, "merge collision, keeping existing field"),
                None => {
                    existing.properties.insert(key.clone(), child.clone());
                    if source.required.contains(key) {
                        existing.required.push(key.clone());
                    }
                    added.push(key.clone());
                }
            }
        }
        if added.is_empty() {
            MergeOutcome::Unchanged
        } else {
            debug!(definition = into, added = ?added, "merged fields");
            MergeOutcome::Merged(added)
        }
    }
}

/// `type` of an inline node, `$ref` for a bare reference.
fn shape(p: &Property) -> &str {
    p.type_.as_deref().unwrap_or("$ref")
}

fn conflict(c: MergeConflict) -> MergeOutcome {
    warn!(conflict = %c, "merge conflict, keeping existing entry");
    MergeOutcome::Conflict(c)
}

// ------------------------------- Tests ------------------------------------ //
