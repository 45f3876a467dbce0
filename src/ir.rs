// Output nodes of the translation: JSON-Schema-flavored properties.

use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::Kind;

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// One schema node. Either *inline* (has `type`) or a *reference* (has `$ref`
/// and nothing else describing its shape); arrays are inline with an `items`
/// node that follows the same rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertion_order: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Item>,

    // housekeeping, never serialized
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub kind: Kind,
}

/// Array element or `anyOf` arm: an inline type or a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
}

impl Property {
    pub fn inline(name: &str, kind: Kind, type_: impl Into<String>) -> Self {
        Self { type_: Some(type_.into()), name: name.to_string(), kind, ..Self::default() }
    }

    pub fn reference(name: &str, kind: Kind) -> Self {
        Self { ref_: Some(definition_ref(name)), name: name.to_string(), kind, ..Self::default() }
    }

    pub fn array(name: &str, kind: Kind, item: Item) -> Self {
        Self {
            type_: Some("array".into()),
            insertion_order: Some(false),
            items: Some(item),
            name: name.to_string(),
            kind,
            ..Self::default()
        }
    }

    /// Closed object shell; fields are attached with [`Property::push_field`].
    pub fn object(name: &str, kind: Kind) -> Self {
        Self { additional_properties: Some(false), ..Self::inline(name, kind, "object") }
    }

    /// Name of the definition this property points at, if it is a reference.
    pub fn target(&self) -> Option<&str> {
        self.ref_.as_deref().and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }

    /// Definition this property leads to, directly or through its array items.
    pub fn referenced(&self) -> Option<&str> {
        let item_ref = || self.items.as_ref()?.ref_.as_deref()?.strip_prefix(DEFINITIONS_PREFIX);
        self.target().or_else(item_ref)
    }

    /// Attach a child under its property key, recording it as required when asked.
    pub fn push_field(&mut self, field_name: &str, child: Property, required: bool) {
        let key = property_key(field_name);
        if required {
            self.required.push(key.clone());
        }
        self.properties.insert(key, child);
    }

    /// Every `$ref` this node holds, including nested items and `anyOf` arms.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.ref_.as_deref());
        let arms = self.items.iter().chain(&self.any_of);
        out.extend(arms.filter_map(|arm| arm.ref_.as_deref()));
        for child in self.properties.values() {
            child.collect_references(out);
        }
    }
}

impl Item {
    pub fn typed(type_: impl Into<String>) -> Self {
        Self { type_: Some(type_.into()), ..Self::default() }
    }

    pub fn reference(name: &str) -> Self {
        Self { ref_: Some(definition_ref(name)), ..Self::default() }
    }
}

pub fn definition_ref(name: &str) -> String {
    format!("{DEFINITIONS_PREFIX}{name}")
}

/// Property keys are capitalized (`id` → `Id`), following CloudFormation casing.
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ------------------------------- Tests ------------------------------------ //
