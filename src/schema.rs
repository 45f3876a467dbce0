//! Read-only view of a GraphQL type system.
//!
//! The translator never looks at syntax: `parse` lowers the SDL into this
//! model once, and everything downstream reads it through name lookups.
pub mod parse;

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

pub use parse::SchemaError;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Category of a named type. `Basic` stands in for names the schema never
/// declares (the built-in scalars, or anything unresolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    Object,
    Interface,
    InputObject,
    Enum,
    Scalar,
    Union,
    #[default]
    Basic,
}

/// Root operation a field hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    Mutation,
}

/// A usage-site type reference: a named type plus its list / non-null wrappers.
///
/// Only one list level is kept; `[[Foo]]` is read as a list of `Foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub list: bool,
    pub non_null: bool,
    pub item_non_null: bool,
}

/// An argument of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
    pub arguments: Vec<InputValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: Kind,
    pub description: Option<String>,
    /// Object/interface fields, or input-object fields (which carry no arguments).
    pub fields: Vec<FieldDefinition>,
    pub enum_values: Vec<String>,
    /// Union member type names, in declared order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    types: IndexMap<String, TypeDefinition>,
    query_roots: Vec<String>,
    mutation_roots: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Kind {
    /// Composite kinds are emitted once under `definitions` and shared.
    pub fn is_composite(self) -> bool {
        match self {
            Kind::Object | Kind::Interface | Kind::InputObject | Kind::Enum | Kind::Union => true,
            Kind::Scalar | Kind::Basic => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Object => "object",
            Kind::Interface => "interface",
            Kind::InputObject => "input object",
            Kind::Enum => "enum",
            Kind::Scalar => "scalar",
            Kind::Union => "union",
            Kind::Basic => "basic",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Query => f.write_str("query"),
            Operation::Mutation => f.write_str("mutation"),
        }
    }
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), list: false, non_null: false, item_non_null: false }
    }
    pub fn required(mut self) -> Self { self.non_null = true; self }
    pub fn list_of(mut self) -> Self {
        self.item_non_null = self.non_null;
        self.non_null = false;
        self.list = true;
        self
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bang = |b: bool| if b { "!" } else { "" };
        if self.list {
            write!(f, "[{}{}]{}", self.name, bang(self.item_non_null), bang(self.non_null))
        } else {
            write!(f, "{}{}", self.name, bang(self.non_null))
        }
    }
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self { name: name.into(), description: None, ty, arguments: Vec::new() }
    }
    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: Vec::new(),
            enum_values: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Stand-in for a name with no declaration in the schema.
    pub fn basic(name: impl Into<String>) -> Self { Self::new(name, Kind::Basic) }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl SchemaDocument {
    /// Parse SDL text. See [`parse::parse_schema`].
    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        parse::parse_schema(source)
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// The declared definition for `ty`, or a synthesized `Basic` one.
    pub fn resolve(&self, ty: &FieldType) -> Cow<'_, TypeDefinition> {
        match self.lookup(&ty.name) {
            Some(def) => Cow::Borrowed(def),
            None => Cow::Owned(TypeDefinition::basic(ty.name.clone())),
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn roots(&self, op: Operation) -> &[String] {
        match op {
            Operation::Query => &self.query_roots,
            Operation::Mutation => &self.mutation_roots,
        }
    }

    /// Every field of every root type for `op`, in declaration order.
    pub fn root_fields(&self, op: Operation) -> impl Iterator<Item = &FieldDefinition> {
        self.roots(op)
            .iter()
            .filter_map(|root| self.lookup(root))
            .flat_map(|def| def.fields.iter())
    }

    pub fn field(&self, op: Operation, name: &str) -> Option<&FieldDefinition> {
        self.root_fields(op).find(|f| f.name == name)
    }

    /// Root fields of `op` whose name starts with `prefix`.
    pub fn matching_fields<'a>(
        &'a self,
        op: Operation,
        prefix: &str,
    ) -> impl Iterator<Item = &'a FieldDefinition> {
        self.root_fields(op).filter(move |f| f.name.starts_with(prefix))
    }
}

// ------------------------------- Tests ------------------------------------ //
