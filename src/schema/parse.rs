//! SDL → [`SchemaDocument`] via the `apollo-parser` CST.
use apollo_parser::{cst, Parser};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::{FieldDefinition, FieldType, InputValue, Kind, SchemaDocument, TypeDefinition};

#[derive(Debug, Error)]
#[error("schema has {} syntax error(s): {}", .messages.len(), .messages.join("; "))]
pub struct SchemaError {
    pub messages: Vec<String>,
}

/// Parse SDL text into a schema.
///
/// Any syntax error fails the whole parse. Extensions are folded into their
/// base definition after all base definitions are known; roots default to
/// `Query` / `Mutation` when there is no `schema { ... }` block.
pub fn parse_schema(source: &str) -> Result<SchemaDocument, SchemaError> {
    let tree = Parser::new(source).parse();
    let messages: Vec<String> = tree
        .errors()
        .map(|e| format!("{} (at offset {})", e.message(), e.index()))
        .collect();
    if !messages.is_empty() {
        return Err(SchemaError { messages });
    }

    let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
    let mut extensions: Vec<TypeDefinition> = Vec::new();
    let mut roots = Roots::default();

    for definition in tree.document().definitions() {
        match definition {
            cst::Definition::SchemaDefinition(def) => {
                roots.declared = true;
                roots.add(def.root_operation_type_definitions());
            }
            cst::Definition::SchemaExtension(def) => {
                roots.declared = true;
                roots.add(def.root_operation_type_definitions());
            }
            cst::Definition::ObjectTypeDefinition(def) => {
                let fields = fields(def.fields_definition());
                declare(&mut types, shell(def.name(), Kind::Object, def.description()), |t| t.fields = fields);
            }
            cst::Definition::InterfaceTypeDefinition(def) => {
                let fields = fields(def.fields_definition());
                declare(&mut types, shell(def.name(), Kind::Interface, def.description()), |t| t.fields = fields);
            }
            cst::Definition::InputObjectTypeDefinition(def) => {
                let fields = input_fields(def.input_fields_definition());
                declare(&mut types, shell(def.name(), Kind::InputObject, def.description()), |t| t.fields = fields);
            }
            cst::Definition::EnumTypeDefinition(def) => {
                let values = enum_values(def.enum_values_definition());
                declare(&mut types, shell(def.name(), Kind::Enum, def.description()), |t| t.enum_values = values);
            }
            cst::Definition::UnionTypeDefinition(def) => {
                let members = union_members(def.union_member_types());
                declare(&mut types, shell(def.name(), Kind::Union, def.description()), |t| t.members = members);
            }
            cst::Definition::ScalarTypeDefinition(def) => {
                declare(&mut types, shell(def.name(), Kind::Scalar, def.description()), |_| {});
            }
            cst::Definition::ObjectTypeExtension(def) => {
                if let Some(mut ext) = shell(def.name(), Kind::Object, None) {
                    ext.fields = fields(def.fields_definition());
                    extensions.push(ext);
                }
            }
            cst::Definition::InterfaceTypeExtension(def) => {
                if let Some(mut ext) = shell(def.name(), Kind::Interface, None) {
                    ext.fields = fields(def.fields_definition());
                    extensions.push(ext);
                }
            }
            cst::Definition::InputObjectTypeExtension(def) => {
                if let Some(mut ext) = shell(def.name(), Kind::InputObject, None) {
                    ext.fields = input_fields(def.input_fields_definition());
                    extensions.push(ext);
                }
            }
            cst::Definition::EnumTypeExtension(def) => {
                if let Some(mut ext) = shell(def.name(), Kind::Enum, None) {
                    ext.enum_values = enum_values(def.enum_values_definition());
                    extensions.push(ext);
                }
            }
            cst::Definition::UnionTypeExtension(def) => {
                if let Some(mut ext) = shell(def.name(), Kind::Union, None) {
                    ext.members = union_members(def.union_member_types());
                    extensions.push(ext);
                }
            }
            cst::Definition::ScalarTypeExtension(_)
            | cst::Definition::DirectiveDefinition(_)
            | cst::Definition::OperationDefinition(_)
            | cst::Definition::FragmentDefinition(_) => {}
        }
    }

    for ext in extensions {
        match types.get_mut(&ext.name) {
            Some(base) => fold_extension(base, ext),
            None => {
                debug!(name = %ext.name, "extension without a base definition");
                types.insert(ext.name.clone(), ext);
            }
        }
    }

    if !roots.declared {
        for (name, list) in [("Query", &mut roots.query), ("Mutation", &mut roots.mutation)] {
            if types.contains_key(name) {
                list.push(name.to_string());
            }
        }
    }

    Ok(SchemaDocument { types, query_roots: roots.query, mutation_roots: roots.mutation })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default)]
struct Roots {
    declared: bool,
    query: Vec<String>,
    mutation: Vec<String>,
}

impl Roots {
    fn add(&mut self, defs: cst::CstChildren<cst::RootOperationTypeDefinition>) {
        for def in defs {
            let Some(name) = def.named_type().and_then(|t| text(t.name())) else { continue };
            let Some(op) = def.operation_type() else { continue };
            if op.query_token().is_some() {
                self.query.push(name);
            } else if op.mutation_token().is_some() {
                self.mutation.push(name);
            }
        }
    }
}

/// Append what `ext` adds to `base`. Names `base` already declares are skipped.
fn fold_extension(base: &mut TypeDefinition, ext: TypeDefinition) {
    for field in ext.fields {
        if base.field(&field.name).is_some() {
            warn!(ty = %base.name, field = %field.name, "duplicate field in extension, keeping the first");
            continue;
        }
        base.fields.push(field);
    }
    for value in ext.enum_values {
        if base.enum_values.contains(&value) {
            warn!(ty = %base.name, value = %value, "duplicate enum value in extension, keeping the first");
            continue;
        }
        base.enum_values.push(value);
    }
    for member in ext.members {
        if base.members.contains(&member) {
            warn!(ty = %base.name, member = %member, "duplicate union member in extension, keeping the first");
            continue;
        }
        base.members.push(member);
    }
}

fn declare(
    types: &mut IndexMap<String, TypeDefinition>,
    def: Option<TypeDefinition>,
    fill: impl FnOnce(&mut TypeDefinition),
) {
    let Some(mut def) = def else { return };
    if types.contains_key(&def.name) {
        warn!(name = %def.name, "duplicate type definition, keeping the first");
        return;
    }
    fill(&mut def);
    types.insert(def.name.clone(), def);
}

fn shell(name: Option<cst::Name>, kind: Kind, description: Option<cst::Description>) -> Option<TypeDefinition> {
    let mut def = TypeDefinition::new(text(name)?, kind);
    def.description = describe(description);
    Some(def)
}

fn text(name: Option<cst::Name>) -> Option<String> {
    name.map(|n| n.text().to_string())
}

fn describe(description: Option<cst::Description>) -> Option<String> {
    description?.string_value().map(String::from)
}

fn fields(def: Option<cst::FieldsDefinition>) -> Vec<FieldDefinition> {
    let Some(def) = def else { return Vec::new() };
    def.field_definitions()
        .filter_map(|field| {
            let arguments = field
                .arguments_definition()
                .map(|args| args.input_value_definitions().filter_map(input_value).collect())
                .unwrap_or_default();
            Some(FieldDefinition {
                name: text(field.name())?,
                description: describe(field.description()),
                ty: field_type(field.ty()?)?,
                arguments,
            })
        })
        .collect()
}

fn input_fields(def: Option<cst::InputFieldsDefinition>) -> Vec<FieldDefinition> {
    let Some(def) = def else { return Vec::new() };
    def.input_value_definitions()
        .filter_map(input_value)
        .map(|v| FieldDefinition { name: v.name, description: v.description, ty: v.ty, arguments: Vec::new() })
        .collect()
}

fn input_value(def: cst::InputValueDefinition) -> Option<InputValue> {
    Some(InputValue {
        name: text(def.name())?,
        description: describe(def.description()),
        ty: field_type(def.ty()?)?,
    })
}

fn enum_values(def: Option<cst::EnumValuesDefinition>) -> Vec<String> {
    let Some(def) = def else { return Vec::new() };
    def.enum_value_definitions()
        .filter_map(|v| text(v.enum_value()?.name()))
        .collect()
}

fn union_members(def: Option<cst::UnionMemberTypes>) -> Vec<String> {
    let Some(def) = def else { return Vec::new() };
    def.named_types().filter_map(|t| text(t.name())).collect()
}

fn field_type(ty: cst::Type) -> Option<FieldType> {
    match ty {
        cst::Type::NamedType(named) => Some(FieldType::named(text(named.name())?)),
        cst::Type::ListType(list) => Some(field_type(list.ty()?)?.list_of()),
        cst::Type::NonNullType(non_null) => {
            let inner = match (non_null.named_type(), non_null.list_type()) {
                (Some(named), _) => FieldType::named(text(named.name())?),
                (None, Some(list)) => field_type(cst::Type::ListType(list))?,
                (None, None) => return None,
            };
            Some(inner.required())
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Operation;

    #[test]
    fn parses_every_kind() {
        let schema = parse_schema(
            r#"
            "A widget"
            type Widget implements Node { id: ID! parts: [Part!]! }
            interface Node { id: ID! }
            input WidgetInput { name: String, tags: [String] }
            enum Color { RED GREEN }
            union Part = Bolt | Nut
            scalar DateTime
            type Bolt { size: Int }
            type Nut { size: Int }
            "#,
        )
        .unwrap();

        let widget = schema.lookup("Widget").unwrap();
        assert_eq!(widget.kind, Kind::Object);
        assert_eq!(widget.description.as_deref(), Some("A widget"));
        assert_eq!(widget.fields[1].ty.to_string(), "[Part!]!");

        assert_eq!(schema.lookup("Node").unwrap().kind, Kind::Interface);
        let input = schema.lookup("WidgetInput").unwrap();
        assert_eq!(input.kind, Kind::InputObject);
        assert_eq!(input.fields.len(), 2);
        assert_eq!(schema.lookup("Color").unwrap().enum_values, ["RED", "GREEN"]);
        assert_eq!(schema.lookup("Part").unwrap().members, ["Bolt", "Nut"]);
        assert_eq!(schema.lookup("DateTime").unwrap().kind, Kind::Scalar);
        assert!(schema.lookup("Int").is_none());
    }

    #[test]
    fn explicit_schema_block_selects_roots() {
        let schema = parse_schema(
            r#"
            schema { query: RootQuery mutation: RootMutation }
            type RootQuery { ping: String }
            type RootMutation { widgetCreate(name: String): String }
            type Mutation { ignored: String }
            "#,
        )
        .unwrap();
        assert_eq!(schema.roots(Operation::Mutation), ["RootMutation"]);
        assert_eq!(schema.roots(Operation::Query), ["RootQuery"]);
        let field = schema.field(Operation::Mutation, "widgetCreate").unwrap();
        assert_eq!(field.arguments[0].name, "name");
        assert!(schema.field(Operation::Mutation, "ignored").is_none());
    }

    #[test]
    fn extensions_fold_into_base() {
        let schema = parse_schema(
            r#"
            type Mutation { a: String }
            extend type Mutation { b: String }
            enum Color { RED }
            extend enum Color { BLUE }
            "#,
        )
        .unwrap();
        let names: Vec<_> = schema.root_fields(Operation::Mutation).map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(schema.lookup("Color").unwrap().enum_values, ["RED", "BLUE"]);
    }

    #[test]
    fn extensions_skip_names_the_base_declares() {
        let schema = parse_schema(
            r#"
            type W { id: ID! }
            extend type W { id: ID! name: String }
            enum Color { RED }
            extend enum Color { RED BLUE }
            union Part = Bolt
            extend union Part = Bolt | Nut
            "#,
        )
        .unwrap();
        let names: Vec<_> = schema.lookup("W").unwrap().fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "name"]);
        assert_eq!(schema.lookup("Color").unwrap().enum_values, ["RED", "BLUE"]);
        assert_eq!(schema.lookup("Part").unwrap().members, ["Bolt", "Nut"]);
    }

    #[test]
    fn duplicate_definition_keeps_first() {
        let schema = parse_schema("type A { x: Int } type A { y: Int }").unwrap();
        assert_eq!(schema.lookup("A").unwrap().fields[0].name, "x");
    }

    #[test]
    fn syntax_errors_are_fatal() {
        let err = parse_schema("type Widget { id: }").unwrap_err();
        assert!(!err.messages.is_empty());
        assert!(err.to_string().contains("syntax error"));
    }
}
