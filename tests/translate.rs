use gql2cfn::schema::Operation;
use gql2cfn::service::{self, Lifecycle};
use gql2cfn::{Document, SchemaDocument, ServiceGrouper, TranslateConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn parse(sdl: &str) -> SchemaDocument {
    SchemaDocument::parse(sdl).unwrap()
}

fn emit_services(schema: &SchemaDocument) -> Vec<Document> {
    let config = TranslateConfig::default();
    let mut grouper = ServiceGrouper::new();
    for field in schema.root_fields(Operation::Mutation) {
        grouper.add(schema, field);
    }
    grouper.services().map(|s| s.emit(&config)).collect()
}

fn query(schema: &SchemaDocument, name: &str) -> Document {
    let field = schema.field(Operation::Query, name).unwrap();
    service::translate(schema, &TranslateConfig::default(), field)
}

fn to_json(doc: &Document) -> Value {
    serde_json::to_value(doc).unwrap()
}

const WIDGETS: &str = r#"
    type Query { widgets: WidgetPage }
    type Mutation {
        "Creates a widget"
        widgetCreate(input: WidgetInput!): Widget
        widgetUpdate(id: ID!, input: WidgetInput): Widget
        widgetDelete(id: ID!): Widget
    }
    type WidgetPage { items: [Widget] cursor: String }
    type Widget { id: ID! name: String tags: [String] kind: WidgetKind owner: Owner }
    type Owner { name: String widgets: [Widget] }
    input WidgetInput { name: String }
    enum WidgetKind { SMALL LARGE }
"#;

#[test]
fn output_is_deterministic() {
    let schema = parse(WIDGETS);
    let first: Vec<String> = emit_services(&schema).iter().map(|d| serde_json::to_string_pretty(d).unwrap()).collect();
    let second: Vec<String> = emit_services(&parse(WIDGETS))
        .iter()
        .map(|d| serde_json::to_string_pretty(d).unwrap())
        .collect();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&query(&schema, "widgets")).unwrap(),
        serde_json::to_string(&query(&schema, "widgets")).unwrap()
    );
}

#[test]
fn mutual_recursion_terminates() {
    let schema = parse("type Query { a: A } type A { b: B } type B { a: A }");
    let doc = to_json(&query(&schema, "a"));
    assert_eq!(
        doc["definitions"],
        json!({
            "A": { "type": "object", "additionalProperties": false, "properties": { "B": { "$ref": "#/definitions/B" } } },
            "B": { "type": "object", "additionalProperties": false, "properties": { "A": { "$ref": "#/definitions/A" } } }
        })
    );
}

#[test]
fn list_of_strings_is_an_array_of_strings() {
    let schema = parse(WIDGETS);
    let doc = to_json(&query(&schema, "widgets"));
    assert_eq!(
        doc["definitions"]["Widget"]["properties"]["Tags"],
        json!({ "type": "array", "insertionOrder": false, "items": { "type": "string" } })
    );
    assert_eq!(
        doc["properties"]["Items"],
        json!({ "type": "array", "insertionOrder": false, "items": { "$ref": "#/definitions/Widget" } })
    );
}

#[test]
fn union_is_any_of_its_members() {
    let schema = parse("type Query { find: Found } type Found { hit: U } union U = X | Y type X { x: Int } type Y { y: Int }");
    let doc = query(&schema, "find");
    let json = to_json(&doc);
    assert_eq!(
        json["definitions"]["Found"]["properties"]["Hit"],
        json!({ "type": "object", "anyOf": [{ "$ref": "#/definitions/X" }, { "$ref": "#/definitions/Y" }] })
    );
    assert_eq!(
        json["definitions"]["U"]["anyOf"],
        json!([{ "$ref": "#/definitions/X" }, { "$ref": "#/definitions/Y" }])
    );
    assert!(doc.dangling_references().is_empty());
}

#[test]
fn non_null_field_is_required_once_across_mutations() {
    let schema = parse(
        r#"
        type Mutation {
            widgetCreate(widget: Widget!): String
            widgetUpdate(widget: Widget!): String
            widgetDelete(widget: Widget!): String
        }
        input Widget { id: ID! name: String }
        "#,
    );
    let docs = emit_services(&schema);
    assert_eq!(docs.len(), 1);
    let json = to_json(&docs[0]);
    assert_eq!(json["definitions"]["Widget"]["required"], json!(["Id"]));
    assert_eq!(json["required"], json!(["Widget", "Id"]));
}

#[test]
fn basic_types_map_to_json_types() {
    let schema = parse("type Query { m: M } type M { f: Float i: Int d: ID b: Boolean x: Foo s: String }");
    let doc = to_json(&query(&schema, "m"));
    assert_eq!(
        doc["definitions"]["M"]["properties"],
        json!({
            "F": { "type": "number" },
            "I": { "type": "integer" },
            "D": { "type": "string" },
            "B": { "type": "boolean" },
            "X": { "type": "foo" },
            "S": { "type": "string" }
        })
    );
}

#[test]
fn evolved_input_types_merge_across_schema_versions() {
    let before = parse("type Mutation { widgetCreate(input: WidgetInput): String } input WidgetInput { name: String }");
    let after = parse(
        "type Mutation { widgetUpdate(input: WidgetInput): String } input WidgetInput { name: String description: String }",
    );
    let mut grouper = ServiceGrouper::new();
    for field in before.root_fields(Operation::Mutation) {
        grouper.add(&before, field);
    }
    for field in after.root_fields(Operation::Mutation) {
        grouper.add(&after, field);
    }
    let widget = grouper.get("widget").unwrap();
    assert_eq!(widget.lifecycles().collect::<Vec<_>>(), [Lifecycle::Create, Lifecycle::Update]);

    let doc = to_json(&widget.emit(&TranslateConfig::default()));
    assert_eq!(
        doc["definitions"]["WidgetInput"]["properties"],
        json!({ "Name": { "type": "string" }, "Description": { "type": "string" } })
    );
    assert_eq!(doc["properties"]["Description"], json!({ "type": "string" }));
}

#[test]
fn widget_create_end_to_end() {
    let schema = parse(
        r#"
        type Mutation { widgetCreate(input: WidgetInput): Widget }
        type Widget { id: ID! name: String tags: [String] }
        input WidgetInput { name: String }
        "#,
    );
    let docs = emit_services(&schema);
    let doc = to_json(&docs[0]);
    assert_eq!(doc["typeName"], json!("NewRelic::Observability::Widget"));
    assert_eq!(doc["properties"]["Name"], json!({ "type": "string" }));
    assert_eq!(doc["definitions"]["WidgetInput"]["properties"]["Name"], json!({ "type": "string" }));
    assert_eq!(doc["required"], json!([]));
    assert_eq!(docs[0].file_name(), "newrelic-observability-widget.json");

    let schema = parse(
        r#"
        type Mutation { widgetCreate(input: WidgetInput!): Widget }
        type Widget { id: ID! }
        input WidgetInput { name: String }
        "#,
    );
    let doc = to_json(&emit_services(&schema)[0]);
    assert_eq!(doc["required"], json!(["Input"]));
}

#[test]
fn entity_tags_make_every_resource_taggable() {
    let schema = parse(
        r#"
        type Mutation {
            widgetCreate(input: WidgetInput!): String
            widgetDelete(id: ID!): String
        }
        input WidgetInput { name: String }
        type Entity { tags: [EntityTag] }
        type EntityTag { key: String values: [String] }
        "#,
    );
    let doc = &emit_services(&schema)[0];
    let json = to_json(doc);
    assert_eq!(
        json["properties"]["Tags"],
        json!({ "type": "array", "insertionOrder": false, "items": { "$ref": "#/definitions/EntityTag" } })
    );
    assert_eq!(json["tagging"], json!({ "taggable": true, "tagProperty": "#/definitions/EntityTag" }));
    assert_eq!(json["handlers"], json!({ "create": { "permissions": [] }, "delete": { "permissions": [] } }));
    assert!(doc.dangling_references().is_empty());
}

#[test]
fn union_return_type_defines_every_member() {
    let schema = parse("type Query { search: Result } union Result = Bolt | Nut type Bolt { size: Int } type Nut { size: Float }");
    let doc = query(&schema, "search");
    let json = to_json(&doc);
    assert_eq!(
        json["definitions"]["Result"]["anyOf"],
        json!([{ "$ref": "#/definitions/Bolt" }, { "$ref": "#/definitions/Nut" }])
    );
    assert_eq!(json["definitions"]["Bolt"]["properties"], json!({ "Size": { "type": "integer" } }));
    assert_eq!(json["definitions"]["Nut"]["properties"], json!({ "Size": { "type": "number" } }));
    assert!(doc.dangling_references().is_empty());
}

#[test]
fn list_arguments_merge_their_item_definitions() {
    let schema = parse(
        r#"
        type Mutation {
            widgetCreate(items: [A]): String
            widgetUpdate(items: [B]): String
        }
        input A { x: String }
        input B { x: String y: Int! }
        "#,
    );
    let doc = &emit_services(&schema)[0];
    let json = to_json(doc);
    assert_eq!(
        json["properties"]["Items"],
        json!({ "type": "array", "insertionOrder": false, "items": { "$ref": "#/definitions/A" } })
    );
    assert_eq!(
        json["definitions"]["A"],
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["Y"],
            "properties": { "X": { "type": "string" }, "Y": { "type": "integer" } }
        })
    );
}
