//! End-to-end validation scenarios, each driven entirely through the
//! public `compile_schema`/`validate` API, the way a caller outside this
//! crate would use it.

use pretty_assertions::assert_eq;
use yasl::engine::{validate, DataSource, Outcome};
use yasl::parser::compiler::{compile_schema, SchemaSource};
use yasl::ErrorKind;

fn compiled(schema: &str) -> yasl::Registry {
    compile_schema(SchemaSource::Str(schema.to_string())).expect("schema should compile")
}

fn single_outcome(outcome: Outcome) -> Result<yasl::Value, Vec<yasl::Diagnostic>> {
    match outcome {
        Outcome::Single(result) => result.map(|(value, _)| value),
        other => panic!("expected a single-document outcome, got {other:?}"),
    }
}

const CUSTOMER_LIST_SCHEMA: &str = r#"
definitions:
  acme:
    enums:
      customer_status:
        values: [active, inactive]
    types:
      customer:
        properties:
          name: {type: str, unique: true}
          email: {type: str, presence: required}
          status: {type: customer_status}
      customer_list:
        properties:
          customers: {type: "customer[]", list_min: 2, list_max: 3}
"#;

#[test]
fn customer_list_accepts_valid_document() {
    let mut registry = compiled(CUSTOMER_LIST_SCHEMA);
    let data = r#"
customers:
  - {name: Bob Smith, email: bob@x, status: active}
  - {name: Joe Smith, email: joe@x, status: inactive}
"#;
    let outcome = validate(&mut registry, Some(("customer_list", Some("acme"))), DataSource::Str(data.into())).unwrap();
    assert!(single_outcome(outcome).is_ok());
}

#[test]
fn customer_list_rejects_unknown_enum_member() {
    let mut registry = compiled(CUSTOMER_LIST_SCHEMA);
    let data = r#"
customers:
  - {name: Bob Smith, email: bob@x, status: active}
  - {name: Joe Smith, email: joe@x, status: unknown}
"#;
    let outcome = validate(&mut registry, Some(("customer_list", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.kind == ErrorKind::ConstraintViolation));
}

#[test]
fn customer_list_rejects_duplicate_unique_name() {
    let mut registry = compiled(CUSTOMER_LIST_SCHEMA);
    let data = r#"
customers:
  - {name: Bob Smith, email: bob@x, status: active}
  - {name: Bob Smith, email: joe@x, status: inactive}
"#;
    let outcome = validate(&mut registry, Some(("customer_list", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.kind == ErrorKind::DuplicateUnique));
}

const PERSON_AGE_SCHEMA: &str = r#"
definitions:
  acme:
    types:
      person:
        properties:
          age: {type: int, ge: 18, lt: 125, whole_number: true, multiple_of: 2, exclude: [64]}
"#;

fn age_outcome(age_literal: &str) -> Result<yasl::Value, Vec<yasl::Diagnostic>> {
    let mut registry = compiled(PERSON_AGE_SCHEMA);
    let data = format!("age: {age_literal}\n");
    let outcome = validate(&mut registry, Some(("person", Some("acme"))), DataSource::Str(data)).unwrap();
    single_outcome(outcome)
}

#[test]
fn person_age_within_bounds_is_ok() {
    assert!(age_outcome("20").is_ok());
}

#[test]
fn person_age_below_ge_fails() {
    let diags = age_outcome("10").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("greater than or equal")));
}

#[test]
fn person_age_at_or_above_lt_fails() {
    let diags = age_outcome("130").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("less than")));
}

#[test]
fn person_age_excluded_value_fails() {
    let diags = age_outcome("64").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("must not be one of")));
}

#[test]
fn person_age_non_whole_number_fails() {
    let diags = age_outcome("34.2").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("whole number")));
}

#[test]
fn person_age_not_multiple_of_fails() {
    let diags = age_outcome("35").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("multiple of")));
}

#[test]
fn person_age_value_tree_matches_expected_shape() {
    use yasl::value::{ObjectValue, PrimitiveValue, Value};

    let mut registry = compiled(PERSON_AGE_SCHEMA);
    let outcome = validate(&mut registry, Some(("person", Some("acme"))), DataSource::Str("age: 20\n".into())).unwrap();
    let value = single_outcome(outcome).unwrap();

    let mut fields = indexmap::IndexMap::new();
    fields.insert("age".to_string(), Value::Primitive(PrimitiveValue::Int(20)));
    let expected = Value::Object(ObjectValue {
        type_name: "person".to_string(),
        namespace: "acme".to_string(),
        fields,
    });
    assert_eq!(value, expected);
}

const SHAPE_SCHEMA: &str = r#"
definitions:
  acme:
    types:
      shape:
        properties:
          name: {type: str}
          type: {type: str}
          radius: {type: float, presence: optional}
          side_length: {type: float, presence: optional}
          color: {type: str, presence: optional}
          colour: {type: str, presence: optional}
          location: {type: str, presence: optional}
          orientation: {type: str, presence: optional}
        validators:
          only_one: [color, colour]
          at_least_one: [location, orientation]
          if_then:
            - {eval: type, value: [circle], present: [radius], absent: [side_length]}
            - {eval: type, value: [square, triangle], present: [side_length], absent: [radius]}
"#;

#[test]
fn shape_valid_circle_passes_all_clauses() {
    let mut registry = compiled(SHAPE_SCHEMA);
    let data = "name: bob\ntype: circle\nradius: 1\ncolor: red\nlocation: nw\n";
    let outcome = validate(&mut registry, Some(("shape", Some("acme"))), DataSource::Str(data.into())).unwrap();
    assert!(single_outcome(outcome).is_ok());
}

#[test]
fn shape_missing_at_least_one_fails() {
    let mut registry = compiled(SHAPE_SCHEMA);
    let data = "name: bob\ntype: circle\nradius: 1\ncolor: red\n";
    let outcome = validate(&mut registry, Some(("shape", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("at least one")));
}

#[test]
fn shape_both_color_fields_fails_only_one() {
    let mut registry = compiled(SHAPE_SCHEMA);
    let data = "name: bob\ntype: circle\nradius: 1\ncolor: red\ncolour: blue\nlocation: nw\n";
    let outcome = validate(&mut registry, Some(("shape", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("exactly one")));
}

#[test]
fn shape_square_with_radius_fails_if_then() {
    let mut registry = compiled(SHAPE_SCHEMA);
    let data = "name: bob\ntype: square\nradius: 1\ncolor: red\nlocation: nw\n";
    let outcome = validate(&mut registry, Some(("shape", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("side_length")));
}

const REF_SCHEMA: &str = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str, unique: true}
      account:
        properties:
          customer_name: {type: "ref[customer.name]"}
          customers: {type: "customer[]"}
"#;

#[test]
fn ref_resolves_against_earlier_object_in_same_document() {
    let mut registry = compiled(REF_SCHEMA);
    let data = r#"
customer_name: Bob
customers:
  - {name: Bob}
"#;
    let outcome = validate(&mut registry, Some(("account", Some("acme"))), DataSource::Str(data.into())).unwrap();
    assert!(single_outcome(outcome).is_ok());
}

#[test]
fn ref_to_unknown_value_is_dangling() {
    let mut registry = compiled(REF_SCHEMA);
    let data = r#"
customer_name: Ghost
customers:
  - {name: Bob}
"#;
    let outcome = validate(&mut registry, Some(("account", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.kind == ErrorKind::DanglingReference));
}

const TASK_MAP_SCHEMA: &str = r#"
definitions:
  acme:
    enums:
      taskkey:
        values: [task_01, task_02]
    types:
      task:
        properties:
          label: {type: str}
      board:
        properties:
          tasks: {type: "map[taskkey,task]"}
"#;

#[test]
fn map_accepts_only_declared_enum_keys() {
    let mut registry = compiled(TASK_MAP_SCHEMA);
    let data = "tasks:\n  task_01: {label: first}\n  task_02: {label: second}\n";
    let outcome = validate(&mut registry, Some(("board", Some("acme"))), DataSource::Str(data.into())).unwrap();
    assert!(single_outcome(outcome).is_ok());
}

#[test]
fn map_rejects_key_outside_enum() {
    let mut registry = compiled(TASK_MAP_SCHEMA);
    let data = "tasks:\n  task_03: {label: first}\n";
    let outcome = validate(&mut registry, Some(("board", Some("acme"))), DataSource::Str(data.into())).unwrap();
    let diags = single_outcome(outcome).unwrap_err();
    assert!(diags.iter().any(|d| d.kind == ErrorKind::ConstraintViolation));
}

const MARKDOWN_SCHEMA: &str = r#"
definitions:
  acme:
    types:
      article:
        properties:
          body: {type: markdown}
"#;

#[test]
fn empty_markdown_is_rejected() {
    let mut registry = compiled(MARKDOWN_SCHEMA);
    let outcome = validate(&mut registry, Some(("article", Some("acme"))), DataSource::Str("body: \"\"\n".into())).unwrap();
    assert!(single_outcome(outcome).is_err());
}

#[test]
fn non_empty_markdown_is_accepted() {
    let mut registry = compiled(MARKDOWN_SCHEMA);
    let outcome = validate(&mut registry, Some(("article", Some("acme"))), DataSource::Str("body: \"# hi\"\n".into())).unwrap();
    assert!(single_outcome(outcome).is_ok());
}
