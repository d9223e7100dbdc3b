//! Property-based tests for the numeric/string/list constraint pipeline,
//! driven entirely through the public `compile_schema`/`validate` API.

use proptest::prelude::*;
use yasl::engine::{validate, DataSource, Outcome};
use yasl::parser::compiler::{compile_schema, SchemaSource};

fn compiled(schema: &str) -> yasl::Registry {
    compile_schema(SchemaSource::Str(schema.to_string())).expect("schema should compile")
}

fn is_ok(schema: &str, root: &str, data: String) -> bool {
    let mut registry = compiled(schema);
    let outcome = validate(&mut registry, Some((root, Some("acme"))), DataSource::Str(data)).expect("document should parse");
    match outcome {
        Outcome::Single(result) => result.is_ok(),
        other => panic!("expected a single-document outcome, got {other:?}"),
    }
}

const BOUNDED_INT_SCHEMA: &str = r#"
definitions:
  acme:
    types:
      reading:
        properties:
          value: {type: int, ge: -100, le: 100}
"#;

proptest! {
    /// `ge`/`le` accept iff the value falls within the closed interval, for
    /// any integer the schema author might write.
    #[test]
    fn int_ge_le_bounds_match_closed_interval(value in -1000i64..1000i64) {
        let ok = is_ok(BOUNDED_INT_SCHEMA, "reading", format!("value: {value}\n"));
        prop_assert_eq!(ok, (-100..=100).contains(&value));
    }

    /// A list's length is accepted iff it falls within `[list_min, list_max]`,
    /// for any pair of bounds and any length a document might supply.
    #[test]
    fn list_length_matches_bounds(
        min in 0i64..5,
        extra in 0i64..5,
        len in 0usize..10,
    ) {
        let max = min + extra;
        let schema = format!(
            "definitions:\n  acme:\n    types:\n      item:\n        properties:\n          name: {{type: str}}\n      holder:\n        properties:\n          items: {{type: \"item[]\", list_min: {min}, list_max: {max}}}\n"
        );
        let data = if len == 0 {
            "items: []\n".to_string()
        } else {
            let mut data = String::from("items:\n");
            for i in 0..len {
                data.push_str(&format!("  - {{name: n{i}}}\n"));
            }
            data
        };
        let ok = is_ok(&schema, "holder", data);
        let len_i64 = len as i64;
        prop_assert_eq!(ok, len_i64 >= min && len_i64 <= max);
    }

    /// `str_regex` is matched as a full-string match (anchored both ends),
    /// never a substring search: embedding the pattern inside extra
    /// characters must always fail even though the pattern itself matches.
    #[test]
    fn str_regex_is_a_full_match_not_a_substring_search(
        prefix in "[a-z]{0,3}",
        suffix in "[a-z]{0,3}",
    ) {
        let schema = r#"
definitions:
  acme:
    types:
      code:
        properties:
          value: {type: str, str_regex: "[0-9]{3}"}
"#;
        let exact = is_ok(schema, "code", "value: \"123\"\n".to_string());
        prop_assert!(exact);

        let padded = format!("value: \"{prefix}123{suffix}\"\n");
        let padded_ok = is_ok(schema, "code", padded);
        prop_assert_eq!(padded_ok, prefix.is_empty() && suffix.is_empty());
    }

    /// Compiling the same schema and validating the same document twice
    /// always produces the same accept/reject outcome (determinism).
    #[test]
    fn validation_outcome_is_deterministic(value in -1000i64..1000i64) {
        let data = format!("value: {value}\n");
        let first = is_ok(BOUNDED_INT_SCHEMA, "reading", data.clone());
        let second = is_ok(BOUNDED_INT_SCHEMA, "reading", data);
        prop_assert_eq!(first, second);
    }
}
