//! Selects a root type, named or auto-detected, and walks one or more
//! data documents through it, draining the deferred reference queue
//! once traversal completes.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::error::{Location, Result, SchemaError};
use crate::parser::source::{self, Node, YamlParseError};
use crate::registry::{Registry, TypeDescriptor};
use crate::validator::{validate_object, ValidationCtx};
use crate::value::Value;

/// `(name, namespace?)`, naming an already-compiled root type.
pub type RootHint<'a> = (&'a str, Option<&'a str>);

/// Where data to validate comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A single YAML file, possibly a `---`-separated multi-document stream.
    File(PathBuf),
    /// Every `*.yaml`/`*.yml` file under a directory, processed in sorted
    /// order; one file's failure does not stop the others.
    Dir(PathBuf),
    /// An in-memory YAML string, possibly multi-document.
    Str(String),
}

/// One document's validation result: the validated value tree plus any
/// accumulated non-fatal diagnostics (currently only `PreferredMissing`) on
/// success, or the full fatal-and-non-fatal diagnostic list on failure.
pub type UnitResult = std::result::Result<(Value, Vec<Diagnostic>), Vec<Diagnostic>>;

/// The result of one `validate()` call.
#[derive(Debug)]
pub enum Outcome {
    /// A single document was validated.
    Single(UnitResult),
    /// A multi-document stream: each document validated independently.
    Documents(Vec<UnitResult>),
    /// Directory mode: one result per file, in sorted path order.
    Files(Vec<(PathBuf, UnitResult)>),
}

/// Validate `data` against `registry` with default engine configuration and
/// no cancellation.
pub fn validate(registry: &mut Registry, root_hint: Option<RootHint<'_>>, data: DataSource) -> Result<Outcome> {
    validate_with(registry, root_hint, data, &EngineConfig::default(), None)
}

/// Validate `data` against `registry`, honoring `config` and an optional
/// cooperative cancellation token. The uniqueness index accumulated while
/// validating is cleared before returning, regardless of outcome.
pub fn validate_with(
    registry: &mut Registry,
    root_hint: Option<RootHint<'_>>,
    data: DataSource,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Outcome> {
    let outcome = match data {
        DataSource::Str(text) => {
            let docs = source::parse_str(&text).map_err(to_schema_error)?;
            documents_outcome(docs, registry, root_hint, config, cancellation)
        }
        DataSource::File(path) => {
            let docs = source::parse_file(&path).map_err(to_schema_error)?;
            documents_outcome(docs, registry, root_hint, config, cancellation)
        }
        DataSource::Dir(dir) => {
            let mut files = source::collect_files(&dir, "yaml")?;
            files.extend(source::collect_files(&dir, "yml")?);
            files.sort();
            let mut results = Vec::with_capacity(files.len());
            for file in files {
                if let Some(token) = cancellation {
                    if token.is_cancelled() {
                        break;
                    }
                }
                let result = match source::parse_file(&file) {
                    Ok(docs) => validate_stream(&docs, registry, root_hint, config, cancellation),
                    Err(e) => Err(vec![Diagnostic::new(ErrorKind::YamlParseError, e.message.clone(), Vec::new(), e.line, e.column)]),
                };
                results.push((file, result));
            }
            Outcome::Files(results)
        }
    };
    registry.clear_uniqueness();
    Ok(outcome)
}

fn to_schema_error(e: YamlParseError) -> SchemaError {
    SchemaError::YamlParseError {
        message: e.message.clone(),
        location: Location {
            file: e.path.as_ref().map(|p| p.display().to_string()),
            line: Some(e.line),
            column: Some(e.column),
        },
    }
}

fn documents_outcome(
    docs: Vec<Node>,
    registry: &mut Registry,
    root_hint: Option<RootHint<'_>>,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Outcome {
    if docs.len() == 1 {
        Outcome::Single(validate_one_document(&docs[0], registry, root_hint, config, cancellation))
    } else {
        let results = docs
            .iter()
            .map(|d| validate_one_document(d, registry, root_hint, config, cancellation))
            .collect();
        Outcome::Documents(results)
    }
}

/// Validate every document in a file as one unit, for directory mode, where
/// a multi-document file still contributes exactly one `(path, result)` pair.
fn validate_stream(
    docs: &[Node],
    registry: &mut Registry,
    root_hint: Option<RootHint<'_>>,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> UnitResult {
    if docs.len() == 1 {
        return validate_one_document(&docs[0], registry, root_hint, config, cancellation);
    }
    let mut values = Vec::with_capacity(docs.len());
    let mut diagnostics = Vec::new();
    let mut non_fatal = Vec::new();
    for (idx, doc) in docs.iter().enumerate() {
        match validate_one_document(doc, registry, root_hint, config, cancellation) {
            Ok((v, diags)) => {
                values.push(v);
                for mut d in diags {
                    d.path.insert(0, idx.to_string());
                    non_fatal.push(d);
                }
            }
            Err(diags) => {
                for mut d in diags {
                    d.path.insert(0, idx.to_string());
                    diagnostics.push(d);
                }
            }
        }
    }
    if diagnostics.is_empty() {
        Ok((Value::List(values), non_fatal))
    } else {
        Err(diagnostics)
    }
}

fn validate_one_document(
    doc: &Node,
    registry: &mut Registry,
    root_hint: Option<RootHint<'_>>,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> UnitResult {
    let type_desc = match resolve_root(doc, registry, root_hint) {
        Ok(t) => t,
        Err(diagnostic) => return Err(vec![diagnostic]),
    };

    let mut ctx = ValidationCtx::new(config, cancellation);
    let mut path = Vec::new();
    let value = validate_object(doc, &type_desc, registry, &mut ctx, &mut path);
    drain_pending_refs(registry, &mut ctx);

    if ctx.diagnostics.iter().any(Diagnostic::is_fatal) {
        Err(ctx.diagnostics)
    } else {
        Ok((value, ctx.diagnostics))
    }
}

/// Resolve the root type: a named root, or auto-detection by comparing
/// the document's top-level key set against every compiled type's property
/// names.
fn resolve_root(
    doc: &Node,
    registry: &Registry,
    root_hint: Option<RootHint<'_>>,
) -> std::result::Result<Arc<TypeDescriptor>, Diagnostic> {
    if let Some((name, namespace)) = root_hint {
        return match registry.find_type(name, namespace, None) {
            Ok(Some(t)) => Ok(t),
            Ok(None) => Err(Diagnostic::new(
                ErrorKind::SchemaError,
                format!("root type '{name}' not found in the compiled schema"),
                Vec::new(),
                doc.line,
                doc.column,
            )),
            Err(_) => Err(Diagnostic::new(
                ErrorKind::SchemaError,
                format!("root type '{name}' is ambiguous without an explicit namespace"),
                Vec::new(),
                doc.line,
                doc.column,
            )),
        };
    }

    let Some(mapping) = doc.as_mapping() else {
        return Err(Diagnostic::new(
            ErrorKind::TypeError,
            "data document must be a mapping to auto-detect a root type",
            Vec::new(),
            doc.line,
            doc.column,
        ));
    };
    let keys: Vec<&str> = mapping.iter().filter_map(|(k, _)| k.as_scalar()).collect();

    let exact: Vec<&Arc<TypeDescriptor>> = registry.all_types().filter(|t| t.is_exact_key_set_match(keys.iter().copied())).collect();
    if exact.len() == 1 {
        tracing::debug!(root = %exact[0].qualified_name(), "auto-detected root type by exact key-set match");
        return Ok(exact[0].clone());
    }
    if exact.len() > 1 {
        tracing::warn!(candidates = exact.len(), "auto-detection found multiple exact key-set matches");
        return Err(ambiguous_root(&exact, doc));
    }

    let candidates: Vec<&Arc<TypeDescriptor>> = registry.all_types().filter(|t| t.accepts_key_set(keys.iter().copied())).collect();
    match candidates.len() {
        1 => {
            tracing::debug!(root = %candidates[0].qualified_name(), "auto-detected root type by key-subset match");
            Ok(candidates[0].clone())
        }
        0 => Err(Diagnostic::new(
            ErrorKind::AmbiguousRoot,
            "no declared type accepts this document's key set",
            Vec::new(),
            doc.line,
            doc.column,
        )),
        _ => {
            tracing::warn!(candidates = candidates.len(), "auto-detection found multiple key-subset matches");
            Err(ambiguous_root(&candidates, doc))
        }
    }
}

fn ambiguous_root(candidates: &[&Arc<TypeDescriptor>], doc: &Node) -> Diagnostic {
    let names: Vec<String> = candidates.iter().map(|t| t.qualified_name().to_string()).collect();
    Diagnostic::new(
        ErrorKind::AmbiguousRoot,
        format!("multiple root type candidates match this document: {names:?}"),
        Vec::new(),
        doc.line,
        doc.column,
    )
}

/// Drain `ctx.pending_refs`, verifying each `ref[Type.property]` occurrence
/// against the now-fully-populated uniqueness index.
fn drain_pending_refs(registry: &Registry, ctx: &mut ValidationCtx) {
    let pending = std::mem::take(&mut ctx.pending_refs);
    tracing::debug!(count = pending.len(), "draining deferred reference queue");
    for r in pending {
        match registry.unique_exists(r.target_namespace.as_deref(), &r.target_type, &r.target_property, &r.value) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(value = %r.rendered_value, target = %r.target_type, property = %r.target_property, "dangling reference");
                ctx.diagnostics.push(Diagnostic::new(
                    ErrorKind::DanglingReference,
                    format!("'{}' does not match any '{}.{}' value", r.rendered_value, r.target_type, r.target_property),
                    r.path,
                    r.line,
                    r.column,
                ));
            }
            Err(_) => {
                ctx.diagnostics.push(Diagnostic::new(
                    ErrorKind::SchemaError,
                    format!("reference target '{}.{}' is ambiguous", r.target_type, r.target_property),
                    r.path,
                    r.line,
                    r.column,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compiler::{compile_schema, SchemaSource};

    fn compiled(schema: &str) -> Registry {
        compile_schema(SchemaSource::Str(schema.to_string())).unwrap()
    }

    #[test]
    fn validates_a_single_document() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str, unique: true}
          age: {type: int, ge: 0}
"#,
        );
        let outcome = validate(&mut registry, Some(("customer", Some("acme"))), DataSource::Str("name: Bob\nage: 41\n".into())).unwrap();
        match outcome {
            Outcome::Single(Ok((value, diags))) => {
                assert_eq!(value.as_object().unwrap().type_name, "customer");
                assert!(diags.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn auto_detects_root_by_exact_key_set() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str}
      widget:
        properties:
          sku: {type: str}
"#,
        );
        let outcome = validate(&mut registry, None, DataSource::Str("sku: W-1\n".into())).unwrap();
        match outcome {
            Outcome::Single(Ok((value, _))) => assert_eq!(value.as_object().unwrap().type_name, "widget"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn dangling_reference_is_reported_after_traversal() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str, unique: true}
      account:
        properties:
          owner: {type: "ref[customer.name]"}
"#,
        );
        let outcome = validate(
            &mut registry,
            Some(("account", Some("acme"))),
            DataSource::Str("owner: ghost\n".into()),
        )
        .unwrap();
        match outcome {
            Outcome::Single(Err(diags)) => assert_eq!(diags[0].kind, ErrorKind::DanglingReference),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn uniqueness_index_is_cleared_between_validate_calls() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str, unique: true}
      account:
        properties:
          owner: {type: "ref[customer.name]"}
"#,
        );
        let outcome = validate(&mut registry, Some(("customer", Some("acme"))), DataSource::Str("name: Bob\n".into())).unwrap();
        assert!(matches!(outcome, Outcome::Single(Ok(_))));

        let outcome = validate(&mut registry, Some(("account", Some("acme"))), DataSource::Str("owner: Bob\n".into()));
        // the uniqueness index was cleared by the previous `validate()` call,
        // so this reference is unresolved again.
        match outcome.unwrap() {
            Outcome::Single(Err(diags)) => assert_eq!(diags[0].kind, ErrorKind::DanglingReference),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn preferred_missing_is_surfaced_alongside_a_successful_outcome() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str}
          nickname: {type: str, presence: preferred}
"#,
        );
        let outcome = validate(&mut registry, Some(("customer", Some("acme"))), DataSource::Str("name: Bob\n".into())).unwrap();
        match outcome {
            Outcome::Single(Ok((value, diags))) => {
                assert_eq!(value.as_object().unwrap().type_name, "customer");
                assert_eq!(diags.len(), 1);
                assert_eq!(diags[0].kind, ErrorKind::PreferredMissing);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn multi_document_stream_validates_each_independently() {
        let mut registry = compiled(
            r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str}
"#,
        );
        let outcome = validate(
            &mut registry,
            Some(("customer", Some("acme"))),
            DataSource::Str("name: Alice\n---\nname: Bob\n".into()),
        )
        .unwrap();
        match outcome {
            Outcome::Documents(results) => assert_eq!(results.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
