//! The schema compiler: turns one or more YASL documents
//! into a fully-linked [`Registry`].
//!
//! Name resolution (type expressions, `ref[...]` targets, defaults) is done
//! entirely against an in-memory index of the parsed AST, never against the
//! [`Registry`] being built. That sidesteps import/declaration ordering
//! concerns: two mutually-referencing types compile correctly regardless of
//! which one is declared first, because every name is known before any
//! descriptor is built.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::error::{Location, Result, SchemaError};
use crate::registry::{EnumDescriptor, FieldDescriptor, Registry, TypeDescriptor};
use crate::resolved::{MapKeyType, Presence, QualifiedName, ResolvedType};
use crate::value::{ObjectValue, PrimitiveValue, Value};

use super::ast::{Constraints, Enumeration, TypeDef, TypeExpr};
use super::lower::lower_document;
use super::source::{self, Node};

/// Where a schema comes from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// A single `.yasl` file; its `imports` are resolved relative to it.
    File(PathBuf),
    /// Every `*.yasl` file under a directory, processed in sorted order.
    Dir(PathBuf),
    /// An in-memory YAML document (or multi-document stream). `imports` in
    /// an in-memory schema resolve only against the current directory.
    Str(String),
}

/// Compile a schema with default engine configuration.
pub fn compile_schema(source: SchemaSource) -> Result<Registry> {
    compile_schema_with(source, &EngineConfig::default())
}

/// Compile a schema, honoring `config.max_import_depth`.
pub fn compile_schema_with(source: SchemaSource, config: &EngineConfig) -> Result<Registry> {
    tracing::debug!(?source, "compiling schema");
    let order = load_roots(&source, config)?;
    let index = build_index(&order)?;
    tracing::debug!(enums = index.enums.len(), types = index.types.len(), "schema index built");

    let mut registry = Registry::new();
    for ((name, namespace), e) in &index.enums {
        let descriptor = EnumDescriptor {
            name: name.clone(),
            namespace: namespace.clone(),
            description: e.description.clone(),
            values: e.values.clone(),
        };
        registry.insert_enum(descriptor, &e.location)?;
    }
    for ((name, namespace), t) in &index.types {
        let descriptor = compile_type(name, namespace, t, &index)?;
        registry.insert_type(descriptor, &t.location)?;
    }
    tracing::debug!("schema compiled successfully");
    Ok(registry)
}

/// An index of every declared enum/type, keyed by `(name, namespace)`,
/// spanning every document in import order. Built once, up front, so name
/// resolution never depends on registration order.
struct AstIndex<'a> {
    enums: IndexMap<(String, String), &'a Enumeration>,
    types: IndexMap<(String, String), &'a TypeDef>,
}

fn build_index(order: &[super::ast::YaslRoot]) -> Result<AstIndex<'_>> {
    let mut index = AstIndex {
        enums: IndexMap::new(),
        types: IndexMap::new(),
    };
    for root in order {
        for (_, item) in &root.definitions {
            for e in &item.enums {
                let key = (e.name.clone(), e.namespace.clone());
                if index.enums.contains_key(&key) || index.types.contains_key(&key) {
                    return Err(SchemaError::DuplicateDefinition {
                        name: e.name.clone(),
                        namespace: e.namespace.clone(),
                        location: e.location.clone(),
                    });
                }
                index.enums.insert(key, e);
            }
            for t in &item.types {
                let key = (t.name.clone(), t.namespace.clone());
                if index.types.contains_key(&key) || index.enums.contains_key(&key) {
                    return Err(SchemaError::DuplicateDefinition {
                        name: t.name.clone(),
                        namespace: t.namespace.clone(),
                        location: t.location.clone(),
                    });
                }
                index.types.insert(key, t);
            }
        }
    }
    Ok(index)
}

fn compile_type(name: &str, namespace: &str, t: &TypeDef, index: &AstIndex) -> Result<TypeDescriptor> {
    let mut fields = Vec::with_capacity(t.properties.len());
    for p in &t.properties {
        let mut resolved = resolve_type_expr(&p.type_expr, namespace, index, &p.location, &p.name)?;
        check_constraint_applicability(&resolved, &p.constraints, &p.name, &p.location)?;
        if let ResolvedType::Reference { target_type, target_property, .. } = resolved {
            resolved = ResolvedType::Reference {
                target_type,
                target_property,
                no_ref_check: p.constraints.no_ref_check,
            };
        }
        let default = match &p.default {
            Some(node) => Some(compile_default(node, &resolved, &p.constraints, index, &p.location, &p.name)?),
            None => None,
        };
        fields.push(FieldDescriptor {
            name: p.name.clone(),
            resolved_type: resolved,
            presence: p.presence,
            unique: p.unique,
            constraints: p.constraints.clone(),
            default,
            location: p.location.clone(),
        });
    }
    Ok(TypeDescriptor {
        name: name.to_string(),
        namespace: namespace.to_string(),
        description: t.description.clone(),
        fields,
        validators: t.validators.clone(),
    })
}

/// Resolve a surface [`TypeExpr`] against the AST index.
fn resolve_type_expr(
    expr: &TypeExpr,
    defining_namespace: &str,
    index: &AstIndex,
    location: &Location,
    property_name: &str,
) -> Result<ResolvedType> {
    match expr {
        TypeExpr::Name { namespace, name } => resolve_named(name, namespace.as_deref(), defining_namespace, index, location),
        TypeExpr::List(inner) => Ok(ResolvedType::List(Box::new(resolve_type_expr(
            inner,
            defining_namespace,
            index,
            location,
            property_name,
        )?))),
        TypeExpr::Map(key_expr, value_expr) => {
            let key_resolved = resolve_type_expr(key_expr, defining_namespace, index, location, property_name)?;
            let key = match &key_resolved {
                ResolvedType::Scalar(crate::primitive::PrimitiveKind::Str) => MapKeyType::Str,
                ResolvedType::Scalar(crate::primitive::PrimitiveKind::Int) => MapKeyType::Int,
                ResolvedType::Enum(q) => MapKeyType::Enum(q.clone()),
                other => {
                    return Err(SchemaError::BadMapKey {
                        key_type: format!("{other:?}"),
                        property: property_name.to_string(),
                        location: location.clone(),
                    })
                }
            };
            let value = resolve_type_expr(value_expr, defining_namespace, index, location, property_name)?;
            Ok(ResolvedType::Map {
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        TypeExpr::Ref {
            namespace,
            type_name,
            property_name: target_prop,
        } => resolve_reference(namespace.as_deref(), type_name, target_prop, defining_namespace, index, location),
    }
}

fn resolve_named(
    name: &str,
    qualifier: Option<&str>,
    defining_namespace: &str,
    index: &AstIndex,
    location: &Location,
) -> Result<ResolvedType> {
    if qualifier.is_none() {
        if let Some(prim) = crate::primitive::PrimitiveKind::from_name(name) {
            return Ok(ResolvedType::Scalar(prim));
        }
    }
    if let Some(ns) = qualifier {
        if index.types.contains_key(&(name.to_string(), ns.to_string())) {
            return Ok(ResolvedType::Object(QualifiedName::new(name, ns)));
        }
        if index.enums.contains_key(&(name.to_string(), ns.to_string())) {
            return Ok(ResolvedType::Enum(QualifiedName::new(name, ns)));
        }
        return Err(SchemaError::UnknownType {
            name: format!("{ns}.{name}"),
            location: location.clone(),
        });
    }

    let type_matches: Vec<String> = index.types.keys().filter(|(n, _)| n == name).map(|(_, ns)| ns.clone()).collect();
    let enum_matches: Vec<String> = index.enums.keys().filter(|(n, _)| n == name).map(|(_, ns)| ns.clone()).collect();

    match (type_matches.len(), enum_matches.len()) {
        (0, 0) => Err(SchemaError::UnknownType {
            name: name.to_string(),
            location: location.clone(),
        }),
        (1, 0) => Ok(ResolvedType::Object(QualifiedName::new(name, type_matches[0].clone()))),
        (0, 1) => Ok(ResolvedType::Enum(QualifiedName::new(name, enum_matches[0].clone()))),
        _ => {
            if type_matches.iter().any(|ns| ns == defining_namespace) {
                return Ok(ResolvedType::Object(QualifiedName::new(name, defining_namespace)));
            }
            if enum_matches.iter().any(|ns| ns == defining_namespace) {
                return Ok(ResolvedType::Enum(QualifiedName::new(name, defining_namespace)));
            }
            let mut namespaces: Vec<String> = type_matches.into_iter().chain(enum_matches).collect();
            namespaces.sort();
            namespaces.dedup();
            Err(SchemaError::AmbiguousType {
                name: name.to_string(),
                namespaces,
                location: location.clone(),
            })
        }
    }
}

fn resolve_reference(
    qualifier: Option<&str>,
    type_name: &str,
    target_property: &str,
    defining_namespace: &str,
    index: &AstIndex,
    location: &Location,
) -> Result<ResolvedType> {
    let target = resolve_named(type_name, qualifier, defining_namespace, index, location)?;
    let target_qname = match target {
        ResolvedType::Object(q) => q,
        _ => {
            return Err(SchemaError::BadReference {
                target: format!("{type_name}.{target_property}"),
                reason: "target is not a composite type".into(),
                location: location.clone(),
            })
        }
    };
    let target_def = index
        .types
        .get(&(target_qname.name.clone(), target_qname.namespace.clone()))
        .ok_or_else(|| SchemaError::BadReference {
            target: format!("{target_qname}.{target_property}"),
            reason: "target type not found".into(),
            location: location.clone(),
        })?;
    let target_field = target_def.property(target_property).ok_or_else(|| SchemaError::BadReference {
        target: format!("{target_qname}.{target_property}"),
        reason: "target property not declared".into(),
        location: location.clone(),
    })?;
    if !target_field.unique {
        return Err(SchemaError::BadReference {
            target: format!("{target_qname}.{target_property}"),
            reason: "target property is not marked unique".into(),
            location: location.clone(),
        });
    }
    let target_resolved = resolve_type_expr(&target_field.type_expr, &target_qname.namespace, index, location, target_property)?;
    if !matches!(target_resolved, ResolvedType::Scalar(_)) {
        return Err(SchemaError::BadReference {
            target: format!("{target_qname}.{target_property}"),
            reason: "target property is not a primitive type".into(),
            location: location.clone(),
        });
    }
    Ok(ResolvedType::Reference {
        target_type: target_qname,
        target_property: target_property.to_string(),
        no_ref_check: false,
    })
}

/// Reject constraint keys that cannot apply to a property's resolved type.
/// Checked once at compile time so a misattached constraint (e.g.
/// `str_regex` on an `int`) is a schema error rather than a
/// silently-ignored no-op at validation time.
fn check_constraint_applicability(resolved: &ResolvedType, c: &Constraints, property_name: &str, location: &Location) -> Result<()> {
    let unknown = |constraint: &str| -> SchemaError {
        SchemaError::UnknownConstraint {
            constraint: constraint.to_string(),
            property: property_name.to_string(),
            location: location.clone(),
        }
    };

    if c.list_min.is_some() || c.list_max.is_some() {
        match resolved {
            ResolvedType::List(_) => {}
            ResolvedType::Map { .. } => {
                return Err(SchemaError::ListAndMap {
                    property: property_name.to_string(),
                    location: location.clone(),
                })
            }
            _ => return Err(unknown(if c.list_min.is_some() { "list_min" } else { "list_max" })),
        }
    }

    let numeric_set = c.gt.is_some() || c.ge.is_some() || c.lt.is_some() || c.le.is_some() || c.exclude.is_some() || c.multiple_of.is_some() || c.whole_number;
    let string_set = c.str_min.is_some() || c.str_max.is_some() || c.str_regex.is_some();
    let date_set = c.before.is_some() || c.after.is_some();
    let path_set = c.path_exists.is_some() || c.is_dir.is_some() || c.is_file.is_some() || c.file_ext.is_some();
    let url_set = c.url_base.is_some() || c.url_protocols.is_some() || c.url_reachable.is_some();

    match resolved {
        ResolvedType::Scalar(kind) => {
            if numeric_set && !kind.is_numeric() {
                return Err(unknown("gt/ge/lt/le/exclude/multiple_of/whole_number"));
            }
            if string_set && !kind.is_string_like() {
                return Err(unknown("str_min/str_max/str_regex"));
            }
            if date_set && !kind.is_date_like() {
                return Err(unknown("before/after"));
            }
            if path_set && !kind.is_path_like() {
                return Err(unknown("path_exists/is_dir/is_file/file_ext"));
            }
            if url_set && !kind.is_url_like() {
                return Err(unknown("url_base/url_protocols/url_reachable"));
            }
        }
        ResolvedType::Reference { .. } => {
            if numeric_set || string_set || date_set || path_set || url_set {
                return Err(unknown("scalar constraint on a reference property"));
            }
        }
        ResolvedType::List(inner) => {
            return check_constraint_applicability(inner, c, property_name, location);
        }
        ResolvedType::Map { value, .. } => {
            return check_constraint_applicability(value, c, property_name, location);
        }
        ResolvedType::Enum(_) | ResolvedType::Object(_) => {
            if numeric_set || string_set || date_set || path_set || url_set {
                return Err(unknown("scalar constraint on a non-scalar property"));
            }
        }
    }
    Ok(())
}

/// Parse and validate a property's `default:` node against its resolved
/// type, using the AST index (not the registry) so forward references work
/// the same way they do for ordinary type resolution.
fn compile_default(
    node: &Node,
    resolved: &ResolvedType,
    constraints: &Constraints,
    index: &AstIndex,
    location: &Location,
    property_name: &str,
) -> Result<Value> {
    match resolved {
        ResolvedType::Scalar(kind) => {
            let text = node
                .as_scalar()
                .ok_or_else(|| invalid_default(property_name, "default must be a scalar", location))?;
            let value = kind.parse(text).map_err(|e| invalid_default(property_name, &e, location))?;
            Ok(Value::Primitive(value))
        }
        ResolvedType::Enum(qname) => {
            let text = node
                .as_scalar()
                .ok_or_else(|| invalid_default(property_name, "default must be a scalar", location))?;
            let descriptor = index
                .enums
                .get(&(qname.name.clone(), qname.namespace.clone()))
                .ok_or_else(|| invalid_default(property_name, &format!("enum '{qname}' not found"), location))?;
            if descriptor.values.iter().any(|v| v == text) {
                Ok(Value::Enum(text.to_string()))
            } else {
                Err(invalid_default(property_name, &format!("'{text}' is not a member of enum '{qname}'"), location))
            }
        }
        ResolvedType::Object(qname) => {
            let mapping = node
                .as_mapping()
                .ok_or_else(|| invalid_default(property_name, "default must be a mapping", location))?;
            let type_def = index
                .types
                .get(&(qname.name.clone(), qname.namespace.clone()))
                .ok_or_else(|| invalid_default(property_name, &format!("type '{qname}' not found"), location))?;
            for (key_node, _) in mapping {
                let key = key_node.as_scalar().unwrap_or_default();
                if type_def.property(key).is_none() {
                    return Err(invalid_default(property_name, &format!("unknown field '{key}' in default"), location));
                }
            }
            Ok(Value::Object(ObjectValue {
                type_name: qname.name.clone(),
                namespace: qname.namespace.clone(),
                fields: IndexMap::new(),
            }))
        }
        ResolvedType::List(inner) => {
            let items = node
                .as_sequence()
                .ok_or_else(|| invalid_default(property_name, "default must be a list", location))?;
            if let Some(min) = constraints.list_min {
                if (items.len() as i64) < min {
                    return Err(invalid_default(property_name, "default list is shorter than list_min", location));
                }
            }
            if let Some(max) = constraints.list_max {
                if (items.len() as i64) > max {
                    return Err(invalid_default(property_name, "default list is longer than list_max", location));
                }
            }
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(compile_default(item, inner, constraints, index, location, property_name)?);
            }
            Ok(Value::List(out))
        }
        ResolvedType::Map { key, value } => {
            let pairs = node
                .as_mapping()
                .ok_or_else(|| invalid_default(property_name, "default must be a mapping", location))?;
            let mut out = Vec::with_capacity(pairs.len());
            for (key_node, value_node) in pairs {
                let key_text = key_node
                    .as_scalar()
                    .ok_or_else(|| invalid_default(property_name, "map key must be a scalar", location))?;
                match key.as_ref() {
                    MapKeyType::Str => {}
                    MapKeyType::Int => {
                        key_text
                            .parse::<i64>()
                            .map_err(|_| invalid_default(property_name, "map key is not an integer", location))?;
                    }
                    MapKeyType::Enum(qname) => {
                        let descriptor = index
                            .enums
                            .get(&(qname.name.clone(), qname.namespace.clone()))
                            .ok_or_else(|| invalid_default(property_name, &format!("enum '{qname}' not found"), location))?;
                        if !descriptor.values.iter().any(|v| v == key_text) {
                            return Err(invalid_default(
                                property_name,
                                &format!("map key '{key_text}' is not a member of enum '{qname}'"),
                                location,
                            ));
                        }
                    }
                }
                out.push((key_text.to_string(), compile_default(value_node, value, constraints, index, location, property_name)?));
            }
            Ok(Value::Map(out))
        }
        ResolvedType::Reference { .. } => {
            let text = node
                .as_scalar()
                .ok_or_else(|| invalid_default(property_name, "default must be a scalar", location))?;
            Ok(Value::Primitive(PrimitiveValue::Str(text.to_string())))
        }
    }
}

fn invalid_default(property: &str, message: &str, location: &Location) -> SchemaError {
    SchemaError::InvalidDefault {
        property: property.to_string(),
        message: message.to_string(),
        location: location.clone(),
    }
}

/// Load every document reachable from `source`, imports first, in
/// compilation order.
fn load_roots(source: &SchemaSource, config: &EngineConfig) -> Result<Vec<super::ast::YaslRoot>> {
    let mut order = Vec::new();
    match source {
        SchemaSource::File(path) => {
            let mut visiting = Vec::new();
            let mut visited = HashSet::new();
            load_file_recursive(path, config, &mut visiting, &mut visited, &mut order)?;
        }
        SchemaSource::Dir(dir) => {
            let files = source::collect_files(dir, "yasl")?;
            let mut visiting = Vec::new();
            let mut visited = HashSet::new();
            for file in files {
                load_file_recursive(&file, config, &mut visiting, &mut visited, &mut order)?;
            }
        }
        SchemaSource::Str(text) => {
            let docs = source::parse_str(text).map_err(|e| SchemaError::YamlParseError {
                message: e.message.clone(),
                location: Location {
                    file: None,
                    line: Some(e.line),
                    column: Some(e.column),
                },
            })?;
            for doc in &docs {
                order.push(lower_document(doc, None)?);
            }
        }
    }
    Ok(order)
}

fn load_file_recursive(
    path: &Path,
    config: &EngineConfig,
    visiting: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
    order: &mut Vec<super::ast::YaslRoot>,
) -> Result<()> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if visiting.contains(&canonical) {
        let mut cycle: Vec<String> = visiting.iter().map(|p| p.display().to_string()).collect();
        cycle.push(canonical.display().to_string());
        return Err(SchemaError::SchemaImportCycle { cycle: cycle.join(" -> ") });
    }
    if visited.contains(&canonical) {
        return Ok(());
    }
    if visiting.len() >= config.max_import_depth {
        return Err(SchemaError::ImportError {
            import: path.display().to_string(),
            reason: "maximum import depth exceeded".into(),
        });
    }

    let docs = source::parse_file(path).map_err(|e| SchemaError::YamlParseError {
        message: e.message.clone(),
        location: Location {
            file: e.path.as_ref().map(|p| p.display().to_string()),
            line: Some(e.line),
            column: Some(e.column),
        },
    })?;
    let file_label = path.to_str().map(str::to_string);
    let mut roots = Vec::with_capacity(docs.len());
    for doc in &docs {
        roots.push(lower_document(doc, file_label.as_deref())?);
    }

    visiting.push(canonical.clone());
    for root in &roots {
        for import in &root.imports {
            tracing::debug!(from = %path.display(), import, "resolving schema import");
            let import_path = resolve_import_path(import, path)?;
            load_file_recursive(&import_path, config, visiting, visited, order)?;
        }
    }
    visiting.pop();

    order.extend(roots);
    visited.insert(canonical);
    Ok(())
}

/// Resolve an `imports` entry: absolute as-is, else relative to the
/// importing file's directory, else relative to the current working
/// directory.
fn resolve_import_path(raw: &str, importing_file: &Path) -> Result<PathBuf> {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(SchemaError::ImportError {
            import: raw.to_string(),
            reason: "path does not exist".into(),
        });
    }
    if let Some(dir) = importing_file.parent() {
        let relative = dir.join(candidate);
        if relative.exists() {
            return Ok(relative);
        }
    }
    if candidate.exists() {
        return Ok(candidate.to_path_buf());
    }
    Err(SchemaError::ImportError {
        import: raw.to_string(),
        reason: "could not resolve relative to the importing file or the working directory".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_enum_and_unique_property() {
        let schema = r#"
definitions:
  acme:
    enums:
      status:
        values: [active, inactive]
    types:
      customer:
        properties:
          name: {type: str, unique: true}
          status: {type: status, presence: required}
"#;
        let registry = compile_schema(SchemaSource::Str(schema.to_string())).unwrap();
        assert!(registry.find_type("customer", Some("acme"), None).unwrap().is_some());
        assert!(registry.find_enum("status", Some("acme"), None).unwrap().is_some());
    }

    #[test]
    fn resolves_forward_referenced_type() {
        let schema = r#"
definitions:
  acme:
    types:
      account:
        properties:
          owner: {type: customer}
      customer:
        properties:
          name: {type: str, unique: true}
"#;
        let registry = compile_schema(SchemaSource::Str(schema.to_string())).unwrap();
        let account = registry.find_type("account", Some("acme"), None).unwrap().unwrap();
        let owner = account.field("owner").unwrap();
        assert!(matches!(owner.resolved_type, ResolvedType::Object(_)));
    }

    #[test]
    fn rejects_duplicate_definition() {
        let schema = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str}
      customer:
        properties:
          email: {type: str}
"#;
        let err = compile_schema(SchemaSource::Str(schema.to_string())).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateDefinition { .. }));
    }

    #[test]
    fn rejects_unknown_type_reference() {
        let schema = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          tier: {type: pricing_tier}
"#;
        let err = compile_schema(SchemaSource::Str(schema.to_string())).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn ref_target_must_be_unique() {
        let schema = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str}
      account:
        properties:
          owner: {type: "ref[customer.name]"}
"#;
        let err = compile_schema(SchemaSource::Str(schema.to_string())).unwrap_err();
        assert!(matches!(err, SchemaError::BadReference { .. }));
    }

    #[test]
    fn ref_target_resolves_when_unique() {
        let schema = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          name: {type: str, unique: true}
      account:
        properties:
          owner: {type: "ref[customer.name]"}
"#;
        let registry = compile_schema(SchemaSource::Str(schema.to_string())).unwrap();
        let account = registry.find_type("account", Some("acme"), None).unwrap().unwrap();
        let owner = account.field("owner").unwrap();
        assert!(matches!(owner.resolved_type, ResolvedType::Reference { .. }));
    }

    #[test]
    fn invalid_default_is_rejected() {
        let schema = r#"
definitions:
  acme:
    types:
      customer:
        properties:
          age: {type: int, default: "not-a-number"}
"#;
        let err = compile_schema(SchemaSource::Str(schema.to_string())).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn detects_import_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yasl");
        let b = dir.path().join("b.yasl");
        std::fs::write(&a, "imports: [b.yasl]\ndefinitions: {}\n").unwrap();
        std::fs::write(&b, "imports: [a.yasl]\ndefinitions: {}\n").unwrap();
        let err = compile_schema(SchemaSource::File(a)).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaImportCycle { .. }));
    }

    #[test]
    fn resolves_import_relative_to_importing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let base = sub.join("base.yasl");
        std::fs::write(&base, "definitions:\n  acme:\n    enums:\n      status:\n        values: [a, b]\n").unwrap();
        let main = dir.path().join("main.yasl");
        std::fs::write(&main, "imports: [sub/base.yasl]\ndefinitions: {}\n").unwrap();
        let registry = compile_schema(SchemaSource::File(main)).unwrap();
        assert!(registry.find_enum("status", Some("acme"), None).unwrap().is_some());
    }
}
