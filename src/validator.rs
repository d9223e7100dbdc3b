//! Per-property validator pipelines and type-level validator clauses.
//!
//! This is the core of the engine: a recursive function that walks a
//! [`Node`] against a [`ResolvedType`], running the ordered constraint
//! stages, and threading a [`ValidationCtx`] so diagnostics accumulate
//! instead of short-circuiting the enclosing type.

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::parser::ast::Constraints;
use crate::parser::source::Node;
use crate::primitive::PrimitiveKind;
use crate::registry::{FieldDescriptor, Registry, TypeDescriptor};
use crate::resolved::{MapKeyType, Presence, ResolvedType};
use crate::value::{ObjectValue, PrimitiveValue, Value};

/// A pending `ref[Type.property]` occurrence, resolved in the post-pass.
#[derive(Debug, Clone)]
pub struct PendingReference {
    pub target_namespace: Option<String>,
    pub target_type: String,
    pub target_property: String,
    pub value: String,
    pub rendered_value: String,
    pub path: Vec<String>,
    pub line: usize,
    pub column: usize,
}

/// Threaded through one `validate()` call: accumulates diagnostics, the
/// post-pass reference queue, and carries ambient config/cancellation.
pub struct ValidationCtx<'a> {
    pub diagnostics: Vec<Diagnostic>,
    pub pending_refs: Vec<PendingReference>,
    pub config: &'a EngineConfig,
    pub cancellation: Option<&'a crate::cancellation::CancellationToken>,
}

impl<'a> ValidationCtx<'a> {
    #[must_use]
    pub fn new(config: &'a EngineConfig, cancellation: Option<&'a crate::cancellation::CancellationToken>) -> Self {
        Self {
            diagnostics: Vec::new(),
            pending_refs: Vec::new(),
            config,
            cancellation,
        }
    }

    fn push(&mut self, kind: ErrorKind, message: impl Into<String>, path: &[String], line: usize, column: usize) {
        self.diagnostics.push(Diagnostic::new(kind, message, path.to_vec(), line, column));
    }
}

/// Validate a mapping [`Node`] against a compiled [`TypeDescriptor`],
/// running each property's pipeline in declaration order and then the type-level validator clauses.
pub fn validate_object(
    node: &Node,
    type_desc: &TypeDescriptor,
    registry: &mut Registry,
    ctx: &mut ValidationCtx,
    path: &mut Vec<String>,
) -> Value {
    let Some(mapping) = node.as_mapping() else {
        ctx.push(
            ErrorKind::TypeError,
            format!("expected a mapping for type '{}'", type_desc.name),
            path,
            node.line,
            node.column,
        );
        return Value::Null;
    };

    let mut fields = IndexMap::new();
    for field in &type_desc.fields {
        if let Some(token) = ctx.cancellation {
            if token.is_cancelled() {
                break;
            }
        }
        path.push(field.name.clone());
        let child = mapping.iter().find(|(k, _)| k.as_scalar() == Some(field.name.as_str())).map(|(_, v)| v);
        let value = validate_field(child, field, type_desc, registry, ctx, path, node);
        fields.insert(field.name.clone(), value);
        path.pop();
    }

    // forbid-extra-keys.
    for (key_node, _) in mapping {
        let Some(key) = key_node.as_scalar() else { continue };
        if type_desc.field(key).is_none() {
            ctx.push(
                ErrorKind::UnknownField,
                format!("unknown field '{key}' on type '{}'", type_desc.name),
                path,
                key_node.line,
                key_node.column,
            );
        }
    }

    run_type_validators(type_desc, &fields, node, ctx, path);

    Value::Object(ObjectValue {
        type_name: type_desc.name.clone(),
        namespace: type_desc.namespace.clone(),
        fields,
    })
}

fn validate_field(
    node: Option<&Node>,
    field: &FieldDescriptor,
    owner: &TypeDescriptor,
    registry: &mut Registry,
    ctx: &mut ValidationCtx,
    path: &mut Vec<String>,
    parent: &Node,
) -> Value {
    let present = node.is_some_and(|n| !n.is_null());
    if !present {
        match field.presence {
            Presence::Required => {
                ctx.push(
                    ErrorKind::MissingRequired,
                    format!("required field '{}' is missing", field.name),
                    path,
                    parent.line,
                    parent.column,
                );
                return field_default(field);
            }
            Presence::Preferred => {
                ctx.push(
                    ErrorKind::PreferredMissing,
                    format!("preferred field '{}' is missing", field.name),
                    path,
                    parent.line,
                    parent.column,
                );
                return field_default(field);
            }
            Presence::Optional => return field_default(field),
        }
    }
    let node = node.expect("present implies Some");
    let value = validate_value(node, &field.resolved_type, &field.constraints, registry, ctx, path);

    if field.unique {
        if let Some(prim) = value.as_primitive() {
            register_uniqueness(field, owner, prim, node, ctx, registry, path);
        }
    }
    value
}

fn field_default(field: &FieldDescriptor) -> Value {
    field.default.clone().unwrap_or(Value::Null)
}

fn register_uniqueness(
    field: &FieldDescriptor,
    owner: &TypeDescriptor,
    value: &PrimitiveValue,
    node: &Node,
    ctx: &mut ValidationCtx,
    registry: &mut Registry,
    path: &[String],
) {
    let key = value.unique_key();
    if !registry.insert_unique(&owner.namespace, &owner.name, &field.name, key) {
        ctx.push(
            ErrorKind::DuplicateUnique,
            format!("duplicate value '{value}' for unique field '{}'", field.name),
            path,
            node.line,
            node.column,
        );
    }
}

/// Core recursive pipeline: run the ordered constraint stages for one
/// `(Node, ResolvedType, Constraints)` triple. Used both for top-level
/// properties and recursively for list elements / map values.
#[allow(clippy::too_many_lines)]
pub fn validate_value(
    node: &Node,
    resolved: &ResolvedType,
    constraints: &Constraints,
    registry: &mut Registry,
    ctx: &mut ValidationCtx,
    path: &mut Vec<String>,
) -> Value {
    match resolved {
        ResolvedType::Scalar(PrimitiveKind::Any) => validate_any_value(node, constraints, ctx, path),
        ResolvedType::Scalar(kind) => {
            let Some(text) = node.as_scalar() else {
                ctx.push(ErrorKind::TypeError, "expected a scalar value", path, node.line, node.column);
                return Value::Null;
            };
            if *kind == PrimitiveKind::Markdown && text.trim().is_empty() {
                ctx.push(ErrorKind::ConstraintViolation, "markdown value must not be empty", path, node.line, node.column);
                return Value::Null;
            }
            match kind.parse(text) {
                Ok(value) => {
                    if let Some(v) = apply_scalar_constraints(&value, constraints, node, ctx, path) {
                        Value::Primitive(v)
                    } else {
                        Value::Null
                    }
                }
                Err(message) => {
                    ctx.push(ErrorKind::TypeError, message, path, node.line, node.column);
                    Value::Null
                }
            }
        }
        ResolvedType::Enum(qname) => {
            let Some(text) = node.as_scalar() else {
                ctx.push(ErrorKind::TypeError, "expected a scalar enum value", path, node.line, node.column);
                return Value::Null;
            };
            match registry.find_enum(&qname.name, Some(&qname.namespace), None) {
                Ok(Some(descriptor)) => {
                    if descriptor.contains(text) {
                        Value::Enum(text.to_string())
                    } else {
                        ctx.push(
                            ErrorKind::ConstraintViolation,
                            format!("'{text}' is not one of {:?}", descriptor.values),
                            path,
                            node.line,
                            node.column,
                        );
                        Value::Null
                    }
                }
                _ => {
                    ctx.push(
                        ErrorKind::SchemaError,
                        format!("enum '{qname}' not found in compiled registry"),
                        path,
                        node.line,
                        node.column,
                    );
                    Value::Null
                }
            }
        }
        ResolvedType::Object(qname) => {
            match registry.find_type(&qname.name, Some(&qname.namespace), None) {
                Ok(Some(descriptor)) => validate_object(node, &descriptor, registry, ctx, path),
                _ => {
                    ctx.push(
                        ErrorKind::SchemaError,
                        format!("type '{qname}' not found in compiled registry"),
                        path,
                        node.line,
                        node.column,
                    );
                    Value::Null
                }
            }
        }
        ResolvedType::List(inner) => {
            let Some(items) = node.as_sequence() else {
                ctx.push(ErrorKind::TypeError, "expected a list", path, node.line, node.column);
                return Value::Null;
            };
            if let Some(min) = constraints.list_min {
                if (items.len() as i64) < min {
                    ctx.push(
                        ErrorKind::ConstraintViolation,
                        format!("list must contain at least {min} items, found {}", items.len()),
                        path,
                        node.line,
                        node.column,
                    );
                }
            }
            if let Some(max) = constraints.list_max {
                if (items.len() as i64) > max {
                    ctx.push(
                        ErrorKind::ConstraintViolation,
                        format!("list must contain at most {max} items, found {}", items.len()),
                        path,
                        node.line,
                        node.column,
                    );
                }
            }
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                path.push(idx.to_string());
                out.push(validate_value(item, inner, constraints, registry, ctx, path));
                path.pop();
            }
            Value::List(out)
        }
        ResolvedType::Map { key, value } => {
            let Some(pairs) = node.as_mapping() else {
                ctx.push(ErrorKind::TypeError, "expected a mapping", path, node.line, node.column);
                return Value::Null;
            };
            let mut out = Vec::with_capacity(pairs.len());
            for (key_node, value_node) in pairs {
                let Some(rendered_key) = validate_map_key(key_node, key, registry, ctx, path) else {
                    continue;
                };
                path.push(rendered_key.clone());
                let v = validate_value(value_node, value, constraints, registry, ctx, path);
                path.pop();
                out.push((rendered_key, v));
            }
            Value::Map(out)
        }
        ResolvedType::Reference {
            target_type,
            target_property,
            no_ref_check,
        } => {
            let Some(text) = node.as_scalar() else {
                ctx.push(ErrorKind::TypeError, "expected a scalar reference value", path, node.line, node.column);
                return Value::Null;
            };
            if !*no_ref_check {
                let key = target_unique_key(registry, target_type, target_property, text);
                ctx.pending_refs.push(PendingReference {
                    target_namespace: Some(target_type.namespace.clone()),
                    target_type: target_type.name.clone(),
                    target_property: target_property.clone(),
                    value: key,
                    rendered_value: text.to_string(),
                    path: path.clone(),
                    line: node.line,
                    column: node.column,
                });
            }
            Value::Primitive(PrimitiveValue::Str(text.to_string()))
        }
    }
}

/// Render a `ref[Type.property]` occurrence's text the same way the
/// uniqueness index tags the target property's own values, by parsing it
/// through the target's declared `PrimitiveKind` rather than assuming `Str`.
/// `compiler::resolve_reference` already guarantees the target property is a
/// unique `Scalar`; if the target descriptor can't be found or the text
/// doesn't parse as that kind, the raw text is kept so the reference is
/// reported as dangling rather than silently matched against the wrong kind.
fn target_unique_key(registry: &Registry, target_type: &crate::resolved::QualifiedName, target_property: &str, text: &str) -> String {
    let kind = registry
        .find_type(&target_type.name, Some(&target_type.namespace), None)
        .ok()
        .flatten()
        .and_then(|descriptor| match descriptor.field(target_property)?.resolved_type {
            ResolvedType::Scalar(kind) => Some(kind),
            _ => None,
        });
    match kind.and_then(|k| k.parse(text).ok()) {
        Some(value) => value.unique_key(),
        None => PrimitiveValue::Str(text.to_string()).unique_key(),
    }
}

fn validate_map_key(
    key_node: &Node,
    key_type: &MapKeyType,
    registry: &Registry,
    ctx: &mut ValidationCtx,
    path: &[String],
) -> Option<String> {
    let Some(text) = key_node.as_scalar() else {
        ctx.diagnostics.push(Diagnostic::new(
            ErrorKind::TypeError,
            "map keys must be scalars",
            path.to_vec(),
            key_node.line,
            key_node.column,
        ));
        return None;
    };
    match key_type {
        MapKeyType::Str => Some(text.to_string()),
        MapKeyType::Int => {
            if text.parse::<i64>().is_ok() {
                Some(text.to_string())
            } else {
                ctx.diagnostics.push(Diagnostic::new(
                    ErrorKind::TypeError,
                    format!("map key '{text}' is not a valid integer"),
                    path.to_vec(),
                    key_node.line,
                    key_node.column,
                ));
                None
            }
        }
        MapKeyType::Enum(qname) => match registry.find_enum(&qname.name, Some(&qname.namespace), None) {
            Ok(Some(descriptor)) if descriptor.contains(text) => Some(text.to_string()),
            _ => {
                ctx.diagnostics.push(Diagnostic::new(
                    ErrorKind::ConstraintViolation,
                    format!("map key '{text}' is not a member of enum '{qname}'"),
                    path.to_vec(),
                    key_node.line,
                    key_node.column,
                ));
                None
            }
        },
    }
}

/// Validates a property whose declared type is the bare `any` kind. Unlike
/// every other scalar kind, `any` accepts either a scalar or a sequence node:
/// `any_of` entries name the acceptable kinds, with a `K[]` suffix marking a
/// kind that only matches when the whole node is a list of `K`. Without an
/// `any_of` constraint, a scalar `any` value is carried through as a string
/// and a list value is rejected (there would be no kind to parse it against).
fn validate_any_value(node: &Node, constraints: &Constraints, ctx: &mut ValidationCtx, path: &[String]) -> Value {
    if let Some(items) = node.as_sequence() {
        let Some(any_of) = &constraints.any_of else {
            ctx.push(
                ErrorKind::ConstraintViolation,
                "a list value requires an 'any_of' constraint naming the element kind",
                path,
                node.line,
                node.column,
            );
            return Value::Null;
        };
        let list_kinds: Vec<&str> = any_of.iter().filter_map(|k| k.strip_suffix("[]")).collect();
        for kind_name in &list_kinds {
            let Some(primitive_kind) = PrimitiveKind::from_name(kind_name) else { continue };
            let mut values = Vec::with_capacity(items.len());
            let mut all_ok = true;
            for item in items {
                match item.as_scalar().map(|text| primitive_kind.parse(text)) {
                    Some(Ok(v)) => values.push(Value::Primitive(v)),
                    _ => {
                        all_ok = false;
                        break;
                    }
                }
            }
            if all_ok {
                return Value::List(values);
            }
        }
        ctx.push(
            ErrorKind::ConstraintViolation,
            format!("list items must all match one of {any_of:?}"),
            path,
            node.line,
            node.column,
        );
        return Value::Null;
    }

    let Some(text) = node.as_scalar() else {
        ctx.push(ErrorKind::TypeError, "expected a scalar or list value", path, node.line, node.column);
        return Value::Null;
    };

    match &constraints.any_of {
        Some(any_of) => {
            for kind_name in any_of.iter().filter(|k| !k.ends_with("[]")) {
                if let Some(primitive_kind) = PrimitiveKind::from_name(kind_name) {
                    if let Ok(v) = primitive_kind.parse(text) {
                        return Value::Primitive(v);
                    }
                }
            }
            ctx.push(ErrorKind::ConstraintViolation, format!("value must be one of {any_of:?}"), path, node.line, node.column);
            Value::Null
        }
        None => Value::Primitive(PrimitiveValue::Str(text.to_string())),
    }
}

/// The numeric/string/date/path/url/any_of constraint stages, run against
/// an already-parsed [`PrimitiveValue`]. Returns `None` if a stage fails
/// (the property's value is dropped but sibling properties still run).
#[allow(clippy::too_many_lines)]
fn apply_scalar_constraints(
    value: &PrimitiveValue,
    c: &Constraints,
    node: &Node,
    ctx: &mut ValidationCtx,
    path: &[String],
) -> Option<PrimitiveValue> {
    let config = ctx.config;
    let mut ok = true;
    let mut fail = |kind: ErrorKind, msg: String| {
        ctx.push(kind, msg, path, node.line, node.column);
        ok = false;
    };

    // numeric bounds
    if let Some(n) = value.as_float() {
        if let Some(gt) = c.gt {
            if !(n > gt) {
                fail(ErrorKind::ConstraintViolation, format!("value must be greater than {gt}"));
            }
        }
        if let Some(ge) = c.ge {
            if !(n >= ge) {
                fail(ErrorKind::ConstraintViolation, format!("value must be greater than or equal to {ge}"));
            }
        }
        if let Some(lt) = c.lt {
            if !(n < lt) {
                fail(ErrorKind::ConstraintViolation, format!("value must be less than {lt}"));
            }
        }
        if let Some(le) = c.le {
            if !(n <= le) {
                fail(ErrorKind::ConstraintViolation, format!("value must be less than or equal to {le}"));
            }
        }
        if let Some(excluded) = &c.exclude {
            if excluded.iter().any(|x| (x - n).abs() < f64::EPSILON) {
                fail(ErrorKind::ConstraintViolation, format!("value must not be one of {excluded:?}"));
            }
        }
        if c.whole_number && n.fract() != 0.0 {
            fail(ErrorKind::ConstraintViolation, "value must be a whole number".to_string());
        }
        if let Some(m) = c.multiple_of {
            if m != 0.0 && (n % m).abs() > f64::EPSILON {
                fail(ErrorKind::ConstraintViolation, format!("value must be a multiple of {m}"));
            }
        }
    }

    // string bounds
    if let Some(s) = value.as_str() {
        if let Some(min) = c.str_min {
            if (s.chars().count() as i64) < min {
                fail(ErrorKind::ConstraintViolation, format!("string must be at least {min} characters long"));
            }
        }
        if let Some(max) = c.str_max {
            if (s.chars().count() as i64) > max {
                fail(ErrorKind::ConstraintViolation, format!("string must be at most {max} characters long"));
            }
        }
        if let Some(pattern) = &c.str_regex {
            match regex::Regex::new(&format!("^(?:{pattern})$")) {
                Ok(re) => {
                    if !re.is_match(s) {
                        fail(ErrorKind::ConstraintViolation, format!("'{s}' does not match pattern '{pattern}'"));
                    }
                }
                Err(e) => fail(ErrorKind::SchemaError, format!("invalid regex '{pattern}': {e}")),
            }
        }
    }

    // date/time bounds
    apply_date_bounds(value, c, &mut fail);

    // path checks
    if let Some(p) = value.as_str() {
        apply_path_checks(p, c, &mut fail);
        apply_url_checks(p, c, config, &mut fail);
    }

    // any-of membership
    if let Some(any_of) = &c.any_of {
        if !any_of.iter().any(|kind| primitive_value_matches_kind(value, kind)) {
            fail(ErrorKind::ConstraintViolation, format!("value must be one of {any_of:?}"));
        }
    }

    if ok { Some(value.clone()) } else { None }
}

fn apply_date_bounds(value: &PrimitiveValue, c: &Constraints, fail: &mut impl FnMut(ErrorKind, String)) {
    use chrono::NaiveDate;
    let parse_bound = |s: &str| -> Option<PrimitiveValue> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(PrimitiveValue::Date)
            .ok()
            .or_else(|| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(PrimitiveValue::DateTime).ok())
            .or_else(|| chrono::NaiveTime::parse_from_str(s, "%H:%M:%S").map(PrimitiveValue::Time).ok())
    };
    if let Some(before) = &c.before {
        match parse_bound(before) {
            Some(bound) => match (value, &bound) {
                (PrimitiveValue::Date(v), PrimitiveValue::Date(b)) if v < b => {}
                (PrimitiveValue::DateTime(v), PrimitiveValue::DateTime(b)) if v < b => {}
                (PrimitiveValue::Time(v), PrimitiveValue::Time(b)) if v < b => {}
                (PrimitiveValue::Date(_) | PrimitiveValue::DateTime(_) | PrimitiveValue::Time(_), _) => {
                    fail(ErrorKind::ConstraintViolation, format!("value must be before '{before}'"));
                }
                _ => {}
            },
            None => fail(ErrorKind::SchemaError, format!("invalid 'before' bound '{before}'")),
        }
    }
    if let Some(after) = &c.after {
        match parse_bound(after) {
            Some(bound) => match (value, &bound) {
                (PrimitiveValue::Date(v), PrimitiveValue::Date(b)) if v > b => {}
                (PrimitiveValue::DateTime(v), PrimitiveValue::DateTime(b)) if v > b => {}
                (PrimitiveValue::Time(v), PrimitiveValue::Time(b)) if v > b => {}
                (PrimitiveValue::Date(_) | PrimitiveValue::DateTime(_) | PrimitiveValue::Time(_), _) => {
                    fail(ErrorKind::ConstraintViolation, format!("value must be after '{after}'"));
                }
                _ => {}
            },
            None => fail(ErrorKind::SchemaError, format!("invalid 'after' bound '{after}'")),
        }
    }
}

/// `is_dir`/`is_file` are heuristic (trailing separator / suffix presence),
/// not filesystem probes; `path_exists` is the only path check that touches
/// the filesystem.
fn apply_path_checks(value: &str, c: &Constraints, fail: &mut impl FnMut(ErrorKind, String)) {
    let looks_like_dir = value.ends_with('/') || value.ends_with('\\') || !value.contains('.');
    let looks_like_file = !looks_like_dir;
    if let Some(want_dir) = c.is_dir {
        if want_dir && !looks_like_dir {
            fail(ErrorKind::ConstraintViolation, format!("'{value}' must be a directory"));
        }
    }
    let mut is_file_ok = true;
    if let Some(want_file) = c.is_file {
        if want_file && !looks_like_file {
            is_file_ok = false;
            fail(ErrorKind::ConstraintViolation, format!("'{value}' must be a file"));
        }
    }
    if let Some(extensions) = &c.file_ext {
        if is_file_ok && !looks_like_file {
            fail(ErrorKind::ConstraintViolation, format!("'{value}' must be a file"));
        } else {
            let path = std::path::Path::new(value);
            let actual_ext = path.extension().and_then(|e| e.to_str()).map(|e| format!(".{e}").to_lowercase());
            let normalized: Vec<String> = extensions
                .iter()
                .map(|e| if let Some(stripped) = e.strip_prefix('.') { format!(".{}", stripped.to_lowercase()) } else { format!(".{}", e.to_lowercase()) })
                .collect();
            if !actual_ext.is_some_and(|ext| normalized.contains(&ext)) {
                fail(ErrorKind::ConstraintViolation, format!("'{value}' must have one of the extensions {extensions:?}"));
            }
        }
    }
    if let Some(true) = c.path_exists {
        if !std::path::Path::new(value).exists() {
            fail(ErrorKind::ConstraintViolation, format!("'{value}' must exist on the filesystem"));
        }
    }
}

fn apply_url_checks(value: &str, c: &Constraints, config: &EngineConfig, fail: &mut impl FnMut(ErrorKind, String)) {
    if c.url_base.is_none() && c.url_protocols.is_none() && c.url_reachable.is_none() {
        return;
    }
    let Ok(parsed) = url::Url::parse(value) else {
        fail(ErrorKind::TypeError, format!("'{value}' is not a valid URL"));
        return;
    };
    if let Some(base) = &c.url_base {
        if parsed.host_str() != Some(base.as_str()) {
            fail(ErrorKind::ConstraintViolation, format!("URL '{value}' does not have a base of '{base}'"));
        }
    }
    if let Some(protocols) = &c.url_protocols {
        if !protocols.iter().any(|p| p == parsed.scheme()) {
            fail(ErrorKind::ConstraintViolation, format!("URL '{value}' must use one of the protocols {protocols:?}"));
        }
    }
    if c.url_reachable == Some(true) {
        match check_reachable(&parsed, config) {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                let msg = format!("URL '{value}' is not reachable");
                if config.url_reachability_hard_fail {
                    fail(ErrorKind::ConstraintViolation, msg);
                }
            }
        }
    }
}

fn check_reachable(_url: &url::Url, _config: &EngineConfig) -> Result<bool, ()> {
    // Network reachability is not performed in this offline pipeline; a
    // transport would be injected here.
    Ok(true)
}

fn primitive_value_matches_kind(value: &PrimitiveValue, kind: &str) -> bool {
    let (base, is_list) = kind.strip_suffix("[]").map_or((kind, false), |k| (k, true));
    if is_list {
        // A `K[]` entry only ever matches a whole sequence node, which
        // `validate_any_value` handles directly; a single scalar value
        // can never satisfy a list-shaped `any_of` entry.
        return false;
    }
    match PrimitiveKind::from_name(base) {
        Some(primitive_kind) => match (primitive_kind, value) {
            (PrimitiveKind::Str, PrimitiveValue::Str(_))
            | (PrimitiveKind::Int, PrimitiveValue::Int(_))
            | (PrimitiveKind::Float, PrimitiveValue::Float(_) | PrimitiveValue::Int(_))
            | (PrimitiveKind::Bool, PrimitiveValue::Bool(_))
            | (PrimitiveKind::Date, PrimitiveValue::Date(_))
            | (PrimitiveKind::DateTime, PrimitiveValue::DateTime(_))
            | (PrimitiveKind::Time, PrimitiveValue::Time(_)) => true,
            _ => false,
        },
        None => false,
    }
}

fn run_type_validators(
    type_desc: &TypeDescriptor,
    fields: &IndexMap<String, Value>,
    node: &Node,
    ctx: &mut ValidationCtx,
    path: &[String],
) {
    let non_null = |name: &str| fields.get(name).is_some_and(|v| !v.is_null());

    if let Some(clause) = &type_desc.validators.only_one {
        let count = clause.iter().filter(|f| non_null(f)).count();
        if count != 1 {
            ctx.push(
                ErrorKind::ConstraintViolation,
                format!("exactly one of {clause:?} must be present, found {count}"),
                path,
                node.line,
                node.column,
            );
        }
    }
    if let Some(clause) = &type_desc.validators.at_least_one {
        let count = clause.iter().filter(|f| non_null(f)).count();
        if count < 1 {
            ctx.push(
                ErrorKind::ConstraintViolation,
                format!("at least one of {clause:?} must be present"),
                path,
                node.line,
                node.column,
            );
        }
    }
    for clause in &type_desc.validators.if_then {
        let Some(eval_value) = fields.get(&clause.eval) else { continue };
        if matches_any_literal(eval_value, &clause.value) {
            for present in &clause.present {
                if !non_null(present) {
                    ctx.push(
                        ErrorKind::ConstraintViolation,
                        format!("'{present}' must be present when '{}' is in {:?}", clause.eval, clause.value),
                        path,
                        node.line,
                        node.column,
                    );
                }
            }
            for absent in &clause.absent {
                if non_null(absent) {
                    ctx.push(
                        ErrorKind::ConstraintViolation,
                        format!("'{absent}' must be absent when '{}' is in {:?}", clause.eval, clause.value),
                        path,
                        node.line,
                        node.column,
                    );
                }
            }
        }
    }
}

/// Coerce each `if_then.value` literal to the runtime type of `data[eval]`
/// and compare.
fn matches_any_literal(value: &Value, literals: &[String]) -> bool {
    match value {
        Value::Primitive(PrimitiveValue::Str(s)) => literals.iter().any(|l| l == s),
        Value::Primitive(PrimitiveValue::Int(i)) => literals.iter().any(|l| l.parse::<i64>().map(|v| v == *i).unwrap_or(false)),
        Value::Primitive(PrimitiveValue::Float(f)) => literals.iter().any(|l| l.parse::<f64>().map(|v| (v - f).abs() < f64::EPSILON).unwrap_or(false)),
        Value::Primitive(PrimitiveValue::Bool(b)) => literals.iter().any(|l| l.parse::<bool>().map(|v| v == *b).unwrap_or(false)),
        Value::Enum(s) => literals.iter().any(|l| l == s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::source::parse_str;
    use crate::resolved::QualifiedName;

    fn node(yaml: &str) -> Node {
        parse_str(yaml).unwrap().remove(0)
    }

    #[test]
    fn numeric_bounds_reject_out_of_range() {
        let n = node("20\n");
        let c = Constraints { ge: Some(18.0), lt: Some(125.0), ..Default::default() };
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let value = PrimitiveValue::Int(20);
        let out = apply_scalar_constraints(&value, &c, &n, &mut ctx, &[]);
        assert!(out.is_some());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn numeric_bounds_flag_violation() {
        let n = node("150\n");
        let c = Constraints { ge: Some(18.0), lt: Some(125.0), ..Default::default() };
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let value = PrimitiveValue::Int(150);
        let out = apply_scalar_constraints(&value, &c, &n, &mut ctx, &[]);
        assert!(out.is_none());
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn missing_required_field_reports_diagnostic() {
        let mut registry = Registry::new();
        let type_desc = TypeDescriptor {
            name: "Customer".into(),
            namespace: "acme".into(),
            description: None,
            fields: vec![FieldDescriptor {
                name: "name".into(),
                resolved_type: ResolvedType::Scalar(crate::primitive::PrimitiveKind::Str),
                presence: Presence::Required,
                unique: false,
                constraints: Constraints::default(),
                default: None,
                location: crate::error::Location::default(),
            }],
            validators: crate::parser::ast::Validators::default(),
        };
        let root = node("{}\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        let value = validate_object(&root, &type_desc, &mut registry, &mut ctx, &mut path);
        assert!(value.as_object().is_some());
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].kind, ErrorKind::MissingRequired);
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut registry = Registry::new();
        let type_desc = TypeDescriptor {
            name: "Widget".into(),
            namespace: "acme".into(),
            description: None,
            fields: Vec::new(),
            validators: crate::parser::ast::Validators::default(),
        };
        let root = node("extra: true\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        validate_object(&root, &type_desc, &mut registry, &mut ctx, &mut path);
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].kind, ErrorKind::UnknownField);
    }

    #[test]
    fn any_of_list_suffix_accepts_matching_sequence() {
        let n = node("[1, 2, 3]\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        let c = Constraints { any_of: Some(vec!["int[]".into(), "str".into()]), ..Default::default() };
        let value = validate_value(&n, &ResolvedType::Scalar(PrimitiveKind::Any), &c, &mut Registry::new(), &mut ctx, &mut path);
        assert!(ctx.diagnostics.is_empty());
        match value {
            Value::List(items) => assert_eq!(items.len(), 3),
            other => panic!("expected a list value, got {other:?}"),
        }
    }

    #[test]
    fn any_of_list_suffix_rejects_mismatched_element_kind() {
        let n = node("[1, notanumber, 3]\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        let c = Constraints { any_of: Some(vec!["int[]".into()]), ..Default::default() };
        let value = validate_value(&n, &ResolvedType::Scalar(PrimitiveKind::Any), &c, &mut Registry::new(), &mut ctx, &mut path);
        assert!(value.is_null());
        assert_eq!(ctx.diagnostics[0].kind, ErrorKind::ConstraintViolation);
    }

    #[test]
    fn any_scalar_without_any_of_is_carried_as_string() {
        let n = node("hello\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        let value = validate_value(&n, &ResolvedType::Scalar(PrimitiveKind::Any), &Constraints::default(), &mut Registry::new(), &mut ctx, &mut path);
        assert_eq!(value, Value::Primitive(PrimitiveValue::Str("hello".into())));
    }

    #[test]
    fn reference_to_non_string_unique_property_keys_by_parsed_kind() {
        let mut registry = Registry::new();
        registry
            .insert_type(
                TypeDescriptor {
                    name: "person".into(),
                    namespace: "acme".into(),
                    description: None,
                    fields: vec![FieldDescriptor {
                        name: "age".into(),
                        resolved_type: ResolvedType::Scalar(PrimitiveKind::Int),
                        presence: Presence::Required,
                        unique: true,
                        constraints: Constraints::default(),
                        default: None,
                        location: crate::error::Location::default(),
                    }],
                    validators: crate::parser::ast::Validators::default(),
                },
                &crate::error::Location::default(),
            )
            .unwrap();
        // the uniqueness index tags values by their parsed kind, exactly as
        // `register_uniqueness` does for a real `int` field.
        registry.insert_unique("acme", "person", "age", PrimitiveValue::Int(42).unique_key());

        let target = QualifiedName::new("person", "acme");
        let key = target_unique_key(&registry, &target, "age", "42");
        assert_eq!(key, PrimitiveValue::Int(42).unique_key());
        assert!(registry.unique_exists(Some("acme"), "person", "age", &key).unwrap());
    }

    #[test]
    fn enum_membership_is_checked() {
        let mut registry = Registry::new();
        registry
            .insert_enum(
                crate::registry::EnumDescriptor {
                    name: "Status".into(),
                    namespace: "acme".into(),
                    description: None,
                    values: vec!["active".into(), "inactive".into()],
                },
                &crate::error::Location::default(),
            )
            .unwrap();
        let n = node("bogus\n");
        let config = EngineConfig::default();
        let mut ctx = ValidationCtx::new(&config, None);
        let mut path = Vec::new();
        let resolved = ResolvedType::Enum(QualifiedName::new("Status", "acme"));
        let value = validate_value(&n, &resolved, &Constraints::default(), &mut registry, &mut ctx, &mut path);
        assert!(value.is_null());
        assert_eq!(ctx.diagnostics[0].kind, ErrorKind::ConstraintViolation);
    }
}
