//! The Schema AST: a typed, forbid-extra-keys
//! representation of a parsed YASL document, one step removed from the raw
//! [`super::source::Node`] tree and one step before the compiler's
//! `ResolvedType`-bearing descriptors.

use std::collections::BTreeSet;

use crate::error::{Location, Result, SchemaError};
use crate::resolved::Presence;

use super::source::Node;

/// The surface mini-language for type expressions: `T`,
/// `T[]`, `map[K,V]`, `ref[Q]`, `Namespace.T`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `T` or `Namespace.T`.
    Name {
        namespace: Option<String>,
        name: String,
    },
    /// `T[]`.
    List(Box<TypeExpr>),
    /// `map[K,V]`.
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// `ref[Q]` where `Q = [namespace.]Type.property`.
    Ref {
        namespace: Option<String>,
        type_name: String,
        property_name: String,
    },
}

/// Parse a type expression string. This performs only
/// syntactic parsing; resolving the parsed names against the registry
/// happens in `parser::compiler`.
pub fn parse_type_expr(input: &str, location: &Location) -> Result<TypeExpr> {
    let input = input.trim();
    if let Some(inner) = input.strip_suffix("[]") {
        return Ok(TypeExpr::List(Box::new(parse_type_expr(inner, location)?)));
    }
    if let Some(inner) = strip_wrapper(input, "map[") {
        let (k, v) = split_top_level_comma(inner).ok_or_else(|| SchemaError::UnknownConstraint {
            constraint: "map".into(),
            property: input.to_string(),
            location: location.clone(),
        })?;
        return Ok(TypeExpr::Map(
            Box::new(parse_type_expr(k, location)?),
            Box::new(parse_type_expr(v, location)?),
        ));
    }
    if let Some(inner) = strip_wrapper(input, "ref[") {
        let segments: Vec<&str> = inner.split('.').collect();
        return match segments.as_slice() {
            [type_name, property_name] => Ok(TypeExpr::Ref {
                namespace: None,
                type_name: (*type_name).to_string(),
                property_name: (*property_name).to_string(),
            }),
            [namespace, type_name, property_name] => Ok(TypeExpr::Ref {
                namespace: Some((*namespace).to_string()),
                type_name: (*type_name).to_string(),
                property_name: (*property_name).to_string(),
            }),
            _ => Err(SchemaError::BadReference {
                target: inner.to_string(),
                reason: "expected '[namespace.]Type.property'".into(),
                location: location.clone(),
            }),
        };
    }
    if let Some((namespace, name)) = input.rsplit_once('.') {
        if is_identifier(namespace.split('.').next_back().unwrap_or(""))
            && namespace.split('.').all(is_identifier)
            && is_identifier(name)
        {
            return Ok(TypeExpr::Name {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            });
        }
    }
    if !is_identifier(input) {
        return Err(SchemaError::UnknownType {
            name: input.to_string(),
            location: location.clone(),
        });
    }
    Ok(TypeExpr::Name {
        namespace: None,
        name: input.to_string(),
    })
}

fn strip_wrapper<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    input.strip_prefix(prefix)?.strip_suffix(']')
}

fn split_top_level_comma(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (idx, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth -= 1,
            ',' if depth == 0 => return Some((input[..idx].trim(), input[idx + 1..].trim())),
            _ => {}
        }
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `(name, namespace, description?, values)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub namespace: String,
    pub description: Option<String>,
    pub values: Vec<String>,
    pub location: Location,
}

impl Enumeration {
    /// Reject duplicate values within the enumeration.
    pub fn validate_no_duplicates(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for value in &self.values {
            if !seen.insert(value.as_str()) {
                return Err(SchemaError::DuplicateEnumValue {
                    enum_name: self.name.clone(),
                    value: value.clone(),
                    location: self.location.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Per-property independent constraints, all optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    // list
    pub list_min: Option<i64>,
    pub list_max: Option<i64>,
    // numeric
    pub gt: Option<f64>,
    pub ge: Option<f64>,
    pub lt: Option<f64>,
    pub le: Option<f64>,
    pub exclude: Option<Vec<f64>>,
    pub multiple_of: Option<f64>,
    pub whole_number: bool,
    // string
    pub str_min: Option<i64>,
    pub str_max: Option<i64>,
    pub str_regex: Option<String>,
    // date/time
    pub before: Option<String>,
    pub after: Option<String>,
    // path
    pub path_exists: Option<bool>,
    pub is_dir: Option<bool>,
    pub is_file: Option<bool>,
    pub file_ext: Option<Vec<String>>,
    // url
    pub url_base: Option<String>,
    pub url_protocols: Option<Vec<String>>,
    pub url_reachable: Option<bool>,
    // any
    pub any_of: Option<Vec<String>>,
    // ref
    pub no_ref_check: bool,
}

/// `(name, type-expr, description?, presence, unique, default?, constraints*)`
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub type_expr: TypeExpr,
    pub raw_type: String,
    pub description: Option<String>,
    pub presence: Presence,
    pub unique: bool,
    pub default: Option<Node>,
    pub constraints: Constraints,
    pub location: Location,
}

/// `{ eval: field, value: [v, ...], present: [f, ...], absent: [f, ...] }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfThen {
    pub eval: String,
    pub value: Vec<String>,
    pub present: Vec<String>,
    pub absent: Vec<String>,
}

/// Type-level validator clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validators {
    pub only_one: Option<Vec<String>>,
    pub at_least_one: Option<Vec<String>>,
    pub if_then: Vec<IfThen>,
}

/// `(name, namespace, description?, properties, validators?)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub namespace: String,
    pub description: Option<String>,
    /// Declaration order preserved for deterministic diagnostics and
    /// auto-detection.
    pub properties: Vec<Property>,
    pub validators: Validators,
    pub location: Location,
}

impl TypeDef {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// `(description?, enums: name->Enumeration, types: name->TypeDef)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YaslItem {
    pub description: Option<String>,
    pub enums: Vec<Enumeration>,
    pub types: Vec<TypeDef>,
}

/// `(imports, metadata, definitions: namespace -> YaslItem)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YaslRoot {
    pub imports: Vec<String>,
    /// Free-form metadata, kept as raw nodes and not interpreted by the
    /// engine.
    pub metadata: Vec<(String, Node)>,
    pub definitions: Vec<(String, YaslItem)>,
}
