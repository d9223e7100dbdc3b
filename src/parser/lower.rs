//! Lowers a raw [`Node`] tree into the canonical [`YaslRoot`] AST.
//!
//! Two schema surface shapes are accepted: the canonical `definitions: namespace -> YaslItem`
//! shape with the `presence` triad, and a legacy flat `types: [...]` /
//! `enums: [...]` top-level shape with `required: bool`. The legacy shape
//! lowers into the canonical one under an implicit `"default"` namespace;
//! everything downstream of this module only ever sees the canonical shape.

use crate::error::{Location, Result, SchemaError};
use crate::resolved::Presence;

use super::ast::{parse_type_expr, Constraints, Enumeration, IfThen, Property, TypeDef, Validators, YaslItem, YaslRoot};
use super::source::Node;

/// Lower a single parsed document into a [`YaslRoot`].
pub fn lower_document(doc: &Node, file: Option<&str>) -> Result<YaslRoot> {
    let loc = |n: &Node| file.map_or_else(|| Location::at(n.line, n.column), |f| Location {
        file: Some(f.to_string()),
        line: Some(n.line),
        column: Some(n.column),
    });
    let pairs = doc.as_mapping().ok_or_else(|| SchemaError::YamlParseError {
        message: "schema document root must be a mapping".into(),
        location: loc(doc),
    })?;

    let mut imports = Vec::new();
    let mut metadata = Vec::new();
    let mut definitions: Vec<(String, YaslItem)> = Vec::new();
    let mut legacy_enums = Vec::new();
    let mut legacy_types = Vec::new();

    for (key_node, value) in pairs {
        let key = key_node.as_scalar().ok_or_else(|| SchemaError::YamlParseError {
            message: "mapping keys must be scalars".into(),
            location: loc(key_node),
        })?;
        match key {
            "imports" => {
                for item in value.as_sequence().unwrap_or(&[]) {
                    imports.push(
                        item.as_scalar()
                            .ok_or_else(|| SchemaError::YamlParseError {
                                message: "import entries must be strings".into(),
                                location: loc(item),
                            })?
                            .to_string(),
                    );
                }
            }
            "metadata" => {
                for (k, v) in value.as_mapping().unwrap_or(&[]) {
                    if let Some(name) = k.as_scalar() {
                        metadata.push((name.to_string(), v.clone()));
                    }
                }
            }
            "definitions" => {
                for (ns_node, item_node) in value.as_mapping().unwrap_or(&[]) {
                    let ns = ns_node
                        .as_scalar()
                        .ok_or_else(|| SchemaError::YamlParseError {
                            message: "namespace keys must be strings".into(),
                            location: loc(ns_node),
                        })?
                        .to_string();
                    let item = lower_item(item_node, &ns, file)?;
                    definitions.push((ns, item));
                }
            }
            "enums" => legacy_enums.push(value.clone()),
            "types" => legacy_types.push(value.clone()),
            "description" => {}
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: loc(key_node),
                });
            }
        }
    }

    if !legacy_enums.is_empty() || !legacy_types.is_empty() {
        let mut item = YaslItem::default();
        for enums_node in &legacy_enums {
            item.enums.extend(lower_enums_legacy(enums_node, "default", file)?);
        }
        for types_node in &legacy_types {
            item.types.extend(lower_types_legacy(types_node, "default", file)?);
        }
        definitions.push(("default".to_string(), item));
    }

    Ok(YaslRoot {
        imports,
        metadata,
        definitions,
    })
}

fn lower_item(node: &Node, namespace: &str, file: Option<&str>) -> Result<YaslItem> {
    let loc = location_of(node, file);
    let pairs = node.as_mapping().ok_or_else(|| SchemaError::YamlParseError {
        message: format!("namespace '{namespace}' must map to a mapping"),
        location: loc,
    })?;
    let mut item = YaslItem::default();
    for (key_node, value) in pairs {
        let key = key_node.as_scalar().unwrap_or_default();
        match key {
            "description" => item.description = value.as_scalar().map(str::to_string),
            "enums" => {
                for (name_node, def_node) in value.as_mapping().unwrap_or(&[]) {
                    let name = name_node.as_scalar().unwrap_or_default().to_string();
                    item.enums.push(lower_enum(&name, namespace, def_node, file)?);
                }
            }
            "types" => {
                for (name_node, def_node) in value.as_mapping().unwrap_or(&[]) {
                    let name = name_node.as_scalar().unwrap_or_default().to_string();
                    item.types.push(lower_type(&name, namespace, def_node, file)?);
                }
            }
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }
    Ok(item)
}

fn lower_enums_legacy(node: &Node, namespace: &str, file: Option<&str>) -> Result<Vec<Enumeration>> {
    let mut out = Vec::new();
    for (name_node, def_node) in node.as_mapping().unwrap_or(&[]) {
        let name = name_node.as_scalar().unwrap_or_default().to_string();
        out.push(lower_enum(&name, namespace, def_node, file)?);
    }
    Ok(out)
}

fn lower_enum(name: &str, namespace: &str, node: &Node, file: Option<&str>) -> Result<Enumeration> {
    let loc = location_of(node, file);
    let mut description = None;
    let mut values = Vec::new();
    for (key_node, value) in node.as_mapping().unwrap_or(&[]) {
        match key_node.as_scalar().unwrap_or_default() {
            "description" => description = value.as_scalar().map(str::to_string),
            "values" => {
                for v in value.as_sequence().unwrap_or(&[]) {
                    values.push(
                        v.as_scalar()
                            .ok_or_else(|| SchemaError::YamlParseError {
                                message: format!("enum '{name}' values must be strings"),
                                location: location_of(v, file),
                            })?
                            .to_string(),
                    );
                }
            }
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }
    let enumeration = Enumeration {
        name: name.to_string(),
        namespace: namespace.to_string(),
        description,
        values,
        location: loc,
    };
    enumeration.validate_no_duplicates()?;
    Ok(enumeration)
}

fn lower_types_legacy(node: &Node, namespace: &str, file: Option<&str>) -> Result<Vec<TypeDef>> {
    let mut out = Vec::new();
    for (name_node, def_node) in node.as_mapping().unwrap_or(&[]) {
        let name = name_node.as_scalar().unwrap_or_default().to_string();
        out.push(lower_type(&name, namespace, def_node, file)?);
    }
    Ok(out)
}

fn lower_type(name: &str, namespace: &str, node: &Node, file: Option<&str>) -> Result<TypeDef> {
    let loc = location_of(node, file);
    let mut description = None;
    let mut properties = Vec::new();
    let mut validators = Validators::default();
    let mut seen_props = std::collections::HashSet::new();
    for (key_node, value) in node.as_mapping().unwrap_or(&[]) {
        match key_node.as_scalar().unwrap_or_default() {
            "description" => description = value.as_scalar().map(str::to_string),
            "namespace" => {} // legacy per-type namespace override is ignored; the defining scope wins
            "properties" => {
                for (prop_name_node, prop_node) in value.as_mapping().unwrap_or(&[]) {
                    let prop_name = prop_name_node.as_scalar().unwrap_or_default().to_string();
                    if !seen_props.insert(prop_name.clone()) {
                        return Err(SchemaError::DuplicateDefinition {
                            name: prop_name,
                            namespace: namespace.to_string(),
                            location: location_of(prop_name_node, file),
                        });
                    }
                    properties.push(lower_property(&prop_name, prop_node, file)?);
                }
            }
            "validators" => validators = lower_validators(value, file)?,
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }
    let type_def = TypeDef {
        name: name.to_string(),
        namespace: namespace.to_string(),
        description,
        properties,
        validators,
        location: loc,
    };
    for clause_field in type_def
        .validators
        .only_one
        .iter()
        .flatten()
        .chain(type_def.validators.at_least_one.iter().flatten())
        .chain(type_def.validators.if_then.iter().flat_map(|c| {
            std::iter::once(&c.eval)
                .chain(c.present.iter())
                .chain(c.absent.iter())
        }))
    {
        if type_def.property(clause_field).is_none() {
            return Err(SchemaError::UnknownValidatorField {
                type_name: type_def.name.clone(),
                field: clause_field.clone(),
                location: type_def.location.clone(),
            });
        }
    }
    Ok(type_def)
}

fn lower_validators(node: &Node, file: Option<&str>) -> Result<Validators> {
    let mut validators = Validators::default();
    for (key_node, value) in node.as_mapping().unwrap_or(&[]) {
        match key_node.as_scalar().unwrap_or_default() {
            "only_one" => validators.only_one = Some(string_list(value, file)?),
            "at_least_one" => validators.at_least_one = Some(string_list(value, file)?),
            "if_then" => {
                for clause in value.as_sequence().unwrap_or(&[]) {
                    validators.if_then.push(lower_if_then(clause, file)?);
                }
            }
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }
    Ok(validators)
}

fn lower_if_then(node: &Node, file: Option<&str>) -> Result<IfThen> {
    let mut eval = None;
    let mut value = Vec::new();
    let mut present = Vec::new();
    let mut absent = Vec::new();
    for (key_node, v) in node.as_mapping().unwrap_or(&[]) {
        match key_node.as_scalar().unwrap_or_default() {
            "eval" => eval = v.as_scalar().map(str::to_string),
            "value" => value = string_list(v, file)?,
            "present" => present = string_list(v, file)?,
            "absent" => absent = string_list(v, file)?,
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }
    let eval = eval.ok_or_else(|| SchemaError::MissingField {
        field: "eval".into(),
        location: location_of(node, file),
    })?;
    Ok(IfThen {
        eval,
        value,
        present,
        absent,
    })
}

fn string_list(node: &Node, file: Option<&str>) -> Result<Vec<String>> {
    node.as_sequence()
        .unwrap_or(&[])
        .iter()
        .map(|n| {
            n.as_scalar()
                .map(str::to_string)
                .ok_or_else(|| SchemaError::YamlParseError {
                    message: "expected a string".into(),
                    location: location_of(n, file),
                })
        })
        .collect()
}

fn float_list(node: &Node, file: Option<&str>) -> Result<Vec<f64>> {
    node.as_sequence()
        .unwrap_or(&[])
        .iter()
        .map(|n| {
            n.as_scalar()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| SchemaError::YamlParseError {
                    message: "expected a number".into(),
                    location: location_of(n, file),
                })
        })
        .collect()
}

#[allow(clippy::too_many_lines)]
fn lower_property(name: &str, node: &Node, file: Option<&str>) -> Result<Property> {
    let loc = location_of(node, file);
    let mut raw_type = None;
    let mut description = None;
    let mut presence_key: Option<String> = None;
    let mut required_legacy: Option<bool> = None;
    let mut preferred_legacy: Option<bool> = None;
    let mut unique = false;
    let mut default = None;
    let mut c = Constraints::default();

    for (key_node, value) in node.as_mapping().unwrap_or(&[]) {
        let key = key_node.as_scalar().unwrap_or_default();
        let scalar = || value.as_scalar().map(str::to_string);
        let as_bool = |n: &Node| n.as_scalar().and_then(|s| s.parse::<bool>().ok());
        let as_int = |n: &Node| n.as_scalar().and_then(|s| s.parse::<i64>().ok());
        let as_float = |n: &Node| n.as_scalar().and_then(|s| s.parse::<f64>().ok());
        match key {
            "type" => raw_type = scalar(),
            "description" => description = scalar(),
            "presence" => presence_key = scalar(),
            "required" => required_legacy = as_bool(value),
            "preferred" => preferred_legacy = as_bool(value),
            "unique" => unique = as_bool(value).unwrap_or(false),
            "default" => default = Some(value.clone()),
            "list_min" => c.list_min = as_int(value),
            "list_max" => c.list_max = as_int(value),
            "gt" => c.gt = as_float(value),
            "ge" => c.ge = as_float(value),
            "lt" => c.lt = as_float(value),
            "le" => c.le = as_float(value),
            "exclude" => c.exclude = Some(float_list(value, file)?),
            "multiple_of" => c.multiple_of = as_float(value),
            "whole_number" => c.whole_number = as_bool(value).unwrap_or(false),
            "str_min" => c.str_min = as_int(value),
            "str_max" => c.str_max = as_int(value),
            "str_regex" => c.str_regex = scalar(),
            "before" => c.before = scalar(),
            "after" => c.after = scalar(),
            "path_exists" => c.path_exists = as_bool(value),
            "is_dir" => c.is_dir = as_bool(value),
            "is_file" => c.is_file = as_bool(value),
            "file_ext" => c.file_ext = Some(string_list(value, file)?),
            "url_base" => c.url_base = scalar(),
            "url_protocols" => c.url_protocols = Some(string_list(value, file)?),
            "url_reachable" => c.url_reachable = as_bool(value),
            "any_of" => c.any_of = Some(string_list(value, file)?),
            "no_ref_check" => c.no_ref_check = as_bool(value).unwrap_or(false),
            other => {
                return Err(SchemaError::UnknownField {
                    field: other.to_string(),
                    location: location_of(key_node, file),
                })
            }
        }
    }

    let raw_type = raw_type.ok_or_else(|| SchemaError::MissingField {
        field: "type".into(),
        location: loc.clone(),
    })?;
    let type_expr = parse_type_expr(&raw_type, &loc)?;

    // Presence derives from the canonical key when present; else from the
    // legacy `required: bool` sugar *if that key was written*; else
    // optional. Unlike the original Pydantic prototype's
    // `required: bool = True`, a property naming neither key at all is
    // optional, not required.
    let presence = match presence_key.as_deref() {
        Some("required") => Presence::Required,
        Some("preferred") => Presence::Preferred,
        Some("optional") => Presence::Optional,
        Some(other) => {
            return Err(SchemaError::YamlParseError {
                message: format!("unknown presence '{other}', expected required/preferred/optional"),
                location: loc,
            })
        }
        None => {
            if preferred_legacy == Some(true) {
                Presence::Preferred
            } else if let Some(required) = required_legacy {
                if required { Presence::Required } else { Presence::Optional }
            } else {
                Presence::Optional
            }
        }
    };

    if let (Some(min), Some(max)) = (c.list_min, c.list_max) {
        if min > max {
            return Err(SchemaError::YamlParseError {
                message: format!("list_min ({min}) must be <= list_max ({max})"),
                location: loc,
            });
        }
    }

    Ok(Property {
        name: name.to_string(),
        type_expr,
        raw_type,
        description,
        presence,
        unique,
        default,
        constraints: c,
        location: loc,
    })
}

fn location_of(node: &Node, file: Option<&str>) -> Location {
    Location {
        file: file.map(str::to_string),
        line: Some(node.line),
        column: Some(node.column),
    }
}
