//! The process-independent, namespace-keyed type/enum registry.
//!
//! The original's global singletons are replaced here: the registry is a
//! plain owned value the caller creates, threads through
//! `compile_schema`/`validate`, and clears explicitly. Nothing in this
//! crate reaches for a process-level static.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Location, Result, SchemaError};
use crate::resolved::{Presence, QualifiedName, ResolvedType};

/// A compiled enumeration: namespace + ordered, de-duplicated values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub namespace: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumDescriptor {
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// A compiled property, fully linked.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub resolved_type: ResolvedType,
    pub presence: Presence,
    pub unique: bool,
    pub constraints: crate::parser::ast::Constraints,
    pub default: Option<crate::value::Value>,
    pub location: Location,
}

/// A compiled composite type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub namespace: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub validators: crate::parser::ast::Validators,
}

impl TypeDescriptor {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.name.clone(), self.namespace.clone())
    }

    /// Whether every top-level key in `keys` is a declared property.
    #[must_use]
    pub fn accepts_key_set<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys.into_iter().all(|k| self.field(k).is_some())
    }

    #[must_use]
    pub fn is_exact_key_set_match<'a>(&self, keys: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        self.accepts_key_set(keys.clone()) && self.fields.len() == keys.into_iter().count()
    }
}

/// The owned, process-independent registry.
#[derive(Debug, Default)]
pub struct Registry {
    types: IndexMap<(String, String), Arc<TypeDescriptor>>,
    enums: IndexMap<(String, String), Arc<EnumDescriptor>>,
    /// `(type_namespace, type_name, property_name) -> observed values`
    uniqueness: IndexMap<(String, String, String), IndexSet<String>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled type. Fails if `(name, namespace)` already exists.
    pub fn insert_type(&mut self, descriptor: TypeDescriptor, location: &Location) -> Result<()> {
        let key = (descriptor.name.clone(), descriptor.namespace.clone());
        if self.types.contains_key(&key) {
            return Err(SchemaError::DuplicateDefinition {
                name: descriptor.name,
                namespace: descriptor.namespace,
                location: location.clone(),
            });
        }
        self.types.insert(key, Arc::new(descriptor));
        Ok(())
    }

    /// Register a compiled enum.
    pub fn insert_enum(&mut self, descriptor: EnumDescriptor, location: &Location) -> Result<()> {
        let key = (descriptor.name.clone(), descriptor.namespace.clone());
        if self.enums.contains_key(&key) {
            return Err(SchemaError::DuplicateDefinition {
                name: descriptor.name,
                namespace: descriptor.namespace,
                location: location.clone(),
            });
        }
        self.enums.insert(key, Arc::new(descriptor));
        Ok(())
    }

    /// Lookup policy: exact match if namespace given; else search all,
    /// disambiguate via `default_namespace`, else error.
    pub fn find_type(
        &self,
        name: &str,
        namespace: Option<&str>,
        default_namespace: Option<&str>,
    ) -> Result<Option<Arc<TypeDescriptor>>> {
        self.find(&self.types, name, namespace, default_namespace)
    }

    pub fn find_enum(
        &self,
        name: &str,
        namespace: Option<&str>,
        default_namespace: Option<&str>,
    ) -> Result<Option<Arc<EnumDescriptor>>> {
        self.find(&self.enums, name, namespace, default_namespace)
    }

    fn find<T>(
        &self,
        map: &IndexMap<(String, String), Arc<T>>,
        name: &str,
        namespace: Option<&str>,
        default_namespace: Option<&str>,
    ) -> Result<Option<Arc<T>>> {
        if let Some(ns) = namespace {
            return Ok(map.get(&(name.to_string(), ns.to_string())).cloned());
        }
        let matches: Vec<&String> = map
            .keys()
            .filter(|(n, _)| n == name)
            .map(|(_, ns)| ns)
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(map.get(&(name.to_string(), matches[0].clone())).cloned()),
            _ => {
                if let Some(default_ns) = default_namespace {
                    if matches.iter().any(|ns| ns.as_str() == default_ns) {
                        return Ok(map.get(&(name.to_string(), default_ns.to_string())).cloned());
                    }
                }
                Err(SchemaError::AmbiguousType {
                    name: name.to_string(),
                    namespaces: matches.into_iter().cloned().collect(),
                    location: Location::default(),
                })
            }
        }
    }

    #[must_use]
    pub fn all_types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    /// Insert a value into the uniqueness index. Returns `false` if the
    /// value was already present.
    pub fn insert_unique(&mut self, namespace: &str, type_name: &str, property: &str, key: String) -> bool {
        let entry = self
            .uniqueness
            .entry((namespace.to_string(), type_name.to_string(), property.to_string()))
            .or_default();
        entry.insert(key)
    }

    /// Whether `key` has been registered for `(namespace, type_name,
    /// property)`. An unspecified namespace resolves the same way a type
    /// lookup does: unambiguous if exactly one namespace defines
    /// `type_name`, else an error rather than a silent pick.
    pub fn unique_exists(
        &self,
        namespace: Option<&str>,
        type_name: &str,
        property: &str,
        key: &str,
    ) -> Result<bool> {
        if let Some(ns) = namespace {
            return Ok(self
                .uniqueness
                .get(&(ns.to_string(), type_name.to_string(), property.to_string()))
                .is_some_and(|set| set.contains(key)));
        }
        let matches: Vec<&String> = self
            .uniqueness
            .keys()
            .filter(|(_, tn, prop)| tn == type_name && prop == property)
            .map(|(ns, _, _)| ns)
            .collect();
        match matches.len() {
            0 => Ok(false),
            1 => Ok(self
                .uniqueness
                .get(&(matches[0].clone(), type_name.to_string(), property.to_string()))
                .is_some_and(|set| set.contains(key))),
            _ => Err(SchemaError::AmbiguousType {
                name: type_name.to_string(),
                namespaces: matches.into_iter().cloned().collect(),
                location: Location::default(),
            }),
        }
    }

    /// Clear both the type/enum registry and the uniqueness index.
    pub fn clear(&mut self) {
        self.types.clear();
        self.enums.clear();
        self.uniqueness.clear();
    }

    /// Clear only the uniqueness index, leaving compiled descriptors intact
    /// between `validate()` calls that reuse the same registry.
    pub fn clear_uniqueness(&mut self) {
        self.uniqueness.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_desc(name: &str, namespace: &str) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            namespace: namespace.to_string(),
            description: None,
            fields: Vec::new(),
            validators: crate::parser::ast::Validators::default(),
        }
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut reg = Registry::new();
        reg.insert_type(type_desc("Customer", "acme"), &Location::default()).unwrap();
        let err = reg
            .insert_type(type_desc("Customer", "acme"), &Location::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateDefinition { .. }));
    }

    #[test]
    fn exact_namespace_lookup() {
        let mut reg = Registry::new();
        reg.insert_type(type_desc("Customer", "acme"), &Location::default()).unwrap();
        assert!(reg.find_type("Customer", Some("acme"), None).unwrap().is_some());
        assert!(reg.find_type("Customer", Some("other"), None).unwrap().is_none());
    }

    #[test]
    fn ambiguous_without_default_namespace_errors() {
        let mut reg = Registry::new();
        reg.insert_type(type_desc("Widget", "a"), &Location::default()).unwrap();
        reg.insert_type(type_desc("Widget", "b"), &Location::default()).unwrap();
        assert!(reg.find_type("Widget", None, None).is_err());
        assert!(reg.find_type("Widget", None, Some("b")).unwrap().is_some());
    }

    #[test]
    fn uniqueness_index_detects_duplicates() {
        let mut reg = Registry::new();
        assert!(reg.insert_unique("acme", "Customer", "name", "str:Bob".into()));
        assert!(!reg.insert_unique("acme", "Customer", "name", "str:Bob".into()));
    }

    #[test]
    fn clear_uniqueness_preserves_descriptors() {
        let mut reg = Registry::new();
        reg.insert_type(type_desc("Customer", "acme"), &Location::default()).unwrap();
        reg.insert_unique("acme", "Customer", "name", "str:Bob".into());
        reg.clear_uniqueness();
        assert!(reg.find_type("Customer", Some("acme"), None).unwrap().is_some());
        assert!(!reg.unique_exists(Some("acme"), "Customer", "name", "str:Bob").unwrap());
    }
}
