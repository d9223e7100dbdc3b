//! Schema-compile-time error type.
//!
//! Data-validation-time findings are [`crate::diagnostic::Diagnostic`]s, not
//! `SchemaError`s: a schema that fails to compile cannot be reasoned about
//! further, so compilation errors abort eagerly, while data validation
//! accumulates findings.

use thiserror::Error;

/// Result type alias for schema compilation.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// A source location used to annotate a `SchemaError`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Path of the file the error was found in, if known.
    pub file: Option<String>,
    /// 1-based line number.
    pub line: Option<usize>,
    /// 1-based column number.
    pub column: Option<usize>,
}

impl Location {
    /// A location carrying only a file path.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            file: Some(path.into()),
            line: None,
            column: None,
        }
    }

    /// A location carrying line/column, with no known file.
    #[must_use]
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line: Some(line),
            column: Some(column),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}"),
            (Some(file), None) => write!(f, "{file}"),
            (None, Some(line)) => write!(f, "line {line}"),
            (None, None) => write!(f, "<unknown location>"),
        }
    }
}

/// Structural/compile-time error for a YASL schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The YAML source itself could not be parsed.
    #[error("YAML parse error at {location}: {message}")]
    YamlParseError {
        /// Error message from the underlying scanner.
        message: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A mapping carried a key the schema grammar forbids at that position.
    #[error("unknown field '{field}' at {location}")]
    UnknownField {
        /// The offending key.
        field: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A required key was missing from a mapping.
    #[error("missing required field '{field}' at {location}")]
    MissingField {
        /// The absent key.
        field: String,
        /// Where the error occurred.
        location: Location,
    },

    /// Two descriptors share `(name, namespace)`.
    #[error("duplicate definition of '{name}' in namespace '{namespace}' at {location}")]
    DuplicateDefinition {
        /// Conflicting name.
        name: String,
        /// Namespace the name was declared twice in.
        namespace: String,
        /// Where the second declaration occurred.
        location: Location,
    },

    /// A type expression referenced a name that resolves to nothing.
    #[error("unknown type '{name}' referenced at {location}")]
    UnknownType {
        /// The unresolved name.
        name: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A type expression referenced a name that resolves in more than one
    /// namespace and no default namespace disambiguated it.
    #[error("ambiguous type '{name}' found in namespaces {namespaces:?} at {location}")]
    AmbiguousType {
        /// The ambiguous name.
        name: String,
        /// The namespaces it was found in.
        namespaces: Vec<String>,
        /// Where the error occurred.
        location: Location,
    },

    /// A `map[K,V]` used a key kind other than `str`/`string`/`int`/an enum.
    #[error("bad map key type '{key_type}' for property '{property}' at {location}")]
    BadMapKey {
        /// The rejected key type name.
        key_type: String,
        /// The property declaring the map.
        property: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A `ref[Type.property]` target is missing, non-primitive, or not
    /// marked `unique`.
    #[error("bad reference '{target}': {reason} (at {location})")]
    BadReference {
        /// The `Type.property` path that failed to resolve.
        target: String,
        /// Why it failed.
        reason: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A property declared both list and map constraints.
    #[error("property '{property}' cannot be both a list and a map (at {location})")]
    ListAndMap {
        /// The offending property.
        property: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A property's `default` failed its own constraint pipeline.
    #[error("invalid default for property '{property}': {message} (at {location})")]
    InvalidDefault {
        /// The offending property.
        property: String,
        /// Why the default was rejected.
        message: String,
        /// Where the error occurred.
        location: Location,
    },

    /// A constraint key was recognized but is not applicable to the
    /// property's resolved type (e.g. `str_regex` on an `int`).
    #[error("constraint '{constraint}' is not applicable to property '{property}' (at {location})")]
    UnknownConstraint {
        /// The constraint key.
        constraint: String,
        /// The property it was attached to.
        property: String,
        /// Where the error occurred.
        location: Location,
    },

    /// `imports` formed a cycle.
    #[error("import cycle detected: {cycle}")]
    SchemaImportCycle {
        /// The cycle, rendered as `a -> b -> a`.
        cycle: String,
    },

    /// An `only_one`/`at_least_one`/`if_then` clause named a field the
    /// enclosing type does not declare.
    #[error("validator clause on '{type_name}' references unknown field '{field}' (at {location})")]
    UnknownValidatorField {
        /// The enclosing type.
        type_name: String,
        /// The unresolved field name.
        field: String,
        /// Where the error occurred.
        location: Location,
    },

    /// An enumeration declared the same value twice.
    #[error("duplicate value '{value}' in enumeration '{enum_name}' (at {location})")]
    DuplicateEnumValue {
        /// The enumeration.
        enum_name: String,
        /// The repeated value.
        value: String,
        /// Where the error occurred.
        location: Location,
    },

    /// An import path could not be read.
    #[error("failed to resolve import '{import}': {reason}")]
    ImportError {
        /// The import path as written in the schema.
        import: String,
        /// Why it failed.
        reason: String,
    },

    /// Wraps an I/O failure encountered while loading schema/data sources.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Best-effort location accessor, used by the CLI to render `line <L>`.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::YamlParseError { location, .. }
            | Self::UnknownField { location, .. }
            | Self::MissingField { location, .. }
            | Self::DuplicateDefinition { location, .. }
            | Self::UnknownType { location, .. }
            | Self::AmbiguousType { location, .. }
            | Self::BadMapKey { location, .. }
            | Self::BadReference { location, .. }
            | Self::ListAndMap { location, .. }
            | Self::InvalidDefault { location, .. }
            | Self::UnknownConstraint { location, .. }
            | Self::UnknownValidatorField { location, .. }
            | Self::DuplicateEnumValue { location, .. } => Some(location),
            Self::SchemaImportCycle { .. } | Self::ImportError { .. } | Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_variants() {
        assert_eq!(Location::at(4, 2).to_string(), "line 4");
        assert_eq!(Location::file("a.yasl").to_string(), "a.yasl");
        assert_eq!(Location::default().to_string(), "<unknown location>");
    }

    #[test]
    fn schema_error_location_accessor() {
        let err = SchemaError::UnknownType {
            name: "Foo".into(),
            location: Location::at(3, 1),
        };
        assert_eq!(err.location().unwrap().line, Some(3));
    }
}
