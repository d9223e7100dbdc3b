//! Data-validation diagnostics.
//!
//! Unlike [`crate::error::SchemaError`], a `Diagnostic` never aborts
//! validation on its own: all properties of a type are visited even after
//! one fails, so the caller gets the maximal useful set of findings in one
//! pass.

use serde::{Deserialize, Serialize};

/// The taxonomy of data-validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ErrorKind {
    /// The YAML data document itself could not be parsed.
    YamlParseError,
    /// A value could not be coerced to its declared primitive/enum kind.
    TypeError,
    /// A value failed a property-level constraint (list/numeric/string/date/
    /// path/url/any/map/markdown).
    ConstraintViolation,
    /// A `required` property was absent or null.
    MissingRequired,
    /// A `preferred` property was absent or null. Never fatal.
    PreferredMissing,
    /// A mapping carried a key its type does not declare (forbid-extra-keys).
    UnknownField,
    /// A `unique` property repeated a value already seen.
    DuplicateUnique,
    /// A `ref[Type.property]` value matched no object's unique value.
    DanglingReference,
    /// Auto-detection of the root type found more than one equally good
    /// candidate.
    AmbiguousRoot,
    /// A structural problem in the compiled schema surfaced during
    /// validation (should not happen against a schema that compiled).
    SchemaError,
}

/// A single structured, line-carrying diagnostic record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What kind of finding this is.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Property names and numeric indices leading to the offending value.
    pub path: Vec<String>,
    /// 1-based source line, when known.
    pub line: usize,
    /// 1-based source column, when known.
    pub column: usize,
    /// What was expected, if applicable.
    pub expected: Option<String>,
    /// What was actually found, if applicable.
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic with no `expected`/`actual` detail.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        path: Vec<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            path,
            line,
            column,
            expected: None,
            actual: None,
        }
    }

    /// Attach `expected`/`actual` detail, builder-style.
    #[must_use]
    pub fn with_detail(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// `PreferredMissing` is the only kind that never fails validation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, ErrorKind::PreferredMissing)
    }

    /// Render as the one-line text format:
    /// `❌ [<kind>] line <L>: <path> → <message>`.
    #[must_use]
    pub fn render_text(&self) -> String {
        let path = if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        };
        format!(
            "❌ [{:?}] line {}: {} → {}",
            self.kind, self.line, path, self.message
        )
    }
}
