//! The YAML source adapter.
//!
//! Wraps `saphyr-parser`'s event-based parser so every scalar, sequence, and mapping
//! in a document keeps its 1-based `line`/`column`. This is the only module
//! in the crate that talks to the external YAML library directly; everything
//! downstream (the schema AST, the data engine) walks a [`Node`] tree.

use std::fmt;
use std::path::{Path, PathBuf};

use saphyr_parser::{Event, Marker, Parser, ScalarStyle, ScanError};

/// The shape of a [`Node`]'s payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A leaf scalar: `string`, unquoted literal, or YAML-native bool/number
    /// (still carried as the original source text; typed coercion happens in
    /// [`crate::primitive`]).
    Scalar(String),
    /// An ordered sequence of child nodes.
    Sequence(Vec<Node>),
    /// An ordered mapping of scalar keys to child nodes. Stored as pairs
    /// (not a `HashMap`) so `forbid-extra-keys` validation can report keys in
    /// document order and detect duplicate keys.
    Mapping(Vec<(Node, Node)>),
    /// `null` / `~` / empty scalar.
    Null,
}

/// A single YAML node with source position, as produced by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What this node contains.
    pub kind: NodeKind,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
}

impl Node {
    fn new(kind: NodeKind, marker: Marker) -> Self {
        Self {
            kind,
            line: marker.line(),
            column: marker.col() + 1,
        }
    }

    /// Borrow the raw scalar text, if this node is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the sequence elements, if this node is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Borrow the mapping pairs, if this node is a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.kind {
            NodeKind::Mapping(pairs) => Some(pairs.as_slice()),
            _ => None,
        }
    }

    /// Look up a mapping value by scalar key name. Does not detect
    /// duplicates; callers that must forbid extra/duplicate keys iterate
    /// [`Self::as_mapping`] directly.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }
}

/// A failure to parse a YAML source into a [`Node`] tree.
#[derive(Debug, Clone)]
pub struct YamlParseError {
    /// 1-based line the scanner stopped at.
    pub line: usize,
    /// 1-based column the scanner stopped at.
    pub column: usize,
    /// Scanner message.
    pub message: String,
    /// Source path, if parsing a file.
    pub path: Option<PathBuf>,
}

impl fmt::Display for YamlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(
                f,
                "{}:{}:{}: {}",
                path.display(),
                self.line,
                self.column,
                self.message
            )
        } else {
            write!(f, "{}:{}: {}", self.line, self.column, self.message)
        }
    }
}

impl std::error::Error for YamlParseError {}

impl From<ScanError> for YamlParseError {
    fn from(err: ScanError) -> Self {
        let marker = err.marker();
        Self {
            line: marker.line(),
            column: marker.col() + 1,
            message: err.info().to_string(),
            path: None,
        }
    }
}

/// Parse a possibly multi-document YAML string into an ordered list of
/// top-level [`Node`]s, one per document.
pub fn parse_str(source: &str) -> Result<Vec<Node>, YamlParseError> {
    let mut builder = TreeBuilder::default();
    Parser::new_from_str(source)
        .load(&mut builder, true)
        .map_err(YamlParseError::from)?;
    Ok(builder.finish())
}

/// Parse a single YAML file on disk.
pub fn parse_file(path: &Path) -> Result<Vec<Node>, YamlParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| YamlParseError {
        line: 0,
        column: 0,
        message: e.to_string(),
        path: Some(path.to_path_buf()),
    })?;
    parse_str(&content).map_err(|mut e| {
        e.path = Some(path.to_path_buf());
        e
    })
}

/// Collect every `*.ext` file under `dir`, sorted lexicographically by path
/// for deterministic processing order.
pub fn collect_files(dir: &Path, ext: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    collect_files_rec(dir, ext, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_files_rec(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files_rec(&path, ext, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    Ok(())
}

/// Builds a forest of [`Node`]s from a stream of `saphyr_parser` [`Event`]s,
/// the same stack-machine approach `saphyr`/`yaml-rust` use internally for
/// their own untyped `Yaml` tree, just retaining markers at every level.
#[derive(Default)]
struct TreeBuilder {
    /// Completed top-level documents.
    docs: Vec<Node>,
    /// Stack of in-progress containers: a sequence accumulator, or a mapping
    /// accumulator together with a pending key waiting for its value.
    stack: Vec<Container>,
}

enum Container {
    Sequence(Vec<Node>, Marker),
    Mapping(Vec<(Node, Node)>, Option<Node>, Marker),
}

impl TreeBuilder {
    fn finish(self) -> Vec<Node> {
        self.docs
    }

    fn push_complete(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(Container::Sequence(items, _)) => items.push(node),
            Some(Container::Mapping(pairs, pending, _)) => {
                if let Some(key) = pending.take() {
                    pairs.push((key, node));
                } else {
                    *pending = Some(node);
                }
            }
            None => self.docs.push(node),
        }
    }
}

impl saphyr_parser::EventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, marker: Marker) {
        match event {
            Event::StreamStart | Event::StreamEnd | Event::DocumentStart | Event::DocumentEnd => {}
            Event::SequenceStart(..) => self.stack.push(Container::Sequence(Vec::new(), marker)),
            Event::SequenceEnd => {
                if let Some(Container::Sequence(items, start)) = self.stack.pop() {
                    self.push_complete(Node::new(NodeKind::Sequence(items), start));
                }
            }
            Event::MappingStart(..) => {
                self.stack.push(Container::Mapping(Vec::new(), None, marker));
            }
            Event::MappingEnd => {
                if let Some(Container::Mapping(pairs, _, start)) = self.stack.pop() {
                    self.push_complete(Node::new(NodeKind::Mapping(pairs), start));
                }
            }
            Event::Scalar(value, style, _, _) => {
                let kind = if is_null_scalar(&value, style) {
                    NodeKind::Null
                } else {
                    NodeKind::Scalar(value.into_owned())
                };
                self.push_complete(Node::new(kind, marker));
            }
            Event::Alias(_) => {
                // Aliases are not resolvable without the anchor table, so
                // they come through as an opaque null instead of a panic.
                self.push_complete(Node::new(NodeKind::Null, marker));
            }
            Event::Nothing => {}
        }
    }
}

fn is_null_scalar(value: &str, style: ScalarStyle) -> bool {
    style == ScalarStyle::Plain && matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_with_line_info() {
        let docs = parse_str("name: bob\nage: 3\n").unwrap();
        assert_eq!(docs.len(), 1);
        let mapping = docs[0].as_mapping().unwrap();
        assert_eq!(mapping.len(), 2);
        let (k0, v0) = &mapping[0];
        assert_eq!(k0.as_scalar(), Some("name"));
        assert_eq!(v0.as_scalar(), Some("bob"));
        assert_eq!(v0.line, 1);
        let (k1, _) = &mapping[1];
        assert_eq!(k1.line, 2);
    }

    #[test]
    fn parses_multi_document() {
        let docs = parse_str("a: 1\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn null_scalar_is_null_kind() {
        let docs = parse_str("a: ~\nb: null\nc: \"\"\n").unwrap();
        let mapping = docs[0].as_mapping().unwrap();
        assert!(mapping[0].1.is_null());
        assert!(mapping[1].1.is_null());
        // quoted empty string is a scalar, not null
        assert_eq!(mapping[2].1.as_scalar(), Some(""));
    }

    #[test]
    fn reports_scan_error_location() {
        let err = parse_str("a: [1, 2\n").unwrap_err();
        assert!(err.line >= 1);
    }
}
