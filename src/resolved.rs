//! Compiled type expressions (`ResolvedType`) and property presence.
//!
//! A [`ResolvedType`] is what a surface type expression (`T`, `T[]`,
//! `map[K,V]`, `ref[T.p]`, `ns.T`) lowers to once the compiler has resolved
//! every name against the [`crate::registry::Registry`].
//! Object references are namespaced names rather than pointers/indices into
//! a `Vec`, so the registry can hand out `Arc<TypeDescriptor>` without
//! `unsafe` arena bookkeeping while still supporting mutually-recursive
//! object graphs.

use crate::primitive::PrimitiveKind;

/// A fully-qualified reference to a registered type or enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// The declared name.
    pub name: String,
    /// The namespace it was registered under.
    pub namespace: String,
}

impl QualifiedName {
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// A compiled, fully-linked type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    /// A built-in scalar kind.
    Scalar(PrimitiveKind),
    /// A reference to a declared enumeration.
    Enum(QualifiedName),
    /// A reference to a declared composite type.
    Object(QualifiedName),
    /// `T[]`.
    List(Box<ResolvedType>),
    /// `map[K,V]`.
    Map {
        key: Box<MapKeyType>,
        value: Box<ResolvedType>,
    },
    /// `ref[Type.property]`.
    Reference {
        target_type: QualifiedName,
        target_property: String,
        no_ref_check: bool,
    },
}

/// The restricted set of types usable as a map key.
#[derive(Debug, Clone, PartialEq)]
pub enum MapKeyType {
    Str,
    Int,
    Enum(QualifiedName),
}

impl ResolvedType {
    /// Whether this resolved type is (or wraps) an enum reference.
    #[must_use]
    pub fn as_enum(&self) -> Option<&QualifiedName> {
        match self {
            Self::Enum(q) => Some(q),
            _ => None,
        }
    }

    /// Whether this resolved type is (or wraps) an object reference.
    #[must_use]
    pub fn as_object(&self) -> Option<&QualifiedName> {
        match self {
            Self::Object(q) => Some(q),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }
}

/// One of `required | preferred | optional`.
///
/// Absence of the canonical `presence` key lowers from the legacy
/// `required: bool` sugar during AST-to-`Property` construction, not here;
/// by the time a `Presence` exists, the triad is already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Preferred,
    Optional,
}

impl Presence {
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::Optional
    }
}
