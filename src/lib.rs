//! # YASL
//!
//! Schema compiler and validator for YASL, a structured configuration
//! language layered over YAML.
//!
//! A YASL schema declares named enumerations and composite types with rich
//! per-property constraints and cross-property/cross-object relationships.
//! This crate compiles a schema into an in-memory type graph ([`Registry`])
//! and validates YAML data documents against a chosen root type, producing
//! either a validated value tree or a list of [`Diagnostic`]s carrying
//! source line information.
//!
//! ## Design Principles
//!
//! - **Owned registry, not a singleton**: the registry is a value the caller
//!   creates, passes to `compile`/`validate`, and clears explicitly.
//! - **Result aggregation over exceptions**: constraint checks never abort a
//!   validation early; diagnostics accumulate under the enclosing type.
//! - **Deterministic**: same schema and data always produce the same outcome
//!   and the same diagnostic ordering.
#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Cancellation token shared between long-running compile/validate calls.
pub mod cancellation;
/// Ambient engine configuration (timeouts, import depth, reachability policy).
pub mod config;
/// Data-validation diagnostics (non-fatal, accumulating).
pub mod diagnostic;
/// Schema-compile-time error type.
pub mod error;
/// The data validation engine: selects a root type and walks data through it.
pub mod engine;
/// The line-annotated YAML source adapter and the YASL schema AST.
pub mod parser;
/// Built-in primitive scalar kinds and their parse/validate behavior.
pub mod primitive;
/// The process-independent, namespace-keyed type/enum registry.
pub mod registry;
/// Compiled type expressions (`ResolvedType`) and presence.
pub mod resolved;
/// The runtime value tree produced by a successful validation.
pub mod value;
/// Per-property validator pipelines and type-level validator clauses.
pub mod validator;

pub use cancellation::CancellationToken;
pub use config::EngineConfig;
pub use diagnostic::{Diagnostic, ErrorKind};
pub use engine::{validate, Outcome, UnitResult};
pub use error::{Result, SchemaError};
pub use parser::compiler::compile_schema;
pub use registry::Registry;
pub use value::Value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::EngineConfig;
    pub use crate::diagnostic::{Diagnostic, ErrorKind};
    pub use crate::engine::{validate, Outcome, UnitResult};
    pub use crate::error::{Result, SchemaError};
    pub use crate::parser::compiler::compile_schema;
    pub use crate::registry::Registry;
    pub use crate::value::Value;
}
