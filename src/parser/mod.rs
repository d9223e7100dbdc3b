//! Everything that turns bytes on disk into a compiled [`crate::registry::Registry`]:
//! the line-annotated YAML adapter ([`source`]), the schema AST ([`ast`]), the
//! node-tree-to-AST lowering pass ([`lower`]), and the compiler proper
//! ([`compiler`]) that resolves type expressions and builds descriptors.

pub mod ast;
pub mod compiler;
pub mod lower;
pub mod source;
