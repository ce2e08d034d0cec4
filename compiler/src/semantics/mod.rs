//! Semantic analysis.
//!
//! This module ties together the scope tree, the typed tree and the passes
//! that build them. Parsing happens in `cinder_core`; everything here starts
//! from a `Program`.

pub mod display;
pub mod ids;
pub mod symbols;
pub mod typed;
pub mod types;

use cinder_core::DiagnosticList;

pub use display::{format_scope, format_symbol};
pub use ids::{ScopeId, SymbolId, TypeId};
pub use typed::TypedProgram;
pub use types::{DataType, TypeRef};

/// Result of the collector or the resolver for one file.
#[derive(Debug, Clone)]
pub struct SemanticOutput {
    /// Present only when every statement went through the pass.
    pub program: Option<TypedProgram>,
    pub diagnostics: DiagnosticList,
}

impl SemanticOutput {
    pub fn succeeded(&self) -> bool {
        self.program.is_some()
    }
}
