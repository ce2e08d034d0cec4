//! Semantic front half of the Cinder compiler.
//!
//! `semantics` holds the scope tree, the typed tree and the collector and
//! resolver passes; `driver` runs them, together with the parser from
//! `cinder_core`, over a whole compilation.

pub mod driver;
pub mod semantics;

pub use driver::{
    Compilation, CompilationUnit, CompileError, CompileOptions, ConfigError, Phase, compile,
};
pub use semantics::symbols::{ScopeTree, collect, resolve};
pub use semantics::{DataType, SemanticOutput, TypedProgram, format_scope, format_symbol};
