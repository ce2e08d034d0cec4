//! Core crate entry point.
//!
//! This crate wires together source buffers, the token model, the lexers,
//! the parser and shared diagnostics for the rest of the Cinder workspace.

pub mod ast;
pub mod diag;
pub mod parser;
pub mod text;

pub use diag::{
    Diagnostic, DiagnosticList, PassFailure, PassResult, Severity, Span, catch_internal,
};
pub use parser::filtered::{FilteredLexer, FilteredToken};
pub use parser::lexer::{Lexer, ScanResult, Token};
pub use parser::{ParseOutput, parse};
pub use text::{SourceBuffer, TextError};
