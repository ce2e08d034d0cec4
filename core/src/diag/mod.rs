//! Diagnostic utilities shared across the workspace.
//!
//! This module centralises source spans, severity-tagged diagnostics and the
//! failure signals passes use internally, so the parser and the semantic
//! passes agree on a common representation.

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticList, Severity};
pub use error::{PassFailure, PassResult, StackFrame, catch_internal};
pub use span::Span;
