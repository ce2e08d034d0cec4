//! Severity-tagged compiler messages.
//!
//! Every pass reports problems as `Diagnostic` values anchored to a source
//! buffer and an optional span. A `DiagnosticList` keeps them in discovery
//! order and offers a stable line/column ordering for presentation.

use std::fmt;
use std::sync::Arc;

use super::Span;
use crate::text::SourceBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    /// 1-based; zero when the diagnostic has no span.
    pub line: usize,
    pub column: usize,
    source: Arc<SourceBuffer>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        source: Arc<SourceBuffer>,
        span: Option<Span>,
        message: impl Into<String>,
    ) -> Self {
        let (line, column) = span
            .and_then(|span| source.line_column(span.start).ok())
            .unwrap_or((0, 0));

        Self {
            severity,
            message: message.into(),
            span,
            line,
            column,
            source,
        }
    }

    pub fn error(source: &Arc<SourceBuffer>, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, Arc::clone(source), Some(span), message)
    }

    /// Error that is not tied to a particular range of the buffer.
    pub fn unanchored(source: &Arc<SourceBuffer>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, Arc::clone(source), None, message)
    }

    pub fn source(&self) -> &Arc<SourceBuffer> {
        &self.source
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Debug for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostic")
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("span", &self.span)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.source.name(),
            self.line,
            self.column,
            self.severity,
            self.message
        )
    }
}

/// Insertion-ordered collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticList {
    entries: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticList) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop everything recorded after the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |diagnostic| diagnostic.severity == severity)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.of_severity(Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics ordered by line, then column. Entries on the same
    /// position keep their discovery order.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.entries.iter().collect();
        sorted.sort_by_key(|diagnostic| (diagnostic.line, diagnostic.column));
        sorted
    }
}

impl From<Vec<Diagnostic>> for DiagnosticList {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for DiagnosticList {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticList {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.sorted() {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
