//! Diagnostic log.
//!
//! Collects diagnostics during analysis and hands them back sorted by
//! file, line, and column, split by channel. Analysis passes push in
//! traversal order; the sort makes output order independent of pass
//! scheduling.

use vela_ast::Span;

use crate::{Channel, Diagnostic, ErrorCode, LineMap};

/// Accumulator for one analysis run.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    /// Create an empty log.
    pub fn new() -> Self {
        DiagnosticLog::default()
    }

    /// Push a prebuilt diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Report a problem at `span` of the unit described by `file` and `map`.
    pub fn report(
        &mut self,
        code: impl Into<ErrorCode>,
        file: &str,
        map: &LineMap,
        span: Span,
        message: impl Into<String>,
    ) {
        let (line, column) = map.position(span);
        self.push(Diagnostic::new(
            code,
            file,
            line,
            column,
            map.span_length(span),
            message,
        ));
    }

    /// Total number of diagnostics so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics on `channel`, sorted by file, line, and column.
    pub fn channel(&self, channel: Channel) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self
            .diagnostics
            .iter()
            .filter(|d| d.channel() == channel)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (&a.file, a.line, a.column, a.code.as_str())
                .cmp(&(&b.file, b.line, b.column, b.code.as_str()))
        });
        out
    }

    /// Resolution-channel diagnostics, sorted.
    pub fn compilation_errors(&self) -> Vec<Diagnostic> {
        self.channel(Channel::Compilation)
    }

    /// Type-channel diagnostics, sorted.
    pub fn type_errors(&self) -> Vec<Diagnostic> {
        self.channel(Channel::Type)
    }

    /// Drain every diagnostic, sorted, for final emission.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| {
            (&a.file, a.line, a.column, a.code.as_str())
                .cmp(&(&b.file, b.line, b.column, b.code.as_str()))
        });
        self.diagnostics
    }
}
