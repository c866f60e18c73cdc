use std::fmt;

use crate::{Channel, ErrorCode};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported problem, located by line, column, and length.
///
/// Lines and columns are 1-based and counted in characters, not bytes, so
/// positions stay stable for multi-byte source text. Length is the number
/// of characters the problem's span covers.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    /// File name of the unit the problem was found in.
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic. Severity follows the code's channel:
    /// resolution problems are errors, type problems are warnings.
    pub fn new(
        code: impl Into<ErrorCode>,
        file: impl Into<String>,
        line: u32,
        column: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let severity = match code.channel() {
            Channel::Compilation => Severity::Error,
            Channel::Type => Severity::Warning,
        };
        Diagnostic {
            code,
            severity,
            file: file.into(),
            line,
            column,
            length,
            message: message.into(),
        }
    }

    /// Channel this diagnostic belongs to, from its code.
    pub fn channel(&self) -> Channel {
        self.code.channel()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}: {}",
            self.file, self.line, self.column, self.severity, self.code, self.message
        )
    }
}
