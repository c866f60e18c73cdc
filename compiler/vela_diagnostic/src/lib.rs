//! Diagnostic collection and reporting for the Vela front end.
//!
//! Problems are identified by a stable code name, located by 1-based line
//! and character column, and accumulated on one of two channels so that
//! resolution problems and type problems can be inspected independently.

mod diagnostic;
mod error_code;
mod line_map;
mod log;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::{Channel, ErrorCode, ResolverErrorCode, TypeErrorCode};
pub use line_map::LineMap;
pub use log::DiagnosticLog;
