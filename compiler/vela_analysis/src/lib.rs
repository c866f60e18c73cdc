//! Vela Analysis - Pipeline Driver
//!
//! Ties the front end together: an [`AnalysisHost`] owns the shared state
//! of one session, [`AnalysisHost::analyze_library`] runs the populate,
//! resolve, and type-check passes over one library, and
//! [`AnalysisHost::analyze_all`] walks the import graph in dependency
//! order. [`load_units_parallel`] feeds a library's unit map from
//! concurrent producers.

mod host;

pub use host::{load_units_parallel, AnalysisConfig, AnalysisHost, AnalysisResult};
