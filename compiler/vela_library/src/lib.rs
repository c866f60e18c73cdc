//! Library and compilation-unit index for the Vela front end.
//!
//! A [`Library`] owns its compilation units and the one-shot index of
//! top-level declarations. The diet form ([`save_api`]/[`load_api`])
//! serializes a library's public API as signature-only source and restores
//! it without re-parsing.

mod diet;
mod library;
mod reader;

pub use diet::{load_api, save_api, DietError, UNIT_NAME_MARKER, UNIT_URI_MARKER};
pub use library::{Collision, Import, Library, TopLevel};
pub use reader::Token;
