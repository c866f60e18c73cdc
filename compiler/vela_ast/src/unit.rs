//! Compilation unit: the tree root for one source file.

use crate::{NodeArena, NodeId};

/// One file's parsed directives and declarations.
///
/// A diet unit carries declaration signatures only (no executable bodies);
/// it is produced when a library is restored from its serialized API
/// instead of re-parsed. The resolver and type analyzer treat diet and full
/// units identically — bodies simply do not exist to visit.
#[derive(Clone, Debug)]
pub struct Unit {
    /// File name the unit is keyed by within its library.
    pub file_name: String,
    /// Source URI.
    pub uri: String,
    /// Source text. For diet units this is the diet rendering.
    pub source: String,
    /// Node storage for this unit.
    pub arena: NodeArena,
    /// Directives in source order.
    pub directives: Vec<NodeId>,
    /// Top-level declarations in source order.
    pub declarations: Vec<NodeId>,
    /// Whether this unit was restored from a serialized API.
    pub diet: bool,
}

impl Unit {
    /// Create an empty unit.
    pub fn new(file_name: impl Into<String>, uri: impl Into<String>, source: impl Into<String>) -> Self {
        Unit {
            file_name: file_name.into(),
            uri: uri.into(),
            source: source.into(),
            arena: NodeArena::new(),
            directives: Vec::new(),
            declarations: Vec::new(),
            diet: false,
        }
    }
}
