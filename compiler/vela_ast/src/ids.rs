//! Handle types for the flat tree and the later passes' stores.
//!
//! Nodes carry optional [`ElementId`]/[`TypeId`] slots even though the
//! element store and type pool live in downstream crates; declaring the
//! handles here keeps the tree crate free of upward dependencies, the same
//! way the parser-facing id types are declared below the passes that
//! consume them.

use std::fmt;

/// Index into a unit's node arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Identifies a library within one analysis host.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct LibraryId(u32);

impl LibraryId {
    /// Create a new `LibraryId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        LibraryId(index)
    }

    /// Get the index into the host's library list.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibraryId({})", self.0)
    }
}

/// Identifies a resolved element: a library plus an index into that
/// library's element store.
///
/// Cross-library references are plain read-only handles into the producer
/// library's already-completed store.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ElementId {
    pub library: LibraryId,
    pub index: u32,
}

impl ElementId {
    /// Create a new `ElementId`.
    #[inline]
    pub const fn new(library: LibraryId, index: u32) -> Self {
        ElementId { library, index }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({:?}, {})", self.library, self.index)
    }
}

/// Index into the analysis host's type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a new `TypeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    /// Get the index into the pool.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ElementId, NodeId, TypeId};
    crate::static_assert_size!(NodeId, 4);
    crate::static_assert_size!(TypeId, 4);
    crate::static_assert_size!(ElementId, 8);
}
