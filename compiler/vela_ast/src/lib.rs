//! Vela AST - Tree Model for the Vela Front End
//!
//! This crate contains the syntax tree the rest of the front end operates on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Arena-allocated nodes with parent back-handles
//! - The closed `NodeKind` union over every construct
//! - Visitor dispatch in source order
//! - Signature rendering for diet serialization and diagnostics
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No `Box<Node>`, use `NodeId(u32)` indices
//! - **Closed unions**: adding a `NodeKind` variant breaks every pass at
//!   compile time instead of at runtime
//!
//! Nodes are created by the (external) parser through [`build::UnitBuilder`]
//! and never reparented once resolution begins. Synthetic error nodes fill
//! every required child slot so traversal never meets a missing child.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod build;
mod ids;
mod interner;
mod name;
mod node;
pub mod printer;
mod span;
mod unit;
pub mod visitor;

pub use arena::NodeArena;
pub use build::UnitBuilder;
pub use ids::{ElementId, LibraryId, NodeId, TypeId};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use node::{Accessor, Modifiers, Node, NodeKind, NodeList, Operator};
pub use span::{find_span, Span};
pub use unit::Unit;
pub use visitor::Visitor;
