//! Vela Resolve - Name Resolution
//!
//! Turns declaration nodes into [`Element`]s and binds every name in a
//! library to the element it denotes. Runs after a library's top-level
//! index is populated and before type analysis; type analysis reads the
//! bindings off the tree and never looks names up itself.
//!
//! Resolution failures are reported on the compilation channel and the
//! failed node stays unbound, so one bad name does not stop the pass.

mod element;
mod resolver;
mod scope;

pub use element::{Element, ElementKind, ElementStore, Elements, ParamSig};
pub use resolver::{resolve_library, LibraryImports};
pub use scope::ScopeStack;
