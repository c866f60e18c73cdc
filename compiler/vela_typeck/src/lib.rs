//! Vela Typeck - Type Analysis
//!
//! Runs over a resolved library: types every expression bottom-up, checks
//! argument lists against bound signatures, and enforces the declaration
//! rules around setters, interface default constructors, and abstract
//! classes. Unbound names and absent annotations are `Dynamic`, so a
//! resolution failure never cascades into type noise.

mod checker;
mod pool;

pub use checker::check_library;
pub use pool::{Type, TypePool};
