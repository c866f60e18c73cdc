//! Lexical scope stack.
//!
//! Innermost-out chain of name-to-element maps for parameters, local
//! variables, and local functions. Class member and library-level lookup
//! is not a scope frame; the resolver consults those after the stack
//! misses, because member lookup must walk supertype chains.

use rustc_hash::FxHashMap;
use vela_ast::{ElementId, Name};

/// Stack of local scopes, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<FxHashMap<Name, ElementId>>,
}

impl ScopeStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        ScopeStack::default()
    }

    /// Open a scope.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Close the innermost scope.
    ///
    /// # Panics
    /// Panics if no scope is open.
    pub fn pop(&mut self) {
        assert!(self.frames.pop().is_some(), "scope stack underflow");
    }

    /// Declare a name in the innermost scope. A redeclaration shadows the
    /// previous binding within the same frame.
    ///
    /// # Panics
    /// Panics if no scope is open.
    pub fn declare(&mut self, name: Name, element: ElementId) {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| panic!("declare outside any scope"));
        frame.insert(name, element);
    }

    /// Look a name up, innermost scope first.
    pub fn lookup(&self, name: Name) -> Option<ElementId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name).copied())
    }

    /// Depth of the stack, for pairing pushes and pops in debug asserts.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vela_ast::{LibraryId, SharedInterner};

    fn el(index: u32) -> ElementId {
        ElementId::new(LibraryId::new(0), index)
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let interner = SharedInterner::new();
        let x = interner.intern("x");
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.declare(x, el(0));
        scopes.push();
        scopes.declare(x, el(1));
        assert_eq!(scopes.lookup(x), Some(el(1)));
        scopes.pop();
        assert_eq!(scopes.lookup(x), Some(el(0)));
        scopes.pop();
        assert_eq!(scopes.lookup(x), None);
    }

    #[test]
    #[should_panic(expected = "scope stack underflow")]
    fn unbalanced_pop_is_a_fault() {
        let mut scopes = ScopeStack::new();
        scopes.pop();
    }
}
