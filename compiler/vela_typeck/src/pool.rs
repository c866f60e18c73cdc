//! Type pool.
//!
//! Types are immutable and interned; a [`TypeId`] is an index into the
//! pool, so type equality is handle equality. The three structural types
//! are pre-seeded at fixed indices; nominal interface types are interned
//! on first request.

use rustc_hash::FxHashMap;
use vela_ast::{ElementId, TypeId};

/// A static type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Type {
    /// The absent-annotation type. Assignable anywhere, checks nothing.
    Dynamic,
    Void,
    /// Any callable value.
    Function,
    /// Nominal type of a class or interface element.
    Interface {
        element: ElementId,
        args: Vec<TypeId>,
    },
}

/// Interning pool for one analysis session.
#[derive(Debug)]
pub struct TypePool {
    types: Vec<Type>,
    interned: FxHashMap<(ElementId, Vec<TypeId>), TypeId>,
}

impl TypePool {
    /// Create a pool holding the structural types.
    pub fn new() -> Self {
        TypePool {
            types: vec![Type::Dynamic, Type::Void, Type::Function],
            interned: FxHashMap::default(),
        }
    }

    pub fn dynamic(&self) -> TypeId {
        TypeId::new(0)
    }

    pub fn void_type(&self) -> TypeId {
        TypeId::new(1)
    }

    pub fn function(&self) -> TypeId {
        TypeId::new(2)
    }

    /// Intern the nominal type of `element` applied to `args`.
    pub fn interface(&mut self, element: ElementId, args: Vec<TypeId>) -> TypeId {
        let key = (element, args);
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = TypeId::new(
            u32::try_from(self.types.len()).unwrap_or_else(|_| panic!("type pool overflow")),
        );
        self.types.push(Type::Interface {
            element: key.0,
            args: key.1.clone(),
        });
        self.interned.insert(key, id);
        id
    }

    /// Borrow a type.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Number of types interned so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypePool {
    fn default() -> Self {
        TypePool::new()
    }
}
