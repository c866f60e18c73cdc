//! Resolved elements.
//!
//! An element is the semantic object behind a declaration node: the thing
//! identifiers bind to. Elements live in one store per library and are
//! addressed by [`ElementId`], so cross-library references are plain
//! read-only handles into an imported library's completed store.

use rustc_hash::FxHashMap;
use vela_ast::{Accessor, ElementId, LibraryId, Modifiers, Name, NodeId, Span};

/// What a declaration is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Library,
    Class,
    Interface,
    Method,
    Constructor,
    /// Named local function.
    Function,
    Field,
    Parameter,
    Variable,
}

/// Call-site metadata for one declared parameter.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParamSig {
    pub name: Name,
    /// Rendered declared type; `Dynamic` when unannotated.
    pub type_text: String,
    /// Whether the parameter is in the optional section. Optional
    /// parameters are addressable by name at call sites.
    pub optional: bool,
}

/// One resolved element.
#[derive(Clone, Debug)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: Name,
    /// Unit (by file name) holding the declaring node.
    pub unit_name: String,
    /// Declaring node within that unit.
    pub node: NodeId,
    /// Span of the declared name.
    pub name_span: Span,
    /// Lexically enclosing element: class for members, method for locals.
    pub enclosing: Option<ElementId>,
    pub modifiers: Modifiers,
    pub accessor: Accessor,
    /// Rendered declared type: return type for callables, value type for
    /// fields and variables. `Dynamic` when unannotated.
    pub type_text: String,
    pub params: Vec<ParamSig>,
    /// Non-setter members by name (classes and interfaces only).
    pub members: FxHashMap<Name, ElementId>,
    /// Setters by name. A getter and a setter may share a name.
    pub setters: FxHashMap<Name, ElementId>,
    /// Constructors by full declared name (`A`, `I.foo`).
    pub constructors: FxHashMap<String, ElementId>,
    pub superclass: Option<ElementId>,
    pub interfaces: Vec<ElementId>,
    /// Default implementation class (interfaces only).
    pub default_class: Option<ElementId>,
}

impl Element {
    /// A fresh element with empty container state. The store assigns the
    /// real id on allocation.
    pub fn new(
        kind: ElementKind,
        name: Name,
        unit_name: impl Into<String>,
        node: NodeId,
        name_span: Span,
    ) -> Self {
        Element {
            id: ElementId::new(LibraryId::new(0), 0),
            kind,
            name,
            unit_name: unit_name.into(),
            node,
            name_span,
            enclosing: None,
            modifiers: Modifiers::empty(),
            accessor: Accessor::None,
            type_text: String::new(),
            params: Vec::new(),
            members: FxHashMap::default(),
            setters: FxHashMap::default(),
            constructors: FxHashMap::default(),
            superclass: None,
            interfaces: Vec::new(),
            default_class: None,
        }
    }

    /// Whether the element is a type declaration.
    pub fn is_type(&self) -> bool {
        matches!(self.kind, ElementKind::Class | ElementKind::Interface)
    }

    /// Whether call sites may invoke the element.
    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Method | ElementKind::Constructor | ElementKind::Function
        )
    }

    /// Number of required (non-optional) parameters.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

/// Element storage for one library.
#[derive(Debug)]
pub struct ElementStore {
    library: LibraryId,
    elements: Vec<Element>,
}

impl ElementStore {
    /// Create an empty store for `library`.
    pub fn new(library: LibraryId) -> Self {
        ElementStore {
            library,
            elements: Vec::new(),
        }
    }

    /// Library the store belongs to.
    pub fn library(&self) -> LibraryId {
        self.library
    }

    fn alloc(&mut self, mut element: Element) -> ElementId {
        let index = u32::try_from(self.elements.len())
            .unwrap_or_else(|_| panic!("element store overflow"));
        let id = ElementId::new(self.library, index);
        element.id = id;
        self.elements.push(element);
        id
    }

    fn get(&self, id: ElementId) -> &Element {
        assert_eq!(id.library, self.library, "element id from another library");
        &self.elements[id.index as usize]
    }

    fn get_mut(&mut self, id: ElementId) -> &mut Element {
        assert_eq!(id.library, self.library, "element id from another library");
        &mut self.elements[id.index as usize]
    }
}

/// All element stores of one analysis session, indexed by library.
#[derive(Debug, Default)]
pub struct Elements {
    stores: Vec<ElementStore>,
}

impl Elements {
    /// Create an empty registry.
    pub fn new() -> Self {
        Elements::default()
    }

    /// Open a store for the next library and return its id.
    pub fn add_library(&mut self) -> LibraryId {
        let id = LibraryId::new(
            u32::try_from(self.stores.len()).unwrap_or_else(|_| panic!("library id overflow")),
        );
        self.stores.push(ElementStore::new(id));
        id
    }

    /// Allocate an element in `library`'s store.
    pub fn alloc(&mut self, library: LibraryId, element: Element) -> ElementId {
        self.stores[library.index()].alloc(element)
    }

    /// Id of `library`'s library element. The resolver allocates it first,
    /// so it is always index zero; its member map is the library's top
    /// level, which import resolution reads across library boundaries.
    pub fn library_element(library: LibraryId) -> ElementId {
        ElementId::new(library, 0)
    }

    /// Borrow an element.
    pub fn get(&self, id: ElementId) -> &Element {
        self.stores[id.library.index()].get(id)
    }

    /// Borrow an element mutably.
    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        self.stores[id.library.index()].get_mut(id)
    }

    /// Find a member by name on a type, searching the superclass chain and
    /// every transitively implemented interface. Setters are a separate
    /// namespace and are not returned here.
    pub fn find_member(&self, ty: ElementId, name: Name) -> Option<ElementId> {
        let mut visited = Vec::new();
        self.find_member_inner(ty, name, &mut visited)
    }

    fn find_member_inner(
        &self,
        ty: ElementId,
        name: Name,
        visited: &mut Vec<ElementId>,
    ) -> Option<ElementId> {
        if visited.contains(&ty) {
            return None;
        }
        visited.push(ty);
        let element = self.get(ty);
        if let Some(&member) = element.members.get(&name) {
            return Some(member);
        }
        if let Some(superclass) = element.superclass {
            if let Some(found) = self.find_member_inner(superclass, name, visited) {
                return Some(found);
            }
        }
        for &interface in &element.interfaces {
            if let Some(found) = self.find_member_inner(interface, name, visited) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vela_ast::SharedInterner;

    #[test]
    fn ids_are_per_library() {
        let interner = SharedInterner::new();
        let mut elements = Elements::new();
        let lib_a = elements.add_library();
        let lib_b = elements.add_library();

        let a = elements.alloc(
            lib_a,
            Element::new(
                ElementKind::Class,
                interner.intern("A"),
                "a.vela",
                NodeId::new(0),
                Span::new(0, 1),
            ),
        );
        let b = elements.alloc(
            lib_b,
            Element::new(
                ElementKind::Class,
                interner.intern("B"),
                "b.vela",
                NodeId::new(0),
                Span::new(0, 1),
            ),
        );
        assert_eq!(a.library, lib_a);
        assert_eq!(b.library, lib_b);
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 0);
        assert_eq!(elements.get(a).unit_name, "a.vela");
    }

    #[test]
    fn member_lookup_walks_supertypes() {
        let interner = SharedInterner::new();
        let mut elements = Elements::new();
        let lib = elements.add_library();

        let base = elements.alloc(
            lib,
            Element::new(
                ElementKind::Class,
                interner.intern("Base"),
                "a.vela",
                NodeId::new(0),
                Span::new(0, 1),
            ),
        );
        let foo = elements.alloc(
            lib,
            Element::new(
                ElementKind::Method,
                interner.intern("foo"),
                "a.vela",
                NodeId::new(1),
                Span::new(2, 3),
            ),
        );
        elements
            .get_mut(base)
            .members
            .insert(interner.intern("foo"), foo);

        let derived = elements.alloc(
            lib,
            Element::new(
                ElementKind::Class,
                interner.intern("Derived"),
                "a.vela",
                NodeId::new(2),
                Span::new(4, 5),
            ),
        );
        elements.get_mut(derived).superclass = Some(base);

        assert_eq!(elements.find_member(derived, interner.intern("foo")), Some(foo));
        assert_eq!(elements.find_member(derived, interner.intern("bar")), None);
    }
}
