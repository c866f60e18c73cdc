//! Library: a named collection of compilation units.
//!
//! Units are keyed by file name in a sorted map behind a mutex, so loaders
//! may insert units from worker threads while iteration order stays
//! deterministic. The top-level declaration index is populated exactly
//! once, after every unit is in; populating twice or querying before
//! populating is a programming fault and panics.

use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use vela_ast::{LibraryId, Name, NodeId, NodeKind, Span, Unit};

/// An import of another library, optionally through a prefix.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Import {
    /// URI of the imported library.
    pub uri: String,
    /// Prefix the import is scoped under, if any.
    pub prefix: Option<String>,
}

/// A top-level declaration, addressed by unit.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TopLevel {
    /// File name of the unit that declares it.
    pub unit_name: String,
    /// Declaration node within that unit.
    pub node: NodeId,
}

/// A losing binding in a top-level name collision.
///
/// The first declaration of a name wins; every later declaration of the
/// same name is recorded here for the resolver to report.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Collision {
    pub name: Name,
    pub unit_name: String,
    pub node: NodeId,
    /// Span of the losing declaration's name.
    pub name_span: Span,
}

#[derive(Debug, Default)]
struct TopLevelIndex {
    by_name: FxHashMap<Name, TopLevel>,
}

/// One library: units, imports, and the top-level declaration index.
#[derive(Debug)]
pub struct Library {
    name: String,
    uri: String,
    id: LibraryId,
    units: Mutex<BTreeMap<String, Unit>>,
    imports: Mutex<Vec<Import>>,
    top_level: Mutex<Option<TopLevelIndex>>,
}

impl Library {
    /// Create an empty library.
    pub fn new(name: impl Into<String>, uri: impl Into<String>, id: LibraryId) -> Self {
        Library {
            name: name.into(),
            uri: uri.into(),
            id,
            units: Mutex::new(BTreeMap::new()),
            imports: Mutex::new(Vec::new()),
            top_level: Mutex::new(None),
        }
    }

    /// Library name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Library id within the analysis session.
    pub fn id(&self) -> LibraryId {
        self.id
    }

    /// Insert a unit, keyed by its file name. Replaces any previous unit
    /// with the same file name. Safe to call from multiple threads.
    pub fn put_unit(&self, unit: Unit) {
        self.units.lock().insert(unit.file_name.clone(), unit);
    }

    /// Lock the unit map. Iteration over the guard is in file-name order.
    pub fn units(&self) -> MutexGuard<'_, BTreeMap<String, Unit>> {
        self.units.lock()
    }

    /// Unit file names, sorted.
    pub fn unit_names(&self) -> Vec<String> {
        self.units.lock().keys().cloned().collect()
    }

    /// Record an import.
    pub fn add_import(&self, import: Import) {
        self.imports.lock().push(import);
    }

    /// Snapshot of the imports, in the order they were added.
    pub fn imports(&self) -> Vec<Import> {
        self.imports.lock().clone()
    }

    /// Build the top-level declaration index from every unit, in unit
    /// name order. First binding of a name wins; later bindings are
    /// returned as collisions.
    ///
    /// # Panics
    /// Panics if the index was already populated.
    pub fn populate_top_level_nodes(&self) -> Vec<Collision> {
        let mut slot = self.top_level.lock();
        assert!(
            slot.is_none(),
            "top-level nodes of library '{}' populated twice",
            self.name
        );

        let mut index = TopLevelIndex::default();
        let mut collisions = Vec::new();
        let units = self.units.lock();
        for (unit_name, unit) in units.iter() {
            for &decl in &unit.declarations {
                let Some((name, name_span)) = declared_name(unit, decl) else {
                    continue;
                };
                if index.by_name.contains_key(&name) {
                    collisions.push(Collision {
                        name,
                        unit_name: unit_name.clone(),
                        node: decl,
                        name_span,
                    });
                } else {
                    index.by_name.insert(
                        name,
                        TopLevel {
                            unit_name: unit_name.clone(),
                            node: decl,
                        },
                    );
                }
            }
        }
        tracing::debug!(
            library = %self.name,
            declarations = index.by_name.len(),
            collisions = collisions.len(),
            "populated top-level nodes"
        );
        *slot = Some(index);
        collisions
    }

    /// Whether the top-level index has been populated.
    pub fn is_populated(&self) -> bool {
        self.top_level.lock().is_some()
    }

    /// Look up a top-level declaration by name.
    ///
    /// # Panics
    /// Panics if [`Library::populate_top_level_nodes`] has not run.
    pub fn top_level_node(&self, name: Name) -> Option<TopLevel> {
        let slot = self.top_level.lock();
        let index = slot
            .as_ref()
            .unwrap_or_else(|| panic!("top-level nodes of library '{}' not populated", self.name));
        index.by_name.get(&name).cloned()
    }

    /// All top-level names, unordered.
    ///
    /// # Panics
    /// Panics if [`Library::populate_top_level_nodes`] has not run.
    pub fn top_level_names(&self) -> Vec<Name> {
        let slot = self.top_level.lock();
        let index = slot
            .as_ref()
            .unwrap_or_else(|| panic!("top-level nodes of library '{}' not populated", self.name));
        index.by_name.keys().copied().collect()
    }
}

/// Name and name span of a top-level declaration node, if it has one.
fn declared_name(unit: &Unit, decl: NodeId) -> Option<(Name, Span)> {
    match &unit.arena.node(decl).kind {
        NodeKind::ClassDecl {
            name, name_span, ..
        }
        | NodeKind::InterfaceDecl {
            name, name_span, ..
        }
        | NodeKind::FieldDecl {
            name, name_span, ..
        } => Some((*name, *name_span)),
        NodeKind::MethodDecl { name, .. } => match &unit.arena.node(*name).kind {
            NodeKind::Identifier { name: id } => Some((*id, unit.arena.span(*name))),
            // Qualified names never name a top-level declaration.
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vela_ast::{Modifiers, SharedInterner, UnitBuilder};

    fn class_unit(interner: &SharedInterner, file: &str, class_name: &str) -> Unit {
        let source = format!("class {class_name} {{}}");
        let mut b = UnitBuilder::new(file, format!("file:///{file}"), source, interner);
        let class = b.class(
            class_name,
            Span::new(6, 6 + class_name.len() as u32),
            Modifiers::empty(),
            None,
            [],
            [],
            Span::new(0, 9 + class_name.len() as u32),
        );
        b.add_declaration(class);
        b.finish()
    }

    #[test]
    fn populate_indexes_declarations_across_units() {
        let interner = SharedInterner::new();
        let lib = Library::new("app", "file:///app.vela", LibraryId::new(0));
        lib.put_unit(class_unit(&interner, "b.vela", "B"));
        lib.put_unit(class_unit(&interner, "a.vela", "A"));

        let collisions = lib.populate_top_level_nodes();
        assert_eq!(collisions, vec![]);

        let a = lib.top_level_node(interner.intern("A")).unwrap();
        assert_eq!(a.unit_name, "a.vela");
        assert!(lib.top_level_node(interner.intern("C")).is_none());
    }

    #[test]
    fn first_binding_wins_and_collision_is_recorded() {
        let interner = SharedInterner::new();
        let lib = Library::new("app", "file:///app.vela", LibraryId::new(0));
        lib.put_unit(class_unit(&interner, "a.vela", "Dup"));
        lib.put_unit(class_unit(&interner, "b.vela", "Dup"));

        let collisions = lib.populate_top_level_nodes();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].unit_name, "b.vela");

        let winner = lib.top_level_node(interner.intern("Dup")).unwrap();
        assert_eq!(winner.unit_name, "a.vela");
    }

    #[test]
    #[should_panic(expected = "populated twice")]
    fn populate_is_one_shot() {
        let lib = Library::new("app", "file:///app.vela", LibraryId::new(0));
        lib.populate_top_level_nodes();
        lib.populate_top_level_nodes();
    }

    #[test]
    #[should_panic(expected = "not populated")]
    fn query_before_populate_is_a_fault() {
        let interner = SharedInterner::new();
        let lib = Library::new("app", "file:///app.vela", LibraryId::new(0));
        lib.top_level_node(interner.intern("A"));
    }

    #[test]
    fn put_unit_from_many_threads() {
        let interner = SharedInterner::new();
        let lib = Library::new("app", "file:///app.vela", LibraryId::new(0));
        std::thread::scope(|scope| {
            for i in 0..8 {
                let lib = &lib;
                let interner = interner.clone();
                scope.spawn(move || {
                    let file = format!("u{i}.vela");
                    let class = format!("C{i}");
                    lib.put_unit(class_unit(&interner, &file, &class));
                });
            }
        });
        assert_eq!(lib.unit_names().len(), 8);
        let collisions = lib.populate_top_level_nodes();
        assert_eq!(collisions, vec![]);
    }
}
