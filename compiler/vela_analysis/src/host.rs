//! Analysis host and pipeline.
//!
//! The host owns everything one analysis session shares: the interner, the
//! libraries, their element stores, the type pool, and a diagnostic log
//! per library. No globals; dropping the host discards the session.
//!
//! A library is analyzed in one sequential sweep: populate the top-level
//! index, resolve, type-check. Every library it imports must already be
//! analyzed; scheduling and suspension are the caller's concern, and
//! [`AnalysisHost::analyze_all`] provides the dependency-order walk for
//! the common case.

use std::fmt::Write as _;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use vela_ast::{LibraryId, SharedInterner, Span, Unit, UnitBuilder};
use vela_diagnostic::{Diagnostic, DiagnosticLog};
use vela_library::Library;
use vela_resolve::{resolve_library, Elements, LibraryImports};
use vela_typeck::{check_library, TypePool};

/// Session configuration.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Give every library an implicit unprefixed import of a synthesized
    /// `core` library declaring the built-in types (`int`, `bool`, ...).
    /// Explicit imports take priority over it.
    pub synthesize_core_import: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            synthesize_core_import: true,
        }
    }
}

/// Diagnostics of one analyzed library, split by channel and sorted by
/// position. The annotated tree stays in the host's library.
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    pub compilation_errors: Vec<Diagnostic>,
    pub type_errors: Vec<Diagnostic>,
}

/// Built-in types declared by the synthesized `core` library.
const CORE_TYPES: &[&str] = &["Object", "bool", "int", "double", "num", "String"];

/// One analysis session.
pub struct AnalysisHost {
    config: AnalysisConfig,
    interner: SharedInterner,
    libraries: Vec<Library>,
    elements: Elements,
    types: TypePool,
    logs: Vec<DiagnosticLog>,
    analyzed: Vec<bool>,
    core: Option<LibraryId>,
}

impl AnalysisHost {
    /// Create a host. With `synthesize_core_import` set, the `core`
    /// library is created and analyzed up front.
    pub fn new(config: AnalysisConfig) -> Self {
        let synthesize = config.synthesize_core_import;
        let mut host = AnalysisHost {
            config,
            interner: SharedInterner::new(),
            libraries: Vec::new(),
            elements: Elements::new(),
            types: TypePool::new(),
            logs: Vec::new(),
            analyzed: Vec::new(),
            core: None,
        };
        if synthesize {
            let core = host.synthesize_core();
            host.core = Some(core);
            let result = host.analyze_library(core);
            assert!(
                result.compilation_errors.is_empty() && result.type_errors.is_empty(),
                "synthesized core library must be clean"
            );
        }
        host
    }

    /// The session's interner.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// The session's configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Register an empty library. Units and imports are put in through
    /// the returned handle before analysis.
    pub fn add_library(&mut self, name: impl Into<String>, uri: impl Into<String>) -> LibraryId {
        let id = self.elements.add_library();
        self.libraries.push(Library::new(name, uri, id));
        self.logs.push(DiagnosticLog::new());
        self.analyzed.push(false);
        id
    }

    /// Borrow a library.
    pub fn library(&self, id: LibraryId) -> &Library {
        &self.libraries[id.index()]
    }

    /// Borrow the session's element stores.
    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// Borrow the session's type pool.
    pub fn types(&self) -> &TypePool {
        &self.types
    }

    /// Borrow a library's diagnostic log.
    pub fn log(&self, id: LibraryId) -> &DiagnosticLog {
        &self.logs[id.index()]
    }

    /// Analyze one library: populate, resolve, type-check.
    ///
    /// # Panics
    /// Panics if an imported library has not been analyzed yet, or if the
    /// library was analyzed already (its index populates twice).
    #[tracing::instrument(skip(self), fields(library = self.libraries[lib.index()].name()))]
    pub fn analyze_library(&mut self, lib: LibraryId) -> AnalysisResult {
        let imports = self.resolved_imports(lib);
        let collisions = self.libraries[lib.index()].populate_top_level_nodes();
        let library = &self.libraries[lib.index()];
        let log = &mut self.logs[lib.index()];
        resolve_library(
            library,
            &collisions,
            &imports,
            &self.interner,
            &mut self.elements,
            log,
        );
        check_library(
            library,
            &imports,
            &self.interner,
            &self.elements,
            &mut self.types,
            log,
        );
        self.analyzed[lib.index()] = true;
        self.result(lib)
    }

    /// Analyze every not-yet-analyzed library in dependency order.
    pub fn analyze_all(&mut self) -> Vec<(LibraryId, AnalysisResult)> {
        let mut order = self.topological_order();
        order.retain(|lib| !self.analyzed[lib.index()]);
        order
            .into_iter()
            .map(|lib| (lib, self.analyze_library(lib)))
            .collect()
    }

    /// Diagnostics of an analyzed library.
    pub fn result(&self, lib: LibraryId) -> AnalysisResult {
        let log = &self.logs[lib.index()];
        AnalysisResult {
            compilation_errors: log.compilation_errors(),
            type_errors: log.type_errors(),
        }
    }

    fn resolved_imports(&self, lib: LibraryId) -> LibraryImports {
        let mut imports = LibraryImports::default();
        for import in self.libraries[lib.index()].imports() {
            let Some(dep) = self.find_library(&import.uri) else {
                continue;
            };
            assert!(
                self.analyzed[dep.index()],
                "library '{}' must be analyzed before its importer",
                import.uri
            );
            match import.prefix {
                Some(prefix) => {
                    imports.prefixed.insert(self.interner.intern(&prefix), dep);
                }
                None => imports.open.push(dep),
            }
        }
        if let Some(core) = self.core {
            if core != lib && !imports.open.contains(&core) {
                imports.open.push(core);
            }
        }
        imports
    }

    /// Find an import target by uri, falling back to the library name.
    fn find_library(&self, uri: &str) -> Option<LibraryId> {
        self.libraries
            .iter()
            .find(|l| l.uri() == uri || l.name() == uri)
            .map(Library::id)
    }

    fn topological_order(&self) -> Vec<LibraryId> {
        let mut order = Vec::new();
        let mut state = vec![VisitState::New; self.libraries.len()];
        for library in &self.libraries {
            self.topo_visit(library.id(), &mut state, &mut order);
        }
        order
    }

    fn topo_visit(&self, lib: LibraryId, state: &mut [VisitState], order: &mut Vec<LibraryId>) {
        match state[lib.index()] {
            VisitState::Done => return,
            // Import cycle; the analyzed-before-importer assert reports it.
            VisitState::Visiting => return,
            VisitState::New => {}
        }
        state[lib.index()] = VisitState::Visiting;
        for import in self.libraries[lib.index()].imports() {
            if let Some(dep) = self.find_library(&import.uri) {
                self.topo_visit(dep, state, order);
            }
        }
        state[lib.index()] = VisitState::Done;
        order.push(lib);
    }

    /// Build the `core` library: one unit of empty interface declarations
    /// for the built-in type names.
    fn synthesize_core(&mut self) -> LibraryId {
        let id = self.add_library("core", "vela:core");
        let mut source = String::new();
        let mut name_spans = Vec::new();
        for name in CORE_TYPES {
            let start = source.len() + "interface ".len();
            name_spans.push(Span::from_range(start..start + name.len()));
            let _ = writeln!(source, "interface {name} {{}}");
        }
        let mut builder =
            UnitBuilder::new("core.vela", "vela:core/core.vela", &source, &self.interner);
        for (name, &name_span) in CORE_TYPES.iter().zip(&name_spans) {
            let span = Span::new(name_span.start - 10, name_span.end + 3);
            let decl = builder.interface(name, name_span, [], None, [], span);
            builder.add_declaration(decl);
        }
        self.libraries[id.index()].put_unit(builder.finish());
        id
    }
}

impl Default for AnalysisHost {
    fn default() -> Self {
        AnalysisHost::new(AnalysisConfig::default())
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum VisitState {
    New,
    Visiting,
    Done,
}

/// Populate a library's unit map from producer closures running on the
/// rayon pool. Stands in for the external parallel parse tasks; the unit
/// map keeps file-name order regardless of completion order.
pub fn load_units_parallel<F>(library: &Library, producers: Vec<F>)
where
    F: FnOnce() -> Unit + Send,
{
    producers
        .into_par_iter()
        .for_each(|produce| library.put_unit(produce()));
}
