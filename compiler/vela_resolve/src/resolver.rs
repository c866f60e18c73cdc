//! Name resolution over one library.
//!
//! Resolution is two-phase. Declare walks every unit in file-name order and
//! creates an element for each declaration, so forward references resolve
//! order-independently. Bind then resolves supertype clauses, type
//! references, and every identifier, invocation, and new-expression in
//! bodies. Failures become diagnostics and the pass continues, leaving the
//! failed node unbound.
//!
//! Bare identifiers resolve innermost-out: local scopes, then the enclosing
//! type's members (including inherited ones), then the library's top level,
//! then unprefixed imports. Prefixed names resolve only through the library
//! imported under that prefix.

use rustc_hash::{FxHashMap, FxHashSet};
use vela_ast::printer::{name_text, type_text};
use vela_ast::{
    Accessor, ElementId, LibraryId, Modifiers, Name, NodeId, NodeKind, SharedInterner, Span, Unit,
};
use vela_diagnostic::{DiagnosticLog, LineMap, ResolverErrorCode};
use vela_library::{Collision, Library};

use crate::{Element, ElementKind, Elements, ParamSig, ScopeStack};

/// Resolved import table for one library.
#[derive(Debug, Default)]
pub struct LibraryImports {
    /// Unprefixed imports, searched in directive order.
    pub open: Vec<LibraryId>,
    /// Prefixed imports, reachable only through `prefix.Name`.
    pub prefixed: FxHashMap<Name, LibraryId>,
}

/// Resolve one library. Every imported library must already be resolved;
/// its element store is read through plain [`ElementId`] handles.
#[tracing::instrument(skip_all, fields(library = library.name()))]
pub fn resolve_library(
    library: &Library,
    collisions: &[Collision],
    imports: &LibraryImports,
    interner: &SharedInterner,
    elements: &mut Elements,
    log: &mut DiagnosticLog,
) {
    let lib_id = library.id();
    let lib_el = elements.alloc(
        lib_id,
        Element::new(
            ElementKind::Library,
            interner.intern(library.name()),
            "",
            NodeId::new(0),
            Span::DUMMY,
        ),
    );
    assert_eq!(
        lib_el,
        Elements::library_element(lib_id),
        "library element must be the first allocation in its store"
    );

    let mut units = library.units();
    let line_maps: FxHashMap<String, LineMap> = units
        .iter()
        .map(|(name, unit)| (name.clone(), LineMap::new(unit.source.as_str())))
        .collect();

    let mut ctx = Ctx {
        lib_id,
        lib_el,
        imports,
        interner,
        elements,
        log,
    };

    for (unit_name, unit) in units.iter_mut() {
        let u = UnitCtx {
            unit_name,
            map: &line_maps[unit_name.as_str()],
        };
        ctx.declare_unit(&u, unit);
    }

    for collision in collisions {
        ctx.log.report(
            ResolverErrorCode::DuplicateTopLevelDeclaration,
            &collision.unit_name,
            &line_maps[collision.unit_name.as_str()],
            collision.name_span,
            format!(
                "duplicate top-level declaration '{}'",
                interner.lookup(collision.name)
            ),
        );
    }

    for (unit_name, unit) in units.iter_mut() {
        let u = UnitCtx {
            unit_name,
            map: &line_maps[unit_name.as_str()],
        };
        ctx.bind_supertypes(&u, unit);
        ctx.bind_type_refs(&u, unit);
    }

    for (unit_name, unit) in units.iter_mut() {
        let u = UnitCtx {
            unit_name,
            map: &line_maps[unit_name.as_str()],
        };
        ctx.bind_unit(&u, unit);
    }
}

/// Per-unit context: the diagnostic location source.
struct UnitCtx<'a> {
    unit_name: &'a str,
    map: &'a LineMap,
}

struct Ctx<'a> {
    lib_id: LibraryId,
    lib_el: ElementId,
    imports: &'a LibraryImports,
    interner: &'a SharedInterner,
    elements: &'a mut Elements,
    log: &'a mut DiagnosticLog,
}

impl Ctx<'_> {
    // Declare phase

    fn declare_unit(&mut self, u: &UnitCtx<'_>, unit: &mut Unit) {
        for decl in unit.declarations.clone() {
            self.declare_top_level(u, unit, decl);
        }
    }

    fn declare_top_level(&mut self, u: &UnitCtx<'_>, unit: &mut Unit, decl: NodeId) {
        match unit.arena.node(decl).kind.clone() {
            NodeKind::ClassDecl {
                name,
                name_span,
                modifiers,
                members,
                ..
            } => {
                let mut el =
                    Element::new(ElementKind::Class, name, u.unit_name, decl, name_span);
                el.modifiers = modifiers;
                el.enclosing = Some(self.lib_el);
                let class_el = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(decl, class_el);
                self.insert_top_level(name, class_el);
                for member in members {
                    self.declare_member(u, unit, class_el, name, member);
                }
            }
            NodeKind::InterfaceDecl {
                name,
                name_span,
                members,
                ..
            } => {
                let mut el =
                    Element::new(ElementKind::Interface, name, u.unit_name, decl, name_span);
                el.enclosing = Some(self.lib_el);
                let iface_el = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(decl, iface_el);
                self.insert_top_level(name, iface_el);
                for member in members {
                    self.declare_member(u, unit, iface_el, name, member);
                }
            }
            NodeKind::MethodDecl { .. } => {
                let (name, el_id) = self.declare_callable(u, unit, decl, None);
                self.insert_top_level(name, el_id);
            }
            NodeKind::FieldDecl {
                name,
                name_span,
                modifiers,
                type_ref,
                ..
            } => {
                let mut el = Element::new(ElementKind::Field, name, u.unit_name, decl, name_span);
                el.modifiers = modifiers;
                el.type_text = type_text(&unit.arena, self.interner, type_ref);
                el.enclosing = Some(self.lib_el);
                let id = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(decl, id);
                self.insert_top_level(name, id);
            }
            _ => {}
        }
    }

    /// First binding of a top-level name wins; collisions are reported
    /// from the records the library index produced when populating.
    fn insert_top_level(&mut self, name: Name, el: ElementId) {
        self.elements
            .get_mut(self.lib_el)
            .members
            .entry(name)
            .or_insert(el);
    }

    fn declare_member(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        owner_el: ElementId,
        owner_name: Name,
        member: NodeId,
    ) {
        match unit.arena.node(member).kind.clone() {
            NodeKind::MethodDecl { .. } => {
                self.declare_callable(u, unit, member, Some((owner_el, owner_name)));
            }
            NodeKind::FieldDecl {
                name,
                name_span,
                modifiers,
                type_ref,
                ..
            } => {
                let mut el =
                    Element::new(ElementKind::Field, name, u.unit_name, member, name_span);
                el.modifiers = modifiers;
                el.type_text = type_text(&unit.arena, self.interner, type_ref);
                el.enclosing = Some(owner_el);
                let id = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(member, id);
                if self.elements.get(owner_el).members.contains_key(&name) {
                    self.report_duplicate_member(u, name_span, name, owner_name);
                } else {
                    self.elements.get_mut(owner_el).members.insert(name, id);
                }
            }
            _ => {}
        }
    }

    /// Declare a method, constructor, accessor, or top-level function.
    /// Returns the declared simple name and element.
    fn declare_callable(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        node: NodeId,
        owner: Option<(ElementId, Name)>,
    ) -> (Name, ElementId) {
        let NodeKind::MethodDecl {
            name,
            modifiers,
            accessor,
            return_type,
            params,
            ..
        } = unit.arena.node(node).kind.clone()
        else {
            unreachable!("declare_callable on non-method node");
        };
        let full_name = name_text(&unit.arena, self.interner, name);
        let name_span = unit.arena.span(name);
        let simple = match &unit.arena.node(name).kind {
            NodeKind::Identifier { name } | NodeKind::QualifiedName { name, .. } => *name,
            kind => unreachable!("method name holds {kind:?}"),
        };

        // A constructor carries the declaring type's name, either bare or
        // as the qualifier of `Type.ctor`.
        let is_ctor = owner.is_some_and(|(_, owner_name)| {
            simple == owner_name
                || matches!(
                    unit.arena.node(name).kind,
                    NodeKind::QualifiedName { .. }
                )
        });
        if modifiers.contains(Modifiers::FACTORY) && !is_ctor {
            let start = unit.arena.span(node).start;
            self.log.report(
                ResolverErrorCode::DisallowedFactory,
                u.unit_name,
                u.map,
                Span::new(start, start + 7),
                "factory is allowed only on constructors",
            );
        }

        let kind = if is_ctor {
            ElementKind::Constructor
        } else if owner.is_some() {
            ElementKind::Method
        } else {
            ElementKind::Function
        };
        let mut el = Element::new(kind, simple, u.unit_name, node, name_span);
        el.modifiers = modifiers;
        el.accessor = accessor;
        el.type_text = type_text(&unit.arena, self.interner, return_type);
        el.enclosing = Some(owner.map_or(self.lib_el, |(owner_el, _)| owner_el));
        el.params = self.param_sigs(unit, &params);
        let el_id = self.elements.alloc(self.lib_id, el);
        unit.arena.set_element(node, el_id);

        for &param in &params {
            self.declare_param(u, unit, el_id, param);
        }

        if let Some((owner_el, owner_name)) = owner {
            let duplicate = if is_ctor {
                let owner_mut = self.elements.get_mut(owner_el);
                if owner_mut.constructors.contains_key(&full_name) {
                    true
                } else {
                    owner_mut.constructors.insert(full_name.clone(), el_id);
                    false
                }
            } else if accessor == Accessor::Setter {
                let owner_mut = self.elements.get_mut(owner_el);
                if owner_mut.setters.contains_key(&simple) {
                    true
                } else {
                    owner_mut.setters.insert(simple, el_id);
                    false
                }
            } else {
                let owner_mut = self.elements.get_mut(owner_el);
                if owner_mut.members.contains_key(&simple) {
                    true
                } else {
                    owner_mut.members.insert(simple, el_id);
                    false
                }
            };
            if duplicate {
                self.report_duplicate_member(u, name_span, simple, owner_name);
            }
        }
        (simple, el_id)
    }

    fn declare_param(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        owner: ElementId,
        param: NodeId,
    ) {
        let NodeKind::ParamDecl {
            name,
            name_span,
            type_ref,
            ..
        } = unit.arena.node(param).kind.clone()
        else {
            unreachable!("parameter position holds non-parameter node");
        };
        let mut el = Element::new(ElementKind::Parameter, name, u.unit_name, param, name_span);
        el.type_text = type_text(&unit.arena, self.interner, type_ref);
        el.enclosing = Some(owner);
        let id = self.elements.alloc(self.lib_id, el);
        unit.arena.set_element(param, id);
    }

    fn param_sigs(&self, unit: &Unit, params: &[NodeId]) -> Vec<ParamSig> {
        params
            .iter()
            .map(|&p| {
                let NodeKind::ParamDecl {
                    name,
                    type_ref,
                    optional,
                    ..
                } = &unit.arena.node(p).kind
                else {
                    unreachable!("parameter position holds non-parameter node");
                };
                ParamSig {
                    name: *name,
                    type_text: type_text(&unit.arena, self.interner, *type_ref),
                    optional: *optional,
                }
            })
            .collect()
    }

    fn report_duplicate_member(
        &mut self,
        u: &UnitCtx<'_>,
        name_span: Span,
        name: Name,
        owner_name: Name,
    ) {
        self.log.report(
            ResolverErrorCode::DuplicateMember,
            u.unit_name,
            u.map,
            name_span,
            format!(
                "duplicate member '{}' in '{}'",
                self.interner.lookup(name),
                self.interner.lookup(owner_name)
            ),
        );
    }

    // Supertype and type-reference binding

    fn bind_supertypes(&mut self, u: &UnitCtx<'_>, unit: &mut Unit) {
        for decl in unit.declarations.clone() {
            let Some(type_el) = unit.arena.element(decl) else {
                continue;
            };
            match unit.arena.node(decl).kind.clone() {
                NodeKind::ClassDecl {
                    superclass,
                    interfaces,
                    ..
                } => {
                    if let Some(s) = superclass {
                        if let Some(el) = self.bind_type_ref(u, unit, s) {
                            if self.elements.get(el).kind == ElementKind::Class {
                                self.elements.get_mut(type_el).superclass = Some(el);
                            } else {
                                self.elements.get_mut(type_el).interfaces.push(el);
                            }
                        }
                    }
                    for i in interfaces {
                        if let Some(el) = self.bind_type_ref(u, unit, i) {
                            self.elements.get_mut(type_el).interfaces.push(el);
                        }
                    }
                }
                NodeKind::InterfaceDecl {
                    interfaces,
                    default_class,
                    ..
                } => {
                    for i in interfaces {
                        if let Some(el) = self.bind_type_ref(u, unit, i) {
                            self.elements.get_mut(type_el).interfaces.push(el);
                        }
                    }
                    if let Some(d) = default_class {
                        if let Some(el) = self.bind_type_ref(u, unit, d) {
                            if self.elements.get(el).kind == ElementKind::Class {
                                self.elements.get_mut(type_el).default_class = Some(el);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Bind the remaining type references in signatures and bodies.
    fn bind_type_refs(&mut self, u: &UnitCtx<'_>, unit: &mut Unit) {
        let type_refs: Vec<NodeId> = unit
            .arena
            .ids()
            .filter(|&id| matches!(unit.arena.node(id).kind, NodeKind::TypeRef { .. }))
            .collect();
        for id in type_refs {
            let _ = self.bind_type_ref(u, unit, id);
        }
    }

    /// Resolve one type reference, best-effort. An unknown simple type
    /// name stays unbound without a diagnostic (the core types live
    /// outside this front end); an unknown prefix is `NO_SUCH_PREFIX`.
    fn bind_type_ref(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        node: NodeId,
    ) -> Option<ElementId> {
        if let Some(el) = unit.arena.element(node) {
            return Some(el);
        }
        let NodeKind::TypeRef {
            prefix, name, args, ..
        } = unit.arena.node(node).kind.clone()
        else {
            return None;
        };
        for arg in args {
            let _ = self.bind_type_ref(u, unit, arg);
        }
        let target = match prefix {
            Some(prefix) => match self.imports.prefixed.get(&prefix).copied() {
                Some(dep) => self.dep_top_level(dep, name),
                None => {
                    self.log.report(
                        ResolverErrorCode::NoSuchPrefix,
                        u.unit_name,
                        u.map,
                        unit.arena.span(node),
                        format!(
                            "cannot find import prefix '{}'",
                            self.interner.lookup(prefix)
                        ),
                    );
                    return None;
                }
            },
            None => self.lookup_top_level(name),
        };
        match target {
            Some(el) if self.elements.get(el).is_type() => {
                unit.arena.set_element(node, el);
                Some(el)
            }
            _ => None,
        }
    }

    // Name lookup

    fn dep_top_level(&self, dep: LibraryId, name: Name) -> Option<ElementId> {
        self.elements
            .get(Elements::library_element(dep))
            .members
            .get(&name)
            .copied()
    }

    fn lookup_top_level(&self, name: Name) -> Option<ElementId> {
        if let Some(&el) = self.elements.get(self.lib_el).members.get(&name) {
            return Some(el);
        }
        self.imports
            .open
            .iter()
            .find_map(|&dep| self.dep_top_level(dep, name))
    }

    fn resolve_name(
        &self,
        scopes: &ScopeStack,
        class: Option<ElementId>,
        name: Name,
    ) -> Option<ElementId> {
        scopes
            .lookup(name)
            .or_else(|| class.and_then(|c| self.elements.find_member(c, name)))
            .or_else(|| self.lookup_top_level(name))
    }

    // Bind phase

    fn bind_unit(&mut self, u: &UnitCtx<'_>, unit: &mut Unit) {
        for decl in unit.declarations.clone() {
            match unit.arena.node(decl).kind.clone() {
                NodeKind::ClassDecl { members, .. } | NodeKind::InterfaceDecl { members, .. } => {
                    let class = unit.arena.element(decl);
                    for member in members {
                        self.bind_member(u, unit, class, member);
                    }
                }
                NodeKind::MethodDecl { .. } | NodeKind::FieldDecl { .. } => {
                    self.bind_member(u, unit, None, decl);
                }
                _ => {}
            }
        }
    }

    fn bind_member(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        class: Option<ElementId>,
        node: NodeId,
    ) {
        match unit.arena.node(node).kind.clone() {
            NodeKind::MethodDecl { params, body, .. } => {
                let owner = unit.arena.element(node);
                let mut scopes = ScopeStack::new();
                scopes.push();
                for &param in &params {
                    if let NodeKind::ParamDecl { name, .. } = unit.arena.node(param).kind {
                        if let Some(pid) = unit.arena.element(param) {
                            scopes.declare(name, pid);
                        }
                    }
                }
                for &param in &params {
                    if let NodeKind::ParamDecl {
                        default_value: Some(default),
                        ..
                    } = unit.arena.node(param).kind.clone()
                    {
                        self.bind_expr(u, unit, &mut scopes, class, owner, default);
                    }
                }
                if let Some(body) = body {
                    self.bind_stmt(u, unit, &mut scopes, class, owner, body);
                }
                scopes.pop();
            }
            NodeKind::FieldDecl {
                initializer: Some(init),
                ..
            } => {
                let owner = unit.arena.element(node);
                let mut scopes = ScopeStack::new();
                scopes.push();
                self.bind_expr(u, unit, &mut scopes, class, owner, init);
                scopes.pop();
            }
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_stmt(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        scopes: &mut ScopeStack,
        class: Option<ElementId>,
        owner: Option<ElementId>,
        node: NodeId,
    ) {
        match unit.arena.node(node).kind.clone() {
            NodeKind::Block { stmts } => {
                scopes.push();
                for stmt in stmts {
                    self.bind_stmt(u, unit, scopes, class, owner, stmt);
                }
                scopes.pop();
            }
            NodeKind::ExprStmt { expr } => self.bind_expr(u, unit, scopes, class, owner, expr),
            NodeKind::VarStmt {
                name,
                name_span,
                type_ref,
                initializer,
            } => {
                if let Some(init) = initializer {
                    self.bind_expr(u, unit, scopes, class, owner, init);
                }
                let mut el =
                    Element::new(ElementKind::Variable, name, u.unit_name, node, name_span);
                el.type_text = type_text(&unit.arena, self.interner, type_ref);
                el.enclosing = owner;
                let id = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(node, id);
                scopes.declare(name, id);
            }
            NodeKind::LocalFunction {
                name,
                name_span,
                return_type,
                params,
                body,
            } => {
                let mut el =
                    Element::new(ElementKind::Function, name, u.unit_name, node, name_span);
                el.type_text = type_text(&unit.arena, self.interner, return_type);
                el.params = self.param_sigs(unit, &params);
                el.enclosing = owner;
                let id = self.elements.alloc(self.lib_id, el);
                unit.arena.set_element(node, id);
                // Visible before its body, so recursion resolves.
                scopes.declare(name, id);
                scopes.push();
                for &param in &params {
                    self.declare_param(u, unit, id, param);
                    if let NodeKind::ParamDecl { name, .. } = unit.arena.node(param).kind {
                        if let Some(pid) = unit.arena.element(param) {
                            scopes.declare(name, pid);
                        }
                    }
                }
                self.bind_stmt(u, unit, scopes, class, Some(id), body);
                scopes.pop();
            }
            NodeKind::ReturnStmt { value } => {
                if let Some(value) = value {
                    self.bind_expr(u, unit, scopes, class, owner, value);
                }
            }
            NodeKind::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                self.bind_expr(u, unit, scopes, class, owner, condition);
                self.bind_stmt(u, unit, scopes, class, owner, then_branch);
                if let Some(else_branch) = else_branch {
                    self.bind_stmt(u, unit, scopes, class, owner, else_branch);
                }
            }
            NodeKind::WhileStmt { condition, body } => {
                self.bind_expr(u, unit, scopes, class, owner, condition);
                self.bind_stmt(u, unit, scopes, class, owner, body);
            }
            NodeKind::ForStmt {
                init,
                condition,
                update,
                body,
            } => {
                scopes.push();
                if let Some(init) = init {
                    self.bind_stmt(u, unit, scopes, class, owner, init);
                }
                if let Some(condition) = condition {
                    self.bind_expr(u, unit, scopes, class, owner, condition);
                }
                if let Some(update) = update {
                    self.bind_expr(u, unit, scopes, class, owner, update);
                }
                self.bind_stmt(u, unit, scopes, class, owner, body);
                scopes.pop();
            }
            NodeKind::ErrorStmt => {}
            // Expression in statement position.
            _ => self.bind_expr(u, unit, scopes, class, owner, node),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_expr(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        scopes: &mut ScopeStack,
        class: Option<ElementId>,
        owner: Option<ElementId>,
        node: NodeId,
    ) {
        match unit.arena.node(node).kind.clone() {
            NodeKind::Identifier { name } => {
                if unit.arena.element(node).is_some() {
                    return;
                }
                match self.resolve_name(scopes, class, name) {
                    Some(el) => unit.arena.set_element(node, el),
                    None => self.log.report(
                        ResolverErrorCode::UnresolvedIdentifier,
                        u.unit_name,
                        u.map,
                        unit.arena.span(node),
                        format!("cannot resolve '{}'", self.interner.lookup(name)),
                    ),
                }
            }
            NodeKind::QualifiedName {
                qualifier,
                name,
                name_span,
            } => {
                self.bind_qualified(u, unit, scopes, class, owner, node, qualifier, name, name_span);
            }
            NodeKind::Invocation { target, args } => {
                self.bind_expr(u, unit, scopes, class, owner, target);
                self.bind_args(u, unit, scopes, class, owner, &args);
            }
            NodeKind::NewExpr { ctor, args } => {
                self.bind_new(u, unit, scopes, class, node, ctor);
                self.bind_args(u, unit, scopes, class, owner, &args);
            }
            NodeKind::NamedArgument { value, .. } => {
                self.bind_expr(u, unit, scopes, class, owner, value);
            }
            NodeKind::Binary { lhs, rhs, .. } => {
                self.bind_expr(u, unit, scopes, class, owner, lhs);
                self.bind_expr(u, unit, scopes, class, owner, rhs);
            }
            NodeKind::Unary { operand, .. } => {
                self.bind_expr(u, unit, scopes, class, owner, operand);
            }
            _ => {}
        }
    }

    /// Arguments of one call. A named argument repeated literally is a
    /// resolution error on its second occurrence.
    #[allow(clippy::too_many_arguments)]
    fn bind_args(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        scopes: &mut ScopeStack,
        class: Option<ElementId>,
        owner: Option<ElementId>,
        args: &[NodeId],
    ) {
        let mut seen: FxHashSet<Name> = FxHashSet::default();
        for &arg in args {
            if let NodeKind::NamedArgument { name, value, .. } = unit.arena.node(arg).kind.clone()
            {
                if !seen.insert(name) {
                    self.log.report(
                        ResolverErrorCode::DuplicateNamedArgument,
                        u.unit_name,
                        u.map,
                        unit.arena.span(arg),
                        format!(
                            "duplicate named argument '{}'",
                            self.interner.lookup(name)
                        ),
                    );
                }
                self.bind_expr(u, unit, scopes, class, owner, value);
            } else {
                self.bind_expr(u, unit, scopes, class, owner, arg);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_qualified(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        scopes: &mut ScopeStack,
        class: Option<ElementId>,
        owner: Option<ElementId>,
        node: NodeId,
        qualifier: NodeId,
        name: Name,
        name_span: Span,
    ) {
        let NodeKind::Identifier { name: q } = unit.arena.node(qualifier).kind else {
            self.bind_expr(u, unit, scopes, class, owner, qualifier);
            return;
        };
        if let Some(el) = self.resolve_name(scopes, class, q) {
            unit.arena.set_element(qualifier, el);
            if self.elements.get(el).is_type() {
                if let Some(member) = self.elements.find_member(el, name) {
                    unit.arena.set_element(node, member);
                }
                // A missing static member stays unbound; instance member
                // access through values is not checked here.
            }
            return;
        }
        if let Some(&dep) = self.imports.prefixed.get(&q) {
            unit.arena
                .set_element(qualifier, Elements::library_element(dep));
            match self.dep_top_level(dep, name) {
                Some(el) => unit.arena.set_element(node, el),
                None => self.log.report(
                    ResolverErrorCode::UnresolvedIdentifier,
                    u.unit_name,
                    u.map,
                    name_span,
                    format!("cannot resolve '{}'", self.interner.lookup(name)),
                ),
            }
            return;
        }
        self.log.report(
            ResolverErrorCode::NoSuchPrefix,
            u.unit_name,
            u.map,
            unit.arena.span(qualifier),
            format!("cannot find import prefix '{}'", self.interner.lookup(q)),
        );
    }

    /// Bind a `new` expression. The constructor name node gets the element
    /// whose signature call sites validate against; the new-expression node
    /// gets the constructor that actually runs. The two differ when an
    /// interface constructor is fulfilled by its default class.
    fn bind_new(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        scopes: &mut ScopeStack,
        class: Option<ElementId>,
        new_node: NodeId,
        ctor: NodeId,
    ) {
        let ctor_span = unit.arena.span(ctor);
        match unit.arena.node(ctor).kind.clone() {
            NodeKind::Identifier { name } => {
                let Some(el) = self.resolve_name(scopes, class, name) else {
                    self.log.report(
                        ResolverErrorCode::UnresolvedIdentifier,
                        u.unit_name,
                        u.map,
                        ctor_span,
                        format!("cannot resolve '{}'", self.interner.lookup(name)),
                    );
                    return;
                };
                if !self.elements.get(el).is_type() {
                    self.log.report(
                        ResolverErrorCode::ExpectedConstructor,
                        u.unit_name,
                        u.map,
                        ctor_span,
                        format!("'{}' is not a type", self.interner.lookup(name)),
                    );
                    return;
                }
                let key = self.interner.lookup(name).to_owned();
                self.bind_ctor(u, unit, new_node, ctor, el, &key, None);
            }
            NodeKind::QualifiedName {
                qualifier,
                name,
                name_span,
            } => {
                let NodeKind::Identifier { name: q } = unit.arena.node(qualifier).kind else {
                    self.log.report(
                        ResolverErrorCode::ExpectedConstructor,
                        u.unit_name,
                        u.map,
                        ctor_span,
                        "constructor name expected",
                    );
                    return;
                };
                let ty = self
                    .resolve_name(scopes, class, q)
                    .filter(|&el| self.elements.get(el).is_type());
                if let Some(ty) = ty {
                    unit.arena.set_element(qualifier, ty);
                    let full = format!(
                        "{}.{}",
                        self.interner.lookup(q),
                        self.interner.lookup(name)
                    );
                    self.bind_ctor(u, unit, new_node, ctor, ty, &full, Some(name));
                } else if let Some(&dep) = self.imports.prefixed.get(&q) {
                    unit.arena
                        .set_element(qualifier, Elements::library_element(dep));
                    match self.dep_top_level(dep, name) {
                        Some(el) if self.elements.get(el).is_type() => {
                            let key = self.interner.lookup(name).to_owned();
                            self.bind_ctor(u, unit, new_node, ctor, el, &key, None);
                        }
                        _ => self.log.report(
                            ResolverErrorCode::UnresolvedIdentifier,
                            u.unit_name,
                            u.map,
                            name_span,
                            format!("cannot resolve '{}'", self.interner.lookup(name)),
                        ),
                    }
                } else {
                    self.log.report(
                        ResolverErrorCode::NoSuchPrefix,
                        u.unit_name,
                        u.map,
                        unit.arena.span(qualifier),
                        format!("cannot find import prefix '{}'", self.interner.lookup(q)),
                    );
                }
            }
            _ => self.log.report(
                ResolverErrorCode::ExpectedConstructor,
                u.unit_name,
                u.map,
                ctor_span,
                "constructor name expected",
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_ctor(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &mut Unit,
        new_node: NodeId,
        ctor_node: NodeId,
        ty: ElementId,
        full: &str,
        named: Option<Name>,
    ) {
        let ty_el = self.elements.get(ty);
        match ty_el.kind {
            ElementKind::Class => {
                // An unnamed `new C()` with no declared constructor uses
                // the implicit default; the class element stands for it.
                let bound = ty_el
                    .constructors
                    .get(full)
                    .copied()
                    .or_else(|| named.is_none().then_some(ty));
                match bound {
                    Some(el) => {
                        unit.arena.set_element(ctor_node, el);
                        unit.arena.set_element(new_node, el);
                    }
                    None => self.log.report(
                        ResolverErrorCode::UnresolvedIdentifier,
                        u.unit_name,
                        u.map,
                        unit.arena.span(ctor_node),
                        format!("cannot resolve constructor '{full}'"),
                    ),
                }
            }
            ElementKind::Interface => {
                let declared = ty_el.constructors.get(full).copied();
                let default_class = ty_el.default_class;
                let iface_name = ty_el.name;
                if named.is_some() && declared.is_none() {
                    self.log.report(
                        ResolverErrorCode::UnresolvedIdentifier,
                        u.unit_name,
                        u.map,
                        unit.arena.span(ctor_node),
                        format!("cannot resolve constructor '{full}'"),
                    );
                    return;
                }
                // Call sites validate against the interface's declaration.
                unit.arena
                    .set_element(ctor_node, declared.unwrap_or(ty));
                let Some(f) = default_class else {
                    self.log.report(
                        ResolverErrorCode::ExpectedConstructor,
                        u.unit_name,
                        u.map,
                        unit.arena.span(ctor_node),
                        format!(
                            "interface '{}' has no default implementation",
                            self.interner.lookup(iface_name)
                        ),
                    );
                    return;
                };
                let actual = self.find_counterpart(f, full, named).unwrap_or(f);
                unit.arena.set_element(new_node, actual);
            }
            _ => self.log.report(
                ResolverErrorCode::ExpectedConstructor,
                u.unit_name,
                u.map,
                unit.arena.span(ctor_node),
                format!("'{}' is not a type", self.interner.lookup(ty_el.name)),
            ),
        }
    }

    /// Find the default class's counterpart of an interface constructor:
    /// same full name first, then matching simple name, then the unnamed
    /// constructor for an unnamed interface constructor.
    fn find_counterpart(
        &self,
        default_class: ElementId,
        full: &str,
        named: Option<Name>,
    ) -> Option<ElementId> {
        let f_el = self.elements.get(default_class);
        if let Some(&c) = f_el.constructors.get(full) {
            return Some(c);
        }
        match named {
            Some(named) => {
                let simple = self.interner.lookup(named);
                f_el.constructors
                    .iter()
                    .find_map(|(key, &c)| (key.rsplit('.').next() == Some(simple)).then_some(c))
            }
            None => f_el
                .constructors
                .get(self.interner.lookup(f_el.name))
                .copied(),
        }
    }
}
