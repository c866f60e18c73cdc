//! Type analysis over one resolved library.
//!
//! Expressions are typed bottom-up; anything unbound or unannotated stays
//! `Dynamic` and checking continues best-effort. The checks themselves are
//! local: argument lists against the bound signature, setter return types,
//! interface/default-class constructor compatibility, and the abstract
//! class rules at declarations and `new` sites. Everything reported here
//! lands on the type channel, which carries warning severity.

use rustc_hash::{FxHashMap, FxHashSet};
use vela_ast::printer::{name_text, type_text};
use vela_ast::{
    Accessor, ElementId, Modifiers, Name, NodeId, NodeKind, SharedInterner, Span, TypeId, Unit,
};
use vela_diagnostic::{DiagnosticLog, LineMap, TypeErrorCode};
use vela_library::Library;
use vela_resolve::{Element, ElementKind, Elements, LibraryImports, ParamSig};

use crate::{Type, TypePool};

/// Type-check one resolved library. Nodes get their static type recorded;
/// problems land on the type channel of `log`.
#[tracing::instrument(skip_all, fields(library = library.name()))]
pub fn check_library(
    library: &Library,
    imports: &LibraryImports,
    interner: &SharedInterner,
    elements: &Elements,
    types: &mut TypePool,
    log: &mut DiagnosticLog,
) {
    let lib_el = Elements::library_element(library.id());
    let mut units = library.units();
    let line_maps: FxHashMap<String, LineMap> = units
        .iter()
        .map(|(name, unit)| (name.clone(), LineMap::new(unit.source.as_str())))
        .collect();

    let mut checker = Checker {
        lib_el,
        imports,
        interner,
        elements,
        types,
        log,
    };
    for (unit_name, unit) in units.iter_mut() {
        let u = UnitCtx {
            unit_name,
            map: &line_maps[unit_name.as_str()],
        };
        checker.check_unit(&u, unit);
    }
}

struct UnitCtx<'a> {
    unit_name: &'a str,
    map: &'a LineMap,
}

struct Checker<'a> {
    lib_el: ElementId,
    imports: &'a LibraryImports,
    interner: &'a SharedInterner,
    elements: &'a Elements,
    types: &'a mut TypePool,
    log: &'a mut DiagnosticLog,
}

impl Checker<'_> {
    fn check_unit(&mut self, u: &UnitCtx<'_>, unit: &mut Unit) {
        for decl in unit.declarations.clone() {
            match unit.arena.node(decl).kind.clone() {
                NodeKind::ClassDecl { members, .. } => {
                    self.check_abstract_modifier(u, unit, decl);
                    for member in members {
                        self.check_member(u, unit, member);
                    }
                }
                NodeKind::InterfaceDecl { members, .. } => {
                    self.check_default_constructors(u, unit, decl);
                    for member in members {
                        self.check_member(u, unit, member);
                    }
                }
                NodeKind::MethodDecl { .. } | NodeKind::FieldDecl { .. } => {
                    self.check_member(u, unit, decl);
                }
                _ => {}
            }
        }
    }

    fn check_member(&mut self, u: &UnitCtx<'_>, unit: &mut Unit, node: NodeId) {
        match unit.arena.node(node).kind.clone() {
            NodeKind::MethodDecl {
                name,
                accessor,
                return_type,
                params,
                body,
                ..
            } => {
                if accessor == Accessor::Setter {
                    if let Some(rt) = return_type {
                        let rendered = type_text(&unit.arena, self.interner, Some(rt));
                        if rendered != "void" {
                            self.log.report(
                                TypeErrorCode::SetterReturnType,
                                u.unit_name,
                                u.map,
                                unit.arena.span(rt),
                                format!(
                                    "return type of setter '{}' must be 'void'",
                                    name_text(&unit.arena, self.interner, name)
                                ),
                            );
                        }
                    }
                }
                for &param in &params {
                    if let NodeKind::ParamDecl {
                        default_value: Some(default),
                        ..
                    } = unit.arena.node(param).kind.clone()
                    {
                        let _ = self.type_expr(u, unit, default);
                    }
                }
                if let Some(body) = body {
                    self.check_stmt(u, unit, body);
                }
            }
            NodeKind::FieldDecl {
                initializer: Some(init),
                ..
            } => {
                let _ = self.type_expr(u, unit, init);
            }
            _ => {}
        }
    }

    // Declaration-level checks

    /// A class is abstract when marked so or when any abstract member
    /// (own, inherited, or required by a transitively implemented
    /// interface) lacks a concrete implementation. Unmarked and abstract
    /// gets one warning at the class name listing what is missing.
    fn check_abstract_modifier(&mut self, u: &UnitCtx<'_>, unit: &Unit, decl: NodeId) {
        let Some(class) = unit.arena.element(decl) else {
            return;
        };
        let class_el = self.elements.get(class);
        if class_el.modifiers.contains(Modifiers::ABSTRACT) {
            return;
        }
        let missing = self.unimplemented_members(class);
        if missing.is_empty() {
            return;
        }
        let mut message = format!(
            "class '{}' is abstract without the 'abstract' modifier",
            self.interner.lookup(class_el.name)
        );
        for (contributor, members) in &missing {
            message.push_str("\n# From ");
            message.push_str(self.interner.lookup(self.elements.get(*contributor).name));
            message.push(':');
            for &member in members {
                message.push_str("\n  ");
                message.push_str(&self.element_signature(self.elements.get(member)));
            }
        }
        self.log.report(
            TypeErrorCode::AbstractClassWithoutAbstractModifier,
            u.unit_name,
            u.map,
            class_el.name_span,
            message,
        );
    }

    /// Constructors declared on an interface must match the default
    /// class's counterparts with identical declared parameter type names.
    /// A mismatch is anchored at the interface constructor's declaration.
    fn check_default_constructors(&mut self, u: &UnitCtx<'_>, unit: &Unit, decl: NodeId) {
        let Some(iface) = unit.arena.element(decl) else {
            return;
        };
        let iface_el = self.elements.get(iface);
        let Some(default_class) = iface_el.default_class else {
            return;
        };
        let iface_name = iface_el.name;
        let mut ctors: Vec<(String, ElementId)> = iface_el
            .constructors
            .iter()
            .map(|(full, &ctor)| (full.clone(), ctor))
            .collect();
        ctors.sort_by_key(|&(_, ctor)| ctor.index);

        for (full, ctor) in ctors {
            let Some((counter_name, counter_types)) =
                self.counterpart_signature(default_class, &full)
            else {
                continue;
            };
            let ctor_el = self.elements.get(ctor);
            let declared_types = Self::param_types(&ctor_el.params);
            if declared_types != counter_types {
                self.log.report(
                    TypeErrorCode::DefaultConstructorTypes,
                    u.unit_name,
                    u.map,
                    unit.arena.span(ctor_el.node),
                    format!(
                        "Constructor '{}' in '{}' has parameters types {}, doesn't match '{}' in '{}' with {}",
                        full,
                        self.interner.lookup(iface_name),
                        declared_types,
                        counter_name,
                        self.interner
                            .lookup(self.elements.get(default_class).name),
                        counter_types,
                    ),
                );
            }
        }
    }

    /// Default class counterpart of an interface constructor: same full
    /// name, then same simple name, then the class's unnamed constructor
    /// (implicit if undeclared) for an unnamed interface constructor.
    fn counterpart_signature(
        &self,
        default_class: ElementId,
        full: &str,
    ) -> Option<(String, String)> {
        let f_el = self.elements.get(default_class);
        if let Some(&c) = f_el.constructors.get(full) {
            return Some((full.to_owned(), Self::param_types(&self.elements.get(c).params)));
        }
        match full.split_once('.') {
            Some((_, simple)) => f_el
                .constructors
                .iter()
                .find(|(key, _)| key.rsplit('.').next() == Some(simple))
                .map(|(key, &c)| (key.clone(), Self::param_types(&self.elements.get(c).params))),
            None => {
                let f_name = self.interner.lookup(f_el.name);
                match f_el.constructors.get(f_name) {
                    Some(&c) => Some((
                        f_name.to_owned(),
                        Self::param_types(&self.elements.get(c).params),
                    )),
                    // Implicit default constructor: no parameters.
                    None => Some((f_name.to_owned(), "()".to_owned())),
                }
            }
        }
    }

    fn param_types(params: &[ParamSig]) -> String {
        let mut out = String::from("(");
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&p.type_text);
        }
        out.push(')');
        out
    }

    /// Missing abstract members of `class`, grouped by the type that
    /// contributed the requirement, in declaration order.
    fn unimplemented_members(&self, class: ElementId) -> Vec<(ElementId, Vec<ElementId>)> {
        // Concrete members along the superclass chain satisfy requirements.
        let mut satisfied: FxHashSet<(Name, bool)> = FxHashSet::default();
        let mut chain: Vec<ElementId> = Vec::new();
        let mut cursor = Some(class);
        while let Some(c) = cursor {
            if chain.contains(&c) {
                break;
            }
            chain.push(c);
            let el = self.elements.get(c);
            for (&name, &m) in &el.members {
                let member = self.elements.get(m);
                if !member.modifiers.contains(Modifiers::ABSTRACT) {
                    satisfied.insert((name, false));
                    if member.kind == ElementKind::Field {
                        satisfied.insert((name, true));
                    }
                }
            }
            for (&name, &m) in &el.setters {
                if !self.elements.get(m).modifiers.contains(Modifiers::ABSTRACT) {
                    satisfied.insert((name, true));
                }
            }
            cursor = el.superclass;
        }

        let mut out: Vec<(ElementId, Vec<ElementId>)> = Vec::new();

        // Abstract-marked members declared along the chain itself.
        for &c in &chain {
            let missing = self.missing_from(c, true, &mut satisfied);
            if !missing.is_empty() {
                out.push((c, missing));
            }
        }

        // Interface requirements, breadth-first from the chain's
        // implements clauses; every interface member is a requirement.
        let mut visited = chain.clone();
        let mut queue: Vec<ElementId> = chain
            .iter()
            .flat_map(|&c| self.elements.get(c).interfaces.iter().copied())
            .collect();
        let mut at = 0;
        while at < queue.len() {
            let iface = queue[at];
            at += 1;
            if visited.contains(&iface) {
                continue;
            }
            visited.push(iface);
            queue.extend(self.elements.get(iface).interfaces.iter().copied());
            let missing = self.missing_from(iface, false, &mut satisfied);
            if !missing.is_empty() {
                out.push((iface, missing));
            }
        }
        out
    }

    /// Requirements of one contributor that are not yet satisfied, in
    /// declaration order. Collected requirements are marked satisfied so
    /// a member is listed once under its nearest contributor.
    fn missing_from(
        &self,
        contributor: ElementId,
        abstract_only: bool,
        satisfied: &mut FxHashSet<(Name, bool)>,
    ) -> Vec<ElementId> {
        let el = self.elements.get(contributor);
        let mut missing: Vec<ElementId> = Vec::new();
        for (&name, &m) in &el.members {
            if abstract_only && !self.elements.get(m).modifiers.contains(Modifiers::ABSTRACT) {
                continue;
            }
            if satisfied.insert((name, false)) {
                missing.push(m);
            }
        }
        for (&name, &m) in &el.setters {
            if abstract_only && !self.elements.get(m).modifiers.contains(Modifiers::ABSTRACT) {
                continue;
            }
            if satisfied.insert((name, true)) {
                missing.push(m);
            }
        }
        missing.sort_by_key(|m| m.index);
        missing
    }

    /// Render a member for the missing-members listing: `int fooA`,
    /// `void fooB()`, `int get x()`.
    fn element_signature(&self, el: &Element) -> String {
        if el.kind == ElementKind::Field {
            return format!("{} {}", el.type_text, self.interner.lookup(el.name));
        }
        let mut out = String::new();
        out.push_str(&el.type_text);
        out.push(' ');
        match el.accessor {
            Accessor::Getter => out.push_str("get "),
            Accessor::Setter => out.push_str("set "),
            Accessor::None => {}
        }
        out.push_str(self.interner.lookup(el.name));
        out.push('(');
        let mut in_optional = false;
        for (i, p) in el.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if p.optional && !in_optional {
                out.push('[');
                in_optional = true;
            }
            out.push_str(&p.type_text);
            out.push(' ');
            out.push_str(self.interner.lookup(p.name));
        }
        if in_optional {
            out.push(']');
        }
        out.push(')');
        out
    }

    // Statement and expression walk

    fn check_stmt(&mut self, u: &UnitCtx<'_>, unit: &mut Unit, node: NodeId) {
        match unit.arena.node(node).kind.clone() {
            NodeKind::Block { stmts } => {
                for stmt in stmts {
                    self.check_stmt(u, unit, stmt);
                }
            }
            NodeKind::ExprStmt { expr } => {
                let _ = self.type_expr(u, unit, expr);
            }
            NodeKind::VarStmt {
                initializer: Some(init),
                ..
            } => {
                let _ = self.type_expr(u, unit, init);
            }
            NodeKind::LocalFunction { params, body, .. } => {
                for &param in &params {
                    if let NodeKind::ParamDecl {
                        default_value: Some(default),
                        ..
                    } = unit.arena.node(param).kind.clone()
                    {
                        let _ = self.type_expr(u, unit, default);
                    }
                }
                self.check_stmt(u, unit, body);
            }
            NodeKind::ReturnStmt { value: Some(value) } => {
                let _ = self.type_expr(u, unit, value);
            }
            NodeKind::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                let _ = self.type_expr(u, unit, condition);
                self.check_stmt(u, unit, then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(u, unit, else_branch);
                }
            }
            NodeKind::WhileStmt { condition, body } => {
                let _ = self.type_expr(u, unit, condition);
                self.check_stmt(u, unit, body);
            }
            NodeKind::ForStmt {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.check_stmt(u, unit, init);
                }
                if let Some(condition) = condition {
                    let _ = self.type_expr(u, unit, condition);
                }
                if let Some(update) = update {
                    let _ = self.type_expr(u, unit, update);
                }
                self.check_stmt(u, unit, body);
            }
            NodeKind::VarStmt { .. } | NodeKind::ReturnStmt { .. } | NodeKind::ErrorStmt => {}
            _ => {
                let _ = self.type_expr(u, unit, node);
            }
        }
    }

    fn type_expr(&mut self, u: &UnitCtx<'_>, unit: &mut Unit, node: NodeId) -> TypeId {
        let ty = match unit.arena.node(node).kind.clone() {
            NodeKind::IntLiteral(_) => self.type_from_text("int"),
            NodeKind::DoubleLiteral(_) => self.type_from_text("double"),
            NodeKind::BoolLiteral(_) => self.type_from_text("bool"),
            NodeKind::StringLiteral(_) => self.type_from_text("String"),
            NodeKind::NullLiteral | NodeKind::ErrorExpr => self.types.dynamic(),
            NodeKind::Identifier { .. } => match unit.arena.element(node) {
                Some(el) => self.element_type(el),
                None => self.types.dynamic(),
            },
            NodeKind::QualifiedName { qualifier, .. } => {
                let _ = self.type_expr(u, unit, qualifier);
                match unit.arena.element(node) {
                    Some(el) => self.element_type(el),
                    None => self.types.dynamic(),
                }
            }
            NodeKind::Invocation { target, args } => {
                let target_ty = self.type_expr(u, unit, target);
                for &arg in &args {
                    let _ = self.type_expr(u, unit, arg);
                }
                self.check_call(u, unit, node, target, &args, target_ty)
            }
            NodeKind::NamedArgument { value, .. } => self.type_expr(u, unit, value),
            NodeKind::NewExpr { ctor, args } => {
                for &arg in &args {
                    let _ = self.type_expr(u, unit, arg);
                }
                if let Some(sig) = unit.arena.element(ctor) {
                    let sig_el = self.elements.get(sig);
                    let params = if sig_el.is_callable() {
                        sig_el.params.clone()
                    } else {
                        // Implicit default constructor of a class, or an
                        // interface without a declared constructor.
                        Vec::new()
                    };
                    self.check_args(u, unit, unit.arena.span(node), &params, &args);
                }
                match unit.arena.element(node) {
                    Some(actual) => {
                        self.check_instantiation(u, unit, ctor, actual);
                        let constructed = match self.elements.get(actual).kind {
                            ElementKind::Class | ElementKind::Interface => Some(actual),
                            ElementKind::Constructor => self.elements.get(actual).enclosing,
                            _ => None,
                        };
                        match constructed {
                            Some(c) => self.types.interface(c, Vec::new()),
                            None => self.types.dynamic(),
                        }
                    }
                    None => self.types.dynamic(),
                }
            }
            NodeKind::Binary { lhs, rhs, .. } => {
                let _ = self.type_expr(u, unit, lhs);
                let _ = self.type_expr(u, unit, rhs);
                self.types.dynamic()
            }
            NodeKind::Unary { operand, .. } => {
                let _ = self.type_expr(u, unit, operand);
                self.types.dynamic()
            }
            _ => self.types.dynamic(),
        };
        unit.arena.set_ty(node, ty);
        ty
    }

    /// Declared type of a value element; callables are `Function`, getters
    /// read as their return type.
    fn element_type(&mut self, el: ElementId) -> TypeId {
        let el = self.elements.get(el);
        match el.kind {
            ElementKind::Field | ElementKind::Parameter | ElementKind::Variable => {
                let text = el.type_text.clone();
                self.type_from_text(&text)
            }
            ElementKind::Method if el.accessor == Accessor::Getter => {
                let text = el.type_text.clone();
                self.type_from_text(&text)
            }
            ElementKind::Method | ElementKind::Function | ElementKind::Constructor => {
                self.types.function()
            }
            ElementKind::Class | ElementKind::Interface | ElementKind::Library => {
                self.types.dynamic()
            }
        }
    }

    /// Map a rendered type annotation to a pooled type. Unknown names stay
    /// `Dynamic`.
    fn type_from_text(&mut self, text: &str) -> TypeId {
        let base = text.split('<').next().unwrap_or(text).trim();
        match base {
            "" | "Dynamic" => return self.types.dynamic(),
            "void" => return self.types.void_type(),
            "Function" => return self.types.function(),
            _ => {}
        }
        let found = match base.split_once('.') {
            Some((prefix, name)) => {
                let prefix = self.interner.intern(prefix);
                let name = self.interner.intern(name);
                self.imports.prefixed.get(&prefix).and_then(|&dep| {
                    self.elements
                        .get(Elements::library_element(dep))
                        .members
                        .get(&name)
                        .copied()
                })
            }
            None => {
                let name = self.interner.intern(base);
                self.lookup_top_level(name)
            }
        };
        match found {
            Some(el) if self.elements.get(el).is_type() => self.types.interface(el, Vec::new()),
            _ => self.types.dynamic(),
        }
    }

    fn lookup_top_level(&self, name: Name) -> Option<ElementId> {
        if let Some(&el) = self.elements.get(self.lib_el).members.get(&name) {
            return Some(el);
        }
        self.imports.open.iter().find_map(|&dep| {
            self.elements
                .get(Elements::library_element(dep))
                .members
                .get(&name)
                .copied()
        })
    }

    // Call checks

    fn check_call(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &Unit,
        call: NodeId,
        target: NodeId,
        args: &[NodeId],
        target_ty: TypeId,
    ) -> TypeId {
        if let Some(el) = unit.arena.element(target) {
            let el = self.elements.get(el);
            if el.is_callable() {
                let params = el.params.clone();
                let return_text = el.type_text.clone();
                self.check_args(u, unit, unit.arena.span(call), &params, args);
                return self.type_from_text(&return_text);
            }
            if el.is_type() {
                let name = self.interner.lookup(el.name).to_owned();
                self.log.report(
                    TypeErrorCode::NotAMethod,
                    u.unit_name,
                    u.map,
                    unit.arena.span(target),
                    format!("'{name}' is not a method"),
                );
                return self.types.dynamic();
            }
        }
        match self.types.get(target_ty) {
            Type::Dynamic | Type::Function => self.types.dynamic(),
            _ => {
                let text = &unit.source[unit.arena.span(target).to_range()];
                self.log.report(
                    TypeErrorCode::NotAMethod,
                    u.unit_name,
                    u.map,
                    unit.arena.span(target),
                    format!("'{text}' is not a method"),
                );
                self.types.dynamic()
            }
        }
    }

    /// Check one argument list against a signature with R required and N
    /// optional parameters. Optional parameters are addressable by name.
    fn check_args(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &Unit,
        call_span: Span,
        params: &[ParamSig],
        args: &[NodeId],
    ) {
        let required = params.iter().filter(|p| !p.optional).count();
        let total = params.len();
        let mut positional = 0usize;
        let mut filled: FxHashSet<Name> = FxHashSet::default();
        for &arg in args {
            if let NodeKind::NamedArgument { name, .. } = unit.arena.node(arg).kind {
                let span = unit.arena.span(arg);
                if !params.iter().any(|p| p.optional && p.name == name) {
                    self.log.report(
                        TypeErrorCode::NoSuchNamedParameter,
                        u.unit_name,
                        u.map,
                        span,
                        format!(
                            "no such named parameter '{}'",
                            self.interner.lookup(name)
                        ),
                    );
                    continue;
                }
                if !filled.insert(name) {
                    self.log.report(
                        TypeErrorCode::DuplicateNamedArgument,
                        u.unit_name,
                        u.map,
                        span,
                        format!(
                            "duplicate named argument '{}'",
                            self.interner.lookup(name)
                        ),
                    );
                }
            } else {
                if positional < total {
                    let param = &params[positional];
                    if param.optional {
                        filled.insert(param.name);
                    }
                } else {
                    self.log.report(
                        TypeErrorCode::ExtraArgument,
                        u.unit_name,
                        u.map,
                        unit.arena.span(arg),
                        "extra argument",
                    );
                }
                positional += 1;
            }
        }
        if positional < required {
            self.log.report(
                TypeErrorCode::MissingArgument,
                u.unit_name,
                u.map,
                call_span,
                format!("{required} positional arguments required, {positional} given"),
            );
        }
    }

    /// Instantiation rules at a `new` site, anchored on the constructor
    /// name. A marked-abstract class reports the abstract-class code (the
    /// factory variant when the bound constructor is a factory, never
    /// both); an unmarked class with unimplemented members reports the
    /// unimplemented-members code.
    fn check_instantiation(
        &mut self,
        u: &UnitCtx<'_>,
        unit: &Unit,
        ctor_node: NodeId,
        actual: ElementId,
    ) {
        let (class, ctor) = match self.elements.get(actual).kind {
            ElementKind::Class => (actual, None),
            ElementKind::Constructor => match self.elements.get(actual).enclosing {
                Some(c) if self.elements.get(c).kind == ElementKind::Class => (c, Some(actual)),
                _ => return,
            },
            _ => return,
        };
        let class_el = self.elements.get(class);
        let class_name = self.interner.lookup(class_el.name).to_owned();
        let span = unit.arena.span(ctor_node);
        if class_el.modifiers.contains(Modifiers::ABSTRACT) {
            let factory = ctor.is_some_and(|c| {
                self.elements
                    .get(c)
                    .modifiers
                    .contains(Modifiers::FACTORY)
            });
            if factory {
                self.log.report(
                    TypeErrorCode::InstantiationOfAbstractClassUsingFactory,
                    u.unit_name,
                    u.map,
                    span,
                    format!(
                        "abstract class '{class_name}' is instantiated through a factory constructor"
                    ),
                );
            } else {
                self.log.report(
                    TypeErrorCode::InstantiationOfAbstractClass,
                    u.unit_name,
                    u.map,
                    span,
                    format!("'{class_name}' is abstract and cannot be instantiated"),
                );
            }
        } else if !self.unimplemented_members(class).is_empty() {
            self.log.report(
                TypeErrorCode::InstantiationOfClassWithUnimplementedMembers,
                u.unit_name,
                u.map,
                span,
                format!("'{class_name}' has unimplemented members"),
            );
        }
    }
}
