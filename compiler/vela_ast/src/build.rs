//! Unit construction API.
//!
//! The front end consumes trees produced by an external parser; this
//! builder is the construction surface that parser uses, and it is shared
//! by the diet signature reader and by tests. Every method allocates one
//! node and attaches its children, so parent back-handles are always set
//! and the attach-once invariant is enforced at construction time.

use crate::arena::alloc_binary;
use crate::{
    Accessor, Modifiers, Name, NodeArena, NodeId, NodeKind, NodeList, Operator, SharedInterner,
    Span, Unit,
};

/// Builder for one [`Unit`].
pub struct UnitBuilder {
    unit: Unit,
    interner: SharedInterner,
}

impl UnitBuilder {
    /// Start building a unit for `file_name`.
    pub fn new(
        file_name: impl Into<String>,
        uri: impl Into<String>,
        source: impl Into<String>,
        interner: &SharedInterner,
    ) -> Self {
        UnitBuilder {
            unit: Unit::new(file_name, uri, source),
            interner: interner.clone(),
        }
    }

    /// Intern a string.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Access the arena under construction.
    pub fn arena(&mut self) -> &mut NodeArena {
        &mut self.unit.arena
    }

    /// Finish, returning the completed unit.
    pub fn finish(self) -> Unit {
        self.unit
    }

    /// Finish as a diet unit (signatures only).
    pub fn finish_diet(mut self) -> Unit {
        self.unit.diet = true;
        self.unit
    }

    // Directives

    /// `library "name";`
    pub fn library_directive(&mut self, name: &str, span: Span) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(NodeKind::LibraryDirective { name }, span);
        self.unit.directives.push(id);
        id
    }

    /// `import "uri" [as prefix];`
    pub fn import_directive(&mut self, uri: &str, prefix: Option<&str>, span: Span) -> NodeId {
        let uri = self.name(uri);
        let prefix = prefix.map(|p| self.name(p));
        let id = self
            .unit
            .arena
            .alloc(NodeKind::ImportDirective { uri, prefix }, span);
        self.unit.directives.push(id);
        id
    }

    /// `source "uri";`
    pub fn source_directive(&mut self, uri: &str, span: Span) -> NodeId {
        let uri = self.name(uri);
        let id = self.unit.arena.alloc(NodeKind::SourceDirective { uri }, span);
        self.unit.directives.push(id);
        id
    }

    /// `native "uri";`
    pub fn native_directive(&mut self, uri: &str, span: Span) -> NodeId {
        let uri = self.name(uri);
        let id = self.unit.arena.alloc(NodeKind::NativeDirective { uri }, span);
        self.unit.directives.push(id);
        id
    }

    // Declarations

    /// Add a finished declaration node to the unit's top level.
    pub fn add_declaration(&mut self, decl: NodeId) {
        self.unit.declarations.push(decl);
    }

    /// Class declaration node.
    #[allow(clippy::too_many_arguments)]
    pub fn class(
        &mut self,
        name: &str,
        name_span: Span,
        modifiers: Modifiers,
        superclass: Option<NodeId>,
        interfaces: impl IntoIterator<Item = NodeId>,
        members: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let interfaces: NodeList = interfaces.into_iter().collect();
        let members: NodeList = members.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::ClassDecl {
                name,
                name_span,
                modifiers,
                superclass,
                interfaces: interfaces.clone(),
                members: members.clone(),
            },
            span,
        );
        self.unit.arena.attach_opt(id, superclass);
        self.unit.arena.attach_all(id, interfaces.iter());
        self.unit.arena.attach_all(id, members.iter());
        id
    }

    /// Interface declaration node.
    pub fn interface(
        &mut self,
        name: &str,
        name_span: Span,
        interfaces: impl IntoIterator<Item = NodeId>,
        default_class: Option<NodeId>,
        members: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let interfaces: NodeList = interfaces.into_iter().collect();
        let members: NodeList = members.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::InterfaceDecl {
                name,
                name_span,
                interfaces: interfaces.clone(),
                default_class,
                members: members.clone(),
            },
            span,
        );
        self.unit.arena.attach_all(id, interfaces.iter());
        self.unit.arena.attach_opt(id, default_class);
        self.unit.arena.attach_all(id, members.iter());
        id
    }

    /// Method/constructor/accessor declaration node. `name` is an
    /// `Identifier` or `QualifiedName` node.
    #[allow(clippy::too_many_arguments)]
    pub fn method(
        &mut self,
        name: NodeId,
        modifiers: Modifiers,
        accessor: Accessor,
        return_type: Option<NodeId>,
        params: impl IntoIterator<Item = NodeId>,
        body: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        let params: NodeList = params.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::MethodDecl {
                name,
                modifiers,
                accessor,
                return_type,
                params: params.clone(),
                body,
            },
            span,
        );
        self.unit.arena.attach(id, name);
        self.unit.arena.attach_opt(id, return_type);
        self.unit.arena.attach_all(id, params.iter());
        self.unit.arena.attach_opt(id, body);
        id
    }

    /// Field declaration node.
    pub fn field(
        &mut self,
        name: &str,
        name_span: Span,
        modifiers: Modifiers,
        type_ref: Option<NodeId>,
        initializer: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(
            NodeKind::FieldDecl {
                name,
                name_span,
                modifiers,
                type_ref,
                initializer,
            },
            span,
        );
        self.unit.arena.attach_opt(id, type_ref);
        self.unit.arena.attach_opt(id, initializer);
        id
    }

    /// Formal parameter node.
    pub fn param(
        &mut self,
        name: &str,
        name_span: Span,
        type_ref: Option<NodeId>,
        optional: bool,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(
            NodeKind::ParamDecl {
                name,
                name_span,
                type_ref,
                optional,
                default_value: None,
            },
            span,
        );
        self.unit.arena.attach_opt(id, type_ref);
        id
    }

    /// Type reference node.
    pub fn type_ref(
        &mut self,
        prefix: Option<&str>,
        name: &str,
        args: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> NodeId {
        let prefix = prefix.map(|p| self.name(p));
        let name = self.name(name);
        let args: NodeList = args.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::TypeRef {
                prefix,
                name,
                name_span: span,
                args: args.clone(),
            },
            span,
        );
        self.unit.arena.attach_all(id, args.iter());
        id
    }

    /// Bare type reference with no prefix or arguments.
    pub fn ty(&mut self, name: &str, span: Span) -> NodeId {
        self.type_ref(None, name, [], span)
    }

    // Statements

    /// Block statement node.
    pub fn block(&mut self, stmts: impl IntoIterator<Item = NodeId>, span: Span) -> NodeId {
        let stmts: NodeList = stmts.into_iter().collect();
        let id = self
            .unit
            .arena
            .alloc(NodeKind::Block { stmts: stmts.clone() }, span);
        self.unit.arena.attach_all(id, stmts.iter());
        id
    }

    /// Expression statement node.
    pub fn expr_stmt(&mut self, expr: NodeId, span: Span) -> NodeId {
        let id = self.unit.arena.alloc(NodeKind::ExprStmt { expr }, span);
        self.unit.arena.attach(id, expr);
        id
    }

    /// Local variable declaration statement node.
    pub fn var_stmt(
        &mut self,
        name: &str,
        name_span: Span,
        type_ref: Option<NodeId>,
        initializer: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(
            NodeKind::VarStmt {
                name,
                name_span,
                type_ref,
                initializer,
            },
            span,
        );
        self.unit.arena.attach_opt(id, type_ref);
        self.unit.arena.attach_opt(id, initializer);
        id
    }

    /// Local function declaration statement node.
    pub fn local_function(
        &mut self,
        name: &str,
        name_span: Span,
        return_type: Option<NodeId>,
        params: impl IntoIterator<Item = NodeId>,
        body: NodeId,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let params: NodeList = params.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::LocalFunction {
                name,
                name_span,
                return_type,
                params: params.clone(),
                body,
            },
            span,
        );
        self.unit.arena.attach_opt(id, return_type);
        self.unit.arena.attach_all(id, params.iter());
        self.unit.arena.attach(id, body);
        id
    }

    /// Return statement node.
    pub fn return_stmt(&mut self, value: Option<NodeId>, span: Span) -> NodeId {
        let id = self.unit.arena.alloc(NodeKind::ReturnStmt { value }, span);
        self.unit.arena.attach_opt(id, value);
        id
    }

    /// Synthetic error statement node.
    pub fn error_stmt(&mut self, span: Span) -> NodeId {
        self.unit.arena.alloc(NodeKind::ErrorStmt, span)
    }

    // Expressions

    /// Identifier node.
    pub fn identifier(&mut self, name: &str, span: Span) -> NodeId {
        let name = self.name(name);
        self.unit.arena.alloc(NodeKind::Identifier { name }, span)
    }

    /// `qualifier.name` node.
    pub fn qualified(
        &mut self,
        qualifier: NodeId,
        name: &str,
        name_span: Span,
        span: Span,
    ) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(
            NodeKind::QualifiedName {
                qualifier,
                name,
                name_span,
            },
            span,
        );
        self.unit.arena.attach(id, qualifier);
        id
    }

    /// Invocation node. The span should cover the target through the
    /// closing parenthesis.
    pub fn invocation(
        &mut self,
        target: NodeId,
        args: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> NodeId {
        let args: NodeList = args.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::Invocation {
                target,
                args: args.clone(),
            },
            span,
        );
        self.unit.arena.attach(id, target);
        self.unit.arena.attach_all(id, args.iter());
        id
    }

    /// `name: value` argument node.
    pub fn named_arg(&mut self, name: &str, name_span: Span, value: NodeId, span: Span) -> NodeId {
        let name = self.name(name);
        let id = self.unit.arena.alloc(
            NodeKind::NamedArgument {
                name,
                name_span,
                value,
            },
            span,
        );
        self.unit.arena.attach(id, value);
        id
    }

    /// `new ctor(args)` node.
    pub fn new_expr(
        &mut self,
        ctor: NodeId,
        args: impl IntoIterator<Item = NodeId>,
        span: Span,
    ) -> NodeId {
        let args: NodeList = args.into_iter().collect();
        let id = self.unit.arena.alloc(
            NodeKind::NewExpr {
                ctor,
                args: args.clone(),
            },
            span,
        );
        self.unit.arena.attach(id, ctor);
        self.unit.arena.attach_all(id, args.iter());
        id
    }

    /// Integer literal node.
    pub fn int(&mut self, value: i64, span: Span) -> NodeId {
        self.unit.arena.alloc(NodeKind::IntLiteral(value), span)
    }

    /// Boolean literal node.
    pub fn boolean(&mut self, value: bool, span: Span) -> NodeId {
        self.unit.arena.alloc(NodeKind::BoolLiteral(value), span)
    }

    /// String literal node.
    pub fn string(&mut self, value: &str, span: Span) -> NodeId {
        let value = self.name(value);
        self.unit.arena.alloc(NodeKind::StringLiteral(value), span)
    }

    /// Null literal node.
    pub fn null(&mut self, span: Span) -> NodeId {
        self.unit.arena.alloc(NodeKind::NullLiteral, span)
    }

    /// Binary expression node.
    pub fn binary(&mut self, op: Operator, lhs: NodeId, rhs: NodeId, span: Span) -> NodeId {
        alloc_binary(&mut self.unit.arena, op, lhs, rhs, span)
    }

    /// Unary expression node.
    pub fn unary(&mut self, op: Operator, operand: NodeId, span: Span) -> NodeId {
        let id = self.unit.arena.alloc(NodeKind::Unary { op, operand }, span);
        self.unit.arena.attach(id, operand);
        id
    }

    /// Synthetic error expression node.
    pub fn error_expr(&mut self, span: Span) -> NodeId {
        self.unit.arena.alloc(NodeKind::ErrorExpr, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_small_unit() {
        let interner = SharedInterner::new();
        let source = "class A {}";
        let mut b = UnitBuilder::new("a.vela", "file:///a.vela", source, &interner);
        let class = b.class(
            "A",
            Span::new(6, 7),
            Modifiers::empty(),
            None,
            [],
            [],
            Span::new(0, 10),
        );
        b.add_declaration(class);
        let unit = b.finish();
        assert_eq!(unit.declarations.len(), 1);
        assert!(!unit.diet);
        assert!(unit.arena.node(class).parent.is_none());
    }

    #[test]
    fn children_are_parented() {
        let interner = SharedInterner::new();
        let mut b = UnitBuilder::new("a.vela", "file:///a.vela", "f();", &interner);
        let target = b.identifier("f", Span::new(0, 1));
        let call = b.invocation(target, [], Span::new(0, 3));
        assert_eq!(b.arena().node(target).parent, Some(call));
    }
}
