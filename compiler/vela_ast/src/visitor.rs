//! Tree traversal.
//!
//! A single [`Visitor`] trait over the arena-allocated tree. The default
//! `visit_node` calls [`walk_node`], which matches the closed [`NodeKind`]
//! union exhaustively and visits exactly the syntactically present children
//! in left-to-right source order — absent optional children are skipped,
//! and error nodes guarantee every required slot is populated, so traversal
//! never meets a missing child.
//!
//! # Example
//!
//! ```text
//! struct CountInvocations {
//!     count: usize,
//! }
//!
//! impl Visitor for CountInvocations {
//!     fn visit_node(&mut self, id: NodeId, arena: &NodeArena) {
//!         if matches!(arena.node(id).kind, NodeKind::Invocation { .. }) {
//!             self.count += 1;
//!         }
//!         walk_node(self, id, arena);
//!     }
//! }
//! ```

use crate::{NodeArena, NodeId, NodeKind, Unit};

/// Tree visitor.
///
/// Override `visit_node` to add behavior; call [`walk_node`] to continue
/// into children. The visitor may mutate its own state; the tree itself
/// stays immutable during traversal.
pub trait Visitor {
    /// Visit a whole unit: directives, then declarations, in source order.
    fn visit_unit(&mut self, unit: &Unit) {
        walk_unit(self, unit);
    }

    /// Visit one node.
    fn visit_node(&mut self, id: NodeId, arena: &NodeArena) {
        walk_node(self, id, arena);
    }
}

/// Walk a unit's children in source order.
pub fn walk_unit<V: Visitor + ?Sized>(visitor: &mut V, unit: &Unit) {
    for &directive in &unit.directives {
        visitor.visit_node(directive, &unit.arena);
    }
    for &decl in &unit.declarations {
        visitor.visit_node(decl, &unit.arena);
    }
}

/// Walk a node's children in left-to-right source order.
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, id: NodeId, arena: &NodeArena) {
    let mut go = |child: NodeId| visitor.visit_node(child, arena);
    match &arena.node(id).kind {
        // Directives carry no child nodes.
        NodeKind::LibraryDirective { .. }
        | NodeKind::ImportDirective { .. }
        | NodeKind::SourceDirective { .. }
        | NodeKind::NativeDirective { .. } => {}

        NodeKind::ClassDecl {
            superclass,
            interfaces,
            members,
            ..
        } => {
            if let Some(s) = superclass {
                go(*s);
            }
            for &i in interfaces {
                go(i);
            }
            for &m in members {
                go(m);
            }
        }
        NodeKind::InterfaceDecl {
            interfaces,
            default_class,
            members,
            ..
        } => {
            for &i in interfaces {
                go(i);
            }
            if let Some(d) = default_class {
                go(*d);
            }
            for &m in members {
                go(m);
            }
        }
        NodeKind::MethodDecl {
            name,
            return_type,
            params,
            body,
            ..
        } => {
            if let Some(r) = return_type {
                go(*r);
            }
            go(*name);
            for &p in params {
                go(p);
            }
            if let Some(b) = body {
                go(*b);
            }
        }
        NodeKind::FieldDecl {
            type_ref,
            initializer,
            ..
        } => {
            if let Some(t) = type_ref {
                go(*t);
            }
            if let Some(i) = initializer {
                go(*i);
            }
        }
        NodeKind::ParamDecl {
            type_ref,
            default_value,
            ..
        } => {
            if let Some(t) = type_ref {
                go(*t);
            }
            if let Some(d) = default_value {
                go(*d);
            }
        }
        NodeKind::TypeRef { args, .. } => {
            for &a in args {
                go(a);
            }
        }

        NodeKind::Block { stmts } => {
            for &s in stmts {
                go(s);
            }
        }
        NodeKind::ExprStmt { expr } => go(*expr),
        NodeKind::VarStmt {
            type_ref,
            initializer,
            ..
        } => {
            if let Some(t) = type_ref {
                go(*t);
            }
            if let Some(i) = initializer {
                go(*i);
            }
        }
        NodeKind::LocalFunction {
            return_type,
            params,
            body,
            ..
        } => {
            if let Some(r) = return_type {
                go(*r);
            }
            for &p in params {
                go(p);
            }
            go(*body);
        }
        NodeKind::ReturnStmt { value } => {
            if let Some(v) = value {
                go(*v);
            }
        }
        NodeKind::IfStmt {
            condition,
            then_branch,
            else_branch,
        } => {
            go(*condition);
            go(*then_branch);
            if let Some(e) = else_branch {
                go(*e);
            }
        }
        NodeKind::WhileStmt { condition, body } => {
            go(*condition);
            go(*body);
        }
        NodeKind::ForStmt {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(i) = init {
                go(*i);
            }
            if let Some(c) = condition {
                go(*c);
            }
            if let Some(u) = update {
                go(*u);
            }
            go(*body);
        }
        NodeKind::ErrorStmt => {}

        NodeKind::Identifier { .. } => {}
        NodeKind::QualifiedName { qualifier, .. } => go(*qualifier),
        NodeKind::Invocation { target, args } => {
            go(*target);
            for &a in args {
                go(a);
            }
        }
        NodeKind::NamedArgument { value, .. } => go(*value),
        NodeKind::NewExpr { ctor, args } => {
            go(*ctor);
            for &a in args {
                go(a);
            }
        }
        NodeKind::IntLiteral(_)
        | NodeKind::DoubleLiteral(_)
        | NodeKind::BoolLiteral(_)
        | NodeKind::StringLiteral(_)
        | NodeKind::NullLiteral => {}
        NodeKind::Binary { lhs, rhs, .. } => {
            go(*lhs);
            go(*rhs);
        }
        NodeKind::Unary { operand, .. } => go(*operand),
        NodeKind::ErrorExpr => {}
    }
}
