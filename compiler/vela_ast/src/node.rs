//! Node types.
//!
//! One [`Node`] per syntactic construct, stored flat in a
//! [`NodeArena`](crate::NodeArena) and linked by [`NodeId`] handles. The
//! [`NodeKind`] union is closed: every pass matches it exhaustively, so a
//! new construct cannot be added without every pass being updated.

use smallvec::SmallVec;

use crate::{ElementId, Name, NodeId, Span, TypeId};

/// Child-id list. Most nodes have a handful of children.
pub type NodeList = SmallVec<[NodeId; 4]>;

bitflags::bitflags! {
    /// Declaration modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        const ABSTRACT = 1 << 0;
        const STATIC   = 1 << 1;
        const FACTORY  = 1 << 2;
        const FINAL    = 1 << 3;
    }
}

/// Whether a method declaration is a plain method or a property accessor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Accessor {
    #[default]
    None,
    Getter,
    Setter,
}

/// Operator tokens, shared by binary and unary expression nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Assign,
    Not,
    Neg,
    BitNot,
}

impl Operator {
    /// Whether this operator may appear in a binary expression node.
    pub fn is_binary(self) -> bool {
        !matches!(self, Operator::Not | Operator::Neg | Operator::BitNot)
    }

    /// Whether this operator may appear in a unary expression node.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Not | Operator::Neg | Operator::BitNot | Operator::Sub
        )
    }

    /// Source text of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Assign => "=",
            Operator::Not => "!",
            Operator::BitNot => "~",
        }
    }
}

/// One syntax tree node.
///
/// `parent` is a back-handle set exactly once at attachment. `element` and
/// `ty` start empty and are populated (once each) by the resolver and the
/// type analyzer respectively.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub element: Option<ElementId>,
    pub ty: Option<TypeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node {
            kind,
            span,
            parent: None,
            element: None,
            ty: None,
        }
    }
}

/// The closed union over every syntactic construct.
///
/// Child links are `NodeId`s in left-to-right source order. Optional
/// children that are absent in the source are `None`, never error nodes;
/// required children that failed to parse are `ErrorExpr`/`ErrorStmt`.
#[derive(Clone, Debug)]
pub enum NodeKind {
    // Directives
    /// `library "name";`
    LibraryDirective { name: Name },
    /// `import "uri" [as prefix];`
    ImportDirective { uri: Name, prefix: Option<Name> },
    /// `source "uri";`
    SourceDirective { uri: Name },
    /// `native "uri";`
    NativeDirective { uri: Name },

    // Declarations
    /// Class declaration.
    ClassDecl {
        name: Name,
        name_span: Span,
        modifiers: Modifiers,
        superclass: Option<NodeId>,
        interfaces: NodeList,
        members: NodeList,
    },
    /// Interface declaration, optionally nominating a default class.
    InterfaceDecl {
        name: Name,
        name_span: Span,
        interfaces: NodeList,
        default_class: Option<NodeId>,
        members: NodeList,
    },
    /// Method, constructor, accessor, or top-level function.
    ///
    /// `name` is an `Identifier` for plain members and a `QualifiedName`
    /// for named constructors (`I.foo`, `F.foo`).
    MethodDecl {
        name: NodeId,
        modifiers: Modifiers,
        accessor: Accessor,
        return_type: Option<NodeId>,
        params: NodeList,
        body: Option<NodeId>,
    },
    /// Field or top-level variable declaration.
    FieldDecl {
        name: Name,
        name_span: Span,
        modifiers: Modifiers,
        type_ref: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    /// Formal parameter. `optional` marks parameters declared inside the
    /// `[...]` group; those are also addressable by name at call sites.
    ParamDecl {
        name: Name,
        name_span: Span,
        type_ref: Option<NodeId>,
        optional: bool,
        default_value: Option<NodeId>,
    },
    /// Type reference (`List<int>`, `p.Set`), resolved to a class or
    /// interface element during binding.
    TypeRef {
        prefix: Option<Name>,
        name: Name,
        name_span: Span,
        args: NodeList,
    },

    // Statements
    Block {
        stmts: NodeList,
    },
    ExprStmt {
        expr: NodeId,
    },
    /// Local variable declaration statement.
    VarStmt {
        name: Name,
        name_span: Span,
        type_ref: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    /// Named function declared inside a method body. Distinct from a
    /// member method: its element encloses in the method, not the class.
    LocalFunction {
        name: Name,
        name_span: Span,
        return_type: Option<NodeId>,
        params: NodeList,
        body: NodeId,
    },
    ReturnStmt {
        value: Option<NodeId>,
    },
    IfStmt {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStmt {
        condition: NodeId,
        body: NodeId,
    },
    ForStmt {
        init: Option<NodeId>,
        condition: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    /// Synthetic recovery statement for unparsable input.
    ErrorStmt,

    // Expressions
    Identifier {
        name: Name,
    },
    /// `qualifier.name` — prefix-qualified top-level access, named
    /// constructor reference, or property access.
    QualifiedName {
        qualifier: NodeId,
        name: Name,
        name_span: Span,
    },
    /// Call expression. The span covers the target through the closing
    /// parenthesis.
    Invocation {
        target: NodeId,
        args: NodeList,
    },
    /// `name: value` argument inside a call's argument list.
    NamedArgument {
        name: Name,
        name_span: Span,
        value: NodeId,
    },
    /// `new Target(args)` / `new Target.ctor(args)`.
    NewExpr {
        ctor: NodeId,
        args: NodeList,
    },
    IntLiteral(i64),
    /// Stored as bits for Eq/Hash.
    DoubleLiteral(u64),
    BoolLiteral(bool),
    StringLiteral(Name),
    NullLiteral,
    Binary {
        op: Operator,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: Operator,
        operand: NodeId,
    },
    /// Synthetic recovery expression for unparsable input.
    ErrorExpr,
}

impl NodeKind {
    /// Whether this node is a top-level declaration kind.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassDecl { .. }
                | NodeKind::InterfaceDecl { .. }
                | NodeKind::MethodDecl { .. }
                | NodeKind::FieldDecl { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_shapes() {
        assert!(Operator::Add.is_binary());
        assert!(!Operator::Add.is_unary());
        assert!(Operator::Not.is_unary());
        assert!(!Operator::Not.is_binary());
        // `-` is both.
        assert!(Operator::Sub.is_binary());
        assert!(Operator::Sub.is_unary());
    }

    #[test]
    fn modifiers_combine() {
        let m = Modifiers::ABSTRACT | Modifiers::STATIC;
        assert!(m.contains(Modifiers::ABSTRACT));
        assert!(!m.contains(Modifiers::FACTORY));
    }
}
