//! Signature rendering.
//!
//! Renders declarations and type references back to source-shaped text.
//! Used by the diet API serializer (signature-only unit source) and by
//! diagnostics that quote signatures (`void fooB()`, `(num,bool,Object)`).

use std::fmt::Write as _;

use crate::{Accessor, Modifiers, NodeArena, NodeId, NodeKind, StringInterner, Unit};

/// Render a type reference. Absent annotations render as `Dynamic`.
pub fn type_text(arena: &NodeArena, interner: &StringInterner, ty: Option<NodeId>) -> String {
    let Some(ty) = ty else {
        return "Dynamic".to_owned();
    };
    match &arena.node(ty).kind {
        NodeKind::TypeRef {
            prefix,
            name,
            args,
            ..
        } => {
            let mut out = String::new();
            if let Some(prefix) = prefix {
                out.push_str(interner.lookup(*prefix));
                out.push('.');
            }
            out.push_str(interner.lookup(*name));
            if !args.is_empty() {
                out.push('<');
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&type_text(arena, interner, Some(arg)));
                }
                out.push('>');
            }
            out
        }
        kind => unreachable!("type position holds non-type node {kind:?}"),
    }
}

/// Render a method name node (`foo` or `I.foo`).
pub fn name_text(arena: &NodeArena, interner: &StringInterner, name: NodeId) -> String {
    match &arena.node(name).kind {
        NodeKind::Identifier { name } => interner.lookup(*name).to_owned(),
        NodeKind::QualifiedName {
            qualifier, name, ..
        } => {
            let mut out = name_text(arena, interner, *qualifier);
            out.push('.');
            out.push_str(interner.lookup(*name));
            out
        }
        kind => unreachable!("name position holds non-name node {kind:?}"),
    }
}

/// Render a parameter list: `(int a, [int b, int c])`.
pub fn params_text(arena: &NodeArena, interner: &StringInterner, params: &[NodeId]) -> String {
    let mut out = String::from("(");
    let mut in_optional = false;
    for (i, &param) in params.iter().enumerate() {
        let NodeKind::ParamDecl {
            name,
            type_ref,
            optional,
            ..
        } = &arena.node(param).kind
        else {
            unreachable!("parameter position holds non-parameter node");
        };
        if i > 0 {
            out.push_str(", ");
        }
        if *optional && !in_optional {
            out.push('[');
            in_optional = true;
        }
        if type_ref.is_some() {
            out.push_str(&type_text(arena, interner, *type_ref));
            out.push(' ');
        }
        out.push_str(interner.lookup(*name));
    }
    if in_optional {
        out.push(']');
    }
    out.push(')');
    out
}

/// Render the comma-joined declared parameter types of a member:
/// `(int,int,int)`. Used by constructor-compatibility diagnostics.
pub fn param_types_text(arena: &NodeArena, interner: &StringInterner, params: &[NodeId]) -> String {
    let mut out = String::from("(");
    for (i, &param) in params.iter().enumerate() {
        let NodeKind::ParamDecl { type_ref, .. } = &arena.node(param).kind else {
            unreachable!("parameter position holds non-parameter node");
        };
        if i > 0 {
            out.push(',');
        }
        out.push_str(&type_text(arena, interner, *type_ref));
    }
    out.push(')');
    out
}

/// Render a member's signature for diagnostics: `void fooB()`, `int fooA`.
pub fn member_signature(arena: &NodeArena, interner: &StringInterner, member: NodeId) -> String {
    match &arena.node(member).kind {
        NodeKind::MethodDecl {
            name,
            accessor,
            return_type,
            params,
            ..
        } => {
            let mut out = String::new();
            if return_type.is_some() {
                out.push_str(&type_text(arena, interner, *return_type));
                out.push(' ');
            }
            match accessor {
                Accessor::Getter => out.push_str("get "),
                Accessor::Setter => out.push_str("set "),
                Accessor::None => {}
            }
            out.push_str(&name_text(arena, interner, *name));
            out.push_str(&params_text(arena, interner, params));
            out
        }
        NodeKind::FieldDecl {
            name, type_ref, ..
        } => {
            let mut out = type_text(arena, interner, *type_ref);
            out.push(' ');
            out.push_str(interner.lookup(*name));
            out
        }
        kind => unreachable!("member position holds non-member node {kind:?}"),
    }
}

fn modifiers_text(modifiers: Modifiers) -> String {
    let mut out = String::new();
    if modifiers.contains(Modifiers::STATIC) {
        out.push_str("static ");
    }
    if modifiers.contains(Modifiers::ABSTRACT) {
        out.push_str("abstract ");
    }
    if modifiers.contains(Modifiers::FACTORY) {
        out.push_str("factory ");
    }
    if modifiers.contains(Modifiers::FINAL) {
        out.push_str("final ");
    }
    out
}

fn write_member(
    out: &mut String,
    arena: &NodeArena,
    interner: &StringInterner,
    member: NodeId,
) {
    match &arena.node(member).kind {
        NodeKind::MethodDecl { modifiers, .. } | NodeKind::FieldDecl { modifiers, .. } => {
            let _ = writeln!(
                out,
                "  {}{};",
                modifiers_text(*modifiers),
                member_signature(arena, interner, member)
            );
        }
        kind => unreachable!("member position holds non-member node {kind:?}"),
    }
}

/// Render a unit's diet source: signatures only, no executable bodies.
///
/// The output round-trips through the diet signature reader in the library
/// index crate.
pub fn unit_diet_source(unit: &Unit, interner: &StringInterner) -> String {
    let arena = &unit.arena;
    let mut out = String::new();

    for &directive in &unit.directives {
        match &arena.node(directive).kind {
            NodeKind::LibraryDirective { name } => {
                let _ = writeln!(out, "library \"{}\";", interner.lookup(*name));
            }
            NodeKind::ImportDirective { uri, prefix } => match prefix {
                Some(prefix) => {
                    let _ = writeln!(
                        out,
                        "import \"{}\" as {};",
                        interner.lookup(*uri),
                        interner.lookup(*prefix)
                    );
                }
                None => {
                    let _ = writeln!(out, "import \"{}\";", interner.lookup(*uri));
                }
            },
            NodeKind::SourceDirective { uri } => {
                let _ = writeln!(out, "source \"{}\";", interner.lookup(*uri));
            }
            NodeKind::NativeDirective { uri } => {
                let _ = writeln!(out, "native \"{}\";", interner.lookup(*uri));
            }
            kind => unreachable!("directive position holds non-directive node {kind:?}"),
        }
    }

    for &decl in &unit.declarations {
        match &arena.node(decl).kind {
            NodeKind::ClassDecl {
                name,
                modifiers,
                superclass,
                interfaces,
                members,
                ..
            } => {
                if modifiers.contains(Modifiers::ABSTRACT) {
                    out.push_str("abstract ");
                }
                let _ = write!(out, "class {}", interner.lookup(*name));
                if superclass.is_some() {
                    let _ = write!(out, " extends {}", type_text(arena, interner, *superclass));
                }
                if !interfaces.is_empty() {
                    out.push_str(" implements ");
                    for (i, &itf) in interfaces.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&type_text(arena, interner, Some(itf)));
                    }
                }
                out.push_str(" {\n");
                for &member in members {
                    write_member(&mut out, arena, interner, member);
                }
                out.push_str("}\n");
            }
            NodeKind::InterfaceDecl {
                name,
                interfaces,
                default_class,
                members,
                ..
            } => {
                let _ = write!(out, "interface {}", interner.lookup(*name));
                if !interfaces.is_empty() {
                    out.push_str(" extends ");
                    for (i, &itf) in interfaces.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&type_text(arena, interner, Some(itf)));
                    }
                }
                if default_class.is_some() {
                    let _ = write!(out, " default {}", type_text(arena, interner, *default_class));
                }
                out.push_str(" {\n");
                for &member in members {
                    write_member(&mut out, arena, interner, member);
                }
                out.push_str("}\n");
            }
            NodeKind::MethodDecl { modifiers, .. } | NodeKind::FieldDecl { modifiers, .. } => {
                let _ = writeln!(
                    out,
                    "{}{};",
                    modifiers_text(*modifiers),
                    member_signature(arena, interner, decl)
                );
            }
            kind => unreachable!("declaration position holds non-declaration node {kind:?}"),
        }
    }

    out
}
