//! End-to-end pipeline tests: units built through the construction API,
//! fed through an analysis host, assertions against both diagnostic
//! channels by position.

use pretty_assertions::assert_eq;
use vela_analysis::{load_units_parallel, AnalysisConfig, AnalysisHost, AnalysisResult};
use vela_ast::{find_span, Accessor, LibraryId, Modifiers, SharedInterner, Span, Unit, UnitBuilder};
use vela_library::{load_api, save_api, Import};

fn sp(source: &str, fragment: &str, occurrence: usize) -> Span {
    find_span(source, fragment, occurrence)
        .unwrap_or_else(|| panic!("'{fragment}' occurrence {occurrence} not in source"))
}

/// Span of `inner` inside the first occurrence of `outer`.
fn within(source: &str, outer: &str, inner: &str) -> Span {
    let outer_span = sp(source, outer, 0);
    let offset = outer.find(inner).unwrap();
    let start = outer_span.start as usize + offset;
    Span::from_range(start..start + inner.len())
}

/// Declare a top-level function `decl` like `f_1_3(r1, [n1, n2, n3]) {}`.
fn declare_fn(
    b: &mut UnitBuilder,
    source: &str,
    decl: &str,
    fname: &str,
    required: &[&str],
    optional: &[&str],
) {
    let decl_span = sp(source, decl, 0);
    let name = b.identifier(fname, within(source, decl, fname));
    let mut params = Vec::new();
    for p in required {
        params.push(b.param(p, within(source, decl, p), None, false, within(source, decl, p)));
    }
    for p in optional {
        params.push(b.param(p, within(source, decl, p), None, true, within(source, decl, p)));
    }
    let body = b.block([], Span::new(decl_span.end - 2, decl_span.end));
    let f = b.method(
        name,
        Modifiers::empty(),
        Accessor::None,
        None,
        params,
        Some(body),
        decl_span,
    );
    b.add_declaration(f);
}

/// Build an invocation statement for `call` like `f_1_0(1, 2)` with integer
/// positional arguments. `call` must occur once in the source.
fn int_call_stmt(b: &mut UnitBuilder, source: &str, call: &str, ints: &[i64]) -> vela_ast::NodeId {
    let call_span = sp(source, call, 0);
    let open = call.find('(').unwrap();
    let target = b.identifier(
        &call[..open],
        Span::from_range(call_span.start as usize..call_span.start as usize + open),
    );
    let mut args = Vec::new();
    let mut from = open;
    for &v in ints {
        let text = v.to_string();
        let offset = call[from..].find(&text).unwrap() + from;
        from = offset + text.len();
        let at = call_span.start as usize + offset;
        args.push(b.int(v, Span::from_range(at..at + text.len())));
    }
    let inv = b.invocation(target, args, call_span);
    b.expr_stmt(inv, Span::new(call_span.start, call_span.end + 1))
}

/// Wrap statements into a top-level `main` whose body runs to the end of
/// the source.
fn main_fn(b: &mut UnitBuilder, source: &str, stmts: Vec<vela_ast::NodeId>) {
    let main_at = source.find("main() {").unwrap();
    let body = b.block(stmts, Span::from_range(main_at + 7..source.len()));
    let name = b.identifier("main", Span::from_range(main_at..main_at + 4));
    let main = b.method(
        name,
        Modifiers::empty(),
        Accessor::None,
        None,
        [],
        Some(body),
        Span::from_range(main_at..source.len()),
    );
    b.add_declaration(main);
}

fn analyze_single(
    config: AnalysisConfig,
    source: &str,
    build: impl FnOnce(&mut UnitBuilder),
) -> (AnalysisHost, LibraryId, AnalysisResult) {
    let mut host = AnalysisHost::new(config);
    let lib = host.add_library("app", "file:///app");
    let mut b = UnitBuilder::new("main.vela", "file:///app/main.vela", source, host.interner());
    build(&mut b);
    host.library(lib).put_unit(b.finish());
    let result = host.analyze_library(lib);
    (host, lib, result)
}

fn codes(diagnostics: &[vela_diagnostic::Diagnostic]) -> Vec<(&'static str, u32, u32, u32)> {
    diagnostics
        .iter()
        .map(|d| (d.code.as_str(), d.line, d.column, d.length))
        .collect()
}

#[test]
fn argument_count_grid() {
    let source = "\
f_0_1([n1]) {}
f_1_0(r1) {}
main() {
  f_0_1(0, 0);
  f_1_0();
  f_1_0(1, 2);
  f_0_1(n2: 3);
}";
    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, |b| {
        declare_fn(b, source, "f_0_1([n1]) {}", "f_0_1", &[], &["n1"]);
        declare_fn(b, source, "f_1_0(r1) {}", "f_1_0", &["r1"], &[]);
        let s1 = int_call_stmt(b, source, "f_0_1(0, 0)", &[0, 0]);
        let s2 = int_call_stmt(b, source, "f_1_0()", &[]);
        let s3 = int_call_stmt(b, source, "f_1_0(1, 2)", &[1, 2]);
        let call_span = sp(source, "f_0_1(n2: 3)", 0);
        let target = b.identifier("f_0_1", Span::new(call_span.start, call_span.start + 5));
        let na_span = sp(source, "n2: 3", 0);
        let three = b.int(3, Span::new(na_span.end - 1, na_span.end));
        let named = b.named_arg(
            "n2",
            Span::new(na_span.start, na_span.start + 2),
            three,
            na_span,
        );
        let inv = b.invocation(target, [named], call_span);
        let s4 = b.expr_stmt(inv, Span::new(call_span.start, call_span.end + 1));
        main_fn(b, source, vec![s1, s2, s3, s4]);
    });
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(
        codes(&result.type_errors),
        vec![
            ("EXTRA_ARGUMENT", 4, 12, 1),
            ("MISSING_ARGUMENT", 5, 3, 7),
            ("EXTRA_ARGUMENT", 6, 12, 1),
            ("NO_SUCH_NAMED_PARAMETER", 7, 9, 5),
        ]
    );
    assert_eq!(result.type_errors[1].message, "1 positional arguments required, 0 given");
    assert_eq!(result.type_errors[3].message, "no such named parameter 'n2'");
}

#[test]
fn positional_fill_then_named_rebind_is_type_channel_only() {
    let source = "f_1_3(r1, [n1, n2, n3]) {}\nmain() {\n  f_1_3(-1, 1, n1: 1);\n}";
    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, |b| {
        declare_fn(
            b,
            source,
            "f_1_3(r1, [n1, n2, n3]) {}",
            "f_1_3",
            &["r1"],
            &["n1", "n2", "n3"],
        );
        let call = "f_1_3(-1, 1, n1: 1)";
        let call_span = sp(source, call, 0);
        let target = b.identifier("f_1_3", Span::new(call_span.start, call_span.start + 5));
        let a1 = b.int(-1, within(source, call, "-1"));
        let one_at = call_span.start as usize + 10;
        let a2 = b.int(1, Span::from_range(one_at..one_at + 1));
        let na_span = sp(source, "n1: 1", 0);
        let value = b.int(1, Span::new(na_span.end - 1, na_span.end));
        let a3 = b.named_arg("n1", Span::new(na_span.start, na_span.start + 2), value, na_span);
        let inv = b.invocation(target, [a1, a2, a3], call_span);
        let stmt = b.expr_stmt(inv, Span::new(call_span.start, call_span.end + 1));
        main_fn(b, source, vec![stmt]);
    });
    // The second positional argument fills n1, so the named argument is a
    // rebind: a type problem, not a resolution problem.
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(
        codes(&result.type_errors),
        vec![("DUPLICATE_NAMED_ARGUMENT", 3, 16, 5)]
    );
    assert_eq!(result.type_errors[0].message, "duplicate named argument 'n1'");
}

#[test]
fn literal_named_repeat_is_reported_on_both_channels() {
    let source = "f_1_3(r1, [n1, n2, n3]) {}\nmain() {\n  f_1_3(0, n1: 1, n1: 2);\n}";
    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, |b| {
        declare_fn(
            b,
            source,
            "f_1_3(r1, [n1, n2, n3]) {}",
            "f_1_3",
            &["r1"],
            &["n1", "n2", "n3"],
        );
        let call = "f_1_3(0, n1: 1, n1: 2)";
        let call_span = sp(source, call, 0);
        let target = b.identifier("f_1_3", Span::new(call_span.start, call_span.start + 5));
        let a1 = b.int(0, within(source, call, "0"));
        let n1_first = sp(source, "n1: 1", 0);
        let v1 = b.int(1, Span::new(n1_first.end - 1, n1_first.end));
        let a2 = b.named_arg("n1", Span::new(n1_first.start, n1_first.start + 2), v1, n1_first);
        let n1_second = sp(source, "n1: 2", 0);
        let v2 = b.int(2, Span::new(n1_second.end - 1, n1_second.end));
        let a3 = b.named_arg("n1", Span::new(n1_second.start, n1_second.start + 2), v2, n1_second);
        let inv = b.invocation(target, [a1, a2, a3], call_span);
        let stmt = b.expr_stmt(inv, Span::new(call_span.start, call_span.end + 1));
        main_fn(b, source, vec![stmt]);
    });
    assert_eq!(
        codes(&result.compilation_errors),
        vec![("DUPLICATE_NAMED_ARGUMENT", 3, 19, 5)]
    );
    assert_eq!(
        codes(&result.type_errors),
        vec![("DUPLICATE_NAMED_ARGUMENT", 3, 19, 5)]
    );
}

#[test]
fn interface_constructor_runs_default_class_counterpart() {
    let source = "class F implements I { factory F.foo(int a) {} }\n\
                  interface I default F { factory I.foo(int b); }\n\
                  main() {\n  new I.foo(7);\n  new I.foo();\n}";
    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, |b| {
        // class F implements I { factory F.foo(int a) {} }
        let impl_i = sp(source, "implements I", 0);
        let f_iface = b.ty("I", Span::new(impl_i.end - 1, impl_i.end));
        let f_ctor_span = sp(source, "F.foo", 0);
        let qf = b.identifier("F", Span::new(f_ctor_span.start, f_ctor_span.start + 1));
        let f_name = b.qualified(
            qf,
            "foo",
            Span::new(f_ctor_span.start + 2, f_ctor_span.end),
            f_ctor_span,
        );
        let int_a = sp(source, "int a", 0);
        let ta = b.ty("int", Span::new(int_a.start, int_a.start + 3));
        let pa = b.param("a", Span::new(int_a.end - 1, int_a.end), Some(ta), false, int_a);
        let f_body = b.block([], sp(source, "{}", 0));
        let f_ctor = b.method(
            f_name,
            Modifiers::FACTORY,
            Accessor::None,
            None,
            [pa],
            Some(f_body),
            sp(source, "factory F.foo(int a) {}", 0),
        );
        let class = b.class(
            "F",
            sp(source, "F", 0),
            Modifiers::empty(),
            None,
            [f_iface],
            [f_ctor],
            sp(source, "class F implements I { factory F.foo(int a) {} }", 0),
        );
        b.add_declaration(class);

        // interface I default F { factory I.foo(int b); }
        let default_f = sp(source, "default F", 0);
        let default = b.ty("F", Span::new(default_f.end - 1, default_f.end));
        let i_ctor_span = sp(source, "I.foo", 0);
        let qi = b.identifier("I", Span::new(i_ctor_span.start, i_ctor_span.start + 1));
        let i_name = b.qualified(
            qi,
            "foo",
            Span::new(i_ctor_span.start + 2, i_ctor_span.end),
            i_ctor_span,
        );
        let int_b = sp(source, "int b", 0);
        let tb = b.ty("int", Span::new(int_b.start, int_b.start + 3));
        let pb = b.param("b", Span::new(int_b.end - 1, int_b.end), Some(tb), false, int_b);
        let i_ctor = b.method(
            i_name,
            Modifiers::FACTORY,
            Accessor::None,
            None,
            [pb],
            None,
            sp(source, "factory I.foo(int b);", 0),
        );
        let iface_i = sp(source, "interface I", 0);
        let iface = b.interface(
            "I",
            Span::new(iface_i.end - 1, iface_i.end),
            [],
            Some(default),
            [i_ctor],
            sp(source, "interface I default F { factory I.foo(int b); }", 0),
        );
        b.add_declaration(iface);

        // main() { new I.foo(7); new I.foo(); }
        let c1 = sp(source, "I.foo(7)", 0);
        let q1 = b.identifier("I", Span::new(c1.start, c1.start + 1));
        let ctor1 = b.qualified(
            q1,
            "foo",
            Span::new(c1.start + 2, c1.start + 5),
            Span::new(c1.start, c1.start + 5),
        );
        let seven = b.int(7, sp(source, "7", 0));
        let new1_span = sp(source, "new I.foo(7)", 0);
        let new1 = b.new_expr(ctor1, [seven], new1_span);
        let s1 = b.expr_stmt(new1, Span::new(new1_span.start, new1_span.end + 1));

        let c2 = sp(source, "I.foo()", 0);
        let q2 = b.identifier("I", Span::new(c2.start, c2.start + 1));
        let ctor2 = b.qualified(
            q2,
            "foo",
            Span::new(c2.start + 2, c2.start + 5),
            Span::new(c2.start, c2.start + 5),
        );
        let new2_span = sp(source, "new I.foo()", 0);
        let new2 = b.new_expr(ctor2, [], new2_span);
        let s2 = b.expr_stmt(new2, Span::new(new2_span.start, new2_span.end + 1));
        main_fn(b, source, vec![s1, s2]);
    });
    // The interface constructor and its counterpart agree on (int), so the
    // only problem is the second call missing its argument; the signature
    // checked is the interface's declaration.
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(
        codes(&result.type_errors),
        vec![("MISSING_ARGUMENT", 5, 3, 11)]
    );
}

#[test]
fn abstract_class_instantiation_rules() {
    let source = "abstract class A { factory A.make() {} }\n\
                  main() {\n  new A.make();\n  new A();\n}";
    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, |b| {
        let a_ctor_span = sp(source, "A.make", 0);
        let qa = b.identifier("A", Span::new(a_ctor_span.start, a_ctor_span.start + 1));
        let a_name = b.qualified(
            qa,
            "make",
            Span::new(a_ctor_span.start + 2, a_ctor_span.end),
            a_ctor_span,
        );
        let body = b.block([], sp(source, "{}", 0));
        let make = b.method(
            a_name,
            Modifiers::FACTORY,
            Accessor::None,
            None,
            [],
            Some(body),
            sp(source, "factory A.make() {}", 0),
        );
        let class = b.class(
            "A",
            sp(source, "A", 0),
            Modifiers::ABSTRACT,
            None,
            [],
            [make],
            sp(source, "abstract class A { factory A.make() {} }", 0),
        );
        b.add_declaration(class);

        // Occurrence 0 is the declaration; the call site is next.
        let c1 = sp(source, "A.make()", 1);
        let q1 = b.identifier("A", Span::new(c1.start, c1.start + 1));
        let ctor1 = b.qualified(
            q1,
            "make",
            Span::new(c1.start + 2, c1.start + 6),
            Span::new(c1.start, c1.start + 6),
        );
        let new1_span = sp(source, "new A.make()", 0);
        let new1 = b.new_expr(ctor1, [], new1_span);
        let s1 = b.expr_stmt(new1, Span::new(new1_span.start, new1_span.end + 1));

        let c2 = sp(source, "A()", 0);
        let ctor2 = b.identifier("A", Span::new(c2.start, c2.start + 1));
        let new2_span = sp(source, "new A()", 0);
        let new2 = b.new_expr(ctor2, [], new2_span);
        let s2 = b.expr_stmt(new2, Span::new(new2_span.start, new2_span.end + 1));
        main_fn(b, source, vec![s1, s2]);
    });
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(
        codes(&result.type_errors),
        vec![
            ("INSTANTIATION_OF_ABSTRACT_CLASS_USING_FACTORY", 3, 7, 6),
            ("INSTANTIATION_OF_ABSTRACT_CLASS", 4, 7, 1),
        ]
    );
    assert_eq!(
        result.type_errors[1].message,
        "'A' is abstract and cannot be instantiated"
    );
}

#[test]
fn prefixed_imports_resolve_across_libraries_in_dependency_order() {
    let util_src = "int x;\nclass U {}";
    let app_src = "import \"util\" as u;\nmain() {\n  u.x;\n  u.missing;\n  z.x;\n}";

    let mut host = AnalysisHost::new(AnalysisConfig::default());
    // Registration order is reversed on purpose; analyze_all reorders.
    let app = host.add_library("app", "file:///app");
    let util = host.add_library("util", "file:///util");

    let mut ub = UnitBuilder::new("util.vela", "file:///util/util.vela", util_src, host.interner());
    let int_x = sp(util_src, "int x", 0);
    let tx = ub.ty("int", Span::new(int_x.start, int_x.start + 3));
    let x = ub.field(
        "x",
        Span::new(int_x.end - 1, int_x.end),
        Modifiers::empty(),
        Some(tx),
        None,
        sp(util_src, "int x;", 0),
    );
    ub.add_declaration(x);
    let u_class = ub.class(
        "U",
        sp(util_src, "U", 0),
        Modifiers::empty(),
        None,
        [],
        [],
        sp(util_src, "class U {}", 0),
    );
    ub.add_declaration(u_class);
    host.library(util).put_unit(ub.finish());

    let mut ab = UnitBuilder::new("app.vela", "file:///app/app.vela", app_src, host.interner());
    ab.import_directive("util", Some("u"), sp(app_src, "import \"util\" as u;", 0));
    let ux = sp(app_src, "u.x", 0);
    let q1 = ab.identifier("u", Span::new(ux.start, ux.start + 1));
    let e1 = ab.qualified(q1, "x", Span::new(ux.end - 1, ux.end), ux);
    let s1 = ab.expr_stmt(e1, Span::new(ux.start, ux.end + 1));
    let um = sp(app_src, "u.missing", 0);
    let q2 = ab.identifier("u", Span::new(um.start, um.start + 1));
    let e2 = ab.qualified(q2, "missing", Span::new(um.start + 2, um.end), um);
    let s2 = ab.expr_stmt(e2, Span::new(um.start, um.end + 1));
    let zx = sp(app_src, "z.x", 0);
    let q3 = ab.identifier("z", Span::new(zx.start, zx.start + 1));
    let e3 = ab.qualified(q3, "x", Span::new(zx.end - 1, zx.end), zx);
    let s3 = ab.expr_stmt(e3, Span::new(zx.start, zx.end + 1));
    main_fn(&mut ab, app_src, vec![s1, s2, s3]);
    host.library(app).put_unit(ab.finish());
    host.library(app).add_import(Import {
        uri: "util".to_owned(),
        prefix: Some("u".to_owned()),
    });

    let results = host.analyze_all();
    assert_eq!(
        results.iter().map(|(lib, _)| *lib).collect::<Vec<_>>(),
        vec![util, app]
    );
    let (_, util_result) = &results[0];
    assert_eq!(util_result.compilation_errors, vec![]);
    assert_eq!(util_result.type_errors, vec![]);

    let (_, app_result) = &results[1];
    assert_eq!(
        codes(&app_result.compilation_errors),
        vec![
            ("UNRESOLVED_IDENTIFIER", 4, 5, 7),
            ("NO_SUCH_PREFIX", 5, 3, 1),
        ]
    );
    assert_eq!(
        app_result.compilation_errors[0].message,
        "cannot resolve 'missing'"
    );
    assert_eq!(
        app_result.compilation_errors[1].message,
        "cannot find import prefix 'z'"
    );
    assert_eq!(app_result.type_errors, vec![]);
}

#[test]
fn core_types_make_non_callables_visible() {
    let source = "int x;\nmain() {\n  x();\n}";
    let build = |b: &mut UnitBuilder| {
        let int_x = sp(source, "int x", 0);
        let tx = b.ty("int", Span::new(int_x.start, int_x.start + 3));
        let x = b.field(
            "x",
            Span::new(int_x.end - 1, int_x.end),
            Modifiers::empty(),
            Some(tx),
            None,
            sp(source, "int x;", 0),
        );
        b.add_declaration(x);
        let stmt = int_call_stmt(b, source, "x()", &[]);
        main_fn(b, source, vec![stmt]);
    };

    let (_, _, result) = analyze_single(AnalysisConfig::default(), source, build);
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(codes(&result.type_errors), vec![("NOT_A_METHOD", 3, 3, 1)]);
    assert_eq!(result.type_errors[0].message, "'x' is not a method");

    // Without the synthesized core import, `int` is unknown and `x` stays
    // Dynamic, so the call is not checkable.
    let (_, _, bare) = analyze_single(
        AnalysisConfig {
            synthesize_core_import: false,
        },
        source,
        build,
    );
    assert_eq!(bare.compilation_errors, vec![]);
    assert_eq!(bare.type_errors, vec![]);
}

#[test]
fn restored_api_rebuilds_the_top_level_map() {
    let api = "\
--- unit-name: a.vela
--- unit-uri: file:///pkg/a.vela
class A {
}
interface I default A {
}
Dynamic main();
";
    let mut host = AnalysisHost::new(AnalysisConfig::default());
    let lib = host.add_library("pkg", "file:///pkg");
    let units = load_api(api, host.interner()).unwrap_or_else(|e| panic!("{e}"));
    for unit in units {
        host.library(lib).put_unit(unit);
    }
    let result = host.analyze_library(lib);
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(result.type_errors, vec![]);

    let mut names: Vec<&str> = host
        .library(lib)
        .top_level_names()
        .iter()
        .map(|&n| host.interner().lookup(n))
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["A", "I", "main"]);

    assert_eq!(save_api(host.library(lib), host.interner()), api);
}

#[test]
fn parallel_unit_loading_is_deterministic() {
    fn class_unit(interner: &SharedInterner, file: &str, class_name: &str) -> Unit {
        let source = format!("class {class_name} {{}}");
        let mut b = UnitBuilder::new(file, format!("file:///big/{file}"), source, interner);
        let name_span = Span::new(6, 6 + class_name.len() as u32);
        let span = Span::new(0, 9 + class_name.len() as u32);
        let class = b.class(class_name, name_span, Modifiers::empty(), None, [], [], span);
        b.add_declaration(class);
        b.finish()
    }

    let mut host = AnalysisHost::new(AnalysisConfig::default());
    let lib = host.add_library("big", "file:///big");
    let interner = host.interner().clone();
    let producers: Vec<_> = (0..16)
        .map(|i| {
            let interner = interner.clone();
            move || class_unit(&interner, &format!("u{i:02}.vela"), &format!("C{i:02}"))
        })
        .collect();
    load_units_parallel(host.library(lib), producers);

    let expected: Vec<String> = (0..16).map(|i| format!("u{i:02}.vela")).collect();
    assert_eq!(host.library(lib).unit_names(), expected);

    let result = host.analyze_library(lib);
    assert_eq!(result.compilation_errors, vec![]);
    assert_eq!(result.type_errors, vec![]);
    assert_eq!(host.library(lib).top_level_names().len(), 16);
}

#[test]
#[should_panic(expected = "populated twice")]
fn analyzing_a_library_twice_is_a_fault() {
    let mut host = AnalysisHost::new(AnalysisConfig::default());
    let lib = host.add_library("app", "file:///app");
    let _ = host.analyze_library(lib);
    let _ = host.analyze_library(lib);
}
