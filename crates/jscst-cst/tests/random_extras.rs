//! Scatters comments and whitespace over every gap of a fixed program and
//! checks that both strategies keep the text and the AST intact.

use std::sync::LazyLock;

use jscst_ast::AstNode;
use jscst_cst::{Schema, StrategyKind, build, project, reconstruct};
use jscst_parse::parse;
use proptest::prelude::*;

#[derive(Clone, Copy)]
enum Gap {
    Any,
    /// Two words meet here, so at least one extra is needed.
    Separating,
    /// `return` and its argument, which a line break would split.
    SameLine,
}

/// Semantic tokens of the program, each with the gap that precedes it.
const TEMPLATE: &[(Gap, &str)] = &[
    (Gap::Any, "function"),
    (Gap::Separating, "f"),
    (Gap::Any, "("),
    (Gap::Any, "a"),
    (Gap::Any, ","),
    (Gap::Any, "b"),
    (Gap::Any, ")"),
    (Gap::Any, "{"),
    (Gap::Any, "return"),
    (Gap::SameLine, "g"),
    (Gap::Any, "("),
    (Gap::Any, "a"),
    (Gap::Any, ")"),
    (Gap::Any, "}"),
    (Gap::Any, "g"),
    (Gap::Any, "("),
    (Gap::Any, "1"),
    (Gap::Any, ")"),
];

static SCHEMAS: LazyLock<Vec<Schema>> =
    LazyLock::new(|| StrategyKind::ALL.iter().map(|&kind| Schema::es5(kind).unwrap()).collect());

static PLAIN_AST: LazyLock<AstNode> = LazyLock::new(|| {
    let text = TEMPLATE.iter().map(|(_, token)| *token).collect::<Vec<_>>().join(" ");
    parse(&text).unwrap().ast
});

fn extra(line_breaks: bool) -> BoxedStrategy<&'static str> {
    if line_breaks {
        prop_oneof![
            Just(" "),
            Just("\t"),
            Just("/* c */"),
            Just("/**/"),
            Just("\n"),
            Just("\r\n"),
            Just("// c\n"),
        ]
        .boxed()
    } else {
        prop_oneof![Just(" "), Just("\t"), Just("/* c */"), Just("/**/")].boxed()
    }
}

fn gap(kind: Gap) -> impl Strategy<Value = String> {
    let (line_breaks, min) = match kind {
        Gap::Any => (true, 0),
        Gap::Separating => (true, 1),
        Gap::SameLine => (false, 1),
    };
    prop::collection::vec(extra(line_breaks), min..4).prop_map(|pieces| pieces.concat())
}

fn source() -> impl Strategy<Value = String> {
    let gaps = TEMPLATE.iter().map(|&(kind, _)| gap(kind)).collect::<Vec<_>>();
    (gaps, gap(Gap::Any)).prop_map(|(gaps, trailing)| {
        let mut text = String::new();
        for (gap, (_, token)) in gaps.iter().zip(TEMPLATE) {
            text.push_str(gap);
            text.push_str(token);
        }
        text.push_str(&trailing);
        text
    })
}

proptest! {
    #[test]
    fn extras_never_change_the_ast(text in source()) {
        let parse = parse(&text).unwrap();
        prop_assert_eq!(&parse.ast, &*PLAIN_AST);
    }

    #[test]
    fn extras_survive_the_round_trip(text in source()) {
        let parse = parse(&text).unwrap();

        for schema in SCHEMAS.iter() {
            let cst = build(schema, &parse.ast, &parse.tokens).unwrap();
            prop_assert_eq!(reconstruct(schema, &cst).unwrap(), text.as_str());
            prop_assert_eq!(project(&cst).unwrap(), parse.ast.clone());
        }
    }
}
