//! Call chains nest the AST once per call without nesting the parser, so
//! they reach depths no recursive walk survives.

use jscst_cst::{CstNode, Schema, StrategyKind, build, project, reconstruct};
use jscst_parse::parse;

const DEPTH: usize = 10_000;

fn call_chain(arguments: &str) -> String {
    format!("f{}", format!("({arguments})").repeat(DEPTH))
}

#[test]
fn long_call_chains_round_trip() {
    let text = call_chain(" /* none */ ");
    let parse = parse(&text).unwrap();

    for kind in StrategyKind::ALL {
        let schema = Schema::es5(kind).unwrap();
        let strategy = schema.strategy().name();

        let cst = build(&schema, &parse.ast, &parse.tokens).unwrap();
        assert_eq!(reconstruct(&schema, &cst).unwrap(), text, "{strategy}");
        // Trees this deep are compared with `==`; a failing `assert_eq!` would
        // format them recursively.
        assert!(project(&cst).unwrap() == parse.ast, "{strategy}");
        assert!(cst.to_string().lines().count() > DEPTH, "{strategy}");
    }
}

#[test]
fn long_call_chains_lift() {
    let parse = parse(&call_chain("")).unwrap();
    let lifted = CstNode::lift(&parse.ast);
    assert!(project(&lifted).unwrap() == parse.ast);
}
