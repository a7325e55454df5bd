use std::fs;
use std::path::{Path, PathBuf};

use jscst_cst::{CstNode, CstValue, ExtrasRecord, Schema, StrategyKind, build, project, reconstruct};
use jscst_parse::parse;
use jscst_syntax::Token;

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "js" {
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

fn schemas() -> Vec<Schema> {
    StrategyKind::ALL.iter().map(|&kind| Schema::es5(kind).unwrap()).collect()
}

/// Every extra of the CST in the order the records are stored.
fn extras(cst: &CstNode) -> Vec<&[Token]> {
    fn record<'a>(extras: &'a ExtrasRecord, out: &mut Vec<&'a [Token]>) {
        out.extend(extras.iter().map(|(_, tokens)| tokens));
    }

    fn visit<'a>(value: &'a CstValue, out: &mut Vec<&'a [Token]>) {
        match value {
            CstValue::Node(node) => walk(node, out),
            CstValue::List(items) => {
                for item in items {
                    walk(item, out);
                }
            }
            CstValue::Virtual(virtual_node) => {
                record(virtual_node.extras(), out);
                if let Some(wrapped) = virtual_node.wrapped() {
                    visit(wrapped, out);
                }
            }
            CstValue::Null | CstValue::Scalar(_) => {}
        }
    }

    fn walk<'a>(node: &'a CstNode, out: &mut Vec<&'a [Token]>) {
        record(node.extras(), out);
        for (_, field) in node.fields() {
            visit(field, out);
        }
    }

    let mut out = Vec::new();
    walk(cst, &mut out);
    out
}

#[test]
fn round_trip() {
    let schemas = schemas();

    for case in TestCase::list() {
        let name = case.input.display();
        let parse = parse(&case.text).unwrap_or_else(|err| panic!("{name}: {err}"));

        for schema in &schemas {
            let strategy = schema.strategy().name();
            let cst = build(schema, &parse.ast, &parse.tokens)
                .unwrap_or_else(|err| panic!("{name} ({strategy}): {err}"));

            let text = reconstruct(schema, &cst).unwrap();
            assert_eq!(text, case.text, "{name} ({strategy})");
            assert_eq!(project(&cst).unwrap(), parse.ast, "{name} ({strategy})");
        }
    }
}

#[test]
fn every_extra_is_attached_once_in_source_order() {
    let schemas = schemas();

    for case in TestCase::list() {
        let name = case.input.display();
        let parse = parse(&case.text).unwrap();
        let expected = parse.tokens.iter().filter(|token| token.is_extra()).count();

        for schema in &schemas {
            let strategy = schema.strategy().name();
            let cst = build(schema, &parse.ast, &parse.tokens).unwrap();
            let runs = extras(&cst);

            for run in &runs {
                assert!(!run.is_empty(), "{name} ({strategy}): empty label is stored");
                assert!(
                    run.windows(2).all(|pair| pair[0].range().end() <= pair[1].range().start()),
                    "{name} ({strategy}): extras out of source order"
                );
            }
            let attached: usize = runs.iter().map(|run| run.len()).sum();
            assert_eq!(attached, expected, "{name} ({strategy})");
        }
    }
}

#[test]
fn lifted_ast_is_a_projection_fixed_point() {
    for case in TestCase::list() {
        let ast = parse(&case.text).unwrap().ast;
        assert_eq!(project(&CstNode::lift(&ast)).unwrap(), ast, "{}", case.input.display());
    }
}

#[test]
fn corpus_is_not_empty() {
    assert!(TestCase::list().len() >= 5);
}
