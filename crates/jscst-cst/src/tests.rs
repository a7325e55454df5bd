use expect_test::{Expect, expect};
use jscst_ast::{AstValue, Scalar};
use jscst_parse::parse;

use crate::{
    AnchorRole, CstError, CstNode, CstValue, ExtrasRecord, Label, Owner, Schema, StrategyKind,
    VirtualNode, build, project, reconstruct,
};

const SCENARIO: &str = "/*1*/ function /*2*/ foo /*3*/ ( /*4*/ ) /*5*/ { }";

fn check(kind: StrategyKind, text: &str, expect: Expect) {
    let schema = Schema::es5(kind).unwrap();
    let parse = parse(text).unwrap();

    let cst = build(&schema, &parse.ast, &parse.tokens).unwrap();
    expect.assert_eq(&cst.to_string());

    assert_eq!(reconstruct(&schema, &cst).unwrap(), text);
    assert_eq!(project(&cst).unwrap(), parse.ast);
}

#[test]
fn scenario_with_virtual_nodes() {
    check(
        StrategyKind::VirtualNodes,
        SCENARIO,
        expect![[r#"
            Program
              body:
                - FunctionDeclaration
                  @before "/*1*/" " "
                  id: Identifier
                    @before " " "/*2*/" " "
                    name: "foo"
                  params: <ParamList>
                    @before " " "/*3*/" " "
                    @inside " " "/*4*/" " "
                  body: BlockStatement
                    @before " " "/*5*/" " "
                    @inside " "
                    body: []
        "#]],
    );
}

#[test]
fn scenario_with_extended_labels() {
    check(
        StrategyKind::ExtendedLabels,
        SCENARIO,
        expect![[r#"
            Program
              body:
                - FunctionDeclaration
                  @before "/*1*/" " "
                  @afterFunction " " "/*2*/" " "
                  @afterName " " "/*3*/" " "
                  @insideParams " " "/*4*/" " "
                  @afterParams " " "/*5*/" " "
                  id: Identifier
                    name: "foo"
                  params: []
                  body: BlockStatement
                    @insideBody " "
                    body: []
        "#]],
    );
}

#[test]
fn argument_list_with_virtual_nodes() {
    check(
        StrategyKind::VirtualNodes,
        "f( a /*x*/, b )",
        expect![[r#"
            Program
              body:
                - ExpressionStatement
                  expression: CallExpression
                    callee: Identifier
                      name: "f"
                    arguments: <ArgumentList>
                      - Identifier
                        @before " "
                        @after " " "/*x*/"
                        name: "a"
                      - Identifier
                        @before " "
                        @after " "
                        name: "b"
        "#]],
    );
}

#[test]
fn return_and_literals_with_extended_labels() {
    check(
        StrategyKind::ExtendedLabels,
        "function f() {\n  return /* one */ 1;\n}\n",
        expect![[r#"
            Program
              body:
                - FunctionDeclaration
                  @afterFunction " "
                  @afterParams " "
                  @after "\n"
                  id: Identifier
                    name: "f"
                  params: []
                  body: BlockStatement
                    body:
                      - ReturnStatement
                        @before "\n" "  "
                        @afterReturn " " "/* one */" " "
                        @after ";" "\n"
                        argument: Literal
                          value: 1
                          raw: "1"
        "#]],
    );
}

#[test]
fn empty_program_keeps_its_extras() {
    check(
        StrategyKind::VirtualNodes,
        " // nothing here\n",
        expect![[r#"
            Program
              @inside " " "// nothing here" "\n"
              body: []
        "#]],
    );
    check(
        StrategyKind::ExtendedLabels,
        "",
        expect![[r#"
            Program
              body: []
        "#]],
    );
}

#[test]
fn strategies_reconstruct_the_same_text() {
    let text = "/*a*/f ( (x) , 'y' ) ; ;\nfunction g ( p ) { return ; }";
    let parse = parse(text).unwrap();

    for kind in StrategyKind::ALL {
        let schema = Schema::es5(kind).unwrap();
        let cst = build(&schema, &parse.ast, &parse.tokens).unwrap();
        assert_eq!(reconstruct(&schema, &cst).unwrap(), text, "{kind:?}");
    }
}

#[test]
fn projecting_a_lifted_ast_is_a_no_op() {
    let ast = parse("function f(a) { return g(a, 1); }").unwrap().ast;
    let lifted = CstNode::lift(&ast);

    assert_eq!(project(&lifted).unwrap(), ast);
    assert_eq!(project(&CstNode::lift(&project(&lifted).unwrap())).unwrap(), ast);
}

#[test]
fn mismatched_token_is_reported_with_its_range() {
    let schema = Schema::es5(StrategyKind::VirtualNodes).unwrap();
    let ast = parse("g(a)").unwrap().ast;
    let tokens = parse("f(a)").unwrap().tokens;

    let error = build(&schema, &ast, &tokens).unwrap_err();
    assert_eq!(
        error.to_string(),
        r#"token stream does not match the AST: expected `g`, found "f""#
    );
    assert_eq!(error.range(), Some(text_size::TextRange::new(0.into(), 1.into())));
    assert!(error.diagnostic().is_some());
}

#[test]
fn leftover_tokens_are_a_mismatch() {
    let schema = Schema::es5(StrategyKind::ExtendedLabels).unwrap();
    let ast = parse("f();").unwrap().ast;
    let tokens = parse("f(); g()").unwrap().tokens;

    let error = build(&schema, &ast, &tokens).unwrap_err();
    assert_eq!(
        error.to_string(),
        r#"token stream does not match the AST: expected the end of input, found "g""#
    );
}

#[test]
fn token_stream_must_tile_the_source() {
    let schema = Schema::es5(StrategyKind::VirtualNodes).unwrap();
    let parse = parse("f( )").unwrap();
    let mut tokens = parse.tokens.clone();
    tokens.remove(2);

    let error = build(&schema, &parse.ast, &tokens).unwrap_err();
    assert!(matches!(error, CstError::TokenStreamMismatch { .. }), "{error}");
    assert_eq!(error.range(), Some(text_size::TextRange::new(3.into(), 4.into())));
}

#[test]
fn ast_outside_the_grammar_is_rejected() {
    let schema = Schema::es5(StrategyKind::VirtualNodes).unwrap();
    let parse = parse("f()").unwrap();
    let ast = jscst_ast::AstNode::new("Script", Vec::new());

    let error = build(&schema, &ast, &parse.tokens).unwrap_err();
    assert_eq!(error.to_string(), "expected a `Program` root, found `Script`");
}

#[test]
fn virtual_node_with_wrong_arity_is_malformed() {
    let wrapped = CstValue::Scalar(Scalar::Number(1.0));
    let params = VirtualNode::new(AnchorRole::ParamList, Some(wrapped), ExtrasRecord::default());
    let cst = CstNode::new(
        "FunctionDeclaration",
        vec![("params".to_owned(), CstValue::Virtual(Box::new(params)))],
        ExtrasRecord::default(),
    );

    let error = project(&cst).unwrap_err();
    assert_eq!(
        error.to_string(),
        "malformed CST at `FunctionDeclaration`: <ParamList> must wrap a list"
    );
}

#[test]
fn empty_virtual_node_projects_to_an_empty_list() {
    let params = VirtualNode::new(AnchorRole::ParamList, None, ExtrasRecord::default());
    let cst = CstNode::new(
        "FunctionDeclaration",
        vec![("params".to_owned(), CstValue::Virtual(Box::new(params)))],
        ExtrasRecord::default(),
    );

    let ast = project(&cst).unwrap();
    assert_eq!(ast.field("params"), Some(&AstValue::List(Vec::new())));
}

#[test]
fn virtual_nodes_are_required_by_their_strategy() {
    let schema = Schema::es5(StrategyKind::VirtualNodes).unwrap();
    let lifted = CstNode::lift(&parse("function f() {}").unwrap().ast);

    let error = reconstruct(&schema, &lifted).unwrap_err();
    assert_eq!(
        error.to_string(),
        "malformed CST at `FunctionDeclaration`: expected a <ParamList> virtual node"
    );
}

#[test]
fn unreachable_extras_are_malformed() {
    let schema = Schema::es5(StrategyKind::VirtualNodes).unwrap();
    let comment = parse("/*c*/").unwrap().tokens[0].token.clone();

    let mut extras = ExtrasRecord::default();
    let vocabulary = schema.vocabulary(Owner::Node("Program")).unwrap();
    extras.set(vocabulary, "after", vec![comment]).unwrap();
    let body = vec![("body".to_owned(), CstValue::List(Vec::new()))];
    let cst = CstNode::new("Program", body, extras);

    let error = reconstruct(&schema, &cst).unwrap_err();
    assert_eq!(
        error.to_string(),
        "malformed CST at `Program`: extras are attached where no gap reaches them"
    );
}

#[test]
fn labels_are_checked_against_the_owner() {
    let schema = Schema::es5(StrategyKind::ExtendedLabels).unwrap();
    let comment = parse("/*c*/").unwrap().tokens[0].token.clone();
    let mut extras = ExtrasRecord::default();

    let function = schema.vocabulary(Owner::Node("FunctionDeclaration")).unwrap();
    extras.set(function, "insideParams", vec![comment.clone()]).unwrap();

    let identifier = schema.vocabulary(Owner::Node("Identifier")).unwrap();
    let error = extras.set(identifier, "insideParams", vec![comment]).unwrap_err();
    assert_eq!(
        error,
        CstError::InvalidLabel { owner: "Identifier".to_owned(), label: "insideParams".to_owned() }
    );
    assert_eq!(extras.get(Label::new("insideParams").as_str()).len(), 1);
}

#[test]
fn schema_is_shareable_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();
    assert_send_sync::<CstNode>();
}
