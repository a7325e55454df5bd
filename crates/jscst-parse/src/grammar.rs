use jscst_ast::{AstNode, AstValue, Scalar};
use jscst_syntax::SyntaxKind::*;
use jscst_syntax::SyntaxSet;

use crate::ParseError;
use crate::literal;
use crate::parser::Parser;

const LITERAL_FIRST: SyntaxSet = SyntaxSet::new([NUMBER, STRING, TRUE_KW, FALSE_KW, NULL_KW]);
const EXPR_FIRST: SyntaxSet = LITERAL_FIRST.union(&SyntaxSet::new([IDENT, LEFT_PAREN]));

type Parsed = Result<AstNode, ParseError>;

fn node<const N: usize>(ty: &str, fields: [(&str, AstValue); N]) -> AstNode {
    AstNode::new(ty, fields.into_iter().map(|(name, value)| (name.to_owned(), value)).collect())
}

fn child(node: AstNode) -> AstValue {
    AstValue::Node(Box::new(node))
}

pub(crate) fn program(p: &mut Parser) -> Parsed {
    let mut body = Vec::new();
    while !p.at(EOF) {
        body.push(statement(p)?);
    }
    Ok(node("Program", [("body", AstValue::List(body))]))
}

fn statement(p: &mut Parser) -> Parsed {
    match p.peek_kind() {
        FUNCTION_KW => function_declaration(p),
        RETURN_KW if p.in_function() => return_statement(p),
        RETURN_KW => Err(p.error("`return` outside of a function")),
        LEFT_BRACE => block(p),
        SEMICOLON => {
            p.advance();
            Ok(node("EmptyStatement", []))
        }
        _ => {
            let expression = expr(p)?;
            terminator(p)?;
            Ok(node("ExpressionStatement", [("expression", child(expression))]))
        }
    }
}

fn function_declaration(p: &mut Parser) -> Parsed {
    debug_assert_eq!(p.peek_kind(), FUNCTION_KW);
    p.advance();

    let id = identifier(p)?;
    p.expect(LEFT_PAREN)?;
    let mut params = Vec::new();
    if !p.at(RIGHT_PAREN) {
        loop {
            params.push(identifier(p)?);
            if !p.eat(COMMA) {
                break;
            }
        }
    }
    p.expect(RIGHT_PAREN)?;

    p.enter_function();
    let body = block(p);
    p.exit_function();

    Ok(node(
        "FunctionDeclaration",
        [("id", child(id)), ("params", AstValue::List(params)), ("body", child(body?))],
    ))
}

fn block(p: &mut Parser) -> Parsed {
    p.nest()?;
    let block = block_body(p);
    p.unnest();
    block
}

fn block_body(p: &mut Parser) -> Parsed {
    p.expect(LEFT_BRACE)?;
    let mut body = Vec::new();
    while !p.at(RIGHT_BRACE) {
        if p.at(EOF) {
            return Err(p.unexpected(RIGHT_BRACE.describe()));
        }
        body.push(statement(p)?);
    }
    p.advance();
    Ok(node("BlockStatement", [("body", AstValue::List(body))]))
}

fn return_statement(p: &mut Parser) -> Parsed {
    debug_assert_eq!(p.peek_kind(), RETURN_KW);
    p.advance();

    let argument = if p.line_break_before() || !EXPR_FIRST.contains(p.peek_kind()) {
        AstValue::Null
    } else {
        child(expr(p)?)
    };
    terminator(p)?;

    Ok(node("ReturnStatement", [("argument", argument)]))
}

/// A statement-ending `;` is an extra. Without one, the statement must end
/// at a line break, a closing brace or the end of the file.
fn terminator(p: &mut Parser) -> Result<(), ParseError> {
    if p.at(SEMICOLON) {
        p.skip_extra();
        return Ok(());
    }
    if p.at(RIGHT_BRACE) || p.at(EOF) || p.line_break_before() {
        return Ok(());
    }
    Err(p.unexpected(SEMICOLON.describe()))
}

fn expr(p: &mut Parser) -> Parsed {
    p.nest()?;
    let expression = call_expr(p);
    p.unnest();
    expression
}

/// Calls chain in a loop, so `f()()()` never nests.
fn call_expr(p: &mut Parser) -> Parsed {
    let mut expression = primary_expr(p)?;

    while p.at(LEFT_PAREN) {
        p.advance();
        let mut arguments = Vec::new();
        if !p.at(RIGHT_PAREN) {
            loop {
                arguments.push(expr(p)?);
                if !p.eat(COMMA) {
                    break;
                }
            }
        }
        p.expect(RIGHT_PAREN)?;

        expression = node(
            "CallExpression",
            [("callee", child(expression)), ("arguments", AstValue::List(arguments))],
        );
    }

    Ok(expression)
}

fn primary_expr(p: &mut Parser) -> Parsed {
    match p.peek_kind() {
        IDENT => identifier(p),
        kind if LITERAL_FIRST.contains(kind) => {
            let range = p.peek_range();
            let raw = p.advance();
            let value =
                literal::value(kind, &raw).map_err(|message| ParseError::new(message, range))?;
            let raw = AstValue::Scalar(Scalar::String(raw));
            Ok(node("Literal", [("value", AstValue::Scalar(value)), ("raw", raw)]))
        }
        LEFT_PAREN => {
            p.skip_extra();
            let expression = expr(p)?;
            if !p.at(RIGHT_PAREN) {
                return Err(p.unexpected(RIGHT_PAREN.describe()));
            }
            p.skip_extra();
            Ok(expression)
        }
        _ => Err(p.unexpected("expression")),
    }
}

fn identifier(p: &mut Parser) -> Parsed {
    match p.peek_kind() {
        IDENT => {
            let name = p.advance();
            Ok(node("Identifier", [("name", AstValue::Scalar(Scalar::String(name)))]))
        }
        RESERVED_WORD | FUNCTION_KW | RETURN_KW | TRUE_KW | FALSE_KW | NULL_KW => {
            let word = p.peek_text();
            Err(p.error(format!("reserved word `{word}` cannot be used as an identifier")))
        }
        _ => Err(p.unexpected("identifier")),
    }
}
