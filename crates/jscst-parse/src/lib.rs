//! Reference parser for the function declaration family of ES5.
//!
//! Produces the ESTree AST together with the complete token stream of the
//! source, each token tagged as semantic or extra. Comments, whitespace,
//! statement-ending semicolons and redundant parentheses are extras.

use jscst_ast::AstNode;
use jscst_errors::Diagnostic;
use jscst_inputs::File;
use jscst_syntax::SourceToken;
use line_index::LineIndex;
use text_size::TextRange;

mod grammar;
mod literal;
mod parser;

#[derive(Clone, Debug)]
pub struct Parse {
    pub ast: AstNode,
    pub tokens: Vec<SourceToken>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    range: TextRange,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Diagnostic::error(error.message.clone(), error.range)
    }
}

/// Parses `text`, stopping at the first syntax error.
pub fn parse(text: &str) -> Result<Parse, ParseError> {
    parse_with(text, &LineIndex::new(text))
}

/// Parses a file, reusing its line index for token positions.
pub fn parse_file(file: &File) -> Result<Parse, ParseError> {
    parse_with(file.text(), file.line_index())
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
fn parse_with(text: &str, line_index: &LineIndex) -> Result<Parse, ParseError> {
    let mut parser = parser::Parser::new(text, line_index);
    let ast = grammar::program(&mut parser)?;
    let tokens = parser.finish();
    tracing::debug!(tokens = tokens.len(), "parsed");
    Ok(Parse { ast, tokens })
}
