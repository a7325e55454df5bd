use jscst_syntax::SyntaxKind::{self, *};
use jscst_syntax::{SourceToken, Token, TokenRole};
use jscst_tokenizer::Tokenizer;
use line_index::LineIndex;
use text_size::{TextRange, TextSize};

use crate::ParseError;

/// How deep blocks and expressions may nest inside each other.
const MAX_NESTING: u32 = 256;

/// Cursor over the significant tokens of a text.
///
/// Every token starts out as an extra. Tokens the grammar consumes through
/// [`Parser::advance`] become semantic; trivia and anything skipped with
/// [`Parser::skip_extra`] stays extra.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    roles: Vec<TokenRole>,
    /// Index of the next significant token.
    pos: usize,
    /// Index just past the last consumed token.
    consumed: usize,
    text_len: TextSize,
    function_depth: u32,
    nesting: u32,
}

impl Parser {
    pub(crate) fn new(text: &str, line_index: &LineIndex) -> Self {
        let tokens: Vec<Token> = Tokenizer::new(text, line_index).collect();
        let roles = vec![TokenRole::Extra; tokens.len()];

        let mut parser = Self {
            tokens,
            roles,
            pos: 0,
            consumed: 0,
            text_len: TextSize::of(text),
            function_depth: 0,
            nesting: 0,
        };
        parser.skip_trivia();
        parser
    }

    fn skip_trivia(&mut self) {
        while self.tokens.get(self.pos).is_some_and(|token| token.kind.is_trivia()) {
            self.pos += 1;
        }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokens.get(self.pos).map_or(EOF, |token| token.kind)
    }

    pub(crate) fn peek_text(&self) -> &str {
        self.tokens.get(self.pos).map_or("", Token::text)
    }

    pub(crate) fn peek_range(&self) -> TextRange {
        self.tokens.get(self.pos).map_or(TextRange::empty(self.text_len), Token::range)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
            self.consumed = self.pos;
            self.skip_trivia();
        }
    }

    /// Consumes the current token as a semantic token and returns its text.
    pub(crate) fn advance(&mut self) -> String {
        let text = self.peek_text().to_owned();
        if let Some(role) = self.roles.get_mut(self.pos) {
            *role = TokenRole::Semantic;
        }
        self.bump();
        text
    }

    /// Consumes the current token, leaving it an extra.
    pub(crate) fn skip_extra(&mut self) {
        self.bump();
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Result<String, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Whether a line terminator separates the current token from the last
    /// consumed one.
    pub(crate) fn line_break_before(&self) -> bool {
        self.tokens[self.consumed..self.pos.min(self.tokens.len())].iter().any(|token| {
            token.kind == LINE_TERMINATOR
                || (token.kind == BLOCK_COMMENT
                    && token.text().contains(['\n', '\r', '\u{2028}', '\u{2029}']))
        })
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.peek_range())
    }

    /// Reports the current token where `expected` should have been.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.peek_kind() {
            EOF => "end of file".to_owned(),
            UNKNOWN if self.peek_text().starts_with("/*") => "unterminated comment".to_owned(),
            UNKNOWN if self.peek_text().starts_with(['"', '\'']) => {
                "unterminated string literal".to_owned()
            }
            _ => format!("`{}`", self.peek_text()),
        };
        self.error(format!("expected {expected}, found {found}"))
    }

    pub(crate) fn in_function(&self) -> bool {
        self.function_depth > 0
    }

    pub(crate) fn enter_function(&mut self) {
        self.function_depth += 1;
    }

    pub(crate) fn exit_function(&mut self) {
        self.function_depth -= 1;
    }

    /// Enters a nested block or expression.
    pub(crate) fn nest(&mut self) -> Result<(), ParseError> {
        if self.nesting == MAX_NESTING {
            return Err(self.error(format!("nesting deeper than {MAX_NESTING} levels")));
        }
        self.nesting += 1;
        Ok(())
    }

    pub(crate) fn unnest(&mut self) {
        self.nesting -= 1;
    }

    pub(crate) fn finish(self) -> Vec<SourceToken> {
        self.tokens
            .into_iter()
            .zip(self.roles)
            .map(|(token, role)| SourceToken { role, token })
            .collect()
    }
}
