mod cursor;

use cursor::Cursor;
pub use jscst_syntax::SyntaxKind;
use jscst_syntax::SyntaxKind::*;
use jscst_syntax::{Span, Token};
use line_index::LineIndex;
use text_size::{TextRange, TextSize};

/// Splits a source text into tokens whose ranges tile the text without gaps.
///
/// Comments, whitespace and line terminators are produced as tokens of their
/// own; deciding which tokens are extras is left to the parser.
pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    line_index: &'a LineIndex,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str, line_index: &'a LineIndex) -> Self {
        Self { text, cursor: Cursor::new(text), line_index }
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    /// Returns the next token, or an empty `EOF` token once the text is exhausted.
    pub fn next_token(&mut self) -> Token {
        let kind = self.syntax_kind();
        let range = self.range();
        self.cursor.reset_pos_within_token();

        let span = Span {
            range,
            start: self.line_index.line_col(range.start()),
            end: self.line_index.line_col(range.end()),
        };
        Token::new(kind, &self.text[range], span)
    }

    fn syntax_kind(&mut self) -> SyntaxKind {
        if self.cursor.is_eof() {
            return EOF;
        }

        match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ',' => COMMA,
            ';' => SEMICOLON,
            '\r' => {
                if self.cursor.matches('\n') {
                    self.cursor.advance();
                }
                LINE_TERMINATOR
            }
            '\n' | '\u{2028}' | '\u{2029}' => LINE_TERMINATOR,
            '/' if self.cursor.matches('/') => {
                self.cursor.advance_while(|c| !is_line_terminator(c));
                LINE_COMMENT
            }
            '/' if self.cursor.matches('*') => self.block_comment(),
            quote @ ('"' | '\'') => self.string(quote),
            first_char @ '0'..='9' => self.number(first_char),
            '.' if self.cursor.peek().is_ascii_digit() => {
                self.digits();
                self.exponent();
                NUMBER
            }
            first_char if is_whitespace(first_char) => {
                self.cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            first_char if is_ident_start(first_char) => {
                self.cursor.advance_while(is_ident_continue);
                keyword(self.text())
            }
            _ => UNKNOWN,
        }
    }

    fn block_comment(&mut self) -> SyntaxKind {
        self.cursor.advance();

        loop {
            if self.cursor.is_eof() {
                return UNKNOWN;
            }
            if self.cursor.advance() == '*' && self.cursor.matches('/') {
                self.cursor.advance();
                return BLOCK_COMMENT;
            }
        }
    }

    fn string(&mut self, quote: char) -> SyntaxKind {
        loop {
            let c = self.cursor.peek();
            if self.cursor.is_eof() || is_line_terminator(c) {
                return UNKNOWN;
            }

            self.cursor.advance();
            if c == quote {
                return STRING;
            }
            if c == '\\' && !self.cursor.is_eof() {
                if self.cursor.advance() == '\r' && self.cursor.matches('\n') {
                    self.cursor.advance();
                }
            }
        }
    }

    fn number(&mut self, first_char: char) -> SyntaxKind {
        if first_char == '0' && (self.cursor.matches('x') || self.cursor.matches('X')) {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_hexdigit());
            return NUMBER;
        }

        self.digits();
        if self.cursor.matches('.') {
            self.cursor.advance();
            self.digits();
        }
        self.exponent();

        NUMBER
    }

    fn digits(&mut self) {
        self.cursor.advance_while(|c| c.is_ascii_digit());
    }

    fn exponent(&mut self) {
        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.cursor.advance();
            if self.cursor.matches('-') || self.cursor.matches('+') {
                self.cursor.advance();
            }
            self.digits();
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != EOF).then_some(token)
    }
}

/// Tokenizes a whole text, excluding the final `EOF`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let line_index = LineIndex::new(text);
    Tokenizer::new(text, &line_index).collect()
}

fn keyword(text: &str) -> SyntaxKind {
    match text {
        "function" => FUNCTION_KW,
        "return" => RETURN_KW,
        "true" => TRUE_KW,
        "false" => FALSE_KW,
        "null" => NULL_KW,
        "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger" | "default"
        | "delete" | "do" | "else" | "enum" | "export" | "extends" | "finally" | "for" | "if"
        | "import" | "in" | "instanceof" | "new" | "super" | "switch" | "this" | "throw"
        | "try" | "typeof" | "var" | "void" | "while" | "with" => RESERVED_WORD,
        _ => IDENT,
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && !is_line_terminator(c) && c != '\u{85}')
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric() || c == '\u{200C}' || c == '\u{200D}'
}
