//! Tokens with exact text and source spans.

use std::fmt;

use line_index::LineCol;
use text_size::TextRange;

use crate::SyntaxKind;

/// Byte range of a token plus its zero-based line/column boundaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub range: TextRange,
    pub start: LineCol,
    pub end: LineCol,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} ({}:{}-{}:{})",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.start.line + 1,
            self.start.col + 1,
            self.end.line + 1,
            self.end.col + 1,
        )
    }
}

/// An atomic lexical unit. Immutable once produced by the tokenizer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: Box<str>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<Box<str>>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.span.range
    }
}

/// Whether a token is a leaf of the AST or an extra the AST does not record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenRole {
    Semantic,
    Extra,
}

/// A token tagged with the role the parser assigned to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceToken {
    pub role: TokenRole,
    pub token: Token,
}

impl SourceToken {
    pub fn semantic(token: Token) -> Self {
        Self { role: TokenRole::Semantic, token }
    }

    pub fn extra(token: Token) -> Self {
        Self { role: TokenRole::Extra, token }
    }

    #[inline]
    pub fn is_extra(&self) -> bool {
        self.role == TokenRole::Extra
    }
}
