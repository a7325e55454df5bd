#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    SEMICOLON,

    FUNCTION_KW,
    RETURN_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    /// Any other ES5 reserved word; never valid in the supported grammar.
    RESERVED_WORD,
    IDENT,

    NUMBER,
    STRING,

    WHITESPACE,
    LINE_TERMINATOR,
    LINE_COMMENT,
    BLOCK_COMMENT,

    UNKNOWN,
    EOF,
}

impl SyntaxKind {
    /// Comments, whitespace and line terminators.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_TERMINATOR | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Human readable description used in diagnostics.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::LEFT_PAREN => "`(`",
            Self::RIGHT_PAREN => "`)`",
            Self::LEFT_BRACE => "`{`",
            Self::RIGHT_BRACE => "`}`",
            Self::COMMA => "`,`",
            Self::SEMICOLON => "`;`",
            Self::FUNCTION_KW => "`function`",
            Self::RETURN_KW => "`return`",
            Self::TRUE_KW => "`true`",
            Self::FALSE_KW => "`false`",
            Self::NULL_KW => "`null`",
            Self::RESERVED_WORD => "reserved word",
            Self::IDENT => "identifier",
            Self::NUMBER => "number",
            Self::STRING => "string",
            Self::WHITESPACE => "whitespace",
            Self::LINE_TERMINATOR => "line terminator",
            Self::LINE_COMMENT => "line comment",
            Self::BLOCK_COMMENT => "block comment",
            Self::UNKNOWN => "unknown token",
            Self::EOF => "end of file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind::*;

    #[test]
    fn trivia_is_comments_and_whitespace() {
        for kind in [WHITESPACE, LINE_TERMINATOR, LINE_COMMENT, BLOCK_COMMENT] {
            assert!(kind.is_trivia());
        }
        for kind in [SEMICOLON, LEFT_PAREN, IDENT, STRING, UNKNOWN, EOF] {
            assert!(!kind.is_trivia());
        }
    }
}
