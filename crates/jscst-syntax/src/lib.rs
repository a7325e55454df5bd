//! Lexical vocabulary shared by the tokenizer, the parser and the CST.
//!
//! Every character of a source text belongs to exactly one [`Token`]. The
//! parser decides which tokens carry meaning for the AST and which are
//! extras, recording the decision as a [`TokenRole`].

mod syntax_kind;
mod syntax_set;
mod token;

/// Token kinds produced by the tokenizer.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Tokens, their spans and roles.
pub use token::{SourceToken, Span, Token, TokenRole};
