use jscst_ast::ShapeError;
use jscst_errors::Diagnostic;
use text_size::TextRange;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CstError {
    /// A label outside the vocabulary of the record's owner.
    #[error("label `{label}` is not recognized for `{owner}`")]
    InvalidLabel { owner: String, label: String },
    /// A gap of a slot schedule that the strategy cannot map to an anchor.
    #[error("extras {gap} in `{owner}` have no anchor")]
    UnresolvableAnchor { owner: String, gap: String },
    /// The token stream disagrees with the AST it was parsed into.
    #[error("token stream does not match the AST: expected {expected}, found {found}")]
    TokenStreamMismatch { expected: String, found: String, range: TextRange },
    #[error("malformed CST at `{owner}`: {message}")]
    MalformedCst { owner: String, message: String },
    /// A slot schedule that does not cover its node type.
    #[error("slot schedule of `{owner}` is incomplete: {message}")]
    IncompleteSlotSchedule { owner: String, message: String },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl CstError {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            Self::TokenStreamMismatch { range, .. } => Some(*range),
            _ => None,
        }
    }

    /// A source diagnostic, for errors that point into the source text.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        let range = self.range()?;
        Some(Diagnostic::error(self.to_string(), range))
    }

    pub(crate) fn malformed(owner: impl ToString, message: impl Into<String>) -> Self {
        Self::MalformedCst { owner: owner.to_string(), message: message.into() }
    }

    pub(crate) fn incomplete(owner: impl ToString, message: impl Into<String>) -> Self {
        Self::IncompleteSlotSchedule { owner: owner.to_string(), message: message.into() }
    }
}
