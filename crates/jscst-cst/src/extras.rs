use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use jscst_syntax::Token;
use serde::Serialize;

use crate::CstError;

/// A position label naming where, relative to its anchor, extras sit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Label(&'static str);

impl Label {
    pub const BEFORE: Self = Self("before");
    pub const INSIDE: Self = Self("inside");
    pub const AFTER: Self = Self("after");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The labels an extras record of one owner may carry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vocabulary {
    owner: String,
    labels: Vec<Label>,
}

impl Vocabulary {
    pub fn new(owner: impl ToString, labels: impl IntoIterator<Item = Label>) -> Self {
        let mut vocabulary = Self { owner: owner.to_string(), labels: Vec::new() };
        for label in labels {
            if !vocabulary.labels.contains(&label) {
                vocabulary.labels.push(label);
            }
        }
        vocabulary
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, name: &str) -> Option<Label> {
        self.labels.iter().copied().find(|label| label.as_str() == name)
    }

    pub fn contains(&self, label: Label) -> bool {
        self.labels.contains(&label)
    }
}

/// Extra tokens of one anchor, grouped by position label.
///
/// Tokens under a label are kept in source order. Labels are kept in the
/// order they were first set, which for built trees is source order too.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtrasRecord {
    entries: IndexMap<Label, Vec<Token>>,
}

impl ExtrasRecord {
    /// Tokens under `label`; empty when the label was never set.
    pub fn get(&self, label: &str) -> &[Token] {
        self.entries.get(label).map_or(&[], Vec::as_slice)
    }

    /// Sets the tokens of `label`, which must belong to `vocabulary`.
    ///
    /// Setting an empty sequence removes the label.
    pub fn set(
        &mut self,
        vocabulary: &Vocabulary,
        label: &str,
        tokens: Vec<Token>,
    ) -> Result<(), CstError> {
        let label = vocabulary.get(label).ok_or_else(|| CstError::InvalidLabel {
            owner: vocabulary.owner().to_owned(),
            label: label.to_owned(),
        })?;

        if tokens.is_empty() {
            self.entries.shift_remove(&label);
        } else {
            self.entries.insert(label, tokens);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &[Token])> {
        self.entries.iter().map(|(label, tokens)| (*label, tokens.as_slice()))
    }

    /// Number of labels holding at least one token.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use jscst_syntax::{Span, SyntaxKind};
    use text_size::TextRange;

    use super::*;

    fn comment(text: &str) -> Token {
        let range = TextRange::up_to((text.len() as u32).into());
        let start = line_index::LineCol { line: 0, col: 0 };
        let end = line_index::LineCol { line: 0, col: text.len() as u32 };
        Token::new(SyntaxKind::BLOCK_COMMENT, text, Span { range, start, end })
    }

    #[test]
    fn absent_label_reads_as_empty() {
        let record = ExtrasRecord::default();
        assert!(record.get("before").is_empty());
        assert!(record.is_empty());
    }

    #[test]
    fn set_checks_the_vocabulary() {
        let vocabulary = Vocabulary::new("Identifier", [Label::BEFORE, Label::AFTER]);
        let mut record = ExtrasRecord::default();

        record.set(&vocabulary, "after", vec![comment("/*a*/")]).unwrap();
        assert_eq!(record.get("after")[0].text(), "/*a*/");

        let error = record.set(&vocabulary, "insideParams", vec![comment("/*b*/")]).unwrap_err();
        assert_eq!(error.to_string(), "label `insideParams` is not recognized for `Identifier`");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn setting_nothing_removes_the_label() {
        let vocabulary = Vocabulary::new("Program", [Label::INSIDE]);
        let mut record = ExtrasRecord::default();

        record.set(&vocabulary, "inside", vec![comment("/**/")]).unwrap();
        record.set(&vocabulary, "inside", Vec::new()).unwrap();
        assert!(record.is_empty());
    }
}
