use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
pub use line_index::LineIndex;

/// A source file together with its line index.
pub struct File {
    path: Utf8PathBuf,
    text: String,
    line_index: LineIndex,
}

impl File {
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self { path: path.into(), text, line_index }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("text_len", &self.text.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use text_size::TextSize;

    #[test]
    fn line_index_is_zero_based() {
        let file = File::new("main.js", "function f() {\n  return 1;\n}\n");

        let col = file.line_index().line_col(TextSize::new(17));
        assert_eq!((col.line, col.col), (1, 2));
        assert_eq!(file.path().as_str(), "main.js");
    }
}
