use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
    label: Option<String>,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range, label: None }
    }

    /// Replaces the default `here` annotation under the highlighted range.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let label = self.label.as_deref().unwrap_or("here");
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(clamp(self.range, text).into()).label(label))
                .fold(true),
        );
        renderer.render(message)
    }
}

/// Keeps the annotation inside the source so the renderer never indexes past it.
fn clamp(range: TextRange, text: &str) -> TextRange {
    let len = text_size::TextSize::new(text.len() as u32);
    TextRange::new(range.start().min(len), range.end().min(len))
}
