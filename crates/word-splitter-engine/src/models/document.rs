/// A run of text sharing character formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    /// Explicit bold toggle; `None` when the run inherits it.
    pub bold: Option<bool>,
    /// Explicit font size in points.
    pub size_pt: Option<f32>,
}

/// Structural facts about one body paragraph.
///
/// Only what heading classification needs is kept here; the raw markup
/// stays in the source package for the materializer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    /// Display name of the paragraph style, e.g. `Heading 2` or `标题 1`.
    pub style_name: Option<String>,
    /// Raw 0-based `outlineLvl` attribute, if the paragraph carries one.
    pub outline_level: Option<u8>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            runs: vec![Run {
                text: text.clone(),
                ..Run::default()
            }],
            text,
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.style_name = Some(style_name.into());
        self
    }

    pub fn with_outline_level(mut self, outline_level: u8) -> Self {
        self.outline_level = Some(outline_level);
        self
    }

    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = runs;
        self
    }
}

/// Position of a body element in physical document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyElement {
    /// Index into the paragraph sequence.
    Paragraph(usize),
    /// Index into the table sequence.
    Table(usize),
}

/// Interleaved paragraph and table order of a document body.
pub type ElementOrder = Vec<BodyElement>;
