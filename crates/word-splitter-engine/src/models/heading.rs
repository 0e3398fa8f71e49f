use serde::Serialize;

/// A paragraph recognised as a structural heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Outline depth, 1 for top-level headings.
    pub level: u8,
    /// Trimmed paragraph text.
    pub title: String,
    /// Index into the document's flat paragraph sequence.
    pub position: usize,
}

impl Heading {
    pub fn new(level: u8, title: impl Into<String>, position: usize) -> Self {
        Self {
            level,
            title: title.into(),
            position,
        }
    }
}
