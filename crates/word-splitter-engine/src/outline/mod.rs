//! # Outline Analysis
//!
//! Turns a document's paragraphs into a chapter plan in four steps.
//!
//! ## Phases
//!
//! 1. **Classification** (`classify`): every paragraph gets an outline level,
//!    0 for body text. Structural cues (style names, `outlineLvl`) come first;
//!    a visual-cue fallback can be layered behind them.
//! 2. **Extraction** (`extract`): non-empty paragraphs with a level become
//!    `Heading`s.
//! 3. **Planning** (`planner`): one pass over the headings decides where
//!    chapters open, using the branch depth from `branch` to lower the split
//!    level for shallow branches, then resolves where each chapter ends.
//! 4. **Table attribution** (`tables`): tables interleaved with paragraphs
//!    are assigned to the chapter owning the paragraph before them.
//!
//! ## Key Invariants
//!
//! - Every phase is a pure function of its input; planning holds no state
//!   between calls and may run concurrently for different documents
//! - Classification never fails: unknown shapes are level 0
//! - Chapters are ordered, disjoint and each covers at least one paragraph

pub mod branch;
pub mod classify;
pub mod extract;
pub mod planner;
pub mod tables;

use std::collections::BTreeSet;

use crate::models::{BodyElement, Chapter, Heading, Paragraph};

pub use classify::{HeuristicClassifier, OutlineClassifier, StructuralClassifier};
pub use extract::extract_headings;
pub use planner::plan;
pub use tables::associate;

/// A chapter together with the tables attributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChapter {
    pub chapter: Chapter,
    pub tables: BTreeSet<usize>,
}

/// Everything the splitter decided about one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPlan {
    pub headings: Vec<Heading>,
    pub chapters: Vec<PlannedChapter>,
}

impl DocumentPlan {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Run all outline phases over one document.
pub fn plan_document(
    paragraphs: &[Paragraph],
    elements: &[BodyElement],
    classifier: &dyn OutlineClassifier,
    target_level: u8,
) -> DocumentPlan {
    let headings = extract_headings(paragraphs, classifier);
    let chapters = plan(&headings, target_level, paragraphs.len())
        .into_iter()
        .map(|chapter| {
            let tables = associate(elements, &chapter.paragraphs());
            PlannedChapter { chapter, tables }
        })
        .collect();

    DocumentPlan { headings, chapters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BodyElement::{Paragraph as P, Table as T};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plan_document_end_to_end() {
        let paragraphs = vec![
            Paragraph::new("Cover page"),
            Paragraph::new("Overview").with_style("Heading 1"),
            Paragraph::new("Goals").with_style("Heading 2"),
            Paragraph::new("Goal text"),
            Paragraph::new("Risks").with_style("Heading 2"),
            Paragraph::new("Risk text"),
        ];
        let elements = vec![P(0), T(0), P(1), P(2), P(3), T(1), P(4), P(5), T(2)];

        let plan = plan_document(&paragraphs, &elements, &StructuralClassifier, 3);

        assert_eq!(plan.headings.len(), 3);
        let summary: Vec<(&str, Vec<usize>, Vec<usize>)> = plan
            .chapters
            .iter()
            .map(|c| {
                (
                    c.chapter.title.as_str(),
                    c.chapter.paragraphs().collect(),
                    c.tables.iter().copied().collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Overview - Goals", vec![2, 3], vec![1]),
                ("Overview - Risks", vec![4, 5], vec![2]),
            ]
        );
    }

    #[test]
    fn test_document_without_headings_is_not_split() {
        let paragraphs = vec![Paragraph::new("just"), Paragraph::new("text")];
        let plan = plan_document(&paragraphs, &[P(0), P(1)], &StructuralClassifier, 3);
        assert!(plan.is_empty());
        assert!(plan.headings.is_empty());
    }
}
