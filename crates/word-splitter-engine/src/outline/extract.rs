use crate::models::{Heading, Paragraph};

use super::classify::OutlineClassifier;

/// Collect headings in document order.
///
/// A paragraph becomes a heading when the classifier gives it a level above
/// zero and its trimmed text is non-empty.
pub fn extract_headings(paragraphs: &[Paragraph], classifier: &dyn OutlineClassifier) -> Vec<Heading> {
    paragraphs
        .iter()
        .enumerate()
        .filter_map(|(position, paragraph)| {
            let level = classifier.classify(paragraph);
            let title = paragraph.text.trim();
            (level > 0 && !title.is_empty()).then(|| Heading::new(level, title, position))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::classify::StructuralClassifier;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_levels_titles_and_positions() {
        let paragraphs = vec![
            Paragraph::new("Preface text"),
            Paragraph::new("  Introduction  ").with_style("Heading 1"),
            Paragraph::new("Body"),
            Paragraph::new("Scope").with_style("Heading 2"),
            Paragraph::new("Outlined").with_outline_level(2),
        ];

        let headings = extract_headings(&paragraphs, &StructuralClassifier);

        assert_eq!(
            headings,
            vec![
                Heading::new(1, "Introduction", 1),
                Heading::new(2, "Scope", 3),
                Heading::new(3, "Outlined", 4),
            ]
        );
    }

    #[test]
    fn test_blank_headings_are_dropped() {
        let paragraphs = vec![
            Paragraph::new("   ").with_style("Heading 1"),
            Paragraph::new("").with_outline_level(0),
            Paragraph::new("Real").with_style("Heading 1"),
        ];

        let headings = extract_headings(&paragraphs, &StructuralClassifier);

        assert_eq!(headings, vec![Heading::new(1, "Real", 2)]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let paragraphs = vec![
            Paragraph::new("A").with_style("Heading 1"),
            Paragraph::new("text"),
            Paragraph::new("A.1").with_style("Heading 2"),
        ];

        let first = extract_headings(&paragraphs, &StructuralClassifier);
        let second = extract_headings(&paragraphs, &StructuralClassifier);

        assert_eq!(first, second);
    }

    #[test]
    fn test_no_paragraphs_no_headings() {
        assert!(extract_headings(&[], &StructuralClassifier).is_empty());
    }
}
