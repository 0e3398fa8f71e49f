use serde::Serialize;
use std::ops::RangeInclusive;

/// Contiguous run of paragraphs destined for one output document.
///
/// Chapters are produced by [`crate::outline::planner::plan`] and are not
/// modified once their end boundaries have been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    /// Ancestor titles joined with `" - "`, unsanitised.
    pub title: String,
    /// Outline level the chapter was split at.
    pub level: u8,
    /// Paragraph index of the heading that opened the chapter.
    pub start_paragraph: usize,
    /// Last paragraph index included, never below `start_paragraph`.
    pub end_paragraph: usize,
}

impl Chapter {
    pub fn paragraphs(&self) -> RangeInclusive<usize> {
        self.start_paragraph..=self.end_paragraph
    }

    /// Number of paragraphs in the chapter, at least one.
    pub fn paragraph_count(&self) -> usize {
        self.end_paragraph - self.start_paragraph + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(start: usize, end: usize) -> Chapter {
        Chapter {
            title: "A".to_string(),
            level: 1,
            start_paragraph: start,
            end_paragraph: end,
        }
    }

    #[test]
    fn test_paragraph_range_is_inclusive() {
        let c = chapter(3, 5);
        assert_eq!(c.paragraphs().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(c.paragraph_count(), 3);
    }

    #[test]
    fn test_single_paragraph_chapter() {
        let c = chapter(7, 7);
        assert_eq!(c.paragraph_count(), 1);
        assert_eq!(c.paragraphs().collect::<Vec<_>>(), vec![7]);
    }
}
