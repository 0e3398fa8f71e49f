use std::collections::BTreeMap;

use crate::models::{Chapter, Heading};

use super::branch::max_depth;

/// Separator between ancestor titles in a chapter title.
pub const TITLE_SEPARATOR: &str = " - ";

/// Deepest level a caller may ask to split at.
pub const MAX_TARGET_LEVEL: u8 = 6;

/// Open ancestors of the most recently visited heading, keyed by level.
///
/// Lives only for the duration of one [`plan`] call.
#[derive(Debug, Default)]
struct CurrentPath<'a> {
    open: BTreeMap<u8, &'a Heading>,
}

impl<'a> CurrentPath<'a> {
    /// Record `heading` at its level and close everything deeper.
    fn visit(&mut self, heading: &'a Heading) {
        self.open.insert(heading.level, heading);
        self.open.retain(|&level, _| level <= heading.level);
    }

    fn title_up_to(&self, level: u8) -> String {
        let titles: Vec<&str> = self
            .open
            .range(..=level)
            .map(|(_, heading)| heading.title.as_str())
            .collect();

        if titles.is_empty() {
            format!("章节_{level}")
        } else {
            titles.join(TITLE_SEPARATOR)
        }
    }
}

/// Decide where chapters start and end.
///
/// Each heading whose level equals `min(target_level, depth of its branch)`
/// opens a chapter, so a branch that never reaches `target_level` is still
/// split at its own deepest level. `total_paragraphs` bounds the last
/// chapter.
///
/// Paragraphs before the first chapter belong to no chapter, and neither
/// does the body of an orphan heading: a heading at the chapter's level or
/// shallower that sits between two chapters without opening one itself.
pub fn plan(headings: &[Heading], target_level: u8, total_paragraphs: usize) -> Vec<Chapter> {
    let mut path = CurrentPath::default();
    let mut chapters = Vec::new();

    for (index, heading) in headings.iter().enumerate() {
        path.visit(heading);

        let effective_level = target_level.min(max_depth(headings, index, heading.level));
        if heading.level == effective_level {
            chapters.push(Chapter {
                title: path.title_up_to(heading.level),
                level: heading.level,
                start_paragraph: heading.position,
                end_paragraph: heading.position,
            });
        }
    }

    resolve_boundaries(&mut chapters, headings, total_paragraphs);
    chapters
}

fn resolve_boundaries(chapters: &mut [Chapter], headings: &[Heading], total_paragraphs: usize) {
    let next_starts: Vec<Option<usize>> = chapters
        .iter()
        .skip(1)
        .map(|c| Some(c.start_paragraph))
        .chain(std::iter::once(None))
        .collect();

    for (chapter, next_start) in chapters.iter_mut().zip(next_starts) {
        let end = match next_start {
            Some(next_start) => headings
                .iter()
                .find(|h| {
                    h.position > chapter.start_paragraph
                        && h.position < next_start
                        && h.level <= chapter.level
                })
                .map_or(next_start, |orphan| orphan.position)
                .saturating_sub(1),
            None => total_paragraphs.saturating_sub(1),
        };
        chapter.end_paragraph = end.max(chapter.start_paragraph);
    }
}
