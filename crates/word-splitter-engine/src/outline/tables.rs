use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::models::BodyElement;

/// Tables that belong to the chapter covering `paragraphs`.
///
/// A table belongs to the chapter owning the paragraph physically before it.
/// Tables that precede every paragraph belong to no chapter.
pub fn associate(elements: &[BodyElement], paragraphs: &RangeInclusive<usize>) -> BTreeSet<usize> {
    let mut previous_paragraph = None;
    let mut tables = BTreeSet::new();

    for element in elements {
        match *element {
            BodyElement::Paragraph(index) => previous_paragraph = Some(index),
            BodyElement::Table(table) => {
                if previous_paragraph.is_some_and(|p| paragraphs.contains(&p)) {
                    tables.insert(table);
                }
            }
        }
    }

    tables
}
