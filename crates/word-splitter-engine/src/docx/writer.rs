use std::collections::BTreeSet;
use std::io::{Cursor, Seek, Write};
use std::ops::RangeInclusive;

use super::{DOCUMENT_PART, SourceDocument};
use crate::models::BodyElement;

impl SourceDocument {
    /// `word/document.xml` for a document holding only the given paragraphs
    /// and tables, in their original order.
    ///
    /// The XML prologue, root element and final section properties are kept
    /// from the source; every copied element is byte-identical to its source.
    pub fn chapter_xml(&self, paragraphs: &RangeInclusive<usize>, tables: &BTreeSet<usize>) -> String {
        let layout = &self.layout;
        let tag = layout.body_tag.as_str();

        let mut xml = String::with_capacity(layout.xml.len());
        xml.push_str(layout.head());
        xml.push('<');
        xml.push_str(tag);
        xml.push('>');

        for element in &self.elements {
            let range = match *element {
                BodyElement::Paragraph(index) if paragraphs.contains(&index) => {
                    layout.paragraphs.get(index)
                }
                BodyElement::Table(index) if tables.contains(&index) => layout.tables.get(index),
                _ => None,
            };
            if let Some(range) = range {
                xml.push_str(layout.slice(range));
            }
        }

        if let Some(section) = &layout.section {
            xml.push_str(layout.slice(section));
        }

        xml.push_str("</");
        xml.push_str(tag);
        xml.push('>');
        xml.push_str(layout.tail());
        xml
    }

    /// Write a complete chapter package: every source part unchanged except
    /// the document body.
    pub fn write_chapter<W: Write + Seek>(
        &self,
        writer: W,
        paragraphs: &RangeInclusive<usize>,
        tables: &BTreeSet<usize>,
    ) -> zip::result::ZipResult<W> {
        let xml = self.chapter_xml(paragraphs, tables);
        self.package
            .write_with(writer, (DOCUMENT_PART, xml.as_bytes()))
    }

    pub fn chapter_bytes(
        &self,
        paragraphs: &RangeInclusive<usize>,
        tables: &BTreeSet<usize>,
    ) -> zip::result::ZipResult<Vec<u8>> {
        Ok(self
            .write_chapter(Cursor::new(Vec::new()), paragraphs, tables)?
            .into_inner())
    }
}
