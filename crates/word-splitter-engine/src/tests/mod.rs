//! Shared fixtures for unit tests.

use std::path::Path;

use crate::docx::{DOCUMENT_PART, Package, STYLES_PART, SourceDocument, WML_NS};

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builds small but well-formed docx packages in memory.
#[derive(Debug, Default)]
pub struct DocxFixture {
    body: String,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(self, level: u8, text: &str) -> Self {
        self.raw(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
        ))
    }

    pub fn paragraph(self, text: &str) -> Self {
        self.raw(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
    }

    pub fn table(self, cell: &str) -> Self {
        self.raw(&format!(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{cell}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"
        ))
    }

    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WML_NS}" xmlns:r="{REL_NS}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            self.body
        )
    }

    pub fn package(&self) -> Package {
        let mut package = Package::default();
        package.set_part(
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_vec(),
        );
        package.set_part(DOCUMENT_PART, self.document_xml().into_bytes());
        package.set_part(STYLES_PART, styles_xml().into_bytes());
        package
    }

    pub fn source(&self) -> SourceDocument {
        self.source_at("fixture.docx")
    }

    pub fn source_at(&self, path: impl AsRef<Path>) -> SourceDocument {
        SourceDocument::from_package(path.as_ref(), self.package()).unwrap()
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.package().to_bytes().unwrap()).unwrap();
    }
}

fn styles_xml() -> String {
    let headings: String = (1..=6)
        .map(|level| {
            format!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/></w:style>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{WML_NS}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>{headings}</w:styles>"#
    )
}
