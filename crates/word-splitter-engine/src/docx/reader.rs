use std::ops::Range;
use std::path::{Path, PathBuf};

use log::debug;

use super::styles::StyleSheet;
use super::{
    DOCUMENT_PART, LoadError, Package, STYLES_PART, is_wml, wml, wml_attr, wml_bool, wml_val,
};
use crate::models::{BodyElement, ElementOrder, Paragraph, Run};

/// Wrapper elements whose runs still belong to the paragraph text.
const RUN_CONTAINERS: [&str; 7] = [
    "hyperlink",
    "ins",
    "smartTag",
    "fldSimple",
    "customXml",
    "sdt",
    "sdtContent",
];

/// A loaded source document: what the outline phases need plus everything
/// required to write chapters back out.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub paragraphs: Vec<Paragraph>,
    pub elements: ElementOrder,
    pub(crate) package: Package,
    pub(crate) layout: BodyLayout,
}

/// Byte ranges of the body and its children inside `word/document.xml`.
#[derive(Debug, Clone, Default)]
pub(crate) struct BodyLayout {
    pub xml: String,
    pub body: Range<usize>,
    /// Qualified tag name as written in the source, usually `w:body`.
    pub body_tag: String,
    pub section: Option<Range<usize>>,
    pub paragraphs: Vec<Range<usize>>,
    pub tables: Vec<Range<usize>>,
}

impl BodyLayout {
    pub fn head(&self) -> &str {
        &self.xml[..self.body.start]
    }

    pub fn tail(&self) -> &str {
        &self.xml[self.body.end..]
    }

    pub fn slice(&self, range: &Range<usize>) -> &str {
        &self.xml[range.clone()]
    }
}

impl SourceDocument {
    pub fn from_package(path: impl Into<PathBuf>, package: Package) -> Result<Self, LoadError> {
        let path = path.into();
        let styles = match package.part_text(STYLES_PART)? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };
        let xml = package
            .part_text(DOCUMENT_PART)?
            .ok_or(LoadError::MissingPart(DOCUMENT_PART))?;

        let (paragraphs, elements, layout) = read_body(xml, &styles)?;
        debug!(
            "Loaded {}: {} paragraphs, {} tables, {} styles",
            path.display(),
            paragraphs.len(),
            layout.tables.len(),
            styles.len()
        );

        Ok(Self {
            path,
            paragraphs,
            elements,
            package,
            layout,
        })
    }

    pub fn table_count(&self) -> usize {
        self.layout.tables.len()
    }

    /// File stem of the source, used to name its output directory.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension of the source including the leading dot, `.docx` if none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".docx".to_string())
    }
}

/// Read a Word document from disk.
pub fn load_document(path: &Path) -> Result<SourceDocument, LoadError> {
    let package = Package::read(path)?;
    SourceDocument::from_package(path, package)
}

fn read_body(
    xml: String,
    styles: &StyleSheet,
) -> Result<(Vec<Paragraph>, ElementOrder, BodyLayout), LoadError> {
    let doc = roxmltree::Document::parse(&xml).map_err(|source| LoadError::Xml {
        part: DOCUMENT_PART,
        source,
    })?;
    let body = wml(doc.root_element(), "body").ok_or(LoadError::MissingBody)?;

    let mut paragraphs = Vec::new();
    let mut elements = ElementOrder::new();
    let mut layout = BodyLayout {
        body: body.range(),
        body_tag: qualified_tag(&xml, body.range().start),
        ..BodyLayout::default()
    };

    for child in body.children().filter(|n| n.is_element()) {
        if is_wml(child, "p") {
            elements.push(BodyElement::Paragraph(paragraphs.len()));
            paragraphs.push(read_paragraph(child, styles));
            layout.paragraphs.push(child.range());
        } else if is_wml(child, "tbl") {
            elements.push(BodyElement::Table(layout.tables.len()));
            layout.tables.push(child.range());
        } else if is_wml(child, "sectPr") {
            layout.section = Some(child.range());
        }
    }

    drop(doc);
    layout.xml = xml;
    Ok((paragraphs, elements, layout))
}

/// The element name exactly as spelled at `start`, prefix included.
fn qualified_tag(xml: &str, start: usize) -> String {
    xml[start..]
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("w:body")
        .to_string()
}

fn read_paragraph(node: roxmltree::Node, styles: &StyleSheet) -> Paragraph {
    let ppr = wml(node, "pPr");
    let style = styles.resolve(ppr.and_then(|p| wml_attr(p, "pStyle")));
    let direct_outline = ppr
        .and_then(|p| wml_attr(p, "outlineLvl"))
        .and_then(|v| v.trim().parse().ok());

    let mut runs = Vec::new();
    collect_runs(node, &mut runs);

    Paragraph {
        text: runs.iter().map(|r| r.text.as_str()).collect(),
        outline_level: direct_outline.or(style.as_ref().and_then(|s| s.outline_level)),
        style_name: style.map(|s| s.name),
        runs,
    }
}

fn collect_runs(node: roxmltree::Node, runs: &mut Vec<Run>) {
    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "r") {
            runs.push(read_run(child));
        } else if RUN_CONTAINERS.iter().any(|name| is_wml(child, name)) {
            collect_runs(child, runs);
        }
    }
}

fn read_run(node: roxmltree::Node) -> Run {
    let mut text = String::new();
    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "t") {
            text.push_str(child.text().unwrap_or_default());
        } else if is_wml(child, "tab") {
            text.push('\t');
        } else if is_wml(child, "br") || is_wml(child, "cr") {
            text.push('\n');
        }
    }

    let rpr = wml(node, "rPr");
    Run {
        text,
        bold: rpr.and_then(|r| wml_bool(r, "b")),
        size_pt: rpr
            .and_then(|r| wml(r, "sz"))
            .and_then(wml_val)
            .and_then(|v| v.parse::<f32>().ok())
            .map(|half_points| half_points / 2.0),
    }
}
