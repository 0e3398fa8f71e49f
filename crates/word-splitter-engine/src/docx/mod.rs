//! # Docx Packages
//!
//! Reading and writing WordprocessingML packages.
//!
//! - **`package`**: the zip container, held in memory part by part
//! - **`styles`**: style id to display name resolution from `word/styles.xml`
//! - **`reader`**: `SourceDocument`, the body's paragraphs, tables and their
//!   byte ranges inside `word/document.xml`
//! - **`writer`**: a chapter's `word/document.xml` spliced from those ranges
//!
//! The source markup is never re-serialised: chapter documents are built by
//! copying byte ranges of the original XML, so every attribute survives even
//! when this crate does not understand it.

pub mod package;
pub mod reader;
pub mod styles;
pub mod writer;

use std::path::PathBuf;

pub use package::Package;
pub use reader::{SourceDocument, load_document};

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Legacy binary Word documents are not supported")]
    UnsupportedFormat,
    #[error("Not a valid document package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Missing package part: {0}")]
    MissingPart(&'static str),
    #[error("Package part {0} is not valid UTF-8")]
    Encoding(&'static str),
    #[error("Invalid XML in {part}: {source}")]
    Xml {
        part: &'static str,
        source: roxmltree::Error,
    },
    #[error("Document has no body")]
    MissingBody,
}

/// Whether `node` is the WordprocessingML element `name`.
pub(crate) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(crate) fn wml<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| is_wml(*n, name))
}

pub(crate) fn wml_val<'a, 'input>(node: roxmltree::Node<'a, 'input>) -> Option<&'a str> {
    node.attribute((WML_NS, "val"))
}

pub(crate) fn wml_attr<'a, 'input>(node: roxmltree::Node<'a, 'input>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(wml_val)
}

/// WML toggle property such as `w:b`: present without a false `w:val` means on.
pub(crate) fn wml_bool(node: roxmltree::Node, name: &str) -> Option<bool> {
    wml(node, name).map(|n| wml_val(n).is_none_or(|v| !matches!(v, "0" | "false" | "off")))
}
