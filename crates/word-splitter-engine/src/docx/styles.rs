use std::collections::HashMap;

use super::{LoadError, STYLES_PART, WML_NS, is_wml, wml, wml_attr};

/// A paragraph style as declared in `word/styles.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleInfo {
    pub name: String,
    /// 0-based `outlineLvl` set on the style itself.
    pub outline_level: Option<u8>,
}

/// Paragraph styles by id, plus the document's default paragraph style.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, StyleInfo>,
    default_style: Option<String>,
}

impl StyleSheet {
    pub fn parse(xml: &str) -> Result<Self, LoadError> {
        let doc = roxmltree::Document::parse(xml).map_err(|source| LoadError::Xml {
            part: STYLES_PART,
            source,
        })?;

        let mut sheet = Self::default();
        for style in doc.root_element().children().filter(|n| is_wml(*n, "style")) {
            if style.attribute((WML_NS, "type")) != Some("paragraph") {
                continue;
            }
            let Some(id) = style.attribute((WML_NS, "styleId")) else {
                continue;
            };

            let name = wml_attr(style, "name").unwrap_or(id).to_string();
            let outline_level = wml(style, "pPr")
                .and_then(|ppr| wml_attr(ppr, "outlineLvl"))
                .and_then(|v| v.parse().ok());

            if style
                .attribute((WML_NS, "default"))
                .is_some_and(|v| matches!(v, "1" | "true" | "on"))
            {
                sheet.default_style = Some(id.to_string());
            }
            sheet.styles.insert(id.to_string(), StyleInfo { name, outline_level });
        }

        Ok(sheet)
    }

    pub fn get(&self, id: &str) -> Option<&StyleInfo> {
        self.styles.get(id)
    }

    /// Display name for a paragraph's `w:pStyle` id.
    ///
    /// Paragraphs without a style use the default paragraph style. Ids
    /// missing from the sheet are mapped through the built-in heading ids
    /// (`Heading2` becomes `heading 2`) or used verbatim.
    pub fn resolve(&self, id: Option<&str>) -> Option<StyleInfo> {
        let id = id.or(self.default_style.as_deref())?;
        if let Some(info) = self.styles.get(id) {
            return Some(info.clone());
        }

        Some(StyleInfo {
            name: builtin_name(id).unwrap_or_else(|| id.to_string()),
            outline_level: None,
        })
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn builtin_name(id: &str) -> Option<String> {
    let digits = id.strip_prefix("Heading").or_else(|| id.strip_prefix("heading"))?;
    let level: u8 = digits.parse().ok()?;
    Some(format!("heading {level}"))
}
