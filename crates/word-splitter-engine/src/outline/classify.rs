use regex::Regex;
use std::num::IntErrorKind;
use std::sync::LazyLock;

use crate::models::Paragraph;

/// Word reserves outline level 9 for body text.
const BODY_TEXT_OUTLINE_LEVEL: u8 = 9;

const MAX_HEADING_CHARS: usize = 50;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static CJK_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[一二三四五六七八九十]+、").unwrap());
static NUMERIC_ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[、.]").unwrap());
static CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(表格|图片|图表).*[：:]$").unwrap());
static ENDING_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(结束|完毕|完成)[。.]$").unwrap());
static CHAPTER_NUMBERING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(第[一二三四五六七八九十\d]+[章节部分]|\d+[.．]\d*\s*|[一二三四五六七八九十]+[、.]\s*)")
        .unwrap()
});
static SECTION_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+节").unwrap());
static DOTTED_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.．]\d+)*").unwrap());
static TRAILING_PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*$").unwrap());

const TOC_INDICATORS: [&str; 6] = ["目　　录", "目录", "......", "………", ".....", "-----"];

/// Assigns an outline level to a paragraph, 0 meaning "not a heading".
///
/// Implementations are total: any paragraph shape they do not recognise is
/// reported as level 0 rather than an error.
pub trait OutlineClassifier: Send + Sync {
    fn classify(&self, paragraph: &Paragraph) -> u8;

    /// Consult `fallback` whenever this classifier reports level 0.
    fn or_else<F>(self, fallback: F) -> WithFallback<Self, F>
    where
        Self: Sized,
        F: OutlineClassifier,
    {
        WithFallback {
            primary: self,
            fallback,
        }
    }
}

/// Classifies from style names and explicit outline levels only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralClassifier;

impl OutlineClassifier for StructuralClassifier {
    fn classify(&self, paragraph: &Paragraph) -> u8 {
        if let Some(level) = paragraph
            .style_name
            .as_deref()
            .and_then(|style| style_level(style, &paragraph.text))
        {
            return level;
        }

        match paragraph.outline_level {
            Some(raw) if raw < BODY_TEXT_OUTLINE_LEVEL => raw + 1,
            _ => 0,
        }
    }
}

/// Level implied by a style name, `None` when the name follows no known
/// heading convention.
fn style_level(style: &str, text: &str) -> Option<u8> {
    if let Some(suffix) = strip_prefix_ignore_ascii_case(style, "heading ") {
        return Some(parse_level(suffix.trim()).unwrap_or(1));
    }

    if style.contains("标题") {
        return Some(first_number(style).unwrap_or(1));
    }

    // Custom "样式N" styles are only headings when the text reads like one.
    if style.starts_with("样式") {
        let level = match first_number(style) {
            Some(n) if looks_like_heading(text) => n,
            _ => 0,
        };
        return Some(level);
    }

    None
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn first_number(s: &str) -> Option<u8> {
    parse_level(FIRST_NUMBER.find(s)?.as_str())
}

/// Numbers past `u8::MAX` saturate; they are still levels, just very deep ones.
fn parse_level(digits: &str) -> Option<u8> {
    match digits.parse::<u8>() {
        Ok(level) => Some(level),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u8::MAX),
        Err(_) => None,
    }
}

fn looks_like_heading(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if CJK_ORDINAL.is_match(text) || NUMERIC_ORDINAL.is_match(text) {
        return true;
    }
    text.chars().count() <= MAX_HEADING_CHARS && !text.contains('。')
}

/// Best-effort detection from visual cues: bold runs, large type and
/// chapter numbering.
///
/// Approximate by nature. Keep it behind [`StructuralClassifier`] via
/// [`OutlineClassifier::or_else`] so documents with real heading styles are
/// never second-guessed.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicClassifier {
    /// Minimum score for a paragraph to count as a heading.
    pub threshold: u32,
    /// Font size from which the first run counts as large type.
    pub large_font_pt: f32,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self {
            threshold: 3,
            large_font_pt: 12.0,
        }
    }
}

impl HeuristicClassifier {
    pub fn score(&self, paragraph: &Paragraph) -> u32 {
        let text = paragraph.text.trim();
        if paragraph.runs.is_empty() || text.is_empty() || is_excluded_text(text) {
            return 0;
        }

        let mut score = 0;
        if paragraph.runs.iter().any(|run| run.bold == Some(true)) {
            score += 2;
        }
        if paragraph.runs[0]
            .size_pt
            .is_some_and(|size| size >= self.large_font_pt)
        {
            score += 1;
        }
        if CHAPTER_NUMBERING.is_match(text) {
            score += 3;
        }
        score
    }
}

impl OutlineClassifier for HeuristicClassifier {
    fn classify(&self, paragraph: &Paragraph) -> u8 {
        if self.score(paragraph) < self.threshold {
            return 0;
        }
        numbering_depth(paragraph.text.trim())
    }
}

fn is_excluded_text(text: &str) -> bool {
    text.chars().count() > MAX_HEADING_CHARS
        || CAPTION.is_match(text)
        || ENDING_STATEMENT.is_match(text)
        || is_likely_toc_entry(text)
}

/// Table-of-contents lines carry dot leaders, page numbers or wide padding.
pub fn is_likely_toc_entry(text: &str) -> bool {
    TOC_INDICATORS.iter().any(|marker| text.contains(marker))
        || TRAILING_PAGE_NUMBER.is_match(text)
        || text.matches('　').count() > 2
        || text.matches(' ').count() > 10
}

fn numbering_depth(text: &str) -> u8 {
    if SECTION_NUMBERING.is_match(text) {
        return 2;
    }
    if let Some(m) = DOTTED_NUMBERING.find(text) {
        let components = m
            .as_str()
            .split(['.', '．'])
            .filter(|part| !part.is_empty())
            .count();
        return u8::try_from(components).unwrap_or(u8::MAX).max(1);
    }
    1
}

/// Pairs a primary classifier with a fallback for unclassified paragraphs.
#[derive(Debug, Clone, Copy)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: OutlineClassifier, F: OutlineClassifier> OutlineClassifier for WithFallback<P, F> {
    fn classify(&self, paragraph: &Paragraph) -> u8 {
        match self.primary.classify(paragraph) {
            0 => self.fallback.classify(paragraph),
            level => level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Run;
    use rstest::rstest;

    fn styled(style: &str, text: &str) -> Paragraph {
        Paragraph::new(text).with_style(style)
    }

    #[rstest]
    #[case("Heading 1", 1)]
    #[case("Heading 3", 3)]
    #[case("heading 2", 2)]
    #[case("Heading Custom", 1)]
    #[case("标题 1", 1)]
    #[case("标题 4", 4)]
    #[case("标题", 1)]
    #[case("Heading 300", u8::MAX)]
    #[case("标题 300", u8::MAX)]
    #[case("Normal", 0)]
    #[case("Body Text", 0)]
    fn test_style_names(#[case] style: &str, #[case] expected: u8) {
        let level = StructuralClassifier.classify(&styled(style, "Some heading"));
        assert_eq!(level, expected);
    }

    #[test]
    fn test_custom_numbered_style_requires_heading_like_text() {
        let short = styled("样式3", "一、总体要求");
        let sentence = styled(
            "样式3",
            "这是一个很长的正文段落，它包含句号。并且它的长度远远超过了一般标题的长度，所以不应当被识别为标题。",
        );
        assert_eq!(StructuralClassifier.classify(&short), 3);
        assert_eq!(StructuralClassifier.classify(&sentence), 0);
        assert_eq!(StructuralClassifier.classify(&styled("样式", "标题")), 0);
        assert_eq!(StructuralClassifier.classify(&styled("样式1000", "一、总体要求")), u8::MAX);
    }

    #[test]
    fn test_custom_style_does_not_fall_through_to_outline_level() {
        let paragraph = styled("样式2", "").with_outline_level(0);
        assert_eq!(StructuralClassifier.classify(&paragraph), 0);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(2, 3)]
    #[case(8, 9)]
    #[case(9, 0)]
    fn test_outline_level_attribute(#[case] raw: u8, #[case] expected: u8) {
        let paragraph = styled("Normal", "Text").with_outline_level(raw);
        assert_eq!(StructuralClassifier.classify(&paragraph), expected);
    }

    #[test]
    fn test_style_takes_priority_over_outline_level() {
        let paragraph = styled("Heading 2", "Text").with_outline_level(0);
        assert_eq!(StructuralClassifier.classify(&paragraph), 2);
    }

    #[test]
    fn test_unstyled_paragraph_is_not_a_heading() {
        assert_eq!(StructuralClassifier.classify(&Paragraph::new("plain")), 0);
    }

    fn bold(text: &str, size_pt: Option<f32>) -> Paragraph {
        Paragraph::new(text).with_runs(vec![Run {
            text: text.to_string(),
            bold: Some(true),
            size_pt,
        }])
    }

    #[test]
    fn test_heuristic_needs_enough_evidence() {
        let heuristic = HeuristicClassifier::default();
        // bold alone scores 2
        assert_eq!(heuristic.classify(&bold("Overview", None)), 0);
        // bold and large type reach the threshold
        assert_eq!(heuristic.classify(&bold("Overview", Some(14.0))), 1);
        // numbering alone reaches the threshold
        assert_eq!(heuristic.classify(&Paragraph::new("第一章 总则")), 1);
    }

    #[rstest]
    #[case("1.2 Scope", 2)]
    #[case("1.2.3 Details", 3)]
    #[case("一、总体要求", 1)]
    #[case("第二节 范围", 2)]
    fn test_heuristic_levels_follow_numbering(#[case] text: &str, #[case] expected: u8) {
        let heuristic = HeuristicClassifier::default();
        assert_eq!(heuristic.classify(&bold(text, None)), expected);
    }

    #[rstest]
    #[case("目录")]
    #[case("第一章 总则 ........ 12")]
    #[case("图表说明如下：")]
    #[case("本章结束。")]
    fn test_heuristic_rejects_non_headings(#[case] text: &str) {
        let heuristic = HeuristicClassifier::default();
        assert_eq!(heuristic.classify(&bold(text, Some(16.0))), 0);
    }

    #[test]
    fn test_toc_detection() {
        assert!(is_likely_toc_entry("Introduction 3"));
        assert!(is_likely_toc_entry("目　　录"));
        assert!(!is_likely_toc_entry("Introduction"));
    }

    #[test]
    fn test_fallback_only_consulted_for_unclassified_paragraphs() {
        let classifier = StructuralClassifier.or_else(HeuristicClassifier::default());
        assert_eq!(classifier.classify(&styled("Heading 4", "1.2 Scope")), 4);
        assert_eq!(classifier.classify(&bold("1.2 Scope", None)), 2);
        assert_eq!(classifier.classify(&Paragraph::new("plain body text")), 0);
    }
}
