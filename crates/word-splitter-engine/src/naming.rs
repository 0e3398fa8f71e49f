/// Placeholder used when a title sanitises to nothing.
pub const UNTITLED_CHAPTER: &str = "未命名章节";

/// Longest file stem produced, in characters.
pub const MAX_FILENAME_CHARS: usize = 100;

/// Longest single path component most file systems accept, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a chapter title safe to use as a file stem on every platform.
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .filter_map(|c| match c {
            '\u{3000}' | '\t' | '\n' | '\r' => Some(' '),
            c if ILLEGAL_CHARS.contains(&c) => Some('_'),
            c if is_removed_control(c) => None,
            c => Some(c),
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return UNTITLED_CHAPTER.to_string();
    }

    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

/// Output file name for a chapter. `extension` includes the leading dot.
///
/// The stem is cut on a character boundary so the whole name fits in
/// [`MAX_FILENAME_BYTES`]; only CJK or other multi-byte titles get that far.
pub fn chapter_file_name(title: &str, extension: &str) -> String {
    let stem = sanitize_filename(title);
    let budget = MAX_FILENAME_BYTES.saturating_sub(extension.len());
    let mut end = stem.len().min(budget);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{extension}", stem[..end].trim_end())
}

fn is_removed_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Characters that must never reach the file system.
pub fn is_forbidden(c: char) -> bool {
    ILLEGAL_CHARS.contains(&c) || c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Intro - Scope", "Intro - Scope")]
    #[case("a/b\\c", "a_b_c")]
    #[case("What? <Why>: \"this\" | *that*", "What_ _Why__ _this_ _ _that_")]
    #[case("  spaced\t\tout\n", "spaced out")]
    #[case("第一章\u{3000}总则", "第一章 总则")]
    #[case("bell\u{7}char", "bellchar")]
    #[case("c1\u{85}control", "c1control")]
    fn test_sanitize(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(title), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\u{3000}\t\r\n")]
    #[case("\u{1}\u{2}")]
    fn test_empty_titles_use_placeholder(#[case] title: &str) {
        assert_eq!(sanitize_filename(title), UNTITLED_CHAPTER);
    }

    #[test]
    fn test_length_is_capped_in_characters() {
        let long = "章".repeat(250);
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_cjk_file_name_fits_byte_limit() {
        // Given a 100-character title of 3-byte characters
        let title = "第一章总则说明".repeat(15).chars().take(100).collect::<String>();
        assert_eq!(title.len(), 300);

        // When it becomes a file name
        let name = chapter_file_name(&title, ".docx");

        // Then the name fits and keeps as much of the title as possible
        assert!(name.len() <= MAX_FILENAME_BYTES, "{} bytes", name.len());
        assert!(name.ends_with(".docx"));
        let stem = name.trim_end_matches(".docx");
        assert!(title.starts_with(stem));
        assert_eq!(stem.chars().count(), 83);
    }

    #[test]
    fn test_short_file_names_are_untouched() {
        assert_eq!(chapter_file_name("Intro - Scope", ".docx"), "Intro - Scope.docx");
        assert_eq!(chapter_file_name(&"a".repeat(120), ".doc").len(), 104);
    }

    #[test]
    fn test_cut_stem_is_retrimmed() {
        // The space is the last byte that fits
        let title = format!("{} {}", "章".repeat(83), "章".repeat(10));
        let name = chapter_file_name(&title, ".docx");
        assert_eq!(name, format!("{}.docx", "章".repeat(83)));
    }

    #[test]
    fn test_never_emits_forbidden_characters() {
        let nasty: String = (0u32..0x200).filter_map(char::from_u32).collect();
        for title in [nasty.as_str(), "<>:\"/\\|?*", "\u{0}\u{1f}\u{7f}\u{9f}"] {
            let sanitized = sanitize_filename(title);
            assert!(!sanitized.is_empty());
            assert!(sanitized.chars().count() <= MAX_FILENAME_CHARS);
            assert!(
                !sanitized.chars().any(is_forbidden),
                "{sanitized:?} still contains forbidden characters"
            );
        }
    }
}
