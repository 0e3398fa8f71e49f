use crate::models::Heading;

/// Deepest heading level reached inside the branch opened by `headings[index]`.
///
/// The branch is the heading itself plus every following heading deeper than
/// `level`, and it closes at the first following heading at `level` or
/// shallower. Headings inside the branch cannot change any ancestor at
/// `level` or above, so they all share the ancestor chain of
/// `headings[index]`.
///
/// Returns `level` for a leaf heading or an out-of-range index.
pub fn max_depth(headings: &[Heading], index: usize, level: u8) -> u8 {
    let Some(rest) = headings.get(index + 1..) else {
        return level;
    };

    rest.iter()
        .take_while(|heading| heading.level > level)
        .map(|heading| heading.level)
        .fold(level, u8::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn outline(levels: &[u8]) -> Vec<Heading> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| Heading::new(level, format!("h{i}"), i))
            .collect()
    }

    #[rstest]
    // leaf heading
    #[case(&[1, 1], 0, 1)]
    // last heading in the document
    #[case(&[1, 2], 1, 2)]
    // nested chain
    #[case(&[1, 2, 3, 2], 0, 3)]
    // branch closes at the next sibling
    #[case(&[1, 2, 1, 2, 3], 0, 2)]
    #[case(&[1, 2, 1, 2, 3], 2, 3)]
    // non-contiguous jump from 1 to 4
    #[case(&[1, 4, 4, 1], 0, 4)]
    // shallower heading closes the branch too
    #[case(&[2, 3, 1, 5], 0, 3)]
    fn test_branch_depth(#[case] levels: &[u8], #[case] index: usize, #[case] expected: u8) {
        let headings = outline(levels);
        assert_eq!(max_depth(&headings, index, levels[index]), expected);
    }

    #[test]
    fn test_out_of_range_index() {
        let headings = outline(&[1, 2]);
        assert_eq!(max_depth(&headings, 5, 1), 1);
        assert_eq!(max_depth(&[], 0, 3), 3);
    }

    #[test]
    fn test_depth_never_below_own_level() {
        let headings = outline(&[3, 1]);
        assert_eq!(max_depth(&headings, 0, 3), 3);
    }
}
