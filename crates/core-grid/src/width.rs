//! Grapheme segmentation and display width for `put` text.
//!
//! All width decisions for the grid flow through `glyph_width`. Widths are
//! clamped into `0..=2`: the grid only knows narrow cells, wide cells (leader +
//! continuation) and zero-width clusters that attach to the previous cell.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Iterate extended grapheme clusters.
pub fn clusters(text: &str) -> impl Iterator<Item = &str> {
    text.graphemes(true)
}

/// Column width of a single grapheme cluster.
///
/// Control characters report 0 from `unicode-width`; the protocol never sends
/// them inside `put`, so treating them as zero-width is harmless.
#[inline]
pub fn glyph_width(cluster: &str) -> usize {
    if cluster.is_empty() {
        return 0;
    }
    UnicodeWidthStr::width(cluster).min(2)
}

/// Total columns occupied by `text`.
pub fn text_width(text: &str) -> usize {
    clusters(text).map(glyph_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_narrow() {
        assert_eq!(glyph_width("a"), 1);
    }

    #[test]
    fn cjk_is_wide() {
        assert_eq!(glyph_width("界"), 2);
    }

    #[test]
    fn combining_sequence_stays_one_cluster() {
        let v: Vec<_> = clusters("e\u{0301}x").collect();
        assert_eq!(v, vec!["e\u{0301}", "x"]);
        assert_eq!(glyph_width(v[0]), 1);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(glyph_width(""), 0);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn mixed_text_width() {
        assert_eq!(text_width("a界b"), 4);
    }
}
