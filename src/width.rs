//! Unicode column-width utilities
//!
//! Grounded in `dreg-core::buffer::Buffer::set_stringn`'s grapheme-aware width walk:
//! segment into extended grapheme clusters, then measure each cluster's display width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr as _;

/// The display-column width of `s`, summing the width of each grapheme cluster.
pub fn display_width(s: &str) -> u16 {
    UnicodeSegmentation::graphemes(s, true)
        .map(|g| g.width() as u16)
        .sum()
}

/// Take the substring of `s` spanning display columns `[start_col, start_col + len)`.
///
/// Both `start_col` and the resulting slice boundary always fall on a grapheme-cluster
/// boundary; if `len` would require splitting a wide grapheme, the slice stops short of
/// it (see [`split_point_columns`] for the boundary-rounding rule used by the span
/// engine when `len` isn't under the caller's control).
pub fn substring_by_display_columns(s: &str, start_col: u16, len: u16) -> String {
    let mut col = 0u16;
    let mut out = String::new();
    for g in UnicodeSegmentation::graphemes(s, true) {
        let w = g.width() as u16;
        if col >= start_col && col + w <= start_col + len {
            out.push_str(g);
        }
        col += w;
        if col >= start_col + len {
            break;
        }
    }
    out
}

/// Round `target_col` down to the nearest grapheme-column boundary in `s`, so that a
/// split at the returned column never slices a wide grapheme in half.
///
/// Returns `target_col` unchanged if it already falls on a boundary (including past
/// the end of `s`).
pub fn split_point_columns(s: &str, target_col: u16) -> u16 {
    let mut col = 0u16;
    let mut last_boundary = 0u16;
    for g in UnicodeSegmentation::graphemes(s, true) {
        if col == target_col {
            return target_col;
        }
        if col > target_col {
            return last_boundary;
        }
        last_boundary = col;
        col += g.width() as u16;
    }
    if col <= target_col {
        target_col
    } else {
        last_boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_width_is_length() {
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn wide_cjk_counts_double() {
        assert_eq!(display_width("界"), 2);
    }

    #[test]
    fn substring_picks_whole_graphemes() {
        assert_eq!(substring_by_display_columns("Hello, world!", 0, 5), "Hello");
        assert_eq!(substring_by_display_columns("Hello, world!", 7, 5), "world");
    }

    #[test]
    fn split_point_rounds_down_through_wide_glyph() {
        // "a" (1) + "界" (2) + "b" (1): columns are 0,1,1,2,3 (the wide glyph spans 1..3)
        let s = "a界b";
        assert_eq!(split_point_columns(s, 0), 0);
        assert_eq!(split_point_columns(s, 1), 1);
        assert_eq!(split_point_columns(s, 2), 1); // inside the wide glyph, rounds down
        assert_eq!(split_point_columns(s, 3), 3);
    }
}
