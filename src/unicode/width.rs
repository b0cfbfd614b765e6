//! Display width calculation for terminal rendering.
//!
//! The two [`WidthMethod`]s differ in what counts as one display *unit*:
//! `WcWidth` measures every codepoint independently (so a base character
//! plus a combining mark, or a flag's two regional-indicator codepoints,
//! are each charged their own width), while `Unicode` measures whole
//! extended grapheme clusters as a single unit (so the same sequences
//! collapse to the width of their widest constituent codepoint).

use std::sync::atomic::{AtomicU8, Ordering};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width calculation method: per-codepoint (`WcWidth`) or per-grapheme-cluster (`Unicode`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: every codepoint is its own display unit.
    #[default]
    WcWidth,
    /// Extended grapheme clusters are single display units.
    Unicode,
}

const WIDTH_METHOD_WCWIDTH: u8 = 0;
const WIDTH_METHOD_UNICODE: u8 = 1;

static WIDTH_METHOD: AtomicU8 = AtomicU8::new(WIDTH_METHOD_WCWIDTH);

/// Set the global width method used by `display_width` helpers.
pub fn set_width_method(method: WidthMethod) {
    let value = match method {
        WidthMethod::WcWidth => WIDTH_METHOD_WCWIDTH,
        WidthMethod::Unicode => WIDTH_METHOD_UNICODE,
    };
    WIDTH_METHOD.store(value, Ordering::Relaxed);
}

/// Get the global width method.
#[must_use]
pub fn width_method() -> WidthMethod {
    match WIDTH_METHOD.load(Ordering::Relaxed) {
        WIDTH_METHOD_UNICODE => WidthMethod::Unicode,
        _ => WidthMethod::WcWidth,
    }
}

/// Get the display width of a string in terminal columns (global method).
#[must_use]
pub fn display_width(s: &str) -> usize {
    display_width_with_method(s, width_method())
}

/// Get the display width of a character in terminal columns (global method).
///
/// This includes a fast path for ASCII printable characters (0x20-0x7E)
/// which are always width 1 and are the most common case.
#[inline]
#[must_use]
pub fn display_width_char(c: char) -> usize {
    // Fast path: ASCII printable characters are always width 1
    // This covers the vast majority of terminal content
    if c.is_ascii() && (' '..='~').contains(&c) {
        return 1;
    }
    // Control characters (below space) have width 0
    if c < ' ' {
        return 0;
    }
    display_width_char_with_method(c, width_method())
}

/// Get the display width of a string in terminal columns using a specific method.
///
/// In [`WidthMethod::WcWidth`], every codepoint contributes its own width
/// (a combining mark adds 0, a flag's two regional indicators add 1 each).
/// In [`WidthMethod::Unicode`], the string is walked grapheme cluster by
/// grapheme cluster and each cluster contributes the width of its widest
/// constituent codepoint once — an emoji-ZWJ sequence or a skin-tone-
/// modified emoji is a single width-2 unit, not the sum of its parts.
#[must_use]
pub fn display_width_with_method(s: &str, method: WidthMethod) -> usize {
    match method {
        WidthMethod::WcWidth => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => s
            .graphemes(true)
            .map(|g| cluster_width(g))
            .sum(),
    }
}

/// Collapsed width of one extended grapheme cluster: the widest codepoint
/// it contains (combining marks and other zero-width codepoints vanish
/// into the base, matching the Unicode-mode cluster-as-unit rule).
///
/// Regional-indicator flag pairs are the one case the per-codepoint max
/// doesn't cover on its own: each half is individually narrow (Unicode's
/// East Asian Width table marks them `Neutral`), but the pair renders as a
/// single width-2 flag glyph, so it is special-cased here.
pub(crate) fn cluster_width(cluster: &str) -> usize {
    let mut chars = cluster.chars();
    if let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) {
        const RI_START: char = '\u{1F1E6}';
        const RI_END: char = '\u{1F1FF}';
        if (RI_START..=RI_END).contains(&a) && (RI_START..=RI_END).contains(&b) {
            return 2;
        }
    }
    cluster
        .chars()
        .map(|c| UnicodeWidthChar::width_cjk(c).unwrap_or(0))
        .max()
        .unwrap_or(0)
}

/// Get the display width of a character in terminal columns using a specific method.
///
/// Both methods agree at the single-codepoint granularity; the difference
/// between `WcWidth` and `Unicode` only appears once codepoints are grouped
/// into clusters (see [`display_width_with_method`]).
#[must_use]
pub fn display_width_char_with_method(c: char, method: WidthMethod) -> usize {
    match method {
        WidthMethod::WcWidth => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Check if a character is a zero-width character (global method).
#[must_use]
pub fn is_zero_width(c: char) -> bool {
    display_width_char(c) == 0
}

/// Check if a character is wide (takes 2 columns, global method).
#[must_use]
pub fn is_wide(c: char) -> bool {
    display_width_char(c) == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width_char('a'), 1);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(display_width("漢字"), 4);
        assert_eq!(display_width_char('漢'), 2);
        assert!(is_wide('漢'));
    }

    #[test]
    fn test_emoji_width() {
        // Simple emoji
        assert_eq!(display_width("\u{1F600}"), 2);
    }

    #[test]
    fn test_zero_width() {
        // Combining characters are zero width
        assert!(is_zero_width('\u{0301}')); // combining acute
    }

    #[test]
    fn test_width_methods() {
        // Ambiguous width character: Circled digit one (U+2460)
        // In WcWidth mode: 1, in CJK/Unicode mode: 2
        let ch = '\u{2460}';
        assert_eq!(display_width_char_with_method(ch, WidthMethod::WcWidth), 1);
        assert_eq!(display_width_char_with_method(ch, WidthMethod::Unicode), 2);
    }

    // Spec scenario F and sec 6: wcwidth charges every codepoint, unicode
    // collapses a cluster to its widest constituent.

    #[test]
    fn combining_mark_wcwidth_zero_unicode_folded_into_base() {
        let s = "e\u{0301}"; // e + combining acute, one grapheme cluster
        assert_eq!(display_width_with_method(s, WidthMethod::WcWidth), 1);
        assert_eq!(display_width_with_method(s, WidthMethod::Unicode), 1);
    }

    #[test]
    fn flag_emoji_both_methods_agree_at_width_two() {
        let flag = "\u{1F1FA}\u{1F1F8}"; // regional indicators U + S ("US")
        assert_eq!(display_width_with_method(flag, WidthMethod::WcWidth), 2);
        assert_eq!(display_width_with_method(flag, WidthMethod::Unicode), 2);
    }

    #[test]
    fn skin_tone_emoji_wcwidth_sums_unicode_collapses() {
        let s = "\u{1F44D}\u{1F3FB}"; // thumbs up + light skin tone modifier
        assert_eq!(display_width_with_method(s, WidthMethod::WcWidth), 4);
        assert_eq!(display_width_with_method(s, WidthMethod::Unicode), 2);
    }

    #[test]
    fn emoji_zwj_sequence_wcwidth_sums_constituents_unicode_single_unit() {
        // family: man + ZWJ + woman + ZWJ + girl
        let s = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(display_width_with_method(s, WidthMethod::WcWidth), 6);
        assert_eq!(display_width_with_method(s, WidthMethod::Unicode), 2);
    }
}
