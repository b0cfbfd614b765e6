//! Grapheme cluster iteration.

use crate::unicode::width::WidthMethod;
use crate::unicode::width::display_width_with_method;
use unicode_segmentation::UnicodeSegmentation;

/// Grapheme metadata for layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphemeInfo {
    pub byte_offset: u32,
    pub byte_len: u8,
    pub col_offset: u32,
    pub width: u8,
}

/// Iterator over grapheme clusters in a string.
pub struct GraphemeIterator<'a> {
    inner: unicode_segmentation::Graphemes<'a>,
}

impl<'a> Iterator for GraphemeIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Iterate over grapheme clusters in a string.
#[must_use]
pub fn graphemes(s: &str) -> GraphemeIterator<'_> {
    GraphemeIterator {
        inner: s.graphemes(true),
    }
}

/// Iterate over grapheme clusters with byte indices.
pub fn grapheme_indices(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.grapheme_indices(true)
}

/// True iff every byte is printable ASCII in `[0x20, 0x7E]` (so control
/// characters, DEL, and anything non-ASCII all disqualify the fast path).
/// An empty string is not "ASCII-only" — there's no text to take the fast
/// path on, so callers should fall through to the general path.
#[must_use]
pub fn is_ascii_only(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Enumerate display units for layout: one entry per extended grapheme
/// cluster in [`WidthMethod::Unicode`] mode (an emoji-ZWJ sequence or a
/// flag is a single entry), one entry per codepoint in
/// [`WidthMethod::WcWidth`] mode (the same sequence reports one entry per
/// constituent codepoint, each charged its own width).
#[must_use]
pub fn grapheme_info(s: &str, tab_width: u32, method: WidthMethod) -> Vec<GraphemeInfo> {
    match method {
        WidthMethod::Unicode => grapheme_info_by_cluster(s, tab_width),
        WidthMethod::WcWidth => grapheme_info_by_codepoint(s, tab_width),
    }
}

fn grapheme_info_by_cluster(s: &str, tab_width: u32) -> Vec<GraphemeInfo> {
    let mut infos = Vec::new();
    let mut col = 0u32;
    let tab_width = tab_width.max(1);

    for (byte_offset, grapheme) in s.grapheme_indices(true) {
        let width = if grapheme == "\t" {
            (tab_width - (col % tab_width)) as u8
        } else {
            crate::unicode::width::cluster_width(grapheme) as u8
        };

        infos.push(GraphemeInfo {
            byte_offset: byte_offset as u32,
            byte_len: grapheme.len() as u8,
            col_offset: col,
            width,
        });
        col += u32::from(width);
    }

    infos
}

fn grapheme_info_by_codepoint(s: &str, tab_width: u32) -> Vec<GraphemeInfo> {
    let mut infos = Vec::new();
    let mut col = 0u32;
    let tab_width = tab_width.max(1);

    for (byte_offset, ch) in s.char_indices() {
        let width = if ch == '\t' {
            (tab_width - (col % tab_width)) as u8
        } else {
            display_width_with_method(&ch.to_string(), WidthMethod::WcWidth) as u8
        };

        infos.push(GraphemeInfo {
            byte_offset: byte_offset as u32,
            byte_len: ch.len_utf8() as u8,
            col_offset: col,
            width,
        });
        col += u32::from(width);
    }

    infos
}
