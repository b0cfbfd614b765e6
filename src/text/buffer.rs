//! Document storage: a rope of [`Segment`]s plus a per-line highlight table.
//!
//! This module provides [`TextBuffer`], the read/display-oriented document
//! model. For editing with cursor movement and undo/redo, wrap this in an
//! [`EditBuffer`](super::EditBuffer).

use crate::error::{Error, Result};
use crate::highlight::SyntaxStyleRegistry;
use crate::rope::Rope;
use crate::style::Style;
use crate::text::segment::{Segment, StyledChunk, StyledSegment};
use crate::unicode::WidthMethod;
use std::ops::Range;
use std::path::Path;
use std::rc::Rc;

fn line_width(text: &str, tab_width: u8, method: WidthMethod) -> u32 {
    let mut col: u32 = 0;
    for g in unicode_segmentation::UnicodeSegmentation::graphemes(text, true) {
        if g == "\t" {
            let tw = u32::from(tab_width.max(1));
            col += tw - (col % tw);
        } else {
            col += crate::unicode::display_width_with_method(g, method) as u32;
        }
    }
    col
}

/// Turn a freshly-set document string into a sequence of rope segments:
/// one `TextChunk` per line, separated by `HardBreak`s. A trailing newline
/// produces a final empty line, matching common rope/line conventions.
fn segments_from_text(
    arena: &Rc<str>,
    tab_width: u8,
    method: WidthMethod,
) -> Vec<Segment> {
    let text: &str = arena;
    if text.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            let width = line_width(&text[start..i], tab_width, method);
            let ascii_only = text[start..i].is_ascii();
            out.push(Segment::text_chunk(
                Rc::clone(arena),
                start..i,
                width,
                ascii_only,
                None,
            ));
            out.push(Segment::HardBreak);
            start = i + 1;
        }
    }
    let width = line_width(&text[start..], tab_width, method);
    let ascii_only = text[start..].is_ascii();
    out.push(Segment::text_chunk(
        Rc::clone(arena),
        start..text.len(),
        width,
        ascii_only,
        None,
    ));
    out
}

/// Document storage: rope of content segments, a byte arena, a width method,
/// a tab width, a per-line highlight table, and an optional style registry.
///
/// The rope is rebuilt wholesale on every `set_text`/`set_styled_text` call.
/// [`super::EditBuffer`] drives single-character typing through this same
/// path: it splices the plain text and calls `set_text` again, trading
/// incremental rope surgery for a document model simple enough to reason
/// about at the character-offset granularity cursors use.
#[derive(Clone, Default)]
pub struct TextBuffer {
    rope: Rope<Segment>,
    segments: Vec<StyledSegment>,
    default_style: Style,
    tab_width: u8,
    width_method: WidthMethod,
    syntax_styles: Option<Rc<SyntaxStyleRegistry>>,
    revision: u64,
}

impl TextBuffer {
    /// Create an empty text buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::init(),
            segments: Vec::new(),
            default_style: Style::NONE,
            tab_width: 4,
            width_method: WidthMethod::default(),
            syntax_styles: None,
            revision: 0,
        }
    }

    /// Create a buffer with initial text.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.set_text(text);
        buf
    }

    /// Set the default style for unstyled text.
    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    #[must_use]
    pub fn default_style(&self) -> Style {
        self.default_style
    }

    pub fn set_tab_width(&mut self, width: u8) {
        self.tab_width = width;
        self.bump_revision();
    }

    #[must_use]
    pub fn tab_width(&self) -> u8 {
        self.tab_width
    }

    pub fn set_width_method(&mut self, method: WidthMethod) {
        self.width_method = method;
        self.bump_revision();
    }

    #[must_use]
    pub fn width_method(&self) -> WidthMethod {
        self.width_method
    }

    /// Attach a syntax style registry for style-id based highlights.
    pub fn set_syntax_styles(&mut self, registry: Rc<SyntaxStyleRegistry>) {
        self.syntax_styles = Some(registry);
    }

    pub fn clear_syntax_styles(&mut self) {
        self.syntax_styles = None;
    }

    /// Set the text content from a fresh arena, clearing all segments.
    pub fn set_text(&mut self, text: &str) {
        let arena: Rc<str> = Rc::from(text);
        let items = segments_from_text(&arena, self.tab_width, self.width_method);
        self.rope = Rope::from_slice(items);
        self.segments.clear();
        self.bump_revision();
    }

    /// Load a document's text from disk, delegating I/O to the host OS.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(Error::from)?;
        self.set_text(&text);
        Ok(())
    }

    /// Append text to the buffer as a new arena (no coalescing with existing content).
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let arena: Rc<str> = Rc::from(text);
        let items = segments_from_text(&arena, self.tab_width, self.width_method);
        for item in items {
            self.rope.append(item);
        }
        self.bump_revision();
    }

    /// Set styled text content from chunks, each becoming its own arena and
    /// an optional highlight entry.
    pub fn set_styled_text(&mut self, chunks: &[StyledChunk<'_>]) {
        self.rope = Rope::init();
        self.segments.clear();
        self.bump_revision();

        let mut offset = 0usize;
        let mut combined = String::new();
        for chunk in chunks {
            combined.push_str(chunk.text);
        }
        let arena: Rc<str> = Rc::from(combined);

        for chunk in chunks {
            let start = offset;
            let end = offset + chunk.text.len();
            for (i, line) in chunk.text.split('\n').enumerate() {
                if i > 0 {
                    self.rope.append(Segment::HardBreak);
                }
                let line_start = start + chunk_line_offset(chunk.text, i);
                let line_end = line_start + line.len();
                let width = line_width(line, self.tab_width, self.width_method);
                self.rope.append(Segment::text_chunk(
                    Rc::clone(&arena),
                    line_start..line_end,
                    width,
                    line.is_ascii(),
                    None,
                ));
            }
            if !chunk.style.is_empty() {
                self.segments
                    .push(StyledSegment::new(start..end, chunk.style));
            }
            offset = end;
        }
    }

    pub fn clear(&mut self) {
        self.rope = Rope::init();
        self.segments.clear();
        self.bump_revision();
    }

    pub fn reset(&mut self) {
        self.clear();
    }

    /// Number of bytes in the document's plain text.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        let mut total = 0usize;
        self.rope.walk(|seg| total += seg.byte_len());
        total
    }

    #[must_use]
    pub fn get_length(&self) -> u32 {
        self.len_bytes() as u32
    }

    /// Number of `char`s in the document's plain text.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.to_string().chars().count()
    }

    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.metrics().break_count as usize + 1
    }

    #[must_use]
    pub fn get_line_count(&self) -> u32 {
        self.len_lines() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len_bytes() == 0
    }

    /// Write the document's plain text into `buf`, returning the byte count written.
    pub fn get_plain_text_into(&self, buf: &mut String) -> usize {
        let start = buf.len();
        self.rope.walk(|seg| {
            if let Some(s) = seg.as_str() {
                buf.push_str(s);
            } else if matches!(seg, Segment::HardBreak) {
                buf.push('\n');
            }
        });
        buf.len() - start
    }

    fn lines_vec(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        self.rope.walk(|seg| match seg {
            Segment::HardBreak => lines.push(std::mem::take(&mut current)),
            _ => {
                if let Some(s) = seg.as_str() {
                    current.push_str(s);
                }
            }
        });
        lines.push(current);
        lines
    }

    #[must_use]
    pub fn line(&self, idx: usize) -> Option<String> {
        self.lines_vec().into_iter().nth(idx)
    }

    pub fn lines(&self) -> impl Iterator<Item = String> {
        self.lines_vec().into_iter()
    }

    #[must_use]
    pub fn rope(&self) -> &Rope<Segment> {
        &self.rope
    }

    pub fn rope_mut(&mut self) -> &mut Rope<Segment> {
        self.bump_revision();
        &mut self.rope
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Convert a char index to a byte offset in the plain text.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        let text = self.to_string();
        text.char_indices()
            .nth(char_idx)
            .map_or(text.len(), |(b, _)| b)
    }

    /// Convert a `(row, col)` position (col in chars) to a byte offset.
    #[must_use]
    pub fn coords_to_byte(&self, row: usize, col: usize) -> usize {
        let lines = self.lines_vec();
        let mut byte = 0usize;
        for (i, line) in lines.iter().enumerate() {
            if i == row {
                return byte
                    + line
                        .char_indices()
                        .nth(col)
                        .map_or(line.len(), |(b, _)| b);
            }
            byte += line.len() + 1; // +1 for the consumed '\n'
        }
        byte
    }

    /// Add a highlight (styled overlay) over a byte range.
    pub fn add_highlight(&mut self, range: Range<usize>, style: Style, priority: u8) {
        self.segments
            .push(StyledSegment::new(range, style).with_priority(priority));
    }

    /// Add a highlight by char range, grouped for later batch removal.
    pub fn add_highlight_by_char_range(
        &mut self,
        char_start: usize,
        char_end: usize,
        style: Style,
        priority: u8,
        group: Option<u16>,
    ) {
        let start = self.char_to_byte(char_start);
        let end = self.char_to_byte(char_end);
        let mut segment = StyledSegment::new(start..end, style).with_priority(priority);
        segment = segment.with_ref(group.unwrap_or(0));
        self.segments.push(segment);
    }

    /// Add a highlight spanning `(row_start, col_start)..(row_end, col_end)`.
    pub fn add_highlight_by_coords(
        &mut self,
        row_start: usize,
        col_start: usize,
        row_end: usize,
        col_end: usize,
        style: Style,
        priority: u8,
        group: Option<u16>,
    ) {
        let start = self.coords_to_byte(row_start, col_start);
        let end = self.coords_to_byte(row_end, col_end);
        if start >= end {
            return;
        }
        let mut segment = StyledSegment::new(start..end, style).with_priority(priority);
        segment = segment.with_ref(group.unwrap_or(0));
        self.segments.push(segment);
    }

    /// Add a highlight using a syntax style ID resolved through the registry.
    pub fn add_highlight_with_style_id(
        &mut self,
        line: usize,
        col_start: usize,
        col_end: usize,
        style_id: u32,
        priority: u8,
        group: Option<u16>,
    ) {
        let Some(registry) = self.syntax_styles.clone() else {
            return;
        };
        let Some(style) = registry.style(style_id) else {
            return;
        };
        self.add_highlight_by_coords(line, col_start, line, col_end, style, priority, group);
    }

    pub fn clear_highlights(&mut self) {
        self.segments.retain(|seg| seg.ref_id.is_none());
    }

    pub fn remove_highlights_by_ref(&mut self, ref_id: u16) {
        self.segments.retain(|seg| seg.ref_id != Some(ref_id));
    }

    /// Highlights overlapping a given source line.
    #[must_use]
    pub fn get_line_highlights(&self, row: usize) -> Vec<StyledSegment> {
        let line_start = self.coords_to_byte(row, 0);
        let line_len = self.line(row).map_or(0, |l| l.len());
        let line_end = line_start + line_len;
        self.segments_in_range(line_start..line_end).cloned().collect()
    }

    /// Segments overlapping a byte range.
    pub fn segments_in_range(&self, range: Range<usize>) -> impl Iterator<Item = &StyledSegment> {
        self.segments
            .iter()
            .filter(move |seg| seg.range.start < range.end && range.start < seg.range.end)
    }

    /// Resolved style at a byte position: overlapping highlights are applied
    /// from lowest to highest priority (ties broken by ascending group, then
    /// original insertion order), so the highest-priority overlay wins.
    #[must_use]
    pub fn style_at(&self, pos: usize) -> Style {
        let mut matches: Vec<&StyledSegment> =
            self.segments.iter().filter(|s| s.contains(pos)).collect();
        matches.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.ref_id.cmp(&b.ref_id)));

        let mut style = self.default_style;
        for seg in matches {
            style = style.merge(seg.style);
        }
        style
    }

    /// Convert to plain string.
    #[must_use]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        let mut buf = String::with_capacity(self.len_bytes());
        self.get_plain_text_into(&mut buf);
        buf
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("len_bytes", &self.len_bytes())
            .field("len_lines", &self.len_lines())
            .field("revision", &self.revision)
            .finish()
    }
}

fn chunk_line_offset(text: &str, line_idx: usize) -> usize {
    text.split('\n')
        .take(line_idx)
        .map(|l| l.len() + 1)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_buffer_basic() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("Hello, world!");
        assert_eq!(buffer.len_chars(), 13);
    }

    #[test]
    fn test_buffer_lines_and_count() {
        let buffer = TextBuffer::with_text("a\nbb\nccc");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(1), Some("bb".to_string()));
        assert_eq!(buffer.to_string(), "a\nbb\nccc");
    }

    #[test]
    fn test_buffer_trailing_newline_adds_empty_line() {
        let buffer = TextBuffer::with_text("one\n");
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(buffer.line(1), Some(String::new()));
    }

    #[test]
    fn test_buffer_styled_text() {
        let mut buffer = TextBuffer::new();
        buffer.set_styled_text(&[
            StyledChunk::new("Hello", Style::bold()),
            StyledChunk::plain(", "),
            StyledChunk::new("world", Style::fg(Rgba::RED)),
        ]);

        assert_eq!(buffer.to_string(), "Hello, world");
    }

    #[test]
    fn test_buffer_highlight() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("Hello, world!");
        buffer.add_highlight(0..5, Style::bold(), 0);

        assert!(
            buffer
                .style_at(0)
                .attributes
                .contains(crate::style::TextAttributes::BOLD)
        );
        assert!(
            !buffer
                .style_at(6)
                .attributes
                .contains(crate::style::TextAttributes::BOLD)
        );
    }

    #[test]
    fn test_buffer_highlight_by_char_range_and_ref() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("Hello, world!");
        buffer.add_highlight_by_char_range(7, 12, Style::underline(), 1, Some(42));
        assert!(
            buffer
                .style_at(buffer.char_to_byte(8))
                .attributes
                .contains(crate::style::TextAttributes::UNDERLINE)
        );

        buffer.remove_highlights_by_ref(42);
        assert!(
            !buffer
                .style_at(buffer.char_to_byte(8))
                .attributes
                .contains(crate::style::TextAttributes::UNDERLINE)
        );
    }

    #[test]
    fn test_highlight_priority_resolution() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("Hello");
        buffer.add_highlight(0..5, Style::fg(Rgba::RED), 0);
        buffer.add_highlight(0..5, Style::fg(Rgba::BLUE), 5);
        assert_eq!(buffer.style_at(0).fg, Some(Rgba::BLUE));
    }

    #[test]
    fn test_get_line_highlights() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("aaa\nbbb\nccc");
        buffer.add_highlight_by_coords(1, 0, 1, 3, Style::bold(), 0, None);
        assert_eq!(buffer.get_line_highlights(1).len(), 1);
        assert_eq!(buffer.get_line_highlights(0).len(), 0);
    }

    #[test]
    fn test_lines_iter() {
        let buffer = TextBuffer::with_text("Line 1\nLine 2");
        let lines: Vec<String> = buffer.lines().collect();
        assert_eq!(lines, vec!["Line 1".to_string(), "Line 2".to_string()]);
    }

    #[test]
    fn test_get_plain_text_into() {
        let buffer = TextBuffer::with_text("abc\ndef");
        let mut buf = String::new();
        let written = buffer.get_plain_text_into(&mut buf);
        assert_eq!(buf, "abc\ndef");
        assert_eq!(written, 7);
    }

    #[test]
    fn test_load_file_missing_is_io_error() {
        let mut buffer = TextBuffer::new();
        let err = buffer.load_file("/nonexistent/path/for/textcore_rs").unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
    }
}
