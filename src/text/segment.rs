//! Rope payload: the closed sum of content kinds a document rope can hold,
//! plus the separate per-line highlight overlay.

use crate::rope::{Metrics, RopeItem};
use crate::style::Style;
use std::ops::Range;
use std::rc::Rc;

/// One item in a document's [`crate::rope::Rope`].
///
/// `TextChunk` references a byte range in a shared, reference-counted
/// backing string rather than owning a copy — cloning the `Rc<str>` handle
/// is the "ownership transfer via shared backing bytes" a separate
/// arena-id registry would otherwise provide. Hard breaks are never merged;
/// adjacent text chunks with the same style and contiguous bytes may be
/// (see [`Segment::try_merge`]).
#[derive(Clone, Debug)]
pub enum Segment {
    /// A run of text backed by a shared arena string.
    TextChunk {
        arena: Rc<str>,
        range: Range<usize>,
        width: u32,
        ascii_only: bool,
        style_id: Option<u32>,
    },
    /// An explicit line break. Always a real line boundary; never merged
    /// with a neighbor, never filtered as a sentinel.
    HardBreak,
    /// A zero-width marker located only by [`crate::rope::Rope::get_marker`]
    /// weight lookups (e.g. a line-start marker). Carries no content.
    Marker(u32),
}

impl Segment {
    /// Build a text chunk from a full arena string and a byte range, with
    /// the chunk's display width precomputed by the caller.
    #[must_use]
    pub fn text_chunk(
        arena: Rc<str>,
        range: Range<usize>,
        width: u32,
        ascii_only: bool,
        style_id: Option<u32>,
    ) -> Self {
        Self::TextChunk {
            arena,
            range,
            width,
            ascii_only,
            style_id,
        }
    }

    /// The text this segment contributes, or `None` for breaks/markers.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::TextChunk { arena, range, .. } => arena.get(range.clone()),
            Self::HardBreak | Self::Marker(_) => None,
        }
    }

    /// Byte length of the chunk's own text, 0 for breaks/markers.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::TextChunk { range, .. } => range.len(),
            Self::HardBreak | Self::Marker(_) => 0,
        }
    }

    /// Attempt to merge two adjacent text chunks sharing the same arena,
    /// style, and a contiguous byte range. Hard breaks and markers never merge.
    #[must_use]
    pub fn try_merge(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (
                Self::TextChunk {
                    arena: a1,
                    range: r1,
                    width: w1,
                    ascii_only: ao1,
                    style_id: s1,
                },
                Self::TextChunk {
                    arena: a2,
                    range: r2,
                    width: w2,
                    ascii_only: ao2,
                    style_id: s2,
                },
            ) if Rc::ptr_eq(a1, a2) && r1.end == r2.start && s1 == s2 => Some(Self::TextChunk {
                arena: Rc::clone(a1),
                range: r1.start..r2.end,
                width: w1 + w2,
                ascii_only: *ao1 && *ao2,
                style_id: *s1,
            }),
            _ => None,
        }
    }
}

impl RopeItem for Segment {
    fn metrics(&self) -> Metrics {
        match self {
            Self::TextChunk {
                width, ascii_only, ..
            } => Metrics {
                total_width: u64::from(*width),
                break_count: 0,
                first_line_width: *width,
                last_line_width: *width,
                max_line_width: *width,
                ascii_only: *ascii_only,
                ..Metrics::identity()
            },
            Self::HardBreak => Metrics {
                break_count: 1,
                ..Metrics::identity()
            },
            Self::Marker(_) => Metrics {
                marker_count: 1,
                ..Metrics::identity()
            },
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::TextChunk { range, .. } => range.is_empty(),
            Self::HardBreak => false,
            Self::Marker(_) => true,
        }
    }

    fn marker_kind(&self) -> Option<u32> {
        match self {
            Self::Marker(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// A styled overlay range on top of document text (syntax highlight, search
/// match, etc.) — stored in the text buffer's highlight table, separate
/// from the rope's own content segments.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSegment {
    /// Byte range in the source text.
    pub range: Range<usize>,
    /// Style applied to this segment.
    pub style: Style,
    /// Priority for overlapping segments (higher wins).
    pub priority: u8,
    /// Optional highlight reference ID for batch removal.
    pub ref_id: Option<u16>,
    /// Optional source line for line-based highlights.
    pub line: Option<usize>,
}

impl StyledSegment {
    /// Create a new styled segment.
    #[must_use]
    pub fn new(range: Range<usize>, style: Style) -> Self {
        Self {
            range,
            style,
            priority: 0,
            ref_id: None,
            line: None,
        }
    }

    /// Create a segment with priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a highlight reference ID.
    #[must_use]
    pub fn with_ref(mut self, ref_id: u16) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    /// Attach a source line for line-based highlights.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Check if this segment overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.range.start < other.range.end && other.range.start < self.range.end
    }

    /// Check if this segment contains a position.
    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        self.range.contains(&pos)
    }

    /// Get the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.start >= self.range.end
    }
}

/// A chunk of styled text for building text-buffer content.
#[derive(Clone, Debug)]
pub struct StyledChunk<'a> {
    /// The text content.
    pub text: &'a str,
    /// The style to apply.
    pub style: Style,
}

impl<'a> StyledChunk<'a> {
    /// Create a new styled chunk.
    #[must_use]
    pub fn new(text: &'a str, style: Style) -> Self {
        Self { text, style }
    }

    /// Create an unstyled chunk.
    #[must_use]
    pub fn plain(text: &'a str) -> Self {
        Self {
            text,
            style: Style::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(arena: &Rc<str>, range: Range<usize>) -> Segment {
        let width = range.len() as u32;
        Segment::text_chunk(Rc::clone(arena), range, width, true, None)
    }

    #[test]
    fn try_merge_contiguous_same_style() {
        let arena: Rc<str> = Rc::from("hello world");
        let a = chunk(&arena, 0..5);
        let b = chunk(&arena, 5..11);
        let merged = a.try_merge(&b).unwrap();
        assert_eq!(merged.as_str(), Some("hello world"));
    }

    #[test]
    fn try_merge_refuses_different_style() {
        let arena: Rc<str> = Rc::from("hello world");
        let a = Segment::text_chunk(Rc::clone(&arena), 0..5, 5, true, Some(1));
        let b = Segment::text_chunk(Rc::clone(&arena), 5..11, 6, true, Some(2));
        assert!(a.try_merge(&b).is_none());
    }

    #[test]
    fn try_merge_refuses_hard_break() {
        let arena: Rc<str> = Rc::from("hi");
        let a = chunk(&arena, 0..2);
        assert!(a.try_merge(&Segment::HardBreak).is_none());
    }

    #[test]
    fn hard_break_is_never_empty() {
        assert!(!Segment::HardBreak.is_empty());
        assert_eq!(Segment::HardBreak.metrics().break_count, 1);
    }

    #[test]
    fn marker_is_empty_but_counted_in_metrics() {
        let m = Segment::Marker(3);
        assert!(m.is_empty());
        assert_eq!(m.marker_kind(), Some(3));
        assert_eq!(m.metrics().marker_count, 1);
    }

    #[test]
    fn test_segment_overlap() {
        let a = StyledSegment::new(0..10, Style::NONE);
        let b = StyledSegment::new(5..15, Style::NONE);
        let c = StyledSegment::new(10..20, Style::NONE);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_segment_contains() {
        let seg = StyledSegment::new(5..10, Style::NONE);
        assert!(!seg.contains(4));
        assert!(seg.contains(5));
        assert!(seg.contains(9));
        assert!(!seg.contains(10));
    }
}
