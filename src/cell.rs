//! Cell type: a single grid position in a [`crate::buffer::CellBuffer`].
//!
//! A cell buffer is a grid of cells, where each cell contains a single
//! character (or grapheme cluster) along with styling information. This
//! module provides [`Cell`] and [`CellContent`].
//!
//! # Wide Characters and Graphemes
//!
//! Some characters (CJK, emoji) have display width 2. When a wide character
//! is placed in a cell, the following cell becomes a [`CellContent::Continuation`]
//! to indicate it's occupied by the previous character.
//!
//! # Examples
//!
//! ```
//! use textcore_rs::{Cell, Style, Rgba};
//!
//! let cell = Cell::new('A', Style::fg(Rgba::GREEN));
//!
//! let empty = Cell::clear(Rgba::BLACK);
//! assert!(empty.is_empty());
//! ```

use crate::color::Rgba;
use crate::pool::GraphemeId;
use crate::style::{Style, TextAttributes};
use std::borrow::Cow;

/// Content of a single cell.
///
/// Most cells contain either a simple character or are empty. Wide
/// characters and grapheme clusters leave [`CellContent::Continuation`]
/// markers in the cells they occupy beyond the first.
///
/// # Grapheme Pool Integration
///
/// Multi-codepoint graphemes (emoji, ZWJ sequences) are stored in a
/// [`crate::pool::GraphemePool`] and referenced by [`GraphemeId`]. The
/// display width is cached alongside the ID so the hot rendering path never
/// needs a pool lookup just to know how many columns a cell occupies; the
/// actual bytes are resolved through the pool only when the text must be
/// written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellContent {
    /// Simple ASCII or single-codepoint character (display width 0-2).
    Char(char),
    /// Reference to a grapheme cluster in the pool, with its display width
    /// cached for the hot path.
    Grapheme(GraphemeId, u8),
    /// Empty/cleared cell.
    #[default]
    Empty,
    /// Continuation of a wide character or grapheme from a preceding cell.
    Continuation,
}

impl CellContent {
    /// Get the display width of this content.
    #[must_use]
    pub fn display_width(&self) -> usize {
        match self {
            Self::Char(c) => crate::unicode::display_width_char(*c),
            Self::Grapheme(_, width) => *width as usize,
            Self::Empty => 1,
            Self::Continuation => 0,
        }
    }

    /// Check if this is a continuation cell.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        matches!(self, Self::Continuation)
    }

    /// Check if this is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check if this is a grapheme reference.
    #[must_use]
    pub fn is_grapheme(&self) -> bool {
        matches!(self, Self::Grapheme(..))
    }

    /// Get the grapheme ID if this is a grapheme reference.
    #[must_use]
    pub fn grapheme_id(&self) -> Option<GraphemeId> {
        match self {
            Self::Grapheme(id, _) => Some(*id),
            _ => None,
        }
    }

    /// Get the character if this is a single char.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// String representation for content that doesn't need a pool lookup.
    ///
    /// Returns `None` for [`CellContent::Grapheme`] — resolve via the pool
    /// (see [`Cell::write_content_with_pool`]).
    #[must_use]
    pub fn as_str_without_pool(&self) -> Option<Cow<'static, str>> {
        match self {
            Self::Char(c) => {
                let mut buf = [0u8; 4];
                Some(Cow::Owned(c.encode_utf8(&mut buf).to_owned()))
            }
            Self::Grapheme(..) => None,
            Self::Empty => Some(Cow::Borrowed(" ")),
            Self::Continuation => Some(Cow::Borrowed("")),
        }
    }
}

/// A single grid cell with content and styling.
///
/// # Alpha Blending
///
/// Cells support alpha blending via [`Cell::blend_over`], which composites
/// one cell on top of another using Porter-Duff "over" compositing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// The character or grapheme content.
    pub content: CellContent,
    /// Foreground color.
    pub fg: Rgba,
    /// Background color.
    pub bg: Rgba,
    /// Text rendering attributes.
    pub attributes: TextAttributes,
}

impl Cell {
    /// Create a new cell with a single character.
    #[must_use]
    pub fn new(ch: char, style: Style) -> Self {
        Self {
            content: CellContent::Char(ch),
            fg: style.fg.unwrap_or(Rgba::WHITE),
            bg: style.bg.unwrap_or(Rgba::TRANSPARENT),
            attributes: style.attributes,
        }
    }

    /// Create a cell from an already-interned grapheme, caching its width.
    #[must_use]
    pub fn from_grapheme_id(id: GraphemeId, width: u8, style: Style) -> Self {
        Self {
            content: CellContent::Grapheme(id, width),
            fg: style.fg.unwrap_or(Rgba::WHITE),
            bg: style.bg.unwrap_or(Rgba::TRANSPARENT),
            attributes: style.attributes,
        }
    }

    /// Create a fully transparent cell.
    ///
    /// This is a true no-op for compositing: blending this cell over another
    /// cell leaves the background cell unchanged.
    #[must_use]
    pub fn transparent() -> Self {
        Self {
            content: CellContent::Empty,
            fg: Rgba::TRANSPARENT,
            bg: Rgba::TRANSPARENT,
            attributes: TextAttributes::empty(),
        }
    }

    /// Create a cleared/empty cell with the specified background.
    #[must_use]
    pub fn clear(bg: Rgba) -> Self {
        Self {
            content: CellContent::Empty,
            fg: Rgba::WHITE,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// Create a continuation cell (placeholder for wide characters).
    #[must_use]
    pub fn continuation(bg: Rgba) -> Self {
        Self {
            content: CellContent::Continuation,
            fg: Rgba::WHITE,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// Get the display width of this cell.
    #[must_use]
    pub fn display_width(&self) -> usize {
        self.content.display_width()
    }

    /// Check if this is a continuation cell.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.content.is_continuation()
    }

    /// Check if this cell is empty/cleared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Write the cell content to a writer (without pool lookup).
    ///
    /// For [`CellContent::Grapheme`] this writes placeholder spaces matching
    /// the cached display width; use [`Cell::write_content_with_pool`] for
    /// the real bytes.
    pub fn write_content<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        match &self.content {
            CellContent::Char(c) => write!(w, "{c}"),
            CellContent::Grapheme(_, width) => {
                for _ in 0..*width {
                    write!(w, " ")?;
                }
                Ok(())
            }
            CellContent::Empty => write!(w, " "),
            CellContent::Continuation => Ok(()),
        }
    }

    /// Write the cell content to a writer with grapheme pool lookup.
    pub fn write_content_with_pool<W, F>(&self, w: &mut W, pool_lookup: F) -> std::io::Result<()>
    where
        W: std::io::Write,
        F: Fn(GraphemeId) -> Option<String>,
    {
        match &self.content {
            CellContent::Char(c) => write!(w, "{c}"),
            CellContent::Grapheme(id, width) => {
                if let Some(s) = pool_lookup(*id) {
                    write!(w, "{s}")
                } else {
                    for _ in 0..*width {
                        write!(w, " ")?;
                    }
                    Ok(())
                }
            }
            CellContent::Empty => write!(w, " "),
            CellContent::Continuation => Ok(()),
        }
    }

    /// Apply a style to this cell.
    pub fn apply_style(&mut self, style: Style) {
        if let Some(fg) = style.fg {
            self.fg = fg;
        }
        if let Some(bg) = style.bg {
            self.bg = bg;
        }
        self.attributes = self.attributes.merge(style.attributes);
    }

    /// Blend this cell's colors with a global opacity factor.
    pub fn blend_with_opacity(&mut self, opacity: f32) {
        self.fg = self.fg.multiply_alpha(opacity);
        self.bg = self.bg.multiply_alpha(opacity);
    }

    /// Fast bitwise equality check for cell diffing.
    #[inline]
    #[must_use]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.fg.bits_eq(other.fg)
            && self.bg.bits_eq(other.bg)
            && self.attributes == other.attributes
    }

    /// Blend this cell over a background cell using alpha compositing.
    #[must_use]
    pub fn blend_over(self, background: &Cell) -> Cell {
        let (content, attributes) = if self.content.is_empty() {
            (background.content, background.attributes)
        } else {
            (self.content, self.attributes)
        };

        Cell {
            content,
            fg: self.fg.blend_over(background.fg),
            bg: self.bg.blend_over(background.bg),
            attributes,
        }
    }
}
