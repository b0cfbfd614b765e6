//! Cell-based frame buffer with alpha blending, scissoring, and grapheme-pool placement.

// Buffer operations naturally have many parameters for region copying
#![allow(clippy::too_many_arguments)]

mod drawing;
mod opacity;
mod scissor;

pub use drawing::{BoxOptions, BoxSides, BoxStyle, TitleAlign};
pub use opacity::OpacityStack;
pub use scissor::{ClipRect, ScissorStack};

use crate::cell::{Cell, CellContent};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::pool::{GraphemePool, GraphemeTracker};
use crate::style::Style;
use crate::text::TextBufferView;
use crate::unicode::{display_width_with_method, WidthMethod};
use std::cell::RefCell;
use std::rc::Rc;

/// A 2D grid of cells: the final composition target for rendered text.
///
/// Owns one [`GraphemeTracker`] bound to a shared [`GraphemePool`] handle, so
/// every non-ASCII or multi-codepoint cluster placed into the grid is
/// refcounted and released exactly once, however many times the buffer is
/// redrawn (see the `set`/`place` orphan-cleanup logic below).
pub struct CellBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,

    scissor_stack: ScissorStack,
    opacity_stack: OpacityStack,

    id: String,
    respect_alpha: bool,

    pool: Rc<RefCell<GraphemePool>>,
    tracker: GraphemeTracker,
}

impl CellBuffer {
    /// Create a new buffer with the given dimensions and its own private pool.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_pool(width, height, Rc::new(RefCell::new(GraphemePool::new())))
    }

    /// Create a buffer sharing an existing grapheme pool (e.g. a process-wide one).
    #[must_use]
    pub fn with_pool(width: u32, height: u32, pool: Rc<RefCell<GraphemePool>>) -> Self {
        let size = (width * height) as usize;
        let tracker = GraphemeTracker::new(Rc::clone(&pool));
        Self {
            width,
            height,
            cells: vec![Cell::clear(Rgba::TRANSPARENT); size],
            scissor_stack: ScissorStack::new(),
            opacity_stack: OpacityStack::new(),
            id: String::new(),
            respect_alpha: true,
            pool,
            tracker,
        }
    }

    /// Create a named buffer.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Get buffer dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The grapheme pool backing this buffer's non-ASCII cell content.
    #[must_use]
    pub fn pool(&self) -> &Rc<RefCell<GraphemePool>> {
        &self.pool
    }

    /// Number of distinct grapheme clusters currently referenced by this buffer.
    #[must_use]
    pub fn tracked_grapheme_count(&self) -> usize {
        self.tracker.count()
    }

    /// Estimated byte size of the buffer cell storage.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Cell>()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Get cell at position.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Get mutable cell at position.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Check if position is within current scissor rect.
    fn is_visible(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.scissor_stack.contains(x as i32, y as i32)
    }

    /// Decref/incref the tracker around a raw cell write, and clean up any
    /// continuation cells orphaned by overwriting a wide cluster's head (or
    /// by overwriting a continuation cell, which orphans the head to its
    /// left). Scenario: drawing "A" over "🌟" leaves the glyph's trailing
    /// continuation cell as a space rather than a stale wide-char half.
    fn place(&mut self, x: u32, y: u32, cell: Cell) {
        let Some(idx) = self.index(x, y) else {
            return;
        };

        if !cell.is_continuation() {
            self.clear_orphan_head_if_continuation(x, y);
        }

        if let CellContent::Grapheme(id, _) = self.cells[idx].content {
            let _ = self.tracker.remove(id);
        }
        self.cells[idx] = cell;
        if let CellContent::Grapheme(id, _) = cell.content {
            let _ = self.tracker.add(id);
        }

        if !cell.is_continuation() {
            self.clear_trailing_orphan_continuations(x, y);
        }
    }

    fn clear_orphan_head_if_continuation(&mut self, x: u32, y: u32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if !self.cells[idx].is_continuation() {
            return;
        }
        let mut hx = x;
        while hx > 0 {
            hx -= 1;
            let Some(hidx) = self.index(hx, y) else {
                break;
            };
            if !self.cells[hidx].is_continuation() {
                if let CellContent::Grapheme(id, _) = self.cells[hidx].content {
                    let _ = self.tracker.remove(id);
                }
                let mut cleared = Cell::new(' ', Style::NONE);
                cleared.bg = self.cells[hidx].bg;
                self.cells[hidx] = cleared;
                break;
            }
        }
    }

    fn clear_trailing_orphan_continuations(&mut self, x: u32, y: u32) {
        let mut cx = x + 1;
        while let Some(idx) = self.index(cx, y) {
            if !self.cells[idx].is_continuation() {
                break;
            }
            let mut cleared = Cell::new(' ', Style::NONE);
            cleared.bg = self.cells[idx].bg;
            self.cells[idx] = cleared;
            cx += 1;
        }
    }

    /// Set cell at position, respecting scissor and opacity.
    pub fn set(&mut self, x: u32, y: u32, mut cell: Cell) {
        if !self.is_visible(x, y) {
            return;
        }

        let opacity = self.opacity_stack.current();
        if opacity < 1.0 {
            cell.blend_with_opacity(opacity);
        }

        self.place(x, y, cell);
    }

    /// Set cell with alpha blending over existing content.
    pub fn set_blended(&mut self, x: u32, y: u32, mut cell: Cell) {
        if !self.is_visible(x, y) {
            return;
        }

        let opacity = self.opacity_stack.current();
        if opacity < 1.0 {
            cell.blend_with_opacity(opacity);
        }

        let respect_alpha = self.respect_alpha;
        let Some(dest) = self.get(x, y).copied() else {
            return;
        };
        let resolved = if respect_alpha { cell.blend_over(&dest) } else { cell };
        self.place(x, y, resolved);
    }

    /// Place a grapheme cluster at `(x, y)`, writing continuation cells for
    /// wide clusters. Single-codepoint ASCII text skips the pool entirely
    /// (per the Cell Buffer placement rules).
    pub fn set_grapheme(&mut self, x: u32, y: u32, grapheme: &str, style: Style, method: WidthMethod) {
        if !self.is_visible(x, y) {
            return;
        }
        let cell = self.grapheme_cell(grapheme, style, method);
        let width = cell.display_width();
        self.set(x, y, cell);
        for i in 1..width {
            self.set(
                x + i as u32,
                y,
                Cell::continuation(style.bg.unwrap_or(Rgba::TRANSPARENT)),
            );
        }
    }

    fn grapheme_cell(&mut self, grapheme: &str, style: Style, method: WidthMethod) -> Cell {
        let mut chars = grapheme.chars();
        let width = display_width_with_method(grapheme, method) as u8;
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii() {
                return Cell::new(c, style);
            }
        }
        match self.pool.borrow_mut().alloc(grapheme) {
            Ok(id) => Cell::from_grapheme_id(id, width, style),
            Err(_) => Cell::new('\u{FFFD}', style),
        }
    }

    /// Clear entire buffer with a background color, releasing every tracked grapheme.
    pub fn clear(&mut self, bg: Rgba) {
        self.clear_with(bg, None);
    }

    /// Clear entire buffer, optionally filling every cell with `ch` instead of leaving it empty.
    pub fn clear_with(&mut self, bg: Rgba, ch: Option<char>) {
        self.tracker.clear();
        let fill = match ch {
            Some(c) => Cell::new(c, Style::NONE.with_bg(bg)),
            None => Cell::clear(bg),
        };
        for cell in &mut self.cells {
            *cell = fill;
        }
    }

    /// Fill a rectangular region with background color.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, bg: Rgba) {
        for row in y..y.saturating_add(h).min(self.height) {
            for col in x..x.saturating_add(w).min(self.width) {
                self.set(col, row, Cell::clear(bg));
            }
        }
    }

    /// Draw text at position with style. Corresponds to the spec's flattened
    /// `draw_text(bytes, x, y, fg, bg, attrs)`: `Style` simply bundles those
    /// three fields into one idiomatic argument.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, style: Style) {
        drawing::draw_text(self, x, y, text, style);
    }

    /// Draw a box border.
    pub fn draw_box(&mut self, x: u32, y: u32, w: u32, h: u32, style: BoxStyle) {
        drawing::draw_box(self, x, y, w, h, style);
    }

    /// Draw a box border with extended options.
    pub fn draw_box_with_options(&mut self, x: u32, y: u32, w: u32, h: u32, options: BoxOptions) {
        drawing::draw_box_with_options(self, x, y, w, h, options);
    }

    /// Composite a text buffer view into this buffer at `(x, y)`, optionally
    /// under a temporary scissor rect that is popped before returning.
    pub fn draw_text_buffer(
        &mut self,
        view: &TextBufferView<'_>,
        x: i32,
        y: i32,
        clip: Option<ClipRect>,
    ) {
        if let Some(rect) = clip {
            self.scissor_stack.push(rect);
        }
        view.render_to(self, x, y);
        if clip.is_some() {
            self.scissor_stack.pop();
        }
    }

    // Scissor stack operations

    /// Push a scissor rectangle onto the stack.
    pub fn push_scissor_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.scissor_stack.push(ClipRect::new(x, y, w, h));
    }

    /// Pop the top scissor rectangle. Errors if the stack is already empty —
    /// every push must be paired with exactly one pop.
    pub fn pop_scissor_rect(&mut self) -> Result<()> {
        if self.scissor_stack.depth() == 0 {
            return Err(Error::UnbalancedScissorPop);
        }
        self.scissor_stack.pop();
        Ok(())
    }

    /// Clear the scissor stack.
    pub fn clear_scissors(&mut self) {
        self.scissor_stack.clear();
    }

    // Opacity stack operations

    /// Push an opacity value onto the stack.
    pub fn push_opacity(&mut self, opacity: f32) {
        self.opacity_stack.push(opacity);
    }

    /// Pop the top opacity value.
    pub fn pop_opacity(&mut self) {
        self.opacity_stack.pop();
    }

    /// Get the current combined opacity.
    #[must_use]
    pub fn current_opacity(&self) -> f32 {
        self.opacity_stack.current()
    }

    /// Draw another buffer onto this one.
    pub fn draw_buffer(&mut self, x: i32, y: i32, src: &CellBuffer) {
        self.draw_buffer_region(x, y, src, 0, 0, src.width, src.height, true);
    }

    /// Draw a region of another buffer onto this one. Any grapheme cells
    /// copied in are tracked by `self`'s own tracker (they now live in two
    /// buffers, each with independent refcounting).
    pub fn draw_buffer_region(
        &mut self,
        x: i32,
        y: i32,
        src: &CellBuffer,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        respect_alpha: bool,
    ) {
        let max_y = (src_y + src_h).min(src.height);
        let max_x = (src_x + src_w).min(src.width);

        for sy in src_y..max_y {
            let dest_y = y + (sy - src_y) as i32;
            if dest_y < 0 || dest_y >= self.height as i32 {
                continue;
            }

            for sx in src_x..max_x {
                let dest_x = x + (sx - src_x) as i32;
                if dest_x < 0 || dest_x >= self.width as i32 {
                    continue;
                }

                if let Some(cell) = src.get(sx, sy) {
                    if respect_alpha {
                        self.set_blended(dest_x as u32, dest_y as u32, *cell);
                    } else {
                        self.set(dest_x as u32, dest_y as u32, *cell);
                    }
                }
            }
        }
    }

    /// Resize buffer, clearing contents and releasing every tracked grapheme.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.tracker.clear();
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::clear(Rgba::TRANSPARENT); (width * height) as usize];
        self.scissor_stack.clear();
        self.opacity_stack.clear();
        self.respect_alpha = true;
    }

    /// Enable or disable alpha blending for blended operations.
    pub fn set_respect_alpha(&mut self, enabled: bool) {
        self.respect_alpha = enabled;
    }

    #[must_use]
    pub fn respect_alpha(&self) -> bool {
        self.respect_alpha
    }

    /// Get raw cell slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get mutable raw cell slice.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterate over cells with positions.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        self.cells.iter().enumerate().map(|(i, cell)| {
            let x = (i as u32) % self.width;
            let y = (i as u32) / self.width;
            (x, y, cell)
        })
    }

    /// Resolve every cell's content to plain text, row by row joined by
    /// `\n`, returning the number of bytes written. Continuation cells are
    /// always skipped (they never hold independent content); cells whose
    /// display width is 0 (zero-width codepoints) are skipped unless
    /// `include_zero_width` is set.
    pub fn write_resolved_chars(&self, out: &mut String, include_zero_width: bool) -> usize {
        let start = out.len();
        let pool = self.pool.borrow();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[(y * self.width + x) as usize];
                if cell.is_continuation() {
                    continue;
                }
                if cell.display_width() == 0 && !include_zero_width {
                    continue;
                }
                match &cell.content {
                    CellContent::Char(c) => out.push(*c),
                    CellContent::Grapheme(id, _) => {
                        if let Ok(bytes) = pool.get(*id) {
                            if let Ok(s) = std::str::from_utf8(bytes) {
                                out.push_str(s);
                            }
                        }
                    }
                    CellContent::Empty => out.push(' '),
                    CellContent::Continuation => {}
                }
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out.len() - start
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl std::fmt::Debug for CellBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellBuffer")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tracked_graphemes", &self.tracker.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buf = CellBuffer::new(80, 24);
        assert_eq!(buf.width(), 80);
        assert_eq!(buf.height(), 24);
    }

    #[test]
    fn test_buffer_get_set() {
        let mut buf = CellBuffer::new(10, 10);
        let cell = Cell::new('X', Style::fg(Rgba::RED));
        buf.set(5, 5, cell);

        let retrieved = buf.get(5, 5).unwrap();
        assert_eq!(retrieved.fg, Rgba::RED);
    }

    #[test]
    fn test_buffer_bounds() {
        let buf = CellBuffer::new(10, 10);
        assert!(buf.get(0, 0).is_some());
        assert!(buf.get(9, 9).is_some());
        assert!(buf.get(10, 10).is_none());
    }

    #[test]
    fn test_buffer_clear() {
        let mut buf = CellBuffer::new(10, 10);
        buf.clear(Rgba::BLUE);

        for cell in buf.cells() {
            assert_eq!(cell.bg, Rgba::BLUE);
        }
    }

    #[test]
    fn test_draw_buffer_region() {
        let mut src = CellBuffer::new(4, 4);
        src.set(1, 1, Cell::new('X', Style::fg(Rgba::RED)));

        let mut dst = CellBuffer::new(4, 4);
        dst.draw_buffer_region(0, 0, &src, 1, 1, 1, 1, true);

        assert_eq!(
            dst.get(0, 0).unwrap().content,
            crate::cell::CellContent::Char('X')
        );
    }

    #[test]
    fn test_emoji_overwrite_clears_orphan_continuation() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set_grapheme(0, 0, "\u{1F31F}", Style::NONE, WidthMethod::default());
        assert_eq!(buf.get(0, 0).unwrap().display_width(), 2);
        assert!(buf.get(1, 0).unwrap().is_continuation());

        buf.set_grapheme(0, 0, "A", Style::NONE, WidthMethod::default());
        assert_eq!(buf.get(0, 0).unwrap().content, CellContent::Char('A'));
        assert_eq!(buf.get(1, 0).unwrap().content, CellContent::Char(' '));
    }

    #[test]
    fn test_bullet_redraw_loop_stays_under_pool_pressure() {
        let pool = Rc::new(RefCell::new(GraphemePool::with_config([
            crate::pool::ClassConfig {
                slots_per_page: 2,
                max_total_slots: None,
            };
            5
        ])));
        let mut buf = CellBuffer::with_pool(10, 1, pool);
        for _ in 0..100 {
            buf.set_grapheme(0, 0, "\u{2022}", Style::NONE, WidthMethod::default());
            buf.set_grapheme(7, 0, "\u{2022}", Style::NONE, WidthMethod::default());
        }
        assert!(buf.tracked_grapheme_count() < 100);
    }

    #[test]
    fn test_write_resolved_chars_skips_zero_width_by_default() {
        let mut buf = CellBuffer::new(3, 1);
        buf.set(0, 0, Cell::new('a', Style::NONE));
        buf.set(1, 0, Cell::new('\u{200B}', Style::NONE));
        buf.set(2, 0, Cell::new('b', Style::NONE));

        let mut out = String::new();
        buf.write_resolved_chars(&mut out, false);
        assert_eq!(out, "ab");

        out.clear();
        buf.write_resolved_chars(&mut out, true);
        assert_eq!(out, "a\u{200B}b");
    }

    #[test]
    fn test_unbalanced_scissor_pop_errors() {
        let mut buf = CellBuffer::new(10, 10);
        assert!(matches!(
            buf.pop_scissor_rect(),
            Err(Error::UnbalancedScissorPop)
        ));

        buf.push_scissor_rect(0, 0, 5, 5);
        assert!(buf.pop_scissor_rect().is_ok());
    }
}
