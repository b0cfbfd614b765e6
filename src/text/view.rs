//! Text buffer view with viewport and wrapping.

// Complex rendering logic naturally has long functions
#![allow(clippy::too_many_lines)]
// Closures with method references are more readable in context
#![allow(clippy::redundant_closure_for_method_calls)]

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::Rgba;
use crate::style::Style;
use crate::text::TextBuffer;
use crate::unicode::display_width_with_method;
use std::cell::RefCell;

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping - lines extend beyond viewport.
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries.
    Word,
}

/// Viewport configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Selection range, given as character offsets into the document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

impl Selection {
    /// Create a new selection.
    #[must_use]
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Get normalized (start <= end) selection.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.start <= self.end {
            *self
        } else {
            Self {
                start: self.end,
                end: self.start,
                style: self.style,
            }
        }
    }

    /// Check if position is within selection.
    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        let norm = self.normalized();
        pos >= norm.start && pos < norm.end
    }
}

/// Local (viewport) selection based on screen coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSelection {
    pub anchor_x: u32,
    pub anchor_y: u32,
    pub focus_x: u32,
    pub focus_y: u32,
    pub style: Style,
}

impl LocalSelection {
    /// Create a new local selection.
    #[must_use]
    pub fn new(anchor_x: u32, anchor_y: u32, focus_x: u32, focus_y: u32, style: Style) -> Self {
        Self {
            anchor_x,
            anchor_y,
            focus_x,
            focus_y,
            style,
        }
    }

    /// Normalize selection rectangle.
    #[must_use]
    pub fn normalized(&self) -> (u32, u32, u32, u32) {
        let min_x = self.anchor_x.min(self.focus_x);
        let max_x = self.anchor_x.max(self.focus_x);
        let min_y = self.anchor_y.min(self.focus_y);
        let max_y = self.anchor_y.max(self.focus_y);
        (min_x, min_y, max_x, max_y)
    }
}

/// View into a text buffer with viewport and rendering options.
pub struct TextBufferView<'a> {
    buffer: &'a TextBuffer,
    viewport: Viewport,
    wrap_mode: WrapMode,
    wrap_width: Option<u32>,
    scroll_x: u32,
    scroll_y: u32,
    selection: Option<Selection>,
    local_selection: Option<LocalSelection>,
    tab_indicator: Option<char>,
    tab_indicator_color: Rgba,
    truncate: bool,
    line_cache: RefCell<Option<LineCache>>,
}

/// A wrapped line segment, in character offsets.
#[derive(Clone, Debug)]
struct VirtualLine {
    source_line: usize,
    char_start: usize,
    char_end: usize,
    width: usize,
    is_wrap: bool,
}

/// Cached line layout information for wrapped text.
#[derive(Clone, Debug, Default)]
pub struct LineInfo {
    /// Character offset where each virtual line starts.
    pub starts: Vec<usize>,
    /// Character offset where each virtual line ends (exclusive).
    pub ends: Vec<usize>,
    /// Display width of each virtual line.
    pub widths: Vec<usize>,
    /// Source line index for each virtual line.
    pub sources: Vec<usize>,
    /// Whether the line is a wrapped continuation.
    pub wraps: Vec<bool>,
    /// Maximum line width across all virtual lines.
    pub max_width: usize,
}

impl LineInfo {
    /// Get the number of virtual lines.
    #[must_use]
    pub fn virtual_line_count(&self) -> usize {
        self.starts.len()
    }

    /// Map a source (logical) line to its first virtual line index.
    ///
    /// Returns the index of the first virtual line that corresponds to
    /// the given source line, or `None` if the source line doesn't exist.
    #[must_use]
    pub fn source_to_virtual(&self, source_line: usize) -> Option<usize> {
        self.sources.iter().position(|&s| s == source_line)
    }

    /// Map a virtual line index to its source (logical) line.
    ///
    /// Returns the source line index for the given virtual line,
    /// or `None` if the virtual line index is out of bounds.
    #[must_use]
    pub fn virtual_to_source(&self, virtual_line: usize) -> Option<usize> {
        self.sources.get(virtual_line).copied()
    }

    /// Get the character range for a virtual line.
    ///
    /// Returns `(char_start, char_end)` for the given virtual line index,
    /// or `None` if the index is out of bounds.
    #[must_use]
    pub fn virtual_line_byte_range(&self, virtual_line: usize) -> Option<(usize, usize)> {
        let start = *self.starts.get(virtual_line)?;
        let end = *self.ends.get(virtual_line)?;
        Some((start, end))
    }

    /// Get the display width of a virtual line.
    #[must_use]
    pub fn virtual_line_width(&self, virtual_line: usize) -> Option<usize> {
        self.widths.get(virtual_line).copied()
    }

    /// Check if a virtual line is a wrapped continuation.
    #[must_use]
    pub fn is_continuation(&self, virtual_line: usize) -> Option<bool> {
        self.wraps.get(virtual_line).copied()
    }

    /// Count virtual lines for a given source line.
    #[must_use]
    pub fn virtual_lines_for_source(&self, source_line: usize) -> usize {
        self.sources.iter().filter(|&&s| s == source_line).count()
    }

    /// Get the maximum source line index.
    #[must_use]
    pub fn max_source_line(&self) -> Option<usize> {
        self.sources.iter().max().copied()
    }
}

/// Measurement result for a given viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextMeasure {
    pub line_count: usize,
    pub max_width: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LineCacheKey {
    wrap_mode: WrapMode,
    wrap_width_override: Option<u32>,
    viewport_width: u32,
    tab_width: u8,
    width_method: crate::unicode::WidthMethod,
    buffer_revision: u64,
}

#[derive(Clone, Debug)]
struct LineCache {
    key: LineCacheKey,
    virtual_lines: Vec<VirtualLine>,
    info: LineInfo,
}

impl<'a> TextBufferView<'a> {
    /// Create a new view of a text buffer.
    #[must_use]
    pub fn new(buffer: &'a TextBuffer) -> Self {
        Self {
            buffer,
            viewport: Viewport::default(),
            wrap_mode: WrapMode::None,
            wrap_width: None,
            scroll_x: 0,
            scroll_y: 0,
            selection: None,
            local_selection: None,
            tab_indicator: None,
            tab_indicator_color: Rgba::WHITE,
            truncate: false,
            line_cache: RefCell::new(None),
        }
    }

    /// Set the viewport.
    #[must_use]
    pub fn viewport(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(x, y, width, height);
        self.clear_line_cache();
        self
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn wrap_mode(mut self, mode: WrapMode) -> Self {
        self.wrap_mode = mode;
        self.clear_line_cache();
        self
    }

    /// Set explicit wrap width (overrides viewport width when wrapping).
    #[must_use]
    pub fn wrap_width(mut self, width: u32) -> Self {
        self.wrap_width = Some(width);
        self.clear_line_cache();
        self
    }

    /// Set scroll position.
    #[must_use]
    pub fn scroll(mut self, x: u32, y: u32) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    /// Set tab indicator character and color.
    #[must_use]
    pub fn tab_indicator(mut self, ch: char, color: Rgba) -> Self {
        self.tab_indicator = Some(ch);
        self.tab_indicator_color = color;
        self
    }

    /// Enable or disable truncation.
    #[must_use]
    pub fn truncate(mut self, enabled: bool) -> Self {
        self.truncate = enabled;
        self
    }

    /// Set selection.
    pub fn set_selection(&mut self, start: usize, end: usize, style: Style) {
        self.selection = Some(Selection::new(start, end, style));
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Set a local (viewport) selection.
    pub fn set_local_selection(
        &mut self,
        anchor_x: u32,
        anchor_y: u32,
        focus_x: u32,
        focus_y: u32,
        style: Style,
    ) {
        self.local_selection = Some(LocalSelection::new(
            anchor_x, anchor_y, focus_x, focus_y, style,
        ));
    }

    /// Clear local selection.
    pub fn clear_local_selection(&mut self) {
        self.local_selection = None;
    }

    fn clear_line_cache(&self) {
        self.line_cache.replace(None);
    }

    /// Get selected text if any.
    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        let sel = self.selection.as_ref()?.normalized();
        if sel.is_empty() {
            return None;
        }

        let max = self.buffer.len_chars();
        let start = sel.start.min(max);
        let end = sel.end.min(max);
        if start >= end {
            return None;
        }
        let text = self.buffer.to_string();
        Some(text.chars().skip(start).take(end - start).collect())
    }

    fn effective_wrap_width(&self) -> Option<usize> {
        if self.wrap_mode == WrapMode::None || self.viewport.width == 0 {
            return None;
        }
        let width = self.wrap_width.unwrap_or(self.viewport.width).max(1);
        Some(width as usize)
    }

    fn effective_wrap_width_for(&self, width: Option<u32>) -> Option<usize> {
        if self.wrap_mode == WrapMode::None {
            return None;
        }
        let base_width = width.unwrap_or(self.viewport.width);
        if base_width == 0 {
            return None;
        }
        let width = self.wrap_width.unwrap_or(base_width).max(1);
        Some(width as usize)
    }

    fn line_cache_key(&self) -> LineCacheKey {
        LineCacheKey {
            wrap_mode: self.wrap_mode,
            wrap_width_override: self.wrap_width,
            viewport_width: self.viewport.width,
            tab_width: self.buffer.tab_width(),
            width_method: self.buffer.width_method(),
            buffer_revision: self.buffer.revision(),
        }
    }

    fn line_cache(&self) -> std::cell::Ref<'_, LineCache> {
        let key = self.line_cache_key();
        let needs_refresh = self
            .line_cache
            .borrow()
            .as_ref()
            .is_none_or(|cache| cache.key != key);

        if needs_refresh {
            let virtual_lines = self.build_virtual_lines_for(self.effective_wrap_width());
            let info = Self::line_info_from_virtual_lines(&virtual_lines);
            *self.line_cache.borrow_mut() = Some(LineCache {
                key,
                virtual_lines,
                info,
            });
        }

        std::cell::Ref::map(self.line_cache.borrow(), |cache| {
            cache.as_ref().expect("line cache should exist")
        })
    }

    fn line_info_from_virtual_lines(virtual_lines: &[VirtualLine]) -> LineInfo {
        let mut info = LineInfo::default();
        for line in virtual_lines {
            info.starts.push(line.char_start);
            info.ends.push(line.char_end);
            info.widths.push(line.width);
            info.sources.push(line.source_line);
            info.wraps.push(line.is_wrap);
            info.max_width = info.max_width.max(line.width);
        }
        info
    }

    /// Build virtual lines for the whole document in a single pass over
    /// `self.buffer.lines()`, tracking character offsets rather than bytes.
    fn build_virtual_lines_for(&self, wrap_width: Option<usize>) -> Vec<VirtualLine> {
        use unicode_segmentation::UnicodeSegmentation;

        let mut lines = Vec::new();
        let method = self.buffer.width_method();
        let tab_width = self.buffer.tab_width().max(1) as usize;

        let mut line_start_char = 0usize;
        for (line_idx, line) in self.buffer.lines().enumerate() {
            let line_char_len = line.chars().count();

            if line.is_empty() {
                lines.push(VirtualLine {
                    source_line: line_idx,
                    char_start: line_start_char,
                    char_end: line_start_char,
                    width: 0,
                    is_wrap: false,
                });
                line_start_char += line_char_len + 1;
                continue;
            }

            let Some(wrap_width) = wrap_width else {
                let width = display_width_with_method(&line, method);
                lines.push(VirtualLine {
                    source_line: line_idx,
                    char_start: line_start_char,
                    char_end: line_start_char + line_char_len,
                    width,
                    is_wrap: false,
                });
                line_start_char += line_char_len + 1;
                continue;
            };

            let graphemes: Vec<&str> = line.graphemes(true).collect();
            let mut seg_start_char = 0usize;
            let mut char_pos = 0usize;
            let mut current_width = 0usize;
            let mut last_break: Option<(usize, usize, usize)> = None; // (break_index, char_pos, width)
            let mut i = 0usize;

            while i < graphemes.len() {
                let grapheme = graphemes[i];
                let g_chars = grapheme.chars().count();

                let g_width = if grapheme == "\t" {
                    let offset = current_width % tab_width;
                    tab_width - offset
                } else {
                    display_width_with_method(grapheme, method)
                };

                let is_break_opportunity = grapheme
                    .chars()
                    .next()
                    .is_some_and(crate::unicode::is_wrap_break_char);
                if self.wrap_mode == WrapMode::Word && is_break_opportunity {
                    last_break = Some((i + 1, char_pos + g_chars, current_width + g_width));
                }

                if current_width + g_width > wrap_width && current_width > 0 {
                    let (break_index, break_char, break_width) = if self.wrap_mode == WrapMode::Word
                    {
                        last_break.unwrap_or((i, char_pos, current_width))
                    } else {
                        (i, char_pos, current_width)
                    };

                    lines.push(VirtualLine {
                        source_line: line_idx,
                        char_start: line_start_char + seg_start_char,
                        char_end: line_start_char + break_char,
                        width: break_width,
                        is_wrap: seg_start_char > 0,
                    });

                    // Leading spaces on the new continuation line are kept
                    // as content, not trimmed: only the break opportunity
                    // itself (already folded into `break_char` above) is
                    // consumed, so a double space wraps into a line that
                    // starts with the second space.
                    seg_start_char = break_char;
                    char_pos = break_char;
                    current_width = 0;
                    last_break = None;
                    i = break_index;

                    continue;
                }

                current_width += g_width;
                char_pos += g_chars;
                i += 1;
            }

            if seg_start_char <= line_char_len {
                lines.push(VirtualLine {
                    source_line: line_idx,
                    char_start: line_start_char + seg_start_char,
                    char_end: line_start_char + line_char_len,
                    width: current_width,
                    is_wrap: seg_start_char > 0,
                });
            }

            line_start_char += line_char_len + 1;
        }

        lines
    }

    /// Compute visual (wrapped) position for a character offset.
    #[must_use]
    pub fn visual_position_for_offset(&self, char_offset: usize) -> (u32, u32) {
        use unicode_segmentation::UnicodeSegmentation;

        let cache = self.line_cache();
        let method = self.buffer.width_method();
        let tab_width = self.buffer.tab_width().max(1) as usize;
        let text = self.buffer.to_string();

        for (row, vline) in cache.virtual_lines.iter().enumerate() {
            let is_last_line = row == cache.virtual_lines.len() - 1;
            if char_offset < vline.char_start {
                continue;
            }
            if char_offset >= vline.char_end && !is_last_line {
                continue;
            }

            let end = char_offset.min(vline.char_end).max(vline.char_start);
            let segment: String = text
                .chars()
                .skip(vline.char_start)
                .take(end - vline.char_start)
                .collect();

            let mut width = 0usize;
            for grapheme in segment.graphemes(true) {
                if grapheme == "\t" {
                    let offset = width % tab_width;
                    width += tab_width - offset;
                } else {
                    width += display_width_with_method(grapheme, method);
                }
            }

            return (row as u32, width as u32);
        }

        (0, 0)
    }

    /// Calculate the number of virtual lines (accounting for wrapping).
    #[must_use]
    pub fn virtual_line_count(&self) -> usize {
        self.line_cache().virtual_lines.len()
    }

    /// Get line layout information for the current view.
    #[must_use]
    pub fn line_info(&self) -> LineInfo {
        self.line_cache().info.clone()
    }

    /// Measure line count and max width for a given viewport size.
    #[must_use]
    pub fn measure_for_dimensions(&self, width: u32, _height: u32) -> TextMeasure {
        let wrap_width = self.effective_wrap_width_for(Some(width.max(1)));
        let virtual_lines = self.build_virtual_lines_for(wrap_width);
        let info = Self::line_info_from_virtual_lines(&virtual_lines);
        TextMeasure {
            line_count: virtual_lines.len(),
            max_width: info.max_width,
        }
    }

    /// Render the view to an output buffer.
    pub fn render_to(&self, output: &mut CellBuffer, dest_x: i32, dest_y: i32) {
        let cache = self.line_cache();
        let virtual_lines = &cache.virtual_lines;
        let start_line = self.scroll_y as usize;
        let end_line = (start_line + self.viewport.height as usize).min(virtual_lines.len());

        for (row_offset, vline_idx) in (start_line..end_line).enumerate() {
            let vline = &virtual_lines[vline_idx];
            let dest_row = dest_y + row_offset as i32;
            if dest_row < 0 {
                continue;
            }
            self.render_virtual_line(output, dest_x, dest_row as u32, vline, row_offset as u32);
        }
    }

    fn render_virtual_line(
        &self,
        output: &mut CellBuffer,
        dest_x: i32,
        dest_y: u32,
        vline: &VirtualLine,
        view_row: u32,
    ) {
        use unicode_segmentation::UnicodeSegmentation;

        let text = self.buffer.to_string();
        let line: String = text
            .chars()
            .skip(vline.char_start)
            .take(vline.char_end - vline.char_start)
            .collect();

        let mut col = 0u32;
        let method = self.buffer.width_method();

        let selection = self.selection.as_ref().map(Selection::normalized);
        let local_sel = self.local_selection;

        let max_col = self.scroll_x + self.viewport.width;

        let mut global_char_offset = vline.char_start;
        for grapheme in line.graphemes(true) {
            // Optimization: Stop if we've gone past the viewport
            if col >= max_col {
                break;
            }

            if grapheme == "\t" {
                let tab_width = self.buffer.tab_width().max(1) as u32;
                let spaces_to_next = tab_width - (col % tab_width);
                // Get the actual style at this position (preserves syntax highlighting)
                let byte_offset = self.buffer.char_to_byte(global_char_offset);
                let base_style = self.buffer.style_at(byte_offset);

                for space_idx in 0..spaces_to_next {
                    // Optimization: Skip if before scroll position
                    if col < self.scroll_x {
                        col += 1;
                        continue;
                    }
                    // Stop if we hit the edge (tab might straddle the edge)
                    if col >= max_col {
                        break;
                    }

                    let screen_col = (col - self.scroll_x) as i32 + dest_x;
                    if screen_col >= 0 {
                        if space_idx == 0 {
                            if let Some(indicator) = self.tab_indicator {
                                // Tab indicator gets special foreground but preserves background
                                let style = base_style.with_fg(self.tab_indicator_color);
                                output.set(screen_col as u32, dest_y, Cell::new(indicator, style));
                            } else {
                                output.set(screen_col as u32, dest_y, Cell::new(' ', base_style));
                            }
                        } else {
                            output.set(screen_col as u32, dest_y, Cell::new(' ', base_style));
                        }

                        if let Some(sel) = selection {
                            if sel.contains(global_char_offset) {
                                if let Some(cell) = output.get_mut(screen_col as u32, dest_y) {
                                    cell.apply_style(sel.style);
                                }
                            }
                        }
                        if let Some(local) = local_sel {
                            let (min_x, min_y, max_x, max_y) = local.normalized();
                            let view_col = (screen_col - dest_x) as u32;
                            if view_col >= min_x
                                && view_col <= max_x
                                && view_row >= min_y
                                && view_row <= max_y
                            {
                                if let Some(cell) = output.get_mut(screen_col as u32, dest_y) {
                                    cell.apply_style(local.style);
                                }
                            }
                        }
                    }
                    col += 1;
                }
                global_char_offset += 1;
                continue;
            }

            let byte_offset = self.buffer.char_to_byte(global_char_offset);
            let style = self.buffer.style_at(byte_offset);
            let width = display_width_with_method(grapheme, method);

            // Optimization: Skip if completely before scroll position
            if col + (width as u32) <= self.scroll_x {
                col += width as u32;
                global_char_offset += grapheme.chars().count();
                continue;
            }

            let screen_col = (col - self.scroll_x) as i32 + dest_x;

            // Only draw if within viewport (and valid screen coordinates)
            if screen_col >= 0 {
                let mut cell_style = style;
                if let Some(sel) = selection {
                    if sel.contains(global_char_offset) {
                        cell_style = cell_style.merge(sel.style);
                    }
                }
                if let Some(local) = local_sel {
                    let (min_x, min_y, max_x, max_y) = local.normalized();
                    let view_col = (screen_col - dest_x) as u32;
                    if view_col >= min_x
                        && view_col <= max_x
                        && view_row >= min_y
                        && view_row <= max_y
                    {
                        cell_style = cell_style.merge(local.style);
                    }
                }

                output.set_grapheme(screen_col as u32, dest_y, grapheme, cell_style, method);
            }

            col += width as u32;
            global_char_offset += grapheme.chars().count();
        }

        if self.truncate && self.wrap_mode == WrapMode::None {
            let max_cols = self.viewport.width as i32;
            if vline.width as i32 > max_cols && max_cols > 0 {
                let ellipsis_col = dest_x + (max_cols - 1);
                if ellipsis_col >= 0 {
                    output.set(
                        ellipsis_col as u32,
                        dest_y,
                        Cell::new('…', self.buffer.default_style()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_basic() {
        let buffer = TextBuffer::with_text("Hello\nWorld");
        let view = TextBufferView::new(&buffer).viewport(0, 0, 80, 24);
        assert_eq!(view.virtual_line_count(), 2);
    }

    #[test]
    fn test_selection() {
        let buffer = TextBuffer::with_text("Hello, World!");
        let mut view = TextBufferView::new(&buffer);
        view.set_selection(0, 5, Style::NONE);
        assert_eq!(view.selected_text(), Some("Hello".to_string()));
    }

    #[test]
    fn test_wrap_char_count() {
        let buffer = TextBuffer::with_text("abcdefghijklmnopqrstuvwxyz");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 5, 10)
            .wrap_mode(WrapMode::Char);
        assert!(view.virtual_line_count() >= 5);
    }

    #[test]
    fn test_line_info_basic_wrap() {
        let buffer = TextBuffer::with_text("abcd");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 2, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();
        assert_eq!(info.starts, vec![0, 2]);
        assert_eq!(info.ends, vec![2, 4]);
        assert_eq!(info.widths, vec![2, 2]);
        assert_eq!(info.sources, vec![0, 0]);
        assert_eq!(info.wraps, vec![false, true]);
        assert_eq!(info.max_width, 2);
    }

    #[test]
    fn test_virtual_line_byte_range_last_line() {
        let buffer = TextBuffer::with_text("Hello World");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();
        let range = info.virtual_line_byte_range(0);

        assert_eq!(
            range,
            Some((0, 11)),
            "Last line should have correct char range (0, 11)"
        );

        let text = &buffer.to_string()[0..11];
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn test_virtual_line_byte_range_wrapped() {
        let buffer = TextBuffer::with_text("abcdefgh");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 3, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();

        // Should wrap to 3 lines: "abc", "def", "gh"
        assert_eq!(info.virtual_line_count(), 3);

        let range0 = info.virtual_line_byte_range(0);
        let range1 = info.virtual_line_byte_range(1);
        let range2 = info.virtual_line_byte_range(2);

        assert_eq!(range0, Some((0, 3)), "First line: chars 0-3");
        assert_eq!(range1, Some((3, 6)), "Second line: chars 3-6");
        assert_eq!(range2, Some((6, 8)), "Last line: chars 6-8 (not 6-6!)");
    }

    #[test]
    fn test_measure_for_dimensions() {
        let buffer = TextBuffer::with_text("abc\ndefgh");
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);
        let measure = view.measure_for_dimensions(3, 10);
        assert_eq!(
            measure,
            TextMeasure {
                line_count: 3,
                max_width: 3
            }
        );
    }

    #[test]
    fn test_measure_no_wrap() {
        let buffer = TextBuffer::with_text("short\nmedium text\nvery long line of text here");
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::None);
        let measure = view.measure_for_dimensions(10, 10);

        assert_eq!(
            measure.line_count, 3,
            "Should have 3 source lines without wrapping"
        );
        assert_eq!(
            measure.max_width, 27,
            "Max width should be longest line (27 chars)"
        );
    }

    #[test]
    fn test_measure_with_char_wrap() {
        let buffer = TextBuffer::with_text("abcdefghij");
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);

        let measure = view.measure_for_dimensions(3, 10);
        assert_eq!(measure.line_count, 4, "10 chars / 3 = 4 wrapped lines");
        assert_eq!(measure.max_width, 3, "Max width capped at wrap width");

        let measure2 = view.measure_for_dimensions(5, 10);
        assert_eq!(measure2.line_count, 2, "10 chars / 5 = 2 wrapped lines");
        assert_eq!(measure2.max_width, 5, "Max width capped at wrap width");
    }

    #[test]
    fn test_measure_with_word_wrap() {
        let buffer = TextBuffer::with_text("hello world test");
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Word);

        let measure = view.measure_for_dimensions(12, 10);
        assert_eq!(measure.line_count, 2, "Should wrap to 2 lines at width 12");
        assert!(
            measure.max_width <= 12,
            "Max width should not exceed wrap width"
        );

        let measure2 = view.measure_for_dimensions(6, 10);
        assert_eq!(measure2.line_count, 3, "Should wrap to 3 lines at width 6");
    }

    #[test]
    fn test_measure_empty_buffer() {
        let buffer = TextBuffer::new();
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);
        let measure = view.measure_for_dimensions(80, 24);

        assert!(
            measure.line_count <= 1,
            "Empty buffer should have 0 or 1 line"
        );
        assert_eq!(measure.max_width, 0, "Empty buffer should have max_width 0");
    }

    #[test]
    fn test_measure_single_long_line() {
        let long_line = "x".repeat(100);
        let buffer = TextBuffer::with_text(&long_line);
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);

        let measure = view.measure_for_dimensions(20, 10);
        assert_eq!(measure.line_count, 5, "100 chars / 20 = 5 wrapped lines");
        assert_eq!(measure.max_width, 20, "Max width should be 20");

        let measure2 = view.measure_for_dimensions(33, 10);
        assert_eq!(measure2.line_count, 4, "100 chars / 33 = 4 wrapped lines");
    }

    #[test]
    fn test_measure_cjk_content() {
        let buffer = TextBuffer::with_text("你好世界"); // 4 CJK chars = 8 display columns
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);

        let measure = view.measure_for_dimensions(4, 10);
        assert_eq!(
            measure.line_count, 2,
            "4 CJK chars at width 4 should be 2 lines"
        );
        assert_eq!(measure.max_width, 4, "Max width should be 4");

        let measure2 = view.measure_for_dimensions(8, 10);
        assert_eq!(
            measure2.line_count, 1,
            "All CJK chars should fit at width 8"
        );
    }

    #[test]
    fn test_measure_updates_after_edit() {
        let mut buffer = TextBuffer::with_text("short");
        let view = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);
        let measure1 = view.measure_for_dimensions(10, 10);

        assert_eq!(measure1.line_count, 1);
        assert_eq!(measure1.max_width, 5);

        buffer.set_text("this is a much longer line now");

        let view2 = TextBufferView::new(&buffer).wrap_mode(WrapMode::Char);
        let measure2 = view2.measure_for_dimensions(10, 10);

        assert_eq!(
            measure2.line_count, 3,
            "30 chars at width 10 should be 3 lines"
        );
        assert_eq!(measure2.max_width, 10);
    }

    #[test]
    fn test_measure_consistency_with_render() {
        let buffer = TextBuffer::with_text("line1\nline2 is longer\nshort");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 8, 10)
            .wrap_mode(WrapMode::Char);

        let measure = view.measure_for_dimensions(8, 10);

        let mut output = CellBuffer::new(8, 10);
        view.render_to(&mut output, 0, 0);

        let virtual_count = view.virtual_line_count();

        assert_eq!(
            measure.line_count, virtual_count,
            "measure_for_dimensions line_count should match virtual_line_count"
        );
    }

    #[test]
    fn test_tab_rendering_preserves_style() {
        use crate::cell::CellContent;
        use crate::color::Rgba;
        use crate::text::segment::StyledChunk;

        let mut buffer = TextBuffer::new();
        buffer.set_styled_text(&[
            StyledChunk::new("hello", Style::fg(Rgba::RED)),
            StyledChunk::new("\t", Style::fg(Rgba::GREEN)), // Tab with green style
            StyledChunk::new("world", Style::fg(Rgba::BLUE)),
        ]);

        let view = TextBufferView::new(&buffer).viewport(0, 0, 80, 24);

        let mut output = CellBuffer::new(80, 24);
        view.render_to(&mut output, 0, 0);

        let cell_at_tab = output.get(5, 0);
        assert!(cell_at_tab.is_some(), "Cell at tab position should exist");
        let cell = cell_at_tab.unwrap();
        assert!(
            matches!(cell.content, CellContent::Char(' ')),
            "Tab should render as space by default"
        );
        assert_eq!(
            cell.fg,
            Rgba::GREEN,
            "Tab should preserve syntax highlighting (GREEN)"
        );

        let cell_at_world = output.get(8, 0); // Tab expands to position 8
        if let Some(cell) = cell_at_world {
            assert!(matches!(cell.content, CellContent::Char('w')));
            assert_eq!(cell.fg, Rgba::BLUE);
        }
    }

    #[test]
    fn test_tab_indicator_with_style() {
        use crate::cell::CellContent;
        use crate::color::Rgba;
        use crate::text::segment::StyledChunk;

        let magenta = Rgba::rgb(1.0, 0.0, 1.0);
        let yellow = Rgba::rgb(1.0, 1.0, 0.0);

        let mut buffer = TextBuffer::new();
        let bg_style = Style::NONE.with_bg(magenta).with_fg(Rgba::GREEN);
        buffer.set_styled_text(&[
            StyledChunk::new("x", Style::NONE),
            StyledChunk::new("\t", bg_style), // Tab with magenta background
            StyledChunk::new("y", Style::NONE),
        ]);

        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .tab_indicator('→', yellow);

        let mut output = CellBuffer::new(80, 24);
        view.render_to(&mut output, 0, 0);

        let cell = output.get(1, 0).expect("Cell should exist");
        assert!(
            matches!(cell.content, CellContent::Char('→')),
            "Tab indicator should be arrow"
        );
        assert_eq!(cell.fg, yellow, "Tab indicator should have yellow fg");
        assert_eq!(
            cell.bg, magenta,
            "Tab should preserve background from syntax"
        );
    }

    #[test]
    fn test_tab_expands_correctly() {
        use crate::cell::CellContent;

        let buffer = TextBuffer::with_text("ab\tcd");
        let view = TextBufferView::new(&buffer).viewport(0, 0, 80, 24);

        let mut output = CellBuffer::new(80, 24);
        view.render_to(&mut output, 0, 0);

        // Default tab width is 4
        // "ab" at positions 0,1; TAB fills to 4; "cd" at positions 4,5.
        let cell_a = output.get(0, 0).expect("Cell should exist");
        assert!(matches!(cell_a.content, CellContent::Char('a')));

        let cell_b = output.get(1, 0).expect("Cell should exist");
        assert!(matches!(cell_b.content, CellContent::Char('b')));

        let cell_tab = output.get(2, 0).expect("Cell should exist");
        assert!(
            matches!(cell_tab.content, CellContent::Char(' ')),
            "Tab should expand to space"
        );

        let cell_tab2 = output.get(3, 0).expect("Cell should exist");
        assert!(
            matches!(cell_tab2.content, CellContent::Char(' ')),
            "Tab should expand to space"
        );

        let cell_c = output.get(4, 0).expect("Cell should exist");
        assert!(matches!(cell_c.content, CellContent::Char('c')));

        let cell_d = output.get(5, 0).expect("Cell should exist");
        assert!(matches!(cell_d.content, CellContent::Char('d')));
    }

    // ================== LineInfo Comprehensive Tests ==================

    #[test]
    fn test_line_cache_no_wrap() {
        let buffer = TextBuffer::with_text("Hello World\nSecond Line\nThird");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();

        assert_eq!(info.virtual_line_count(), 3, "Should have 3 virtual lines");
        assert_eq!(
            info.sources,
            vec![0, 1, 2],
            "Each virtual line maps to its source"
        );
        assert_eq!(info.wraps, vec![false, false, false], "No wrapping");
        assert_eq!(info.max_width, 11, "Max width should be 'Hello World' = 11");
    }

    #[test]
    fn test_line_cache_char_wrap_exact() {
        let buffer = TextBuffer::with_text("abcdef");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 3, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();

        assert_eq!(info.virtual_line_count(), 2, "6 chars / 3 width = 2 lines");
        assert_eq!(info.widths, vec![3, 3], "Each line has width 3");
        assert_eq!(info.wraps, vec![false, true], "Second line is continuation");
    }

    #[test]
    fn test_line_cache_char_wrap_overflow() {
        let buffer = TextBuffer::with_text("abcdefgh");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 3, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();

        assert_eq!(info.virtual_line_count(), 3, "8 chars / 3 width = 3 lines");
        assert_eq!(info.widths, vec![3, 3, 2], "Last line has 2 chars");
    }

    #[test]
    fn test_line_cache_word_wrap_simple() {
        let buffer = TextBuffer::with_text("Hello world test");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 10, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();

        assert!(
            info.virtual_line_count() >= 2,
            "Should wrap into at least 2 lines"
        );
    }

    #[test]
    fn test_line_cache_word_wrap_long_word() {
        let buffer = TextBuffer::with_text("supercalifragilisticexpialidocious");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 10, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();

        assert!(
            info.virtual_line_count() >= 3,
            "Long word should split across lines"
        );
    }

    // Leading whitespace on a wrapped continuation line is content, not
    // trimmed: a run of spaces that straddles the break point leaves its
    // tail intact instead of being swallowed by the skip-ahead the
    // trimming behavior used to perform.
    #[test]
    fn word_wrap_preserves_leading_space_on_continuation_line() {
        let buffer = TextBuffer::with_text("ab  cd");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 2, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();
        let text: Vec<char> = buffer.to_string().chars().collect();
        let slice = |i: usize| -> String {
            text[info.starts[i]..info.ends[i]].iter().collect()
        };

        assert_eq!(info.virtual_line_count(), 3);
        assert_eq!(slice(0), "ab ");
        assert_eq!(slice(1), " ", "the second space is preserved, not trimmed");
        assert_eq!(slice(2), "cd");
    }

    // classify_wrap_break's reference set includes punctuation such as `/`
    // and `-`, not just whitespace, so word wrap can split mid-word on
    // e.g. a path separator or hyphen.
    #[test]
    fn word_wrap_breaks_on_punctuation_not_just_whitespace() {
        let buffer = TextBuffer::with_text("foo/barbaz");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 6, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();
        let text: Vec<char> = buffer.to_string().chars().collect();
        let slice = |i: usize| -> String {
            text[info.starts[i]..info.ends[i]].iter().collect()
        };

        assert_eq!(info.virtual_line_count(), 2);
        assert_eq!(slice(0), "foo/", "breaks right after the slash");
        assert_eq!(slice(1), "barbaz");
    }

    #[test]
    fn test_line_cache_multiple_lines() {
        let buffer = TextBuffer::with_text("Short\nThis is longer\nEnd");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 10, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();

        assert!(info.virtual_line_count() > 3, "Middle line should wrap");
        assert_eq!(info.sources[0], 0, "First virtual line from source 0");
    }

    #[test]
    fn test_line_cache_empty_lines() {
        let buffer = TextBuffer::with_text("Line1\n\nLine3");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();

        assert_eq!(
            info.virtual_line_count(),
            3,
            "Should have 3 lines including empty"
        );
        assert_eq!(info.widths[1], 0, "Empty line has width 0");
    }

    #[test]
    fn test_line_cache_utf8_width() {
        let buffer = TextBuffer::with_text("Hëllo");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();
        assert_eq!(info.widths[0], 5, "UTF-8 'ë' should have display width 1");
    }

    #[test]
    fn test_line_cache_cjk_characters() {
        let buffer = TextBuffer::with_text("Hi中文Ok");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();
        assert_eq!(info.widths[0], 8, "CJK chars should be 2 columns each");
    }

    #[test]
    fn test_line_cache_cjk_wrap() {
        let buffer = TextBuffer::with_text("AB中文CD");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 5, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();

        for (i, &width) in info.widths.iter().enumerate() {
            assert!(width <= 5, "Line {i} width {width} exceeds wrap width 5");
        }
    }

    #[test]
    fn test_line_cache_invalidation_content() {
        let buffer = TextBuffer::with_text("Hello");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info1 = view.line_info();

        let buffer2 = TextBuffer::with_text("Hello World Extended");
        let view2 = TextBufferView::new(&buffer2)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info2 = view2.line_info();

        assert_ne!(
            info1.max_width, info2.max_width,
            "Different content should have different width"
        );
    }

    #[test]
    fn test_line_cache_invalidation_wrap_mode() {
        let buffer = TextBuffer::with_text("Hello World Test Line");

        let view_none = TextBufferView::new(&buffer)
            .viewport(0, 0, 10, 10)
            .wrap_mode(WrapMode::None);
        let info_none = view_none.line_info();

        let view_char = TextBufferView::new(&buffer)
            .viewport(0, 0, 10, 10)
            .wrap_mode(WrapMode::Char);
        let info_char = view_char.line_info();

        assert_ne!(
            info_none.virtual_line_count(),
            info_char.virtual_line_count(),
            "Different wrap modes should produce different line counts"
        );
    }

    #[test]
    fn test_source_to_virtual_mapping() {
        let buffer = TextBuffer::with_text("Short\nThis is a longer line that wraps\nEnd");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 15, 10)
            .wrap_mode(WrapMode::Word);

        let info = view.line_info();

        for src in 0..=2 {
            let virt = info.source_to_virtual(src);
            assert!(virt.is_some(), "Source {src} should map to a virtual line");
        }

        for virt in 0..info.virtual_line_count() {
            let src = info.virtual_to_source(virt);
            assert!(src.is_some(), "Virtual {virt} should map to a source line");
        }

        for src in 0..=2 {
            if let Some(virt) = info.source_to_virtual(src) {
                let back = info.virtual_to_source(virt).unwrap();
                assert_eq!(back, src, "Round-trip should preserve source line");
            }
        }
    }

    #[test]
    fn test_virtual_to_source_mapping() {
        let buffer = TextBuffer::with_text("Line one\nLine two\nLine three");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 5, 10)
            .wrap_mode(WrapMode::Char);

        let info = view.line_info();

        let oob = info.virtual_to_source(1000);
        assert!(oob.is_none(), "Out of bounds should return None");
    }

    #[test]
    fn test_line_info_helper_methods() {
        let buffer = TextBuffer::with_text("Hello\nWorld");
        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 24)
            .wrap_mode(WrapMode::None);

        let info = view.line_info();

        assert_eq!(info.virtual_line_count(), 2);
        assert_eq!(info.max_source_line(), Some(1));
        assert_eq!(info.virtual_lines_for_source(0), 1);
        assert_eq!(info.virtual_line_width(0), Some(5));
        assert_eq!(info.is_continuation(0), Some(false));
    }

    #[test]
    fn test_line_cache_performance() {
        use std::fmt::Write as _;
        use std::time::Instant;

        let mut text = String::new();
        for i in 0..10_000 {
            let _ = writeln!(
                text,
                "Line {i} with some content that might wrap when narrow"
            );
        }

        let buffer = TextBuffer::with_text(&text);

        let view = TextBufferView::new(&buffer)
            .viewport(0, 0, 80, 100)
            .wrap_mode(WrapMode::Word);

        let start = Instant::now();
        let info = view.line_info();
        let elapsed = start.elapsed();

        assert!(info.virtual_line_count() >= 10_000);
        assert!(
            elapsed.as_millis() < 2000,
            "Cache computation took {elapsed:?}, should be well under 2s"
        );
    }
}
