//! Editor view with visual cursor and selection rendering.

// if-let-else is clearer than map_or for complex logic
#![allow(clippy::option_if_let_else)]

use crate::buffer::CellBuffer;
use crate::color::Rgba;
use crate::style::Style;
use crate::text::view::{LocalSelection, Selection, Viewport};
use crate::text::{EditBuffer, TextBuffer, TextBufferView, WrapMode};

/// Cursor style for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorShape {
    /// Block cursor.
    #[default]
    Block,
    /// Underline cursor.
    Underline,
    /// Vertical bar cursor.
    Bar,
}

/// Visual cursor information in wrapped view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualCursor {
    pub visual_row: u32,
    pub visual_col: u32,
    pub logical_row: u32,
    pub logical_col: u32,
    pub offset: u32,
}

/// A virtual line segment for visual navigation with wrapped text.
///
/// `char_start`/`char_end` are char offsets into the document's plain text
/// (matching [`crate::text::EditBuffer::cursor`]'s offset unit), not bytes.
#[derive(Clone, Debug)]
struct VirtualLine {
    source_line: usize,
    char_start: usize,
    char_end: usize,
    width: usize,
    is_wrap: bool,
}

/// Char offset of the start of logical line `row`.
fn char_offset_of_line_start(buffer: &TextBuffer, row: usize) -> usize {
    let mut offset = 0;
    for (i, line) in buffer.lines().enumerate() {
        if i == row {
            return offset;
        }
        offset += line.chars().count() + 1;
    }
    offset
}

/// Editor view wrapping an EditBuffer with visual rendering.
pub struct EditorView {
    edit_buffer: EditBuffer,
    cursor_style: Style,
    cursor_shape: CursorShape,
    selection_style: Style,
    wrap_mode: WrapMode,
    scroll_x: u32,
    scroll_y: u32,
    line_numbers: bool,
    line_number_style: Style,
    viewport: Option<Viewport>,
    scroll_margin: f32,
    selection_follow_cursor: bool,
    selection: Option<Selection>,
    local_selection: Option<LocalSelection>,
    /// Visual column `move_up_visual`/`move_down_visual` try to land on,
    /// independent of any column a short or empty intervening line clamped
    /// the cursor to. `None` means "take whatever the cursor is actually
    /// sitting at" — set on the first vertical move of a run and cleared by
    /// any horizontal move so the next vertical move re-seeds it.
    desired_visual_col: Option<u32>,
}

impl EditorView {
    /// Create a new editor view.
    #[must_use]
    pub fn new(edit_buffer: EditBuffer) -> Self {
        Self {
            edit_buffer,
            cursor_style: Style::builder().inverse().build(),
            cursor_shape: CursorShape::Block,
            selection_style: Style::builder().bg(Rgba::from_rgb_u8(60, 60, 120)).build(),
            wrap_mode: WrapMode::None,
            scroll_x: 0,
            scroll_y: 0,
            line_numbers: false,
            line_number_style: Style::dim(),
            viewport: None,
            scroll_margin: 0.1,
            selection_follow_cursor: false,
            selection: None,
            local_selection: None,
            desired_visual_col: None,
        }
    }

    /// Create an empty editor view.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(EditBuffer::new())
    }

    /// Get the edit buffer.
    #[must_use]
    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit_buffer
    }

    /// Get mutable access to the edit buffer.
    ///
    /// Cursor moves made through the returned `EditBuffer` bypass this
    /// view's `desired_visual_col` tracking (see [`Self::move_left`]); use
    /// the wrapper methods on `EditorView` itself when visual up/down
    /// navigation needs to track a horizontal move.
    pub fn edit_buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.edit_buffer
    }

    /// Replace the text, resetting the viewport and cursor to the start.
    pub fn set_text(&mut self, text: &str) {
        self.edit_buffer.set_text(text);
        self.scroll_x = 0;
        self.scroll_y = 0;
        self.selection = None;
        self.local_selection = None;
        self.desired_visual_col = None;
    }

    /// Move the cursor one grapheme left, resetting the desired visual
    /// column any subsequent `move_up_visual`/`move_down_visual` targets.
    pub fn move_left(&mut self) {
        self.edit_buffer.move_left();
        self.desired_visual_col = None;
    }

    /// Move the cursor one grapheme right, resetting the desired visual
    /// column any subsequent `move_up_visual`/`move_down_visual` targets.
    pub fn move_right(&mut self) {
        self.edit_buffer.move_right();
        self.desired_visual_col = None;
    }

    /// Set the logical cursor position, resetting the desired visual
    /// column any subsequent `move_up_visual`/`move_down_visual` targets.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.edit_buffer.move_to(row, col);
        self.desired_visual_col = None;
    }

    /// Set cursor style.
    pub fn set_cursor_style(&mut self, style: Style) {
        self.cursor_style = style;
    }

    /// Set cursor shape.
    pub fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.cursor_shape = shape;
    }

    /// Get the current cursor shape.
    #[must_use]
    pub fn cursor_shape(&self) -> CursorShape {
        self.cursor_shape
    }

    /// Set selection style.
    pub fn set_selection_style(&mut self, style: Style) {
        self.selection_style = style;
    }

    /// Set wrap mode.
    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    /// Set the viewport.
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Some(Viewport::new(x, y, width, height));
    }

    /// Set scroll margin (0.0-0.5 of viewport).
    pub fn set_scroll_margin(&mut self, margin: f32) {
        self.scroll_margin = margin.clamp(0.0, 0.5);
    }

    /// Enable or disable selection following the cursor.
    pub fn set_selection_follow_cursor(&mut self, enabled: bool) {
        self.selection_follow_cursor = enabled;
    }

    /// Enable or disable line numbers.
    pub fn set_line_numbers(&mut self, enabled: bool) {
        self.line_numbers = enabled;
    }

    /// Set line number style.
    pub fn set_line_number_style(&mut self, style: Style) {
        self.line_number_style = style;
    }

    /// Set selection range by character offsets.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        self.selection = Some(Selection::new(start, end, self.selection_style));
    }

    /// Clear selection range.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Delete selected text (offset-based selection).
    pub fn delete_selected_text(&mut self) {
        if let Some(sel) = self.selection.take() {
            self.edit_buffer
                .delete_range_offsets(sel.start.min(sel.end), sel.start.max(sel.end));
        }
    }

    /// Set a local (viewport) selection.
    pub fn set_local_selection(
        &mut self,
        anchor_x: u32,
        anchor_y: u32,
        focus_x: u32,
        focus_y: u32,
    ) {
        self.local_selection = Some(LocalSelection::new(
            anchor_x,
            anchor_y,
            focus_x,
            focus_y,
            self.selection_style,
        ));
    }

    /// Clear local selection.
    pub fn clear_local_selection(&mut self) {
        self.local_selection = None;
    }

    /// Start a new selection at current cursor position.
    pub fn start_selection(&mut self) {
        let offset = self.edit_buffer.cursor().offset;
        self.selection = Some(Selection::new(offset, offset, self.selection_style));
    }

    /// Extend selection to current cursor position.
    ///
    /// If no selection exists, starts a new selection at the cursor.
    pub fn extend_selection_to_cursor(&mut self) {
        if let Some(sel) = &mut self.selection {
            sel.end = self.edit_buffer.cursor().offset;
        } else {
            self.start_selection();
        }
    }

    /// Get the selected text, if any.
    ///
    /// Returns the text between selection start and end, regardless of direction.
    /// Returns `None` if there is no selection or if the selection is empty.
    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        let sel = self.selection?;
        let (start, end) = (sel.start.min(sel.end), sel.start.max(sel.end));
        if start == end {
            return None;
        }
        let text = self.edit_buffer.buffer().to_string();
        Some(text.chars().skip(start).take(end - start).collect())
    }

    /// Scroll to make cursor visible.
    pub fn scroll_to_cursor(&mut self, viewport_width: u32, viewport_height: u32) {
        let cursor = self.edit_buffer.cursor();
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);

        let margin_rows = (viewport_height as f32 * self.scroll_margin).ceil() as u32;
        let margin_cols = (text_width as f32 * self.scroll_margin).ceil() as u32;

        let (visual_row, visual_col) = if self.wrap_mode == WrapMode::None {
            (cursor.row as u32, cursor.col as u32)
        } else {
            let view = TextBufferView::new(self.edit_buffer.buffer())
                .viewport(0, 0, text_width, viewport_height)
                .wrap_mode(self.wrap_mode);
            view.visual_position_for_offset(cursor.offset)
        };

        // Vertical scrolling
        if visual_row < self.scroll_y + margin_rows {
            self.scroll_y = visual_row.saturating_sub(margin_rows);
        } else if visual_row >= self.scroll_y + viewport_height.saturating_sub(margin_rows) {
            self.scroll_y =
                visual_row.saturating_sub(viewport_height.saturating_sub(margin_rows + 1));
        }

        // Horizontal scrolling (if not wrapping)
        if self.wrap_mode == WrapMode::None {
            if visual_col < self.scroll_x + margin_cols {
                self.scroll_x = visual_col.saturating_sub(margin_cols);
            } else if visual_col >= self.scroll_x + text_width.saturating_sub(margin_cols) {
                self.scroll_x =
                    visual_col.saturating_sub(text_width.saturating_sub(margin_cols + 1));
            }
        } else {
            self.scroll_x = 0;
        }

        if self.selection_follow_cursor {
            if let Some(sel) = &mut self.selection {
                sel.end = cursor.offset;
            }
        }
    }

    /// Set scroll position.
    pub fn set_scroll(&mut self, x: u32, y: u32) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Get scroll position.
    #[must_use]
    pub fn scroll(&self) -> (u32, u32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Move cursor up one visual line (accounts for wrapping).
    ///
    /// In wrapped mode, this moves up within a wrapped line segment. In
    /// non-wrapped mode each logical line is its own visual line, so this
    /// moves up a logical line while preserving the desired visual column
    /// across shorter intervening lines.
    pub fn move_up_visual(&mut self, viewport_width: u32, viewport_height: u32) {
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);

        let cursor = self.edit_buffer.cursor();
        let current_vline_idx = Self::find_vline_index(&vlines, cursor.offset);

        if current_vline_idx == 0 {
            return;
        }

        let current_vline = &vlines[current_vline_idx];
        let actual_col = self.visual_col_in_vline(current_vline, cursor.offset);
        let target_col = self.desired_visual_col.unwrap_or(actual_col as u32);
        self.desired_visual_col = Some(target_col);

        let prev_vline = &vlines[current_vline_idx - 1];
        let target_offset = self.offset_at_visual_col(prev_vline, target_col as usize);
        self.edit_buffer.set_cursor_by_offset(target_offset);
    }

    /// Move cursor down one visual line (accounts for wrapping).
    ///
    /// In wrapped mode, this moves down within a wrapped line segment. In
    /// non-wrapped mode each logical line is its own visual line, so this
    /// moves down a logical line while preserving the desired visual column
    /// across shorter intervening lines.
    pub fn move_down_visual(&mut self, viewport_width: u32, viewport_height: u32) {
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);

        let cursor = self.edit_buffer.cursor();
        let current_vline_idx = Self::find_vline_index(&vlines, cursor.offset);

        if current_vline_idx + 1 >= vlines.len() {
            return;
        }

        let current_vline = &vlines[current_vline_idx];
        let actual_col = self.visual_col_in_vline(current_vline, cursor.offset);
        let target_col = self.desired_visual_col.unwrap_or(actual_col as u32);
        self.desired_visual_col = Some(target_col);

        let next_vline = &vlines[current_vline_idx + 1];
        let target_offset = self.offset_at_visual_col(next_vline, target_col as usize);
        self.edit_buffer.set_cursor_by_offset(target_offset);
    }

    /// Get the start of the current visual line.
    ///
    /// In wrapped mode, returns the start of the current wrapped segment.
    /// In non-wrapped mode, returns the start of the logical line.
    #[must_use]
    pub fn get_visual_sol(&self, viewport_width: u32, viewport_height: u32) -> usize {
        if self.wrap_mode == WrapMode::None {
            let cursor = self.edit_buffer.cursor();
            return char_offset_of_line_start(self.edit_buffer.buffer(), cursor.row);
        }

        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);

        let cursor = self.edit_buffer.cursor();
        let idx = Self::find_vline_index(&vlines, cursor.offset);
        if idx < vlines.len() {
            return vlines[idx].char_start;
        }

        cursor.offset
    }

    /// Get the end of the current visual line.
    ///
    /// In wrapped mode, returns the end of the current wrapped segment.
    /// In non-wrapped mode, returns the end of the logical line (before newline).
    #[must_use]
    pub fn get_visual_eol(&self, viewport_width: u32, viewport_height: u32) -> usize {
        if self.wrap_mode == WrapMode::None {
            return self.edit_buffer.get_eol();
        }

        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);

        let cursor = self.edit_buffer.cursor();
        let idx = Self::find_vline_index(&vlines, cursor.offset);
        if idx < vlines.len() {
            return vlines[idx].char_end;
        }

        cursor.offset
    }

    /// Move cursor to start of visual line.
    pub fn move_to_visual_sol(&mut self, viewport_width: u32, viewport_height: u32) {
        let sol = self.get_visual_sol(viewport_width, viewport_height);
        self.edit_buffer.set_cursor_by_offset(sol);
        self.desired_visual_col = None;
    }

    /// Move cursor to end of visual line.
    pub fn move_to_visual_eol(&mut self, viewport_width: u32, viewport_height: u32) {
        let eol = self.get_visual_eol(viewport_width, viewport_height);
        self.edit_buffer.set_cursor_by_offset(eol);
        self.desired_visual_col = None;
    }

    /// Get visual cursor info for a given viewport size.
    #[must_use]
    pub fn visual_cursor(&self, viewport_width: u32, viewport_height: u32) -> VisualCursor {
        let cursor = self.edit_buffer.cursor();
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let view = TextBufferView::new(self.edit_buffer.buffer())
            .viewport(0, 0, text_width, viewport_height)
            .wrap_mode(self.wrap_mode);
        let (visual_row, visual_col) = if self.wrap_mode == WrapMode::None {
            (cursor.row as u32, cursor.col as u32)
        } else {
            view.visual_position_for_offset(cursor.offset)
        };

        VisualCursor {
            visual_row,
            visual_col,
            logical_row: cursor.row as u32,
            logical_col: cursor.col as u32,
            offset: cursor.offset as u32,
        }
    }

    /// Resolve a visual (wrapped-row, column) position to the logical
    /// `(row, col)` it lands on. `vrow`/`vcol` beyond the last virtual line
    /// or its width clamp to that line's end, matching [`Self::set_cursor`]'s
    /// clamping behavior.
    #[must_use]
    pub fn visual_to_logical(
        &self,
        vrow: usize,
        vcol: usize,
        viewport_width: u32,
        viewport_height: u32,
    ) -> (usize, usize) {
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);
        if vlines.is_empty() {
            return (0, 0);
        }

        let vline = &vlines[vrow.min(vlines.len() - 1)];
        let char_offset = self.offset_at_visual_col(vline, vcol);
        let line_start = char_offset_of_line_start(self.edit_buffer.buffer(), vline.source_line);
        (vline.source_line, char_offset.saturating_sub(line_start))
    }

    /// Resolve a logical `(row, col)` position to its visual (wrapped-row,
    /// column) position under the current wrap configuration. A `col` past
    /// the end of `row` clamps to that line's width.
    #[must_use]
    pub fn logical_to_visual(
        &self,
        row: usize,
        col: usize,
        viewport_width: u32,
        viewport_height: u32,
    ) -> (u32, u32) {
        let gutter_width = if self.line_numbers {
            self.gutter_width()
        } else {
            0
        };
        let text_width = viewport_width.saturating_sub(gutter_width);
        let vlines = self.build_virtual_lines(text_width, viewport_height);
        if vlines.is_empty() {
            return (0, 0);
        }

        let buffer = self.edit_buffer.buffer();
        let line_start = char_offset_of_line_start(buffer, row);
        let line_char_len = buffer.lines().nth(row).map_or(0, |l| l.chars().count());
        let char_offset = (line_start + col).min(line_start + line_char_len);

        let idx = Self::find_vline_index(&vlines, char_offset);
        let vline = &vlines[idx];
        (idx as u32, self.visual_col_in_vline(vline, char_offset) as u32)
    }

    /// Calculate gutter width for line numbers.
    #[must_use]
    pub fn gutter_width(&self) -> u32 {
        if !self.line_numbers {
            return 0;
        }

        let line_count = self.edit_buffer.buffer().len_lines().max(1);
        let digits = line_count.ilog10() + 1;
        digits + 2 // digit count + padding
    }

    /// Build virtual line information for visual navigation. Offsets are in
    /// characters, matching cursor offsets elsewhere in this module.
    #[allow(clippy::too_many_lines)]
    fn build_virtual_lines(&self, text_width: u32, _viewport_height: u32) -> Vec<VirtualLine> {
        use unicode_segmentation::UnicodeSegmentation;

        let mut lines = Vec::new();
        let buffer = self.edit_buffer.buffer();
        let method = buffer.width_method();
        let tab_width = buffer.tab_width().max(1) as usize;
        let wrap_width = if self.wrap_mode != WrapMode::None && text_width > 0 {
            Some(text_width as usize)
        } else {
            None
        };

        let mut line_start_char = 0usize;
        for (line_idx, line) in buffer.lines().enumerate() {
            let line_char_len = line.chars().count();

            if line.is_empty() {
                lines.push(VirtualLine {
                    source_line: line_idx,
                    char_start: line_start_char,
                    char_end: line_start_char,
                    width: 0,
                    is_wrap: false,
                });
                line_start_char += 1;
                continue;
            }

            let Some(wrap_width) = wrap_width else {
                let width = crate::unicode::display_width_with_method(&line, method);
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
            let mut last_break: Option<(usize, usize, usize)> = None;
            let mut i = 0usize;

            while i < graphemes.len() {
                let grapheme = graphemes[i];
                let g_chars = grapheme.chars().count();

                let g_width = if grapheme == "\t" {
                    let offset = current_width % tab_width;
                    tab_width - offset
                } else {
                    crate::unicode::display_width_with_method(grapheme, method)
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

    /// Find the virtual line index for a char offset, handling cursor at newline positions.
    fn find_vline_index(vlines: &[VirtualLine], char_offset: usize) -> usize {
        for (idx, vline) in vlines.iter().enumerate() {
            let is_last = idx == vlines.len() - 1;
            if char_offset < vline.char_start {
                continue;
            }
            if char_offset < vline.char_end {
                return idx;
            }
            if char_offset == vline.char_end {
                if is_last {
                    return idx;
                }
                let next_vline = &vlines[idx + 1];
                if next_vline.source_line != vline.source_line {
                    return idx;
                }
            }
        }
        vlines.len().saturating_sub(1)
    }

    /// Find the character offset at a target visual column within a virtual line.
    fn offset_at_visual_col(&self, vline: &VirtualLine, target_col: usize) -> usize {
        use unicode_segmentation::UnicodeSegmentation;

        let text = self.edit_buffer.buffer().to_string();
        let segment: String = text
            .chars()
            .skip(vline.char_start)
            .take(vline.char_end - vline.char_start)
            .collect();

        let method = self.edit_buffer.buffer().width_method();
        let tab_width = self.edit_buffer.buffer().tab_width().max(1) as usize;

        let mut current_col = 0usize;
        let mut char_offset = vline.char_start;

        for grapheme in segment.graphemes(true) {
            if current_col >= target_col {
                break;
            }

            let g_width = if grapheme == "\t" {
                let offset = current_col % tab_width;
                tab_width - offset
            } else {
                crate::unicode::display_width_with_method(grapheme, method)
            };

            current_col += g_width;
            char_offset += grapheme.chars().count();
        }

        char_offset.min(vline.char_end)
    }

    /// Calculate the visual column of a character offset within a virtual line.
    fn visual_col_in_vline(&self, vline: &VirtualLine, char_offset: usize) -> usize {
        use unicode_segmentation::UnicodeSegmentation;

        let text = self.edit_buffer.buffer().to_string();
        let end = vline.char_end.min(char_offset);
        let segment: String = text
            .chars()
            .skip(vline.char_start)
            .take(end.saturating_sub(vline.char_start))
            .collect();

        let method = self.edit_buffer.buffer().width_method();
        let tab_width = self.edit_buffer.buffer().tab_width().max(1) as usize;

        let mut width = 0usize;
        for grapheme in segment.graphemes(true) {
            if grapheme == "\t" {
                let offset = width % tab_width;
                width += tab_width - offset;
            } else {
                width += crate::unicode::display_width_with_method(grapheme, method);
            }
        }

        width
    }

    /// Render to output buffer.
    pub fn render_to(&mut self, output: &mut CellBuffer, x: u32, y: u32, width: u32, height: u32) {
        let (x, y, width, height) = if let Some(viewport) = self.viewport {
            (viewport.x, viewport.y, viewport.width, viewport.height)
        } else {
            (x, y, width, height)
        };

        let gutter_width = self.gutter_width();
        let text_x = x + gutter_width;
        let text_width = width.saturating_sub(gutter_width);

        if self.line_numbers {
            self.render_line_numbers(output, x, y, gutter_width, height);
        }

        let mut view = TextBufferView::new(self.edit_buffer.buffer())
            .viewport(0, 0, text_width, height)
            .wrap_mode(self.wrap_mode)
            .scroll(self.scroll_x, self.scroll_y);

        if let Some(sel) = self.selection {
            view.set_selection(sel.start, sel.end, sel.style);
        }
        if let Some(local) = self.local_selection {
            view.set_local_selection(
                local.anchor_x,
                local.anchor_y,
                local.focus_x,
                local.focus_y,
                local.style,
            );
        }

        view.render_to(output, text_x as i32, y as i32);

        self.render_cursor(output, &view, text_x, y, text_width, height);
    }

    fn render_line_numbers(
        &self,
        output: &mut CellBuffer,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) {
        let start_line = self.scroll_y as usize;
        let end_line = (start_line + height as usize).min(self.edit_buffer.buffer().len_lines());
        let cursor_row = self.edit_buffer.cursor().row;

        for (offset, line_num) in (start_line..end_line).enumerate() {
            let display_num = line_num + 1;
            let s = format!("{display_num:>width$} ", width = (width - 1) as usize);

            let style = if line_num == cursor_row {
                self.line_number_style.with_bold()
            } else {
                self.line_number_style
            };

            output.draw_text(x, y + offset as u32, &s, style);
        }
    }

    fn render_cursor(
        &self,
        output: &mut CellBuffer,
        view: &TextBufferView<'_>,
        text_x: u32,
        text_y: u32,
        _width: u32,
        _height: u32,
    ) {
        let cursor = self.edit_buffer.cursor();
        let (visual_row, visual_col) = if self.wrap_mode == WrapMode::None {
            (cursor.row as u32, cursor.col as u32)
        } else {
            view.visual_position_for_offset(cursor.offset)
        };

        if visual_row < self.scroll_y {
            return;
        }

        let visible_row = visual_row - self.scroll_y;
        let visible_col = if self.wrap_mode == WrapMode::None {
            visual_col.saturating_sub(self.scroll_x)
        } else {
            visual_col
        };

        let cursor_x = text_x + visible_col;
        let cursor_y = text_y + visible_row;

        if let Some(cell) = output.get_mut(cursor_x, cursor_y) {
            cell.apply_style(self.cursor_style);
        }
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::empty()
    }
}
