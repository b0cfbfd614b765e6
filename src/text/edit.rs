//! Editable text buffer with cursor and undo/redo.
//!
//! This module provides [`EditBuffer`], which wraps a [`TextBuffer`] with
//! editing capabilities including cursor movement, text insertion/deletion,
//! and undo/redo history.
//!
//! # Examples
//!
//! ```
//! use textcore_rs::EditBuffer;
//!
//! let mut buf = EditBuffer::with_text("Hello World");
//!
//! // Move cursor to end of line and delete backward
//! buf.move_to_line_end();
//! buf.delete_backward(); // Removes 'd'
//! buf.commit(); // Create undo checkpoint
//! assert_eq!(buf.text(), "Hello Worl");
//!
//! // Undo restores deleted text
//! buf.undo();
//! assert_eq!(buf.text(), "Hello World");
//! ```

// Iterator patterns are clearer in their current form
#![allow(clippy::while_let_on_iterator)]
// if-let-else is clearer than map_or for complex logic
#![allow(clippy::option_if_let_else)]

use crate::style::Style;
use crate::text::TextBuffer;
use crate::text::segment::StyledChunk;

/// Cursor position in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Character offset in the buffer.
    pub offset: usize,
    /// Line number (0-indexed).
    pub row: usize,
    /// Column number (0-indexed, in characters).
    pub col: usize,
}

impl Cursor {
    /// Create a new cursor at position.
    #[must_use]
    pub fn new(offset: usize, row: usize, col: usize) -> Self {
        Self { offset, row, col }
    }

    /// Create a cursor at the beginning.
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }
}

/// Cursor position info with offset and visual column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
    pub offset: usize,
}

/// An edit operation for undo/redo, expressed as a char-offset splice.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

impl EditOp {
    fn invert(&self) -> Self {
        match self {
            Self::Insert { offset, text } => Self::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Self::Delete { offset, text } => Self::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }
}

/// Default maximum number of undo groups to retain.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Edit history for undo/redo with bounded memory usage.
#[derive(Clone, Debug)]
struct History {
    undo_stack: Vec<Vec<EditOp>>,
    redo_stack: Vec<Vec<EditOp>>,
    current_group: Vec<EditOp>,
    /// Maximum number of undo groups to retain. Oldest entries are dropped when exceeded.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: Vec::new(),
            max_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl History {
    fn new() -> Self {
        Self::default()
    }

    fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    fn push(&mut self, op: EditOp) {
        self.current_group.push(op);
        self.redo_stack.clear();
    }

    fn commit(&mut self) {
        if !self.current_group.is_empty() {
            self.undo_stack
                .push(std::mem::take(&mut self.current_group));
            if self.undo_stack.len() > self.max_depth {
                let excess = self.undo_stack.len() - self.max_depth;
                self.undo_stack.drain(..excess);
            }
        }
    }

    fn pop_undo(&mut self) -> Option<Vec<EditOp>> {
        self.commit();
        self.undo_stack.pop()
    }

    fn push_redo(&mut self, ops: Vec<EditOp>) {
        self.redo_stack.push(ops);
    }

    fn pop_redo(&mut self) -> Option<Vec<EditOp>> {
        self.redo_stack.pop()
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || !self.current_group.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group.clear();
    }
}

/// True if `ch` is a word constituent for word-boundary navigation.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Convert a char offset into `(row, col)`, both measured in characters.
fn offset_to_row_col(text: &str, offset: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for (i, ch) in text.chars().enumerate() {
        if i == offset {
            return (row, col);
        }
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

/// Convert a `(row, col)` position back into a char offset, clamping `col` to
/// the line length and `row` to the last line.
fn row_col_to_offset(text: &str, row: usize, col: usize) -> usize {
    let mut cur_row = 0;
    let mut line_start = 0;
    let mut offset = 0;
    for (i, ch) in text.chars().enumerate() {
        if cur_row == row {
            line_start = i;
            break;
        }
        if ch == '\n' {
            cur_row += 1;
        }
        offset = i + 1;
    }
    if cur_row < row {
        // row beyond the last line: clamp to end of text
        return text.chars().count();
    }
    let mut c = 0;
    for (i, ch) in text.chars().enumerate().skip(line_start) {
        if c == col || ch == '\n' {
            return i;
        }
        c += 1;
    }
    text.chars().count().max(offset)
}

/// Text buffer with editing operations, cursor, and undo/redo.
///
/// `EditBuffer` is the primary type for text editing. It tracks cursor
/// position, maintains undo/redo history, and provides operations for:
///
/// - **Cursor movement**: Lines, words, characters, document bounds
/// - **Text editing**: Insert, delete, backspace with cursor tracking
/// - **Line operations**: Duplicate, move, delete lines
/// - **History**: Grouped undo/redo with configurable depth limit
///
/// Every mutation goes through a char-offset splice on the plain text and
/// then calls [`TextBuffer::set_text`] to rebuild the rope, so highlights
/// added directly on the underlying buffer do not survive an edit -- callers
/// that need persistent syntax highlighting should reapply it after commit.
///
/// # History Management
///
/// Edit operations are grouped automatically. Call [`commit`](Self::commit)
/// to force a group boundary (e.g., after a pause in typing). The history depth
/// is bounded (default 1000 groups) to limit memory usage.
#[derive(Default)]
pub struct EditBuffer {
    buffer: TextBuffer,
    cursor: Cursor,
    history: History,
    placeholder: Option<String>,
    placeholder_chunks: Option<Vec<(String, Style)>>,
    /// Whether `buffer` currently holds placeholder content rather than real
    /// text. While true, [`text`](Self::text) reports empty and the next
    /// [`insert`](Self::insert) clears the buffer before typing.
    placeholder_active: bool,
    /// Column `move_up`/`move_down` try to return to after passing through
    /// a shorter line, independent of `cursor.col`'s own per-line clamping.
    /// `None` means "use the cursor's current column"; any horizontal move
    /// resets it so the next vertical move re-seeds from the new position.
    desired_col: Option<usize>,
}

impl EditBuffer {
    /// Create a new empty edit buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an edit buffer with initial text.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::with_text(text),
            cursor: Cursor::start(),
            history: History::new(),
            placeholder: None,
            placeholder_chunks: None,
            placeholder_active: false,
            desired_col: None,
        }
    }

    /// Create an edit buffer with a custom maximum undo history depth.
    ///
    /// The default is 1000 undo groups. Set a lower value for memory-constrained
    /// environments or a higher value for documents that need extensive undo history.
    #[must_use]
    pub fn with_max_history_depth(max_depth: usize) -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursor: Cursor::start(),
            history: History::with_max_depth(max_depth),
            placeholder: None,
            placeholder_chunks: None,
            placeholder_active: false,
            desired_col: None,
        }
    }

    /// Set the maximum undo history depth.
    ///
    /// If the current history exceeds the new depth, oldest entries will be
    /// pruned on the next commit.
    pub fn set_max_history_depth(&mut self, max_depth: usize) {
        self.history.max_depth = max_depth;
    }

    /// Get the current maximum undo history depth.
    #[must_use]
    pub fn max_history_depth(&self) -> usize {
        self.history.max_depth
    }

    /// Get the underlying text buffer.
    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Get mutable access to the text buffer.
    ///
    /// Edits made directly through the returned reference bypass cursor
    /// tracking and undo history; prefer the `EditBuffer` methods instead.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Get the full text content. While the placeholder is being displayed
    /// (see [`should_show_placeholder`](Self::should_show_placeholder)) this
    /// reports empty, even though the underlying buffer holds the
    /// placeholder's bytes for rendering.
    #[must_use]
    pub fn text(&self) -> String {
        if self.placeholder_active {
            String::new()
        } else {
            self.buffer.to_string()
        }
    }

    /// Replace the entire text, resetting cursor and history.
    ///
    /// Setting the empty string re-displays the placeholder if one is
    /// configured, matching the behavior of deleting the last real character.
    pub fn set_text(&mut self, text: &str) {
        self.placeholder_active = false;
        self.buffer.set_text(text);
        self.cursor = Cursor::start();
        self.desired_col = None;
        self.history.clear();
        self.sync_placeholder_display();
    }

    /// Placeholder text shown by renderers when the buffer is empty.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Set the placeholder text. `None` disables the placeholder.
    ///
    /// The placeholder is display-only: while it is active the underlying
    /// text buffer holds its bytes (so a renderer that just draws the buffer
    /// sees it), but [`text`](Self::text) keeps reporting empty.
    pub fn set_placeholder(&mut self, text: Option<String>) {
        self.placeholder_chunks = None;
        self.placeholder = text;
        self.sync_placeholder_display();
    }

    /// Set a styled placeholder, rendered as the given chunks while the
    /// buffer is empty. Equivalent to [`set_placeholder`](Self::set_placeholder)
    /// but preserves per-chunk style instead of flattening to plain text.
    pub fn set_placeholder_styled_text(&mut self, chunks: &[StyledChunk<'_>]) {
        let owned: Vec<(String, Style)> = chunks
            .iter()
            .map(|chunk| (chunk.text.to_string(), chunk.style))
            .collect();
        self.placeholder = Some(owned.iter().map(|(text, _)| text.as_str()).collect());
        self.placeholder_chunks = Some(owned);
        self.sync_placeholder_display();
    }

    /// Whether the placeholder is currently occupying the buffer in place of
    /// real content.
    #[must_use]
    pub fn should_show_placeholder(&self) -> bool {
        self.placeholder_active
    }

    /// Write the placeholder's bytes into the buffer and mark it active.
    fn show_placeholder(&mut self) {
        if let Some(chunks) = &self.placeholder_chunks {
            let refs: Vec<StyledChunk<'_>> = chunks
                .iter()
                .map(|(text, style)| StyledChunk::new(text, *style))
                .collect();
            self.buffer.set_styled_text(&refs);
        } else if let Some(text) = &self.placeholder {
            self.buffer.set_text(text);
        } else {
            return;
        }
        self.cursor = Cursor::start();
        self.placeholder_active = true;
    }

    /// Reconcile placeholder display with the current (non-placeholder)
    /// content: show it if the real document is empty and one is configured,
    /// hide it if one was just disabled while active.
    fn sync_placeholder_display(&mut self) {
        if self.placeholder_active {
            if self.placeholder.is_some() {
                self.show_placeholder();
            } else {
                self.placeholder_active = false;
                self.buffer.set_text("");
                self.cursor = Cursor::start();
            }
        } else if self.buffer.is_empty() && self.placeholder.is_some() {
            self.show_placeholder();
        }
    }

    /// If the placeholder currently occupies the buffer, clear it so real
    /// content can be inserted in its place.
    fn clear_placeholder_for_edit(&mut self) {
        if self.placeholder_active {
            self.placeholder_active = false;
            self.buffer.set_text("");
            self.cursor = Cursor::start();
        }
    }

    /// Re-display the placeholder if an edit just emptied the document.
    fn reactivate_placeholder_if_empty(&mut self) {
        if !self.placeholder_active && self.buffer.is_empty() && self.placeholder.is_some() {
            self.show_placeholder();
        }
    }

    /// Get the current cursor position.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Set the cursor position.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.desired_col = None;
        self.clamp_cursor();
    }

    /// Set the cursor by character offset.
    pub fn set_cursor_by_offset(&mut self, offset: usize) {
        self.cursor.offset = offset.min(self.buffer.len_chars());
        self.desired_col = None;
        self.update_cursor_position();
    }

    /// Get cursor position info.
    #[must_use]
    pub fn get_cursor_position(&self) -> CursorPosition {
        CursorPosition {
            row: self.cursor.row,
            col: self.cursor.col,
            offset: self.cursor.offset,
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        if self.cursor.offset > 0 {
            self.cursor.offset -= 1;
            self.desired_col = None;
            self.update_cursor_position();
        }
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor.offset < self.buffer.len_chars() {
            self.cursor.offset += 1;
            self.desired_col = None;
            self.update_cursor_position();
        }
    }

    /// Move cursor up, preserving column where possible.
    ///
    /// The column targeted is `desired_col` (seeded from the current column
    /// on the first vertical move of a run), not the column `cursor.col` was
    /// last clamped to — so stepping through a short line and back doesn't
    /// forget where the cursor "really" was horizontally.
    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            let target_col = self.desired_col.unwrap_or(self.cursor.col);
            self.desired_col = Some(target_col);
            self.cursor.row -= 1;
            self.cursor.col = target_col;
            self.update_cursor_from_row_col();
        }
    }

    /// Move cursor down, preserving column where possible.
    ///
    /// See [`move_up`](Self::move_up) for how `desired_col` is tracked.
    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.buffer.len_lines() {
            let target_col = self.desired_col.unwrap_or(self.cursor.col);
            self.desired_col = Some(target_col);
            self.cursor.row += 1;
            self.cursor.col = target_col;
            self.update_cursor_from_row_col();
        }
    }

    /// Move cursor to start of line.
    pub fn move_to_line_start(&mut self) {
        self.cursor.col = 0;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Move cursor to end of line.
    pub fn move_to_line_end(&mut self) {
        if let Some(line) = self.buffer.line(self.cursor.row) {
            self.cursor.col = line.chars().count();
            self.desired_col = None;
            self.update_cursor_from_row_col();
        }
    }

    /// Move to specific row and column.
    pub fn move_to(&mut self, row: usize, col: usize) {
        self.cursor.row = row.min(self.buffer.len_lines().saturating_sub(1));
        self.cursor.col = col;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Jump to a specific line (start of line). A row past the last line
    /// clamps to the last line, not past it.
    pub fn goto_line(&mut self, row: usize) {
        let row = row.min(self.buffer.len_lines().saturating_sub(1));
        self.cursor.row = row;
        self.cursor.col = 0;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Insert text at cursor.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.clear_placeholder_for_edit();
        let offset = self.cursor.offset;
        self.splice_insert(offset, text);
        self.history.push(EditOp::Insert {
            offset,
            text: text.to_string(),
        });
        self.cursor.offset = offset + text.chars().count();
        self.desired_col = None;
        self.update_cursor_position();
    }

    /// Delete character before cursor.
    pub fn delete_backward(&mut self) {
        if self.cursor.offset == 0 {
            return;
        }
        let start = self.cursor.offset - 1;
        let deleted = self.splice_delete(start, self.cursor.offset);
        self.history.push(EditOp::Delete {
            offset: start,
            text: deleted,
        });
        self.cursor.offset = start;
        self.desired_col = None;
        self.update_cursor_position();
        self.reactivate_placeholder_if_empty();
    }

    /// Delete character after cursor.
    pub fn delete_forward(&mut self) {
        if self.cursor.offset >= self.buffer.len_chars() {
            return;
        }
        let end = self.cursor.offset + 1;
        let deleted = self.splice_delete(self.cursor.offset, end);
        self.history.push(EditOp::Delete {
            offset: self.cursor.offset,
            text: deleted,
        });
        self.desired_col = None;
        self.update_cursor_position();
        self.reactivate_placeholder_if_empty();
    }

    /// Delete a range between two cursors.
    pub fn delete_range(&mut self, start: Cursor, end: Cursor) {
        let start_offset = start.offset.min(end.offset);
        let end_offset = start.offset.max(end.offset);
        self.delete_range_offsets(start_offset, end_offset);
    }

    /// Delete a range between character offsets.
    pub fn delete_range_offsets(&mut self, start: usize, end: usize) {
        if start >= end || start >= self.buffer.len_chars() {
            return;
        }
        let end = end.min(self.buffer.len_chars());
        let deleted = self.splice_delete(start, end);
        self.history.push(EditOp::Delete {
            offset: start,
            text: deleted,
        });
        self.cursor.offset = start;
        self.desired_col = None;
        self.update_cursor_position();
        self.reactivate_placeholder_if_empty();
    }

    /// Delete the current line (including trailing newline if present).
    pub fn delete_line(&mut self) {
        let text = self.buffer.to_string();
        let (start, end) = line_char_range(&text, self.cursor.row, true);
        self.delete_range_offsets(start, end);
    }

    /// Duplicate the current line (insert copy below).
    pub fn duplicate_line(&mut self) {
        let text = self.buffer.to_string();
        let (start, end_no_nl) = line_char_range(&text, self.cursor.row, false);
        let line_text: String = text.chars().skip(start).take(end_no_nl - start).collect();
        let is_last_line = self.cursor.row + 1 == self.buffer.len_lines();
        let (insert_pos, text_to_insert) = if is_last_line {
            (end_no_nl, format!("\n{line_text}"))
        } else {
            (start, format!("{line_text}\n"))
        };
        self.splice_insert(insert_pos, &text_to_insert);
        self.history.push(EditOp::Insert {
            offset: insert_pos,
            text: text_to_insert,
        });
        self.cursor.row += 1;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Move the current line up (swap with the line above).
    pub fn move_line_up(&mut self) {
        if self.cursor.row == 0 {
            return;
        }
        let target_row = self.cursor.row - 1;
        let target_col = self.cursor.col;
        let text = self.buffer.to_string();
        let (prev_start, cur_end_no_nl) = {
            let (prev_start, _) = line_char_range(&text, target_row, false);
            let (_, cur_end_no_nl) = line_char_range(&text, self.cursor.row, false);
            (prev_start, cur_end_no_nl)
        };
        let current_line: String = {
            let (s, e) = line_char_range(&text, self.cursor.row, false);
            text.chars().skip(s).take(e - s).collect()
        };
        let prev_line: String = {
            let (s, e) = line_char_range(&text, target_row, false);
            text.chars().skip(s).take(e - s).collect()
        };
        self.delete_range_offsets(prev_start, cur_end_no_nl);
        let new_text = format!("{current_line}\n{prev_line}");
        self.splice_insert(prev_start, &new_text);
        self.history.push(EditOp::Insert {
            offset: prev_start,
            text: new_text,
        });
        self.cursor.row = target_row;
        self.cursor.col = target_col;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Move the current line down (swap with the line below).
    pub fn move_line_down(&mut self) {
        let total_lines = self.buffer.len_lines();
        if self.cursor.row + 1 >= total_lines {
            return;
        }
        let target_row = self.cursor.row + 1;
        let target_col = self.cursor.col;
        let text = self.buffer.to_string();
        let (cur_start, _) = line_char_range(&text, self.cursor.row, false);
        let (_, next_end_no_nl) = line_char_range(&text, target_row, false);
        let current_line: String = {
            let (s, e) = line_char_range(&text, self.cursor.row, false);
            text.chars().skip(s).take(e - s).collect()
        };
        let next_line: String = {
            let (s, e) = line_char_range(&text, target_row, false);
            text.chars().skip(s).take(e - s).collect()
        };
        self.delete_range_offsets(cur_start, next_end_no_nl);
        let new_text = format!("{next_line}\n{current_line}");
        self.splice_insert(cur_start, &new_text);
        self.history.push(EditOp::Insert {
            offset: cur_start,
            text: new_text,
        });
        self.cursor.row = target_row;
        self.cursor.col = target_col;
        self.desired_col = None;
        self.update_cursor_from_row_col();
    }

    /// Replace the entire text, clearing history.
    pub fn replace_text(&mut self, text: &str) {
        self.set_text(text);
    }

    /// Get the next word boundary (character offset). Runs of non-word
    /// characters are treated as a single boundary, mirroring common editor
    /// behavior: a hyphen or space ends a word immediately.
    #[must_use]
    pub fn get_next_word_boundary(&self) -> usize {
        let text = self.buffer.to_string();
        let chars: Vec<char> = text.chars().collect();
        let mut idx = self.cursor.offset.min(chars.len());
        let mut in_word = false;
        while idx < chars.len() {
            let word_char = is_word_char(chars[idx]);
            if in_word && !word_char {
                return idx;
            }
            if word_char {
                in_word = true;
            }
            idx += 1;
        }
        idx
    }

    /// Get the previous word boundary (character offset).
    #[must_use]
    pub fn get_prev_word_boundary(&self) -> usize {
        let text = self.buffer.to_string();
        let chars: Vec<char> = text.chars().collect();
        if self.cursor.offset == 0 {
            return 0;
        }
        let mut idx = self.cursor.offset.min(chars.len());

        while idx > 0 && !is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
        idx
    }

    /// Move cursor to the next word boundary.
    pub fn move_word_right(&mut self) {
        let boundary = self.get_next_word_boundary();
        self.set_cursor_by_offset(boundary);
    }

    /// Move cursor to the previous word boundary.
    pub fn move_word_left(&mut self) {
        let boundary = self.get_prev_word_boundary();
        self.set_cursor_by_offset(boundary);
    }

    /// Delete from cursor to the next word boundary.
    pub fn delete_word_forward(&mut self) {
        let end = self.get_next_word_boundary();
        if end > self.cursor.offset {
            self.delete_range_offsets(self.cursor.offset, end);
        }
    }

    /// Delete from cursor to the previous word boundary.
    pub fn delete_word_backward(&mut self) {
        let start = self.get_prev_word_boundary();
        if start < self.cursor.offset {
            self.delete_range_offsets(start, self.cursor.offset);
        }
    }

    /// Get end of line offset for current line (before any trailing newline).
    #[must_use]
    pub fn get_eol(&self) -> usize {
        let text = self.buffer.to_string();
        let (_, end_no_nl) = line_char_range(&text, self.cursor.row, false);
        end_no_nl
    }

    /// Undo the last edit.
    pub fn undo(&mut self) -> bool {
        let Some(ops) = self.history.pop_undo() else {
            return false;
        };

        let mut redo_ops = Vec::new();
        for op in ops.into_iter().rev() {
            self.apply_op(&op.invert());
            redo_ops.push(op);
        }
        redo_ops.reverse();
        self.history.push_redo(redo_ops);
        self.reactivate_placeholder_if_empty();

        true
    }

    /// Redo the last undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(ops) = self.history.pop_redo() else {
            return false;
        };

        for op in &ops {
            self.apply_op(op);
        }
        self.history.undo_stack.push(ops);
        self.reactivate_placeholder_if_empty();

        true
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commit current edits as an undo group.
    pub fn commit(&mut self) {
        self.history.commit();
    }

    /// Clear the undo/redo history.
    ///
    /// This removes all undo and redo entries. Useful when loading new content
    /// where previous history is no longer relevant.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Splice `text` into the document at char offset `offset`, rebuilding
    /// the underlying rope in place.
    fn splice_insert(&mut self, offset: usize, text: &str) {
        let current = self.buffer.to_string();
        let mut new_text = String::with_capacity(current.len() + text.len());
        new_text.extend(current.chars().take(offset));
        new_text.push_str(text);
        new_text.extend(current.chars().skip(offset));
        self.buffer.set_text(&new_text);
    }

    /// Remove the char range `start..end`, returning the removed text.
    fn splice_delete(&mut self, start: usize, end: usize) -> String {
        let current = self.buffer.to_string();
        let deleted: String = current.chars().skip(start).take(end - start).collect();
        let mut new_text = String::with_capacity(current.len());
        new_text.extend(current.chars().take(start));
        new_text.extend(current.chars().skip(end));
        self.buffer.set_text(&new_text);
        deleted
    }

    fn apply_op(&mut self, op: &EditOp) {
        match op {
            EditOp::Insert { offset, text } => {
                self.splice_insert(*offset, text);
                self.cursor.offset = offset + text.chars().count();
            }
            EditOp::Delete { offset, text } => {
                let end = offset + text.chars().count();
                self.splice_delete(*offset, end);
                self.cursor.offset = *offset;
            }
        }
        self.update_cursor_position();
    }

    fn update_cursor_position(&mut self) {
        let text = self.buffer.to_string();
        let offset = self.cursor.offset.min(text.chars().count());
        self.cursor.offset = offset;
        let (row, col) = offset_to_row_col(&text, offset);
        self.cursor.row = row;
        self.cursor.col = col;
    }

    fn update_cursor_from_row_col(&mut self) {
        let text = self.buffer.to_string();
        let total_lines = self.buffer.len_lines();
        self.cursor.row = self.cursor.row.min(total_lines.saturating_sub(1));
        if let Some(line) = self.buffer.line(self.cursor.row) {
            self.cursor.col = self.cursor.col.min(line.chars().count());
        }
        self.cursor.offset = row_col_to_offset(&text, self.cursor.row, self.cursor.col);
    }

    fn clamp_cursor(&mut self) {
        self.cursor.offset = self.cursor.offset.min(self.buffer.len_chars());
        self.update_cursor_position();
    }
}

/// Char range of line `row` within `text`. If `include_newline` is true and
/// the line is followed by a `\n`, the range extends through that newline.
fn line_char_range(text: &str, row: usize, include_newline: bool) -> (usize, usize) {
    let mut cur_row = 0;
    let mut start = 0;
    let mut end = 0;
    let mut found_start = row == 0;
    for (i, ch) in text.chars().enumerate() {
        if cur_row == row && !found_start {
            start = i;
            found_start = true;
        }
        if ch == '\n' {
            if cur_row == row {
                end = if include_newline { i + 1 } else { i };
                return (start, end);
            }
            cur_row += 1;
            if cur_row == row {
                start = i + 1;
            }
        }
        end = i + 1;
    }
    if !found_start {
        start = end;
    }
    (start, end)
}
