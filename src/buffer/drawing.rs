//! Text and box drawing operations.

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::Rgba;
use crate::style::Style;
use crate::unicode::{WidthMethod, graphemes};

/// Box drawing style with corner and edge characters.
#[derive(Clone, Debug)]
pub struct BoxStyle {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub style: Style,
}

/// Box side visibility.
#[derive(Clone, Copy, Debug)]
pub struct BoxSides {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Default for BoxSides {
    fn default() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

/// Title alignment for boxed titles.
#[derive(Clone, Copy, Debug, Default)]
pub enum TitleAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Extended box drawing options.
#[derive(Clone, Debug)]
pub struct BoxOptions {
    pub style: BoxStyle,
    pub sides: BoxSides,
    pub fill: Option<Rgba>,
    pub title: Option<String>,
    pub title_align: TitleAlign,
}

impl BoxOptions {
    #[must_use]
    pub fn new(style: BoxStyle) -> Self {
        Self {
            style,
            sides: BoxSides::default(),
            fill: None,
            title: None,
            title_align: TitleAlign::Left,
        }
    }
}

impl BoxStyle {
    /// Single-line box drawing characters.
    #[must_use]
    pub fn single(style: Style) -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            style,
        }
    }

    /// Double-line box drawing characters.
    #[must_use]
    pub fn double(style: Style) -> Self {
        Self {
            top_left: '╔',
            top_right: '╗',
            bottom_left: '╚',
            bottom_right: '╝',
            horizontal: '═',
            vertical: '║',
            style,
        }
    }

    /// Rounded corner box drawing characters.
    #[must_use]
    pub fn rounded(style: Style) -> Self {
        Self {
            top_left: '╭',
            top_right: '╮',
            bottom_left: '╰',
            bottom_right: '╯',
            horizontal: '─',
            vertical: '│',
            style,
        }
    }

    /// Heavy (bold) box drawing characters.
    #[must_use]
    pub fn heavy(style: Style) -> Self {
        Self {
            top_left: '┏',
            top_right: '┓',
            bottom_left: '┗',
            bottom_right: '┛',
            horizontal: '━',
            vertical: '┃',
            style,
        }
    }

    /// ASCII box drawing characters (works in all terminals).
    #[must_use]
    pub fn ascii(style: Style) -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
            style,
        }
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self::single(Style::NONE)
    }
}

/// Draw text at position, handling grapheme clusters and wide characters.
///
/// Non-ASCII clusters go through the buffer's grapheme pool exactly as
/// [`CellBuffer::set_grapheme`] does; a plain ASCII cluster is written
/// directly without allocating a pool slot.
pub fn draw_text(buffer: &mut CellBuffer, x: u32, y: u32, text: &str, style: Style) {
    let mut col = x;

    for grapheme in graphemes(text) {
        if grapheme == "\n" || grapheme == "\r" {
            continue;
        }

        let width = crate::unicode::display_width_with_method(grapheme, WidthMethod::default());
        buffer.set_grapheme(col, y, grapheme, style, WidthMethod::default());
        col += width.max(1) as u32;
    }
}

/// Draw a box border.
pub fn draw_box(buffer: &mut CellBuffer, x: u32, y: u32, w: u32, h: u32, box_style: BoxStyle) {
    if w < 2 || h < 2 {
        return;
    }

    let style = box_style.style;

    // Corners
    buffer.set(x, y, Cell::new(box_style.top_left, style));
    buffer.set(x + w - 1, y, Cell::new(box_style.top_right, style));
    buffer.set(x, y + h - 1, Cell::new(box_style.bottom_left, style));
    buffer.set(
        x + w - 1,
        y + h - 1,
        Cell::new(box_style.bottom_right, style),
    );

    // Horizontal edges
    for col in (x + 1)..(x + w - 1) {
        buffer.set(col, y, Cell::new(box_style.horizontal, style));
        buffer.set(col, y + h - 1, Cell::new(box_style.horizontal, style));
    }

    // Vertical edges
    for row in (y + 1)..(y + h - 1) {
        buffer.set(x, row, Cell::new(box_style.vertical, style));
        buffer.set(x + w - 1, row, Cell::new(box_style.vertical, style));
    }
}

/// Draw a box border with extended options.
pub fn draw_box_with_options(
    buffer: &mut CellBuffer,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    options: BoxOptions,
) {
    if w < 2 || h < 2 {
        return;
    }

    let style = options.style.style;

    // Optional fill
    if let Some(bg) = options.fill {
        if w > 2 && h > 2 {
            buffer.fill_rect(x + 1, y + 1, w - 2, h - 2, bg);
        }
    }

    // Corners
    if options.sides.top && options.sides.left {
        buffer.set(x, y, Cell::new(options.style.top_left, style));
    }
    if options.sides.top && options.sides.right {
        buffer.set(x + w - 1, y, Cell::new(options.style.top_right, style));
    }
    if options.sides.bottom && options.sides.left {
        buffer.set(x, y + h - 1, Cell::new(options.style.bottom_left, style));
    }
    if options.sides.bottom && options.sides.right {
        buffer.set(
            x + w - 1,
            y + h - 1,
            Cell::new(options.style.bottom_right, style),
        );
    }

    // Horizontal edges
    if options.sides.top {
        for col in (x + 1)..(x + w - 1) {
            buffer.set(col, y, Cell::new(options.style.horizontal, style));
        }
    }
    if options.sides.bottom {
        for col in (x + 1)..(x + w - 1) {
            buffer.set(col, y + h - 1, Cell::new(options.style.horizontal, style));
        }
    }

    // Vertical edges
    if options.sides.left {
        for row in (y + 1)..(y + h - 1) {
            buffer.set(x, row, Cell::new(options.style.vertical, style));
        }
    }
    if options.sides.right {
        for row in (y + 1)..(y + h - 1) {
            buffer.set(x + w - 1, row, Cell::new(options.style.vertical, style));
        }
    }

    // Title
    if let Some(title) = options.title {
        if options.sides.top && w > 2 {
            let available = (w - 2) as usize;
            let title_text = if title.len() > available {
                title.chars().take(available).collect::<String>()
            } else {
                title
            };
            let start_offset = match options.title_align {
                TitleAlign::Left => 0,
                TitleAlign::Center => (available.saturating_sub(title_text.len())) / 2,
                TitleAlign::Right => available.saturating_sub(title_text.len()),
            };
            let title_x = x + 1 + start_offset as u32;
            buffer.draw_text(title_x, y, &title_text, style);
        }
    }
}

/// Draw a horizontal line.
pub fn draw_hline(buffer: &mut CellBuffer, x: u32, y: u32, len: u32, ch: char, style: Style) {
    for col in x..x.saturating_add(len) {
        buffer.set(col, y, Cell::new(ch, style));
    }
}

/// Draw a vertical line.
pub fn draw_vline(buffer: &mut CellBuffer, x: u32, y: u32, len: u32, ch: char, style: Style) {
    for row in y..y.saturating_add(len) {
        buffer.set(x, row, Cell::new(ch, style));
    }
}
