//! Text storage and editing with styled segments.

mod buffer;
mod edit;
mod editor;
mod segment;
mod view;

pub use buffer::TextBuffer;
pub use edit::{Cursor, CursorPosition, EditBuffer};
pub use editor::{CursorShape, EditorView, VisualCursor};
pub use segment::{Segment, StyledChunk, StyledSegment};
pub use view::{
    LineInfo, LocalSelection, Selection, TextBufferView, TextMeasure, Viewport, WrapMode,
};
