//! `textcore_rs` - Unicode-aware text engine core for terminal UI libraries.
//!
//! Maintains an editable document, computes wrapped visual layout, tracks
//! styling and selection, and composites styled cells into a cell grid
//! suitable for a terminal back-end to diff and emit.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (SIMD-style chunked scanning)
#![allow(dead_code)] // Public API functions not yet used internally
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow Cell::CellContent etc
#![allow(clippy::struct_excessive_bools)] // Cell/style flags are naturally boolean-heavy
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::format_push_string)] // format! with push_str is fine
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::branches_sharing_code)] // Code clarity over DRY in branching
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod event;
pub mod highlight;
pub mod pool;
pub mod rope;
pub mod style;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use buffer::CellBuffer;
pub use cell::{Cell, CellContent};
pub use color::Rgba;
pub use error::{Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use pool::{GraphemeId, GraphemePool, GraphemeTracker};
pub use rope::Rope;
pub use style::{Style, TextAttributes};
pub use text::{
    CursorShape, EditBuffer, EditorView, Segment, StyledChunk, StyledSegment, TextBuffer,
    TextBufferView, VisualCursor, WrapMode,
};
pub use unicode::{WidthMethod, set_width_method};
