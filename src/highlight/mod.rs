//! Syntax highlighting and style management.

mod syntax;

pub use syntax::{SyntaxStyle, SyntaxStyleRegistry};
