// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # Richmark
//!
//! A rich-text document converter with bounded undo/redo.
//!
//! Richmark moves documents between three forms:
//! - Structured markup (the HTML an editing surface holds)
//! - A document tree of typed nodes
//! - A Markdown-subset markup dialect
//!
//! ## Modules
//!
//! - [`document`]: Document tree, structured-markup parsing and rendering
//! - [`markup`]: Conversion to and from the markup dialect
//! - [`editor`]: Editing session, formatting commands and history
//! - [`storage`]: Session auto-save
//! - [`config`]: Saved command-line defaults
//! - [`watcher`]: File watching

pub mod config;
pub mod document;
pub mod editor;
pub mod markup;
pub mod storage;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, Node, NodeKind};
    pub use crate::editor::{Editor, EditorConfig, FormatCommand, History};
    pub use crate::markup::{from_markup, to_markup};
}
