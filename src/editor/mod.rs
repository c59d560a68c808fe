//! Rich-text editing session with bounded undo/redo.
//!
//! Provides a rope-backed buffer over structured markup with cursor and
//! selection, formatting commands, a snapshot history and the debouncer that
//! decides when typed text becomes a snapshot.

mod buffer;
mod commands;
mod debounce;
mod error;
mod history;
mod session;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use commands::{CODE_PLACEHOLDER, FormatCommand};
pub use debounce::Debouncer;
pub use error::{EditorError, Result};
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use session::{DEFAULT_DEBOUNCE_MS, Editor, EditorConfig};
