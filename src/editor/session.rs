use std::path::Path;

use html_escape::encode_text;
use tracing::{debug, trace};

use super::buffer::{Cursor, Direction, EditorBuffer};
use super::commands::{self, FormatCommand};
use super::debounce::Debouncer;
use super::error::Result;
use super::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::document::{Document, SourceFormat};
use crate::markup;

/// Default quiet period before typed text is committed to history.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Tunables for an [`Editor`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots.
    pub history_limit: usize,
    /// Quiet period after typing before a snapshot is taken.
    pub debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// A rich-text editing session.
///
/// Holds the structured markup being edited, its undo/redo history and the
/// debouncer that turns bursts of typing into single snapshots. Time only
/// enters through the `now_ms` arguments.
#[derive(Debug)]
pub struct Editor {
    buffer: EditorBuffer,
    history: History,
    debouncer: Debouncer,
    config: EditorConfig,
}

impl Editor {
    /// Start from an empty document.
    pub fn new(config: EditorConfig) -> Self {
        Self::from_html("", config)
    }

    /// Start from structured markup; it becomes the history floor.
    pub fn from_html(html: &str, config: EditorConfig) -> Self {
        let mut buffer = EditorBuffer::from_text(html);
        buffer.move_to_end();
        let mut history = History::new(config.history_limit);
        history.save_state(html);
        Self {
            buffer,
            history,
            debouncer: Debouncer::new(config.debounce_ms),
            config,
        }
    }

    /// Start from markup text.
    pub fn from_markup(text: &str, config: EditorConfig) -> Self {
        Self::from_html(&markup::from_markup(text), config)
    }

    pub const fn config(&self) -> EditorConfig {
        self.config
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Whether typed text is waiting for the debouncer.
    pub const fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    // --- Typing ---

    /// Type text at the cursor, replacing the selection. The text is
    /// entity-escaped; a snapshot follows once typing pauses.
    pub fn type_text(&mut self, text: &str, now_ms: u64) {
        self.buffer.insert_str(&encode_text(text));
        self.debouncer.touch(now_ms);
    }

    pub fn insert_line_break(&mut self, now_ms: u64) {
        self.buffer.insert_str("<br>");
        self.debouncer.touch(now_ms);
    }

    pub fn delete_back(&mut self, now_ms: u64) -> bool {
        let deleted = self.buffer.delete_back();
        if deleted {
            self.debouncer.touch(now_ms);
        }
        deleted
    }

    pub fn delete_forward(&mut self, now_ms: u64) -> bool {
        let deleted = self.buffer.delete_forward();
        if deleted {
            self.debouncer.touch(now_ms);
        }
        deleted
    }

    // --- Cursor and selection ---

    pub fn move_cursor(&mut self, direction: Direction) {
        self.buffer.move_cursor(direction);
    }

    pub fn move_to(&mut self, line: usize, col: usize) {
        self.buffer.move_to(line, col);
    }

    pub const fn move_home(&mut self) {
        self.buffer.move_home();
    }

    pub fn move_end(&mut self) {
        self.buffer.move_end();
    }

    pub fn select(&mut self, anchor: Cursor, head: Cursor) {
        self.buffer.select(anchor, head);
    }

    pub fn select_all(&mut self) {
        self.buffer.select_all();
    }

    pub const fn clear_selection(&mut self) {
        self.buffer.clear_selection();
    }

    /// The selected structured markup, if any.
    pub fn selected_html(&self) -> Option<String> {
        self.buffer.selected_text()
    }

    // --- Commands and history ---

    /// Apply a formatting command to the selection.
    ///
    /// The state before the command is committed first, so pending typing
    /// and the command land in separate snapshots. Returns `false` when the
    /// command had nothing to act on.
    pub fn apply(&mut self, command: &FormatCommand) -> bool {
        self.record_edit();
        let selection = self.buffer.selected_text();
        let Some(replacement) = command.render(selection.as_deref()) else {
            trace!(command = command.name(), "format command skipped");
            return false;
        };
        self.buffer.replace_selection(&replacement);
        self.record_edit();
        debug!(command = command.name(), "applied format command");
        true
    }

    /// Commit the current state to history now.
    ///
    /// Cancels any pending debounced commit. Returns whether a snapshot was
    /// pushed (identical states are skipped).
    pub fn record_edit(&mut self) -> bool {
        self.debouncer.cancel();
        self.history.save_state(&self.buffer.text())
    }

    /// Drive the debouncer; commits typed text once the quiet period is over.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.debouncer.take_ready(now_ms) {
            self.history.save_state(&self.buffer.text())
        } else {
            false
        }
    }

    /// Step back one snapshot. Pending typed text is committed first.
    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.buffer.replace_all(snapshot);
        trace!(depth = self.history.undo_len(), "undo");
        true
    }

    /// Re-apply the last undone snapshot.
    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.buffer.replace_all(snapshot);
        trace!(depth = self.history.undo_len(), "redo");
        true
    }

    /// Whether there is an edit to step back over. Typing still waiting for
    /// the debouncer counts.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.has_pending_edit()
    }

    /// Whether an undone snapshot is waiting; pending typing discards it.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.has_pending_edit()
    }

    /// Empty the document and reset history to a single floor entry.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.buffer.replace_all("");
        self.history.reset("");
    }

    fn flush_pending(&mut self) {
        if self.debouncer.is_pending() {
            self.record_edit();
        }
    }

    // --- Views ---

    /// The structured markup being edited.
    pub fn html(&self) -> String {
        self.buffer.text()
    }

    pub fn document(&self) -> Document {
        Document::parse_html(&self.html())
    }

    pub fn to_markup(&self) -> String {
        self.document().to_markup()
    }

    /// Whitespace-separated words in the visible text. Block boundaries and
    /// line breaks separate words; markup and entities do not count.
    pub fn word_count(&self) -> usize {
        commands::plain_lines(&self.html())
            .iter()
            .map(|line| line.split_whitespace().count())
            .sum()
    }

    // --- Load and export ---

    /// Replace the document with file contents, picking the dialect from
    /// the file name, and commit it as an edit.
    pub fn load(&mut self, bytes: &[u8], file_name: impl AsRef<Path>) -> Result<()> {
        let file_name = file_name.as_ref();
        let text = String::from_utf8(bytes.to_vec())?;
        let format = SourceFormat::from_file_name(file_name);
        let html = match format {
            SourceFormat::Markup => markup::from_markup(&text),
            SourceFormat::Html => text,
            SourceFormat::PlainText => encode_text(&text).into_owned(),
        };
        self.debouncer.cancel();
        self.buffer.replace_all(&html);
        self.record_edit();
        debug!(file = %file_name.display(), ?format, bytes = bytes.len(), "loaded document");
        Ok(())
    }

    /// The document as markup bytes.
    pub fn export_markup(&self) -> Vec<u8> {
        self.to_markup().into_bytes()
    }

    /// The structured markup as bytes.
    pub fn export_html(&self) -> Vec<u8> {
        self.html().into_bytes()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
