//! Session persistence: the edited document survives restarts.
//!
//! The session is a small JSON file holding the structured markup. Saves are
//! debounced by [`AutoSave`] so a burst of edits writes the file once.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::editor::{Debouncer, Editor, EditorConfig, EditorError, Result};

/// Current session file format.
pub const SESSION_VERSION: u32 = 1;

/// Quiet period after the last edit before the session is written.
pub const AUTO_SAVE_DELAY_MS: u64 = 2_000;

/// On-disk session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    /// Structured markup of the document.
    pub content: String,
}

impl SessionFile {
    pub fn from_editor(editor: &Editor) -> Self {
        Self {
            version: SESSION_VERSION,
            content: editor.html(),
        }
    }
}

/// Write the editor's document to `path`, creating parent directories.
pub fn save_session(path: &Path, editor: &Editor) -> Result<()> {
    let session = SessionFile::from_editor(editor);
    let json = serde_json::to_string_pretty(&session)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    debug!(path = %path.display(), bytes = session.content.len(), "saved session");
    Ok(())
}

/// Restore an editor from `path`. Returns `Ok(None)` if there is no session.
///
/// The restored document is the history floor of the new editor.
pub fn load_session(path: &Path, config: EditorConfig) -> Result<Option<Editor>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let session: SessionFile = serde_json::from_str(&json)?;
    if session.version != SESSION_VERSION {
        warn!(path = %path.display(), version = session.version, "unsupported session version");
        return Err(EditorError::UnsupportedSessionVersion(session.version));
    }
    debug!(path = %path.display(), bytes = session.content.len(), "restored session");
    Ok(Some(Editor::from_html(&session.content, config)))
}

/// Remove the session file if it exists.
pub fn clear_session(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Debounced session writer.
#[derive(Debug)]
pub struct AutoSave {
    path: PathBuf,
    debouncer: Debouncer,
}

impl AutoSave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_delay(path, AUTO_SAVE_DELAY_MS)
    }

    pub fn with_delay(path: impl Into<PathBuf>, delay_ms: u64) -> Self {
        Self {
            path: path.into(),
            debouncer: Debouncer::new(delay_ms),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Note that the document changed.
    pub const fn touch(&mut self, now_ms: u64) {
        self.debouncer.touch(now_ms);
    }

    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Write the session once the quiet period has elapsed.
    ///
    /// Returns whether a write happened.
    pub fn poll(&mut self, now_ms: u64, editor: &Editor) -> Result<bool> {
        if !self.debouncer.take_ready(now_ms) {
            return Ok(false);
        }
        save_session(&self.path, editor)?;
        Ok(true)
    }

    /// Write immediately if a save is pending.
    pub fn flush(&mut self, editor: &Editor) -> Result<bool> {
        if !self.debouncer.cancel() {
            return Ok(false);
        }
        save_session(&self.path, editor)?;
        Ok(true)
    }
}
