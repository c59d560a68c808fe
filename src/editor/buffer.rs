use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The editable surface: structured markup held in a rope.
///
/// Tracks a cursor and an optional selection anchor. The selection spans
/// from the anchor to the cursor; any movement collapses it.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<Cursor>,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole content and park the cursor at the end.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.anchor = None;
        self.move_to_end();
    }

    /// Insert a string at the cursor, replacing the selection if there is one.
    pub fn insert_str(&mut self, s: &str) {
        self.delete_selection();
        if s.is_empty() {
            return;
        }
        let char_idx = self.char_idx_of(self.cursor);
        self.rope.insert(char_idx, s);
        self.cursor = self.cursor_at(char_idx + s.chars().count());
    }

    /// Delete the selection, or the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let char_idx = self.char_idx_of(self.cursor);
        if char_idx == 0 {
            return false;
        }
        self.rope.remove(char_idx - 1..char_idx);
        self.cursor = self.cursor_at(char_idx - 1);
        true
    }

    /// Delete the selection, or the character at the cursor (Delete).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let char_idx = self.char_idx_of(self.cursor);
        if char_idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(char_idx..=char_idx);
        true
    }

    // --- Selection ---

    /// Select from `anchor` to `head`; the cursor moves to `head`.
    pub fn select(&mut self, anchor: Cursor, head: Cursor) {
        let anchor = self.clamp(anchor);
        let head = self.clamp(head);
        self.anchor = (anchor != head).then_some(anchor);
        self.cursor = head;
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self) {
        let end = self.cursor_at(self.rope.len_chars());
        self.select(Cursor::new(), end);
    }

    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// The selection as an ordered `(start, end)` char range.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let anchor = self.char_idx_of(self.anchor?);
        let head = self.char_idx_of(self.cursor);
        (anchor != head).then(|| (anchor.min(head), anchor.max(head)))
    }

    /// The selected text, if any.
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection_range()?;
        Some(self.rope.slice(start..end).to_string())
    }

    /// Replace the selection with `text` and select the inserted text.
    ///
    /// With no selection the text is inserted at the cursor and then selected.
    pub fn replace_selection(&mut self, text: &str) {
        self.delete_selection();
        let start = self.char_idx_of(self.cursor);
        self.rope.insert(start, text);
        let end = start + text.chars().count();
        self.select(self.cursor_at(start), self.cursor_at(end));
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection_range() else {
            self.anchor = None;
            return false;
        };
        self.rope.remove(start..end);
        self.anchor = None;
        self.cursor = self.cursor_at(start);
        true
    }

    // --- Movement ---

    /// Move the cursor in the given direction, collapsing the selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor to a specific line and column.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        self.cursor = self.clamp(Cursor::at(line, col));
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.anchor = None;
        let last_line = self.line_count().saturating_sub(1);
        self.cursor = Cursor::at(last_line, self.line_len(last_line));
    }

    // --- Private helpers ---

    fn clamp(&self, cursor: Cursor) -> Cursor {
        let line = cursor.line.min(self.line_count().saturating_sub(1));
        let text = self.line_at(line).unwrap_or_default();
        let mut col = cursor.col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        Cursor::at(line, col)
    }

    /// Convert a cursor position to a rope char index.
    fn char_idx_of(&self, cursor: Cursor) -> usize {
        let line_idx = cursor.line.min(self.line_count().saturating_sub(1));
        let line_start = self.rope.line_to_char(line_idx);
        let line = self.line_at(line_idx).unwrap_or_default();
        let byte_col = cursor.col.min(line.len());
        line_start + line[..byte_col].chars().count()
    }

    /// Convert a rope char index to a cursor position.
    fn cursor_at(&self, char_idx: usize) -> Cursor {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let offset = char_idx - self.rope.line_to_char(line);
        let col = self
            .rope
            .line(line)
            .chars()
            .take(offset)
            .map(char::len_utf8)
            .sum();
        Cursor::at(line, col)
    }

    fn move_left(&mut self) {
        let idx = self.char_idx_of(self.cursor);
        if idx > 0 {
            self.cursor = self.cursor_at(idx - 1);
        }
    }

    fn move_right(&mut self) {
        let idx = self.char_idx_of(self.cursor);
        if idx < self.rope.len_chars() {
            self.cursor = self.cursor_at(idx + 1);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.col = self.sticky_col(self.cursor.line);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.col = self.sticky_col(self.cursor.line);
        }
    }

    /// The remembered column on `line`, pulled back to a char boundary.
    fn sticky_col(&self, line: usize) -> usize {
        self.clamp(Cursor::at(line, self.cursor.col_memory)).col
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .finish()
    }
}
