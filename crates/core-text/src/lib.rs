//! Rope-based text buffer abstraction.
//!
//! All offsets exposed by this crate are *character* offsets (Unicode scalar
//! values), never bytes. Rows are delimited by `\n` only; the rope is built
//! without CR / Unicode line-break recognition so a stray `\r` is an ordinary
//! character.

use ropey::Rope;
use std::fmt;

pub mod coords;
mod error;
pub mod line_ending;
pub mod motion;

pub use coords::{RowCol, offset_to_row_col, row_col_to_offset};
pub use error::TextError;
pub use line_ending::{LineEnding, NormalizedText, normalize_line_endings};

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice. No normalization is applied.
    pub fn new(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of rows. An empty buffer, or one ending in `\n`, still
    /// counts the (empty) row after the last newline.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Character length of a line excluding its newline. Out of range lines are 0.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let n = line.len_chars();
        if n > 0 && line.char(n - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    /// Offset of the first character of line `idx` (0-based). Caller guarantees `idx < line_count()`.
    pub fn line_start(&self, idx: usize) -> usize {
        debug_assert!(idx < self.rope.len_lines(), "line index in range");
        self.rope.line_to_char(idx)
    }

    /// 0-based line containing `offset`. `offset == len_chars()` is allowed.
    pub fn line_of(&self, offset: usize) -> Result<usize, TextError> {
        self.check_offset(offset)?;
        Ok(self.rope.char_to_line(offset))
    }

    pub fn check_offset(&self, offset: usize) -> Result<(), TextError> {
        let len = self.len_chars();
        if offset > len {
            return Err(TextError::OffsetOutOfRange { offset, len });
        }
        Ok(())
    }

    /// Validate a half-open range `[start,end)`.
    pub fn check_range(&self, start: usize, end: usize) -> Result<(), TextError> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(TextError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// Copy of the characters in `[start,end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<String, TextError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Insert `text` so that its first character lands at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), TextError> {
        self.check_offset(offset)?;
        self.rope.insert(offset, text);
        Ok(())
    }

    /// Delete `[start,end)` and return the removed text.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<String, TextError> {
        self.check_range(start, end)?;
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        Ok(removed)
    }
}

impl From<&str> for Buffer {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("chars", &self.len_chars())
            .field("lines", &self.line_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::new("hello\nworld");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "hello\n");
        assert_eq!(b.line(1).unwrap(), "world");
        assert_eq!(b.line(2), None);
    }

    #[test]
    fn line_len_excludes_newline() {
        let b = Buffer::new("ab\n\ncde\n");
        assert_eq!(b.line_count(), 4);
        assert_eq!(b.line_len(0), 2);
        assert_eq!(b.line_len(1), 0);
        assert_eq!(b.line_len(2), 3);
        assert_eq!(b.line_len(3), 0);
        assert_eq!(b.line_len(99), 0);
    }

    #[test]
    fn carriage_return_is_not_a_line_break() {
        let b = Buffer::new("a\rb\nc");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_len(0), 3);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let mut b = Buffer::new("αβγ");
        assert_eq!(b.len_chars(), 3);
        b.insert(1, "x").unwrap();
        assert_eq!(b.to_string(), "αxβγ");
        assert_eq!(b.remove(2, 3).unwrap(), "β");
        assert_eq!(b.to_string(), "αxγ");
    }

    #[test]
    fn insert_at_end_and_start() {
        let mut b = Buffer::new("mid");
        b.insert(3, "!").unwrap();
        b.insert(0, "<").unwrap();
        assert_eq!(b.to_string(), "<mid!");
    }

    #[test]
    fn insert_past_end_rejected() {
        let mut b = Buffer::new("ab");
        let err = b.insert(3, "x").unwrap_err();
        assert_eq!(err, TextError::OffsetOutOfRange { offset: 3, len: 2 });
        assert_eq!(b.to_string(), "ab");
    }

    #[test]
    fn remove_invalid_ranges_rejected() {
        let mut b = Buffer::new("hello");
        assert!(matches!(
            b.remove(3, 2),
            Err(TextError::InvalidRange { start: 3, end: 2, .. })
        ));
        assert!(matches!(b.remove(0, 6), Err(TextError::InvalidRange { .. })));
        assert_eq!(b.to_string(), "hello");
        assert_eq!(b.remove(2, 2).unwrap(), "");
    }

    #[test]
    fn slice_reads_without_mutation() {
        let b = Buffer::new("hello\nworld");
        assert_eq!(b.slice(4, 7).unwrap(), "o\nw");
        assert_eq!(b.len_chars(), 11);
    }

    #[test]
    fn line_of_end_offset() {
        let b = Buffer::new("ab\ncd");
        assert_eq!(b.line_of(5).unwrap(), 1);
        assert_eq!(b.line_of(2).unwrap(), 0);
        assert_eq!(b.line_of(3).unwrap(), 1);
        assert!(b.line_of(6).is_err());
    }
}
