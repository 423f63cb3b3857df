//! Absolute offset <-> (row, column) mapping.
//!
//! Rows are 1-based. Columns count characters since the preceding `\n` (or
//! since the start of the buffer for row 1), so the first column of every row
//! is 0. Both functions are pure: they read the buffer and hold no state.

use crate::{Buffer, TextError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl RowCol {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Map an absolute offset to its row/column. `offset == len` maps just past
/// the last character.
pub fn offset_to_row_col(buffer: &Buffer, offset: usize) -> Result<RowCol, TextError> {
    let line = buffer.line_of(offset)?;
    let col = offset - buffer.line_start(line);
    Ok(RowCol { row: line + 1, col })
}

/// Inverse of [`offset_to_row_col`]. Over-long columns clamp to the row's end
/// so vertical motion onto a shorter row lands at end-of-line.
pub fn row_col_to_offset(buffer: &Buffer, row: usize, col: usize) -> Result<usize, TextError> {
    let rows = buffer.line_count();
    if row == 0 || row > rows {
        return Err(TextError::RowOutOfRange { row, rows });
    }
    let line = row - 1;
    Ok(buffer.line_start(line) + col.min(buffer.line_len(line)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_row_columns() {
        let b = Buffer::new("ab\ncd");
        assert_eq!(offset_to_row_col(&b, 0).unwrap(), RowCol::new(1, 0));
        assert_eq!(offset_to_row_col(&b, 2).unwrap(), RowCol::new(1, 2));
        assert_eq!(offset_to_row_col(&b, 3).unwrap(), RowCol::new(2, 0));
        assert_eq!(offset_to_row_col(&b, 5).unwrap(), RowCol::new(2, 2));
    }

    #[test]
    fn end_offset_after_trailing_newline() {
        let b = Buffer::new("ab\n");
        assert_eq!(offset_to_row_col(&b, 3).unwrap(), RowCol::new(2, 0));
    }

    #[test]
    fn empty_buffer_maps_origin() {
        let b = Buffer::new("");
        assert_eq!(offset_to_row_col(&b, 0).unwrap(), RowCol::new(1, 0));
        assert_eq!(row_col_to_offset(&b, 1, 0).unwrap(), 0);
        assert_eq!(row_col_to_offset(&b, 1, 7).unwrap(), 0);
    }

    #[test]
    fn offset_past_end_is_out_of_range() {
        let b = Buffer::new("abc");
        assert_eq!(
            offset_to_row_col(&b, 4),
            Err(TextError::OffsetOutOfRange { offset: 4, len: 3 })
        );
    }

    #[test]
    fn column_clamps_to_row_length() {
        let b = Buffer::new("long line\nab\nxyz");
        assert_eq!(row_col_to_offset(&b, 2, 50).unwrap(), 12);
        assert_eq!(row_col_to_offset(&b, 3, 50).unwrap(), 16);
    }

    #[test]
    fn row_outside_buffer_is_out_of_range() {
        let b = Buffer::new("a\nb");
        assert_eq!(
            row_col_to_offset(&b, 0, 0),
            Err(TextError::RowOutOfRange { row: 0, rows: 2 })
        );
        assert_eq!(
            row_col_to_offset(&b, 3, 0),
            Err(TextError::RowOutOfRange { row: 3, rows: 2 })
        );
    }

    proptest! {
        #[test]
        fn mapping_round_trips_every_offset(text in "[a-c\n\r é]{0,40}") {
            let b = Buffer::new(&text);
            for o in 0..=b.len_chars() {
                let rc = offset_to_row_col(&b, o).unwrap();
                prop_assert_eq!(row_col_to_offset(&b, rc.row, rc.col).unwrap(), o);
            }
        }
    }
}
