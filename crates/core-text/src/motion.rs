//! Cursor motion helpers.
//!
//! These operate purely on a `Buffer` + offset pair and are free of view or
//! history state. Horizontal motions step one character and cross newlines;
//! vertical motions keep a sticky goal column that the caller stores between
//! successive moves and discards on any horizontal move, edit, or click.

use crate::coords::{offset_to_row_col, row_col_to_offset};
use crate::{Buffer, TextError};

/// Move left one character (no-op at buffer start).
pub fn left(_buf: &Buffer, offset: usize) -> usize {
    offset.saturating_sub(1)
}

/// Move right one character (no-op at buffer end).
pub fn right(buf: &Buffer, offset: usize) -> usize {
    (offset + 1).min(buf.len_chars())
}

/// Move to start of the row containing `offset`.
pub fn line_start(buf: &Buffer, offset: usize) -> Result<usize, TextError> {
    let line = buf.line_of(offset)?;
    Ok(buf.line_start(line))
}

/// Move to end of the row containing `offset` (before its newline).
pub fn line_end(buf: &Buffer, offset: usize) -> Result<usize, TextError> {
    let line = buf.line_of(offset)?;
    Ok(buf.line_start(line) + buf.line_len(line))
}

/// Move up one row preserving a target column (sticky). Returns the new offset
/// and the sticky column to carry into the next vertical move. When
/// `sticky_col` is `None` it is seeded from the current column. On the first
/// row the offset is unchanged.
pub fn up(
    buf: &Buffer,
    offset: usize,
    sticky_col: Option<usize>,
) -> Result<(usize, Option<usize>), TextError> {
    let here = offset_to_row_col(buf, offset)?;
    let goal = sticky_col.unwrap_or(here.col);
    if here.row == 1 {
        return Ok((offset, Some(goal)));
    }
    Ok((row_col_to_offset(buf, here.row - 1, goal)?, Some(goal)))
}

/// Move down one row preserving sticky column. On the last row the offset is unchanged.
pub fn down(
    buf: &Buffer,
    offset: usize,
    sticky_col: Option<usize>,
) -> Result<(usize, Option<usize>), TextError> {
    let here = offset_to_row_col(buf, offset)?;
    let goal = sticky_col.unwrap_or(here.col);
    if here.row >= buf.line_count() {
        return Ok((offset, Some(goal)));
    }
    Ok((row_col_to_offset(buf, here.row + 1, goal)?, Some(goal)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_moves_cross_newlines_and_stop_at_edges() {
        let b = Buffer::new("a\nb");
        assert_eq!(left(&b, 0), 0);
        assert_eq!(right(&b, 1), 2);
        assert_eq!(left(&b, 2), 1);
        assert_eq!(right(&b, 3), 3);
    }

    #[test]
    fn line_bounds() {
        let b = Buffer::new("abc\ndefg");
        assert_eq!(line_start(&b, 6).unwrap(), 4);
        assert_eq!(line_end(&b, 5).unwrap(), 8);
        assert_eq!(line_end(&b, 1).unwrap(), 3);
    }

    #[test]
    fn vertical_motion_remembers_goal_through_short_lines() {
        // goal column 6 on row 1, passes through a 2-char row and an empty row
        let b = Buffer::new("abcdefgh\nab\n\nabcdefghij");
        let start = 6;
        let (o, g) = down(&b, start, None).unwrap();
        assert_eq!(o, 11); // end of "ab"
        assert_eq!(g, Some(6));
        let (o, g) = down(&b, o, g).unwrap();
        assert_eq!(o, 12); // empty row
        let (o, g) = down(&b, o, g).unwrap();
        assert_eq!(o, 13 + 6);
        let (o, g) = up(&b, o, g).unwrap();
        let (o, g) = up(&b, o, g).unwrap();
        let (o, _) = up(&b, o, g).unwrap();
        assert_eq!(o, start);
    }

    #[test]
    fn vertical_motion_at_edges_keeps_offset() {
        let b = Buffer::new("ab\ncd");
        let (o, g) = up(&b, 1, None).unwrap();
        assert_eq!((o, g), (1, Some(1)));
        let (o, g) = down(&b, 4, None).unwrap();
        assert_eq!((o, g), (4, Some(1)));
    }

    #[test]
    fn vertical_motion_rejects_out_of_range_offset() {
        let b = Buffer::new("ab");
        assert!(up(&b, 9, None).is_err());
    }
}
