use thiserror::Error;

/// Bounds violations raised by buffer and coordinate operations.
///
/// Every variant is a caller bug: the view layer is expected to clamp before
/// calling in. Nothing here is retried or silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("offset {offset} out of range (buffer length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("row {row} out of range (valid rows 1..={rows})")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("range {start}..{end} invalid for buffer length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}
