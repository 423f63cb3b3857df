//! Load-time line-ending normalization.
//!
//! `\r\n` pairs collapse to `\n` exactly once, when content is loaded. A lone
//! `\r` is left untouched. Nothing re-expands on save: what the buffer holds is
//! what gets written.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub normalized: String,   // CRLF collapsed to LF
    pub original: LineEnding, // majority style of the source
    pub mixed: bool,          // both styles encountered
}

/// Collapse CRLF to LF and report the dominant source style.
/// Ties (including no newlines at all) resolve to LF.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let bytes = input.as_bytes();
    let mut crlf = 0usize;
    let mut lf = 0usize;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            if i > 0 && bytes[i - 1] == b'\r' {
                crlf += 1;
            } else {
                lf += 1;
            }
        }
    }
    let original = if crlf > lf {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    };
    let normalized = if crlf == 0 {
        input.to_string()
    } else {
        input.replace("\r\n", "\n")
    };
    NormalizedText {
        normalized,
        original,
        mixed: crlf > 0 && lf > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_crlf() {
        let n = normalize_line_endings("a\r\nb\r\n");
        assert_eq!(n.normalized, "a\nb\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(!n.mixed);
    }

    #[test]
    fn lone_cr_preserved() {
        let n = normalize_line_endings("a\rb\n");
        assert_eq!(n.normalized, "a\rb\n");
        assert_eq!(n.original, LineEnding::Lf);
    }

    #[test]
    fn normalize_mixed_majority() {
        let n = normalize_line_endings("a\r\nb\nc\r\n");
        assert_eq!(n.normalized, "a\nb\nc\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(n.mixed);
    }

    #[test]
    fn normalize_unicode_crlf_preserves_multibyte() {
        let n = normalize_line_endings("α\r\nβ\nγ\r\n");
        assert_eq!(n.normalized, "α\nβ\nγ\n");
        assert!(n.mixed);
    }

    #[test]
    fn normalize_idempotent() {
        let once = normalize_line_endings("x\r\n\r\ny");
        let twice = normalize_line_endings(&once.normalized);
        assert_eq!(once.normalized, "x\n\ny");
        assert_eq!(twice.normalized, once.normalized);
        assert_eq!(twice.original, LineEnding::Lf);
    }

    #[test]
    fn empty_input() {
        let n = normalize_line_endings("");
        assert_eq!(n.normalized, "");
        assert_eq!(n.original, LineEnding::Lf);
        assert!(!n.mixed);
    }
}
