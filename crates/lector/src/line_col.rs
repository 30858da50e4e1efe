//! Offset to line/column mapping
//!
//! Readers report absolute byte offsets; human-facing reports want lines
//! and columns. Hosts reconstruct them from the whole document with
//! [`line_col`].

use crate::text::TextSize;

/// One-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Map a byte offset into `input` to its line and column.
///
/// Columns count characters, not bytes; offsets at or past the end of
/// input map to one past the last character.
#[must_use]
pub fn line_col(input: &str, offset: TextSize) -> LineCol {
    let target = offset.as_usize().min(input.len());
    let mut line = 1;
    let mut column = 1;
    for (at, c) in input.char_indices() {
        if at >= target {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    LineCol { line, column }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(line_col("abc", TextSize::zero()), LineCol { line: 1, column: 1 });
        assert_eq!(line_col("abc", TextSize::from(2)), LineCol { line: 1, column: 3 });
    }

    #[test]
    fn test_after_newlines() {
        let input = "ab\ncd\ne";
        assert_eq!(line_col(input, TextSize::from(3)), LineCol { line: 2, column: 1 });
        assert_eq!(line_col(input, TextSize::from(6)), LineCol { line: 3, column: 1 });
    }

    #[test]
    fn test_past_end_clamps() {
        assert_eq!(line_col("ab", TextSize::from(10)), LineCol { line: 1, column: 3 });
    }

    #[test]
    fn test_multibyte_column() {
        // é is two bytes but one column
        assert_eq!(line_col("éx", TextSize::from(2)), LineCol { line: 1, column: 2 });
    }
}
