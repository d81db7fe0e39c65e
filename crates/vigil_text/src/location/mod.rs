//! Position-only source keys and byte spans.

use std::fmt;

use crate::{Position, TextRange};

/// Byte range into a single text snapshot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// The spanned slice of `text`, or `""` when the span is out of bounds.
    pub fn slice(self, text: &str) -> &str {
        text.get(self.start as usize..self.end as usize).unwrap_or("")
    }
}

/// A line/column range used as a stable key for execution metadata.
///
/// Lines and columns are 1-based and the end column is inclusive, matching
/// what interpreters report for source sections. Equality and hashing are
/// purely positional: two locations are equal iff their coordinates match,
/// whatever text they cover. Line numbers are rewritten when edits change
/// the number of lines before or inside the location.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SourceLocation {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl SourceLocation {
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        SourceLocation {
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }

    /// Whether the edit `range` lies strictly between the first and last line
    /// of this location, touching neither boundary line.
    pub fn contains_range(&self, range: TextRange) -> bool {
        let edit_start = range.start.line + 1;
        let edit_end = range.end.line + 1;
        self.start_line < edit_start && edit_end < self.end_line
    }

    /// Whether this location starts on a line after the last line of `range`.
    pub fn is_after_range(&self, range: TextRange) -> bool {
        range.end.line + 1 < self.start_line
    }

    /// Whether this location ends on a line before the first line of `range`.
    pub fn is_before_range(&self, range: TextRange) -> bool {
        self.end_line < range.start.line + 1
    }

    /// A copy with only the end line moved by `delta`.
    #[must_use]
    pub fn with_end_shifted(self, delta: i64) -> Self {
        SourceLocation {
            end_line: shift(self.end_line, delta),
            ..self
        }
    }

    /// A copy with both lines moved by `delta`.
    #[must_use]
    pub fn shifted(self, delta: i64) -> Self {
        SourceLocation {
            start_line: shift(self.start_line, delta),
            end_line: shift(self.end_line, delta),
            ..self
        }
    }

    /// Editor range covered by this location.
    pub fn to_range(&self) -> TextRange {
        TextRange::new(
            Position::new(
                self.start_line.saturating_sub(1),
                self.start_column.saturating_sub(1),
            ),
            Position::new(self.end_line.saturating_sub(1), self.end_column),
        )
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location[line={}-{}, column={}-{}]",
            self.start_line, self.end_line, self.start_column, self.end_column
        )
    }
}

fn shift(line: u32, delta: i64) -> u32 {
    let shifted = i64::from(line) + delta;
    u32::try_from(shifted.max(1)).unwrap_or(u32::MAX)
}
