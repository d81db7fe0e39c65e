//! Line/column mapping for a text snapshot.
//!
//! Editors address text by `(line, character)` where the character is counted
//! in UTF-16 code units; Rust strings are addressed by byte offset. A
//! [`PositionMap`] bridges the two for exactly one snapshot. It is never
//! patched: any change to the text requires a new map, because line starts
//! after the edit point move.
//!
//! # Line Model
//!
//! Lines are separated by `\n`. A text ending in `\n` has a synthetic empty
//! line after the terminator which is *not* counted by [`PositionMap::line_count`]
//! but on which a cursor may rest:
//!
//! ```text
//! ""            line_count 0   (cursor may rest on line 0)
//! "abc"         line_count 1
//! "abc\n"       line_count 1   (cursor may rest on line 1)
//! "abc\nd"      line_count 2
//! ```

use std::cell::OnceCell;
use std::fmt;

/// A position in a text snapshot (0-based line, 0-based UTF-16 character).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// A half-open range between two [`Position`]s.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(start: Position, end: Position) -> Self {
        TextRange { start, end }
    }

    /// Shorthand for `TextRange::new(Position::new(..), Position::new(..))`.
    pub const fn from_coords(
        start_line: u32,
        start_character: u32,
        end_line: u32,
        end_character: u32,
    ) -> Self {
        TextRange {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    /// An empty range at `position`.
    pub const fn caret(position: Position) -> Self {
        TextRange {
            start: position,
            end: position,
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Offset index for one text snapshot.
///
/// Line starts are computed on first use and cached for the lifetime of the
/// map. The map borrows the snapshot so it cannot outlive (or drift from) it.
pub struct PositionMap<'text> {
    text: &'text str,
    line_starts: OnceCell<Vec<usize>>,
}

impl<'text> PositionMap<'text> {
    pub fn new(text: &'text str) -> Self {
        PositionMap {
            text,
            line_starts: OnceCell::new(),
        }
    }

    /// The snapshot this map indexes.
    pub fn text(&self) -> &'text str {
        self.text
    }

    /// Length of the snapshot in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            starts.extend(
                self.text
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| i + 1),
            );
            starts
        })
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.text.ends_with('\n')
    }

    /// Number of lines, not counting the synthetic line after a final `\n`.
    pub fn line_count(&self) -> u32 {
        if self.text.is_empty() {
            return 0;
        }
        let starts = self.starts().len();
        let count = if self.has_trailing_newline() {
            starts - 1
        } else {
            starts
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Byte offset where `line` starts.
    ///
    /// Defined for every counted line and for the synthetic trailing line.
    pub fn line_start_offset(&self, line: u32) -> Option<usize> {
        self.starts().get(line as usize).copied()
    }

    /// Byte offset where the content of `line` ends (before its `\n`).
    pub fn line_end_offset(&self, line: u32) -> Option<usize> {
        let starts = self.starts();
        let idx = line as usize;
        if idx >= starts.len() {
            return None;
        }
        Some(starts.get(idx + 1).map_or(self.text.len(), |next| next - 1))
    }

    /// Length of `line` in UTF-16 code units, excluding the line terminator.
    pub fn line_length(&self, line: u32) -> Option<u32> {
        let start = self.line_start_offset(line)?;
        let end = self.line_end_offset(line)?;
        Some(utf16_len(&self.text[start..end]))
    }

    /// Whether a cursor may rest on the 0-based `line`.
    pub fn is_line_valid(&self, line: u32) -> bool {
        let count = self.line_count();
        line < count || (line == count && self.has_trailing_newline()) || (line == 0 && count == 0)
    }

    /// Whether `character` lies within (or at the end of) the 0-based `line`.
    pub fn is_column_valid(&self, line: u32, character: u32) -> bool {
        self.is_line_valid(line) && self.line_length(line).is_some_and(|len| character <= len)
    }

    /// Byte offset of `position`, or `None` when the line does not exist.
    ///
    /// A character past the end of the line resolves to the end of the line.
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        let start = self.line_start_offset(position.line)?;
        let end = self.line_end_offset(position.line)?;
        Some(start + utf16_to_byte(&self.text[start..end], position.character))
    }

    /// Byte offset of `position` with both line and character clamped into the text.
    pub fn clamped_offset(&self, position: Position) -> usize {
        let last_line = u32::try_from(self.starts().len() - 1).unwrap_or(u32::MAX);
        let line = position.line.min(last_line);
        self.offset_of(Position::new(line, position.character))
            .unwrap_or(self.text.len())
    }

    /// Position of a byte offset. Offsets past the end clamp to the end; offsets
    /// inside a multi-byte character resolve to the start of that character.
    pub fn position_of(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let starts = self.starts();
        let line = match starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let character = utf16_len(&self.text[starts[line]..offset]);
        Position::new(u32::try_from(line).unwrap_or(u32::MAX), character)
    }
}

impl fmt::Debug for PositionMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionMap")
            .field("len", &self.text.len())
            .field("line_count", &self.line_count())
            .finish()
    }
}

/// Convert an editor line to a source line.
///
/// Returns `None` for lines the snapshot does not have. The synthetic line
/// after a trailing newline clamps onto the last real line; an empty snapshot
/// maps line 0 to line 1.
pub fn zero_based_line_to_one_based_line(line: u32, map: &PositionMap<'_>) -> Option<u32> {
    let count = map.line_count();
    if line < count {
        return Some(line + 1);
    }
    if count == 0 && line == 0 {
        return Some(1);
    }
    if line == count && map.has_trailing_newline() {
        tracing::trace!(line, "cursor on synthetic trailing line");
        return Some(line);
    }
    tracing::debug!(line, count, "line out of range");
    None
}

fn utf16_len(s: &str) -> u32 {
    let units: usize = s.chars().map(char::len_utf16).sum();
    u32::try_from(units).unwrap_or(u32::MAX)
}

/// Byte length of the longest prefix of `line` spanning at most `character` UTF-16 units.
fn utf16_to_byte(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        let width = u32::try_from(ch.len_utf16()).unwrap_or(2);
        if units + width > character {
            return idx;
        }
        units += width;
    }
    line.len()
}

#[cfg(test)]
mod tests;
