//! Editor change batches.
//!
//! # Design
//!
//! Edits are applied in the order the editor sent them. Each ranged edit is
//! interpreted against the text produced by every earlier edit of the same
//! batch, so a fresh [`PositionMap`] is built per step. An edit without a
//! range replaces the whole text; later edits then apply to the replacement.
//!
//! Application is total: ranges pointing past the end of the text clamp to
//! the end, characters past the end of a line clamp to the line end, and
//! inverted ranges collapse to an insertion.

use crate::{Position, PositionMap, TextRange};

/// One editor change.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EditEvent {
    /// The range to replace; `None` replaces the entire text.
    pub range: Option<TextRange>,
    /// The replacement text.
    pub text: String,
}

impl EditEvent {
    /// Replace the entire text.
    pub fn full(text: impl Into<String>) -> Self {
        EditEvent {
            range: None,
            text: text.into(),
        }
    }

    /// Replace `range` with `text`.
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        EditEvent {
            range: Some(range),
            text: text.into(),
        }
    }

    /// Insert `text` at `at`.
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        EditEvent {
            range: Some(TextRange::caret(at)),
            text: text.into(),
        }
    }
}

/// A ranged edit as it was applied to the text.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AppliedEdit {
    /// The range as sent by the editor.
    pub range: TextRange,
    /// Lines spanned by the inserted text.
    pub inserted_lines: u32,
    /// Lines spanned by the replaced text.
    pub deleted_lines: u32,
}

impl AppliedEdit {
    /// Net change in the number of lines.
    pub fn line_delta(&self) -> i64 {
        i64::from(self.inserted_lines) - i64::from(self.deleted_lines)
    }
}

/// Observer of ranged edits, invoked before the edit is applied.
pub trait EditListener {
    fn edit_applied(&mut self, edit: &AppliedEdit);
}

/// Number of lines a piece of text spans. The empty string spans one line.
pub fn line_span(text: &str) -> u32 {
    let newlines = text.bytes().filter(|&b| b == b'\n').count();
    u32::try_from(newlines + 1).unwrap_or(u32::MAX)
}

/// Apply `edits` to `text` in order and return the resulting text.
pub fn apply_edits(
    text: &str,
    edits: &[EditEvent],
    mut listener: Option<&mut dyn EditListener>,
) -> String {
    let mut buffer = text.to_owned();
    for edit in edits {
        let Some(range) = edit.range else {
            buffer.clear();
            buffer.push_str(&edit.text);
            continue;
        };

        let (begin, end) = replace_bounds(&PositionMap::new(&buffer), range);
        if let Some(listener) = listener.as_mut() {
            listener.edit_applied(&AppliedEdit {
                range,
                inserted_lines: line_span(&edit.text),
                deleted_lines: line_span(&buffer[begin..end]),
            });
        }
        buffer.replace_range(begin..end, &edit.text);
    }
    buffer
}

/// Byte range replaced by an edit of `range` against the snapshot of `map`.
fn replace_bounds(map: &PositionMap<'_>, range: TextRange) -> (usize, usize) {
    let line_count = map.line_count();
    if range.start.line >= line_count {
        // Starts on a line that does not exist yet: append.
        tracing::trace!(%range, line_count, "edit starts past the last line");
        return (map.len(), map.len());
    }
    let begin = map.clamped_offset(range.start);
    let end = if range.end.line >= line_count {
        map.len()
    } else {
        map.clamped_offset(range.end)
    };
    (begin, end.max(begin))
}
