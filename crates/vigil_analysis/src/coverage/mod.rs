//! Execution records keyed by source location.
//!
//! # Migration
//!
//! Records are keyed by [`SourceLocation`], which only knows coordinates.
//! When an edit changes the number of lines, keys are rewritten so that
//! they keep pointing at the same statements:
//!
//! ```text
//! edit strictly inside a location   end line += delta
//! edit before a location            both lines += delta
//! anything else                     unchanged
//! ```
//!
//! A location whose boundary line is touched by the edit is left alone,
//! even when the edit changes the lines it covers.

use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::Url;
use vigil_engine::HookId;
use vigil_text::{AppliedEdit, EditListener, SourceLocation, TextRange};

/// Frames captured at one location during one coverage run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageRecord<F> {
    /// The entry point whose execution reached the location.
    pub entry_point: Url,
    /// The hook binding that captured the frames.
    pub hook: HookId,
    /// One frame per execution, oldest first.
    pub frames: Vec<F>,
}

#[derive(Clone, Debug)]
pub struct CoverageStore<F> {
    records: FxHashMap<SourceLocation, Vec<CoverageRecord<F>>>,
}

impl<F> Default for CoverageStore<F> {
    fn default() -> Self {
        CoverageStore {
            records: FxHashMap::default(),
        }
    }
}

impl<F> CoverageStore<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of covered locations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Store `frame` as one more execution of `location`.
    pub fn record(&mut self, location: SourceLocation, entry_point: &Url, hook: HookId, frame: F) {
        let records = self.records.entry(location).or_default();
        match records.last_mut() {
            Some(last) if last.hook == hook && last.entry_point == *entry_point => {
                last.frames.push(frame);
            }
            _ => records.push(CoverageRecord {
                entry_point: entry_point.clone(),
                hook,
                frames: vec![frame],
            }),
        }
    }

    pub fn is_covered(&self, location: &SourceLocation) -> bool {
        self.records.get(location).is_some_and(|records| !records.is_empty())
    }

    pub fn records_for(&self, location: &SourceLocation) -> &[CoverageRecord<F>] {
        self.records.get(location).map(Vec::as_slice).unwrap_or_default()
    }

    /// Distinct entry points that reached `location`, in recording order.
    pub fn entry_points(&self, location: &SourceLocation) -> Vec<&Url> {
        let mut entries: Vec<&Url> = Vec::new();
        for record in self.records_for(location) {
            if !entries.contains(&&record.entry_point) {
                entries.push(&record.entry_point);
            }
        }
        entries
    }

    pub fn locations(&self) -> impl Iterator<Item = &SourceLocation> {
        self.records.keys()
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
    }

    /// Rewrite keys after an edit of `range` that replaced `deleted_lines`
    /// lines with `inserted_lines` lines. Returns how many keys moved.
    pub fn migrate(&mut self, range: TextRange, inserted_lines: u32, deleted_lines: u32) -> usize {
        let delta = i64::from(inserted_lines) - i64::from(deleted_lines);
        if delta == 0 {
            return 0;
        }

        let moves: Vec<(SourceLocation, SourceLocation)> = self
            .records
            .keys()
            .filter_map(|&location| {
                if location.contains_range(range) {
                    Some((location, location.with_end_shifted(delta)))
                } else if location.is_after_range(range) {
                    Some((location, location.shifted(delta)))
                } else {
                    None
                }
            })
            .collect();

        // Take every moving entry out first so that a new key never
        // overwrites an entry that has yet to move.
        let taken: Vec<(SourceLocation, Vec<CoverageRecord<F>>)> = moves
            .iter()
            .filter_map(|(old, new)| self.records.remove(old).map(|records| (*new, records)))
            .collect();
        for (location, records) in taken {
            self.records.entry(location).or_default().extend(records);
        }

        tracing::trace!(moved = moves.len(), delta, "coverage migrated");
        moves.len()
    }
}

impl<F> EditListener for CoverageStore<F> {
    fn edit_applied(&mut self, edit: &AppliedEdit) {
        self.migrate(edit.range, edit.inserted_lines, edit.deleted_lines);
    }
}
