//! Open documents and the edits made to them.

use std::collections::hash_map::Entry;
use std::fs;

use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::Url;
use vigil_engine::{ExecutionEngine, ParsedProgram, SourceFix};
use vigil_text::{apply_edits, EditEvent, EditListener, Position, PositionMap};

use crate::coverage::CoverageStore;

/// One resource known to the backend.
///
/// Holds the text as the editor sees it, the last program that parsed, and
/// the edits made since then. `F` is the engine's frame type.
#[derive(Debug)]
pub struct Document<F> {
    uri: Url,
    language_id: String,
    text: String,
    /// Edits applied since the last successful parse.
    pending_edits: Vec<EditEvent>,
    parsed: Option<ParsedProgram>,
    last_parse_failed: bool,
    /// Repaired text used while serving a single request.
    recovery_text: Option<String>,
    coverage: CoverageStore<F>,
    coverage_analysed: bool,
}

impl<F> Document<F> {
    pub fn new(uri: Url, language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            uri,
            language_id: language_id.into(),
            text: text.into(),
            pending_edits: Vec::new(),
            parsed: None,
            last_parse_failed: false,
            recovery_text: None,
            coverage: CoverageStore::new(),
            coverage_analysed: false,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// The text as the editor sees it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The recovery text while one is set, the editor text otherwise.
    pub fn current_text(&self) -> &str {
        self.recovery_text.as_deref().unwrap_or(&self.text)
    }

    /// Replace the whole text. Pending edits no longer apply to it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.pending_edits.clear();
    }

    pub fn pending_edits(&self) -> &[EditEvent] {
        &self.pending_edits
    }

    /// The last program that parsed, possibly stale.
    pub fn parsed(&self) -> Option<&ParsedProgram> {
        self.parsed.as_ref()
    }

    /// Whether the current text parsed.
    pub fn parse_succeeded(&self) -> bool {
        self.parsed.is_some() && !self.last_parse_failed
    }

    pub fn record_parse_success(&mut self, program: ParsedProgram) {
        self.parsed = Some(program);
        self.last_parse_failed = false;
        self.pending_edits.clear();
    }

    pub fn record_parse_failure(&mut self) {
        self.last_parse_failed = true;
    }

    pub fn recovery_text(&self) -> Option<&str> {
        self.recovery_text.as_deref()
    }

    pub fn set_recovery_text(&mut self, text: Option<String>) {
        self.recovery_text = text;
    }

    pub fn coverage(&self) -> &CoverageStore<F> {
        &self.coverage
    }

    pub fn coverage_mut(&mut self) -> &mut CoverageStore<F> {
        &mut self.coverage
    }

    pub fn has_coverage(&self) -> bool {
        !self.coverage.is_empty()
    }

    pub fn clear_coverage(&mut self) {
        self.coverage.clear_all();
        self.coverage_analysed = false;
    }

    /// Whether a coverage run was started from this document.
    pub fn coverage_analysed(&self) -> bool {
        self.coverage_analysed
    }

    pub fn mark_coverage_analysed(&mut self) {
        self.coverage_analysed = true;
    }

    /// Apply an edit batch and remember it until the next successful parse.
    ///
    /// Coverage keys follow the edits when the document has coverage.
    pub fn apply_edits(&mut self, edits: &[EditEvent]) -> &str {
        if edits.is_empty() {
            return &self.text;
        }
        self.pending_edits.extend_from_slice(edits);
        let listener: Option<&mut dyn EditListener> = if self.coverage.is_empty() {
            None
        } else {
            Some(&mut self.coverage)
        };
        self.text = apply_edits(&self.text, edits, listener);
        &self.text
    }

    /// Text to parse instead of the current one, for a request at `position`.
    ///
    /// The engine's own fix is tried first when `language_fixes` is set.
    /// Otherwise every pending edit except the last is replayed onto the
    /// last text that parsed; the last edit decides the cursor and whether
    /// it was a member-access trigger.
    pub fn build_recovery_text<E>(
        &self,
        engine: &E,
        position: Position,
        language_fixes: bool,
    ) -> Option<SourceFix>
    where
        E: ExecutionEngine<Frame = F>,
    {
        if !PositionMap::new(self.current_text()).is_line_valid(position.line) {
            return None;
        }
        if language_fixes {
            if let Some(fix) =
                engine.fix_source_at_position(self.current_text(), &self.language_id, position)
            {
                tracing::debug!(uri = %self.uri, "source fixed by language hook");
                return Some(fix);
            }
        }

        let (last, earlier) = self.pending_edits.split_last()?;
        let base = self.parsed.as_ref()?.text();
        let text = apply_edits(base, earlier, None);
        tracing::debug!(uri = %self.uri, replayed = earlier.len(), "source rebuilt from pending edits");
        Some(SourceFix {
            text,
            character: last.range.map_or(position.character, |range| range.end.character),
            is_property_completion: engine.is_property_trigger(&self.language_id, &last.text),
        })
    }
}

/// Every document known to the backend, opened or discovered.
#[derive(Debug)]
pub struct DocumentStore<F> {
    documents: FxHashMap<Url, Document<F>>,
}

impl<F> Default for DocumentStore<F> {
    fn default() -> Self {
        DocumentStore {
            documents: FxHashMap::default(),
        }
    }
}

impl<F> DocumentStore<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `uri`, replacing any earlier state of it.
    pub fn open(&mut self, uri: Url, language_id: &str, text: impl Into<String>) -> &mut Document<F> {
        let document = Document::new(uri.clone(), language_id, text);
        match self.documents.entry(uri) {
            Entry::Occupied(mut slot) => {
                slot.insert(document);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(document),
        }
    }

    pub fn close(&mut self, uri: &Url) -> Option<Document<F>> {
        self.documents.remove(uri)
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn get(&self, uri: &Url) -> Option<&Document<F>> {
        self.documents.get(uri)
    }

    pub fn get_mut(&mut self, uri: &Url) -> Option<&mut Document<F>> {
        self.documents.get_mut(uri)
    }

    /// The document for `uri`, created on first use.
    ///
    /// A new `file:` document starts with the content on disk.
    pub fn get_or_create(&mut self, uri: &Url, language_id: &str) -> &mut Document<F> {
        self.documents.entry(uri.clone()).or_insert_with_key(|uri| {
            let text = uri
                .to_file_path()
                .ok()
                .and_then(|path| fs::read_to_string(path).ok())
                .unwrap_or_default();
            tracing::debug!(%uri, bytes = text.len(), "document created on demand");
            Document::new(uri.clone(), language_id, text)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document<F>> {
        self.documents.values()
    }

    /// Drop the coverage of every document.
    pub fn clear_all_coverage(&mut self) {
        for document in self.documents.values_mut() {
            document.clear_coverage();
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests;
