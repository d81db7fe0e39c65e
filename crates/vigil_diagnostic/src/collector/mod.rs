//! In-memory sink.
//!
//! Queues diagnostics per document, drops exact duplicates, and keeps the
//! most recent published batches so they can be inspected. At most
//! [`DEFAULT_HISTORY`] batches are kept unless the collector is built with
//! [`DiagnosticCollector::with_history`]; older ones are dropped. Clones
//! share the same state, so one handle can be given to the backend while
//! another is kept for reading.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::{Diagnostic, DiagnosticSink};

/// One publication for one document.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Published {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Published batches kept by [`DiagnosticCollector::new`].
pub const DEFAULT_HISTORY: usize = 256;

struct State {
    /// Queued diagnostics per document, in order of first queueing.
    pending: Vec<(String, Vec<Diagnostic>)>,
    seen: FxHashSet<(String, Diagnostic)>,
    published: VecDeque<Published>,
    history: usize,
}

impl Default for State {
    fn default() -> Self {
        State {
            pending: Vec::new(),
            seen: FxHashSet::default(),
            published: VecDeque::new(),
            history: DEFAULT_HISTORY,
        }
    }
}

impl State {
    fn publish(&mut self, uri: String, diagnostics: Vec<Diagnostic>) {
        tracing::debug!(%uri, count = diagnostics.len(), "publishing diagnostics");
        if self.published.len() == self.history {
            self.published.pop_front();
        }
        self.published.push_back(Published { uri, diagnostics });
    }

    fn take(&mut self, uri: &str) -> Vec<Diagnostic> {
        self.seen.retain(|(seen_uri, _)| seen_uri != uri);
        match self.pending.iter().position(|(pending, _)| pending == uri) {
            Some(index) => self.pending.remove(index).1,
            None => Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct DiagnosticCollector {
    state: Arc<Mutex<State>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector keeping the last `batches` publications, at least one.
    pub fn with_history(batches: usize) -> Self {
        let state = State {
            history: batches.max(1),
            ..State::default()
        };
        DiagnosticCollector {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Diagnostics queued for `uri` and not yet published.
    pub fn pending(&self, uri: &str) -> Vec<Diagnostic> {
        self.state
            .lock()
            .pending
            .iter()
            .find(|(pending, _)| pending == uri)
            .map(|(_, diagnostics)| diagnostics.clone())
            .unwrap_or_default()
    }

    /// The kept batches, oldest first.
    pub fn published(&self) -> Vec<Published> {
        self.state.lock().published.iter().cloned().collect()
    }

    /// The most recent batch published for `uri`.
    pub fn last_published(&self, uri: &str) -> Option<Vec<Diagnostic>> {
        self.state
            .lock()
            .published
            .iter()
            .rev()
            .find(|published| published.uri == uri)
            .map(|published| published.diagnostics.clone())
    }

    /// Forget everything published so far.
    pub fn clear_published(&self) {
        self.state.lock().published.clear();
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn add_diagnostic(&mut self, uri: &str, diagnostic: Diagnostic) {
        let mut state = self.state.lock();
        if !state.seen.insert((uri.to_owned(), diagnostic.clone())) {
            tracing::trace!(uri, %diagnostic, "duplicate diagnostic dropped");
            return;
        }
        match state.pending.iter_mut().find(|(pending, _)| pending == uri) {
            Some((_, diagnostics)) => diagnostics.push(diagnostic),
            None => state.pending.push((uri.to_owned(), vec![diagnostic])),
        }
    }

    fn report_collected(&mut self, uri: Option<&str>) {
        let mut state = self.state.lock();
        match uri {
            Some(uri) => {
                let diagnostics = state.take(uri);
                state.publish(uri.to_owned(), diagnostics);
            }
            None => {
                let pending = std::mem::take(&mut state.pending);
                state.seen.clear();
                for (uri, diagnostics) in pending {
                    state.publish(uri, diagnostics);
                }
            }
        }
    }
}
