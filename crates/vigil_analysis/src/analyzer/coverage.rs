use crossbeam::channel::{self, Sender};
use rustc_hash::FxHashSet;
use tower_lsp::lsp_types::Url;
use vigil_diagnostic::Diagnostic;
use vigil_engine::{
    EngineError, ExecutionEngine, ExecutionEvent, ExecutionHook, HookAction, HookId, NodeTags,
    SectionFilter, Source,
};
use vigil_text::{SourceLocation, TextRange};

use super::Analyzer;
use crate::directive::parse_coverage_directive;
use crate::error::{AnalysisError, AnalysisResult};
use crate::{engine_error_range, COVERAGE_ANALYSIS, COVERAGE_OVERLAY};

/// Forwards every entered section with its frame.
struct CoverageCapture<F> {
    events: Sender<(String, SourceLocation, F)>,
}

impl<V, F: Clone + Send> ExecutionHook<V, F> for CoverageCapture<F> {
    fn on_enter(&mut self, event: &ExecutionEvent<'_, F>) -> HookAction {
        // The receiver lives until the run is over.
        let _ = self
            .events
            .send((event.source_name.to_owned(), event.location, event.frame.clone()));
        HookAction::Continue
    }
}

impl<E: ExecutionEngine> Analyzer<E> {
    /// Execute the entry point of `uri` and record which sections ran.
    ///
    /// Returns whether the run completed. Problems are reported as
    /// diagnostics.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    pub fn run_coverage_analysis(&mut self, uri: &Url) -> AnalysisResult<bool> {
        let language = self.language_of(uri)?;
        let completed = self.collect_coverage(uri, &language);
        self.sink.report_collected(None);
        Ok(completed)
    }

    /// Publish the coverage overlay of `uri`.
    pub fn show_coverage(&mut self, uri: &Url) -> AnalysisResult<()> {
        if !self.documents.contains(uri) {
            return Err(AnalysisError::UnknownDocument(uri.clone()));
        }
        self.add_coverage_overlay(uri);
        self.sink.report_collected(Some(uri.as_str()));
        Ok(())
    }

    fn collect_coverage(&mut self, uri: &Url, language: &str) -> bool {
        let directive = self.documents.get(uri).map_or(Ok(None), |document| {
            parse_coverage_directive(document.text(), uri, &self.config.coverage_directive)
        });
        let entry = match directive {
            Ok(Some(entry)) => entry,
            Ok(None) => uri.clone(),
            Err(error) => {
                // Reported, then the document runs as its own entry point.
                self.sink.add_diagnostic(
                    uri.as_str(),
                    Diagnostic::error(error.range(), error.reason, COVERAGE_ANALYSIS),
                );
                uri.clone()
            }
        };

        self.documents.clear_all_coverage();
        let text = self.documents.get_or_create(&entry, language).text().to_owned();
        let source = Source::new(entry.as_str(), language, text);

        let (events, captured) = channel::unbounded();
        let (hook, outcome) = self
            .contexts
            .with_nested(self.config.cache_nested_context, |engine| execute_recording(engine, &source, events));

        if let Some(hook) = hook {
            let mut recorded = 0usize;
            for (source_name, location, frame) in captured.try_iter() {
                let Ok(source_uri) = Url::parse(&source_name) else {
                    continue;
                };
                self.documents
                    .get_or_create(&source_uri, language)
                    .coverage_mut()
                    .record(location, &entry, hook, frame);
                recorded += 1;
            }
            tracing::debug!(%entry, recorded, "coverage recorded");
        }

        match outcome {
            Ok(()) => {}
            Err(error) if error.is_exit() => {
                tracing::debug!(%entry, %error, "entry point exited");
            }
            Err(error) => {
                let failing = error
                    .location()
                    .and_then(|at| Url::parse(&at.source_name).ok())
                    .unwrap_or_else(|| uri.clone());
                self.sink.add_diagnostic(
                    failing.as_str(),
                    Diagnostic::error(engine_error_range(&error), error.to_string(), COVERAGE_ANALYSIS),
                );
                return false;
            }
        }

        if let Some(document) = self.documents.get_mut(uri) {
            document.mark_coverage_analysed();
        }
        self.add_coverage_overlay(uri);
        true
    }

    /// Queue a warning for every statement of `uri` no run has reached.
    pub(super) fn add_coverage_overlay(&mut self, uri: &Url) {
        let Some(document) = self.documents.get(uri) else {
            return;
        };
        let Some(program) = document.parsed() else {
            self.sink.add_diagnostic(
                uri.as_str(),
                Diagnostic::error(TextRange::default(), "No coverage information available", COVERAGE_OVERLAY),
            );
            return;
        };

        let mut reported = FxHashSet::default();
        for (_, node) in program.tree.iter() {
            let uncovered = node.instrumentable
                && node.has_tag(NodeTags::STATEMENT)
                && !document.coverage().is_covered(&node.location);
            if uncovered && reported.insert(node.location) {
                self.sink.add_diagnostic(
                    uri.as_str(),
                    Diagnostic::warning(node.location.to_range(), "Not covered", COVERAGE_OVERLAY),
                );
            }
        }
    }
}

/// Parse and run `source` with a coverage hook attached for the run.
fn execute_recording<E: ExecutionEngine>(
    engine: &mut E,
    source: &Source,
    events: Sender<(String, SourceLocation, E::Frame)>,
) -> (Option<HookId>, Result<(), EngineError>) {
    let program = match engine.parse(source) {
        Ok(program) => program,
        Err(error) => return (None, Err(error)),
    };
    let filter = SectionFilter::any().tagged(NodeTags::STATEMENT | NodeTags::EXPRESSION);
    let mut binding = engine.bind_hook(filter, Box::new(CoverageCapture { events }));
    let hook = binding.id();
    let outcome = binding.execute(&program).map(|_| ());
    (Some(hook), outcome)
}
