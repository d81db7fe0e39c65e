//! Worker-side state of the backend and the operations on it.
//!
//! An [`Analyzer`] is not synchronized; [`crate::Backend`] serializes
//! access to it on the worker thread. Every operation that adds
//! diagnostics also asks the sink to publish them before it returns.

mod completion;
mod coverage;
mod navigation;

use tower_lsp::lsp_types::Url;
use vigil_diagnostic::{Diagnostic, DiagnosticSink};
use vigil_engine::{ExecutionEngine, Source};
use vigil_text::EditEvent;

use crate::config::AnalysisConfig;
use crate::context::ContextManager;
use crate::document::{Document, DocumentStore};
use crate::engine_error_range;
use crate::error::{AnalysisError, AnalysisResult};
use crate::eval::EvaluationChain;
use crate::locate::StructuralLocator;

pub struct Analyzer<E: ExecutionEngine> {
    config: AnalysisConfig,
    contexts: ContextManager<E>,
    documents: DocumentStore<E::Frame>,
    locator: StructuralLocator,
    chain: EvaluationChain<E>,
    sink: Box<dyn DiagnosticSink>,
}

impl<E: ExecutionEngine + 'static> Analyzer<E> {
    /// An analyzer parsing with `engine` and running speculative execution
    /// on engines made by `nested`.
    pub fn new(
        engine: E,
        nested: impl Fn() -> E + Send + 'static,
        sink: Box<dyn DiagnosticSink>,
        config: AnalysisConfig,
    ) -> Self {
        Analyzer {
            config,
            contexts: ContextManager::new(engine, nested),
            documents: DocumentStore::new(),
            locator: StructuralLocator::new(),
            chain: EvaluationChain::standard(),
            sink,
        }
    }
}

impl<E: ExecutionEngine> Analyzer<E> {
    /// Replace the evaluation strategies used for member completion.
    #[must_use]
    pub fn with_chain(mut self, chain: EvaluationChain<E>) -> Self {
        self.chain = chain;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn documents(&self) -> &DocumentStore<E::Frame> {
        &self.documents
    }

    pub fn default_engine(&self) -> &E {
        self.contexts.default_engine()
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.documents.contains(uri)
    }

    /// The text of `uri` as the editor sees it.
    pub fn source_text(&self, uri: &Url) -> Option<&str> {
        self.documents.get(uri).map(Document::text)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri, language = language_id))]
    pub fn open(&mut self, uri: &Url, text: &str, language_id: &str) -> AnalysisResult<()> {
        self.check_language(language_id)?;
        self.documents.open(uri.clone(), language_id, text);
        self.parse_document(uri)?;
        self.sink.report_collected(Some(uri.as_str()));
        Ok(())
    }

    /// Forget `uri` with its coverage. Returns `false` if it was not known.
    pub fn close(&mut self, uri: &Url) -> bool {
        self.locator.forget(uri);
        self.documents.close(uri).is_some()
    }

    /// Set the full text of `uri` and parse it, creating the document if needed.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri, language = language_id))]
    pub fn parse(&mut self, uri: &Url, text: &str, language_id: &str) -> AnalysisResult<()> {
        self.check_language(language_id)?;
        self.documents.get_or_create(uri, language_id).set_text(text);
        self.parse_document(uri)?;
        self.sink.report_collected(Some(uri.as_str()));
        Ok(())
    }

    /// Apply an edit batch, parse the result, and refresh the coverage overlay.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri, edits = edits.len()))]
    pub fn apply_changes(&mut self, uri: &Url, edits: &[EditEvent]) -> AnalysisResult<()> {
        if edits.is_empty() {
            return Ok(());
        }
        self.documents
            .get_mut(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?
            .apply_edits(edits);
        self.parse_document(uri)?;
        if self.documents.get(uri).is_some_and(Document::has_coverage) {
            self.add_coverage_overlay(uri);
        }
        self.sink.report_collected(Some(uri.as_str()));
        Ok(())
    }

    /// Drop the cached nested engine. Returns `false` if there was none.
    pub fn reset_cached_context(&mut self) -> bool {
        self.contexts.reset_cached_context()
    }

    fn check_language(&self, language_id: &str) -> AnalysisResult<()> {
        let engine = self.contexts.default_engine();
        if engine.has_language(language_id) {
            Ok(())
        } else {
            Err(AnalysisError::UnknownLanguage {
                language: language_id.to_owned(),
                known: engine.languages(),
            })
        }
    }

    /// Language of an open document, checked against the engine.
    fn language_of(&self, uri: &Url) -> AnalysisResult<String> {
        let language = self
            .documents
            .get(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?
            .language_id()
            .to_owned();
        self.check_language(&language)?;
        Ok(language)
    }

    /// Parse the editor text of `uri`. Failures become diagnostics; the
    /// return value tells whether the text parsed.
    fn parse_document(&mut self, uri: &Url) -> AnalysisResult<bool> {
        self.language_of(uri)?;
        let Analyzer {
            config,
            contexts,
            documents,
            locator,
            sink,
            ..
        } = self;
        let document = documents
            .get_mut(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?;

        let source = Source::new(uri.as_str(), document.language_id(), document.text());
        match contexts.with_default(|engine| engine.parse(&source)) {
            Ok(program) => {
                locator.load_definitions(uri, &program);
                document.record_parse_success(program);
                Ok(true)
            }
            Err(error) => {
                tracing::debug!(%error, "parse failed");
                document.record_parse_failure();
                sink.add_diagnostic(
                    uri.as_str(),
                    Diagnostic::error(engine_error_range(&error), error.to_string(), &config.diagnostic_source),
                );
                Ok(false)
            }
        }
    }
}
