//! The submitting side of the backend.
//!
//! Every operation is queued on the analysis worker and returns a
//! [`Task`]. Requests are answered in submission order, each against the
//! state left by the requests before it.

use std::sync::Arc;

use parking_lot::Mutex;
use tower_lsp::lsp_types::{
    CompletionList, CompletionParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, GotoDefinitionParams, Hover, HoverParams, Location,
    SymbolInformation, Url,
};
use vigil_engine::ExecutionEngine;
use vigil_text::EditEvent;

use crate::analyzer::Analyzer;
use crate::config::WorkerConfig;
use crate::convert::{edit_from_change, from_lsp_position};
use crate::error::AnalysisResult;
use crate::worker::{Task, Worker};

pub struct Backend<E: ExecutionEngine> {
    worker: Worker,
    // Only the worker thread locks this, so it is never contended.
    analyzer: Arc<Mutex<Analyzer<E>>>,
}

impl<E: ExecutionEngine + 'static> Backend<E> {
    pub fn new(analyzer: Analyzer<E>, config: &WorkerConfig) -> AnalysisResult<Self> {
        Ok(Backend {
            worker: Worker::spawn(config)?,
            analyzer: Arc::new(Mutex::new(analyzer)),
        })
    }

    fn run<T, F>(&self, operation: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Analyzer<E>) -> AnalysisResult<T> + Send + 'static,
    {
        let analyzer = Arc::clone(&self.analyzer);
        self.worker.submit(move || operation(&mut analyzer.lock()))
    }

    pub fn did_open(&self, params: DidOpenTextDocumentParams) -> Task<()> {
        let document = params.text_document;
        self.run(move |analyzer| analyzer.open(&document.uri, &document.text, &document.language_id))
    }

    pub fn did_change(&self, params: DidChangeTextDocumentParams) -> Task<()> {
        let uri = params.text_document.uri;
        let edits: Vec<EditEvent> = params.content_changes.into_iter().map(edit_from_change).collect();
        self.run(move |analyzer| analyzer.apply_changes(&uri, &edits))
    }

    pub fn did_close(&self, params: DidCloseTextDocumentParams) -> Task<bool> {
        let uri = params.text_document.uri;
        self.run(move |analyzer| Ok(analyzer.close(&uri)))
    }

    /// Set and parse the full text of `uri`.
    pub fn parse(&self, uri: Url, text: String, language_id: String) -> Task<()> {
        self.run(move |analyzer| analyzer.parse(&uri, &text, &language_id))
    }

    pub fn completion(&self, params: CompletionParams) -> Task<CompletionList> {
        let at = params.text_document_position;
        self.run(move |analyzer| analyzer.completion(&at.text_document.uri, from_lsp_position(at.position)))
    }

    pub fn hover(&self, params: HoverParams) -> Task<Hover> {
        let at = params.text_document_position_params;
        self.run(move |analyzer| analyzer.hover(&at.text_document.uri, from_lsp_position(at.position)))
    }

    pub fn definition(&self, params: GotoDefinitionParams) -> Task<Vec<Location>> {
        let at = params.text_document_position_params;
        self.run(move |analyzer| analyzer.definition(&at.text_document.uri, from_lsp_position(at.position)))
    }

    pub fn document_symbols(&self, params: DocumentSymbolParams) -> Task<Vec<SymbolInformation>> {
        let uri = params.text_document.uri;
        self.run(move |analyzer| analyzer.document_symbols(&uri))
    }

    pub fn run_coverage_analysis(&self, uri: Url) -> Task<bool> {
        self.run(move |analyzer| analyzer.run_coverage_analysis(&uri))
    }

    pub fn show_coverage(&self, uri: Url) -> Task<()> {
        self.run(move |analyzer| analyzer.show_coverage(&uri))
    }

    pub fn source_text(&self, uri: Url) -> Task<Option<String>> {
        self.run(move |analyzer| Ok(analyzer.source_text(&uri).map(str::to_owned)))
    }

    pub fn reset_cached_context(&self) -> Task<bool> {
        self.run(|analyzer| Ok(analyzer.reset_cached_context()))
    }

    /// Finish the queued requests and stop the worker.
    pub fn shutdown(mut self) {
        self.worker.shutdown();
    }
}
