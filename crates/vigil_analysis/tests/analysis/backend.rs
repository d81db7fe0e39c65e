//! The backend over its worker thread, driven by protocol parameters.

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::{
    self as lsp, CompletionParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, GotoDefinitionParams, HoverContents, HoverParams,
    TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem, TextDocumentPositionParams,
    Url, VersionedTextDocumentIdentifier,
};
use vigil_analysis::{AnalysisConfig, AnalysisError, Backend, WorkerConfig};
use vigil_diagnostic::DiagnosticCollector;
use vigil_script::{ScriptEngine, LANGUAGE_ID};

use crate::common::{analyzer, labels, uri};

fn backend() -> (Backend<ScriptEngine>, DiagnosticCollector) {
    let (analyzer, diagnostics) = analyzer(AnalysisConfig::default());
    let config = WorkerConfig::default().with_thread_name("vigil-analysis-test");
    (Backend::new(analyzer, &config).unwrap(), diagnostics)
}

fn open(doc: &Url, text: &str) -> DidOpenTextDocumentParams {
    DidOpenTextDocumentParams {
        text_document: TextDocumentItem::new(doc.clone(), LANGUAGE_ID.to_owned(), 1, text.to_owned()),
    }
}

fn insert(doc: &Url, version: i32, line: u32, character: u32, text: &str) -> DidChangeTextDocumentParams {
    let at = lsp::Position::new(line, character);
    DidChangeTextDocumentParams {
        text_document: VersionedTextDocumentIdentifier::new(doc.clone(), version),
        content_changes: vec![TextDocumentContentChangeEvent {
            range: Some(lsp::Range::new(at, at)),
            range_length: None,
            text: text.to_owned(),
        }],
    }
}

fn at(doc: &Url, line: u32, character: u32) -> TextDocumentPositionParams {
    TextDocumentPositionParams::new(
        TextDocumentIdentifier::new(doc.clone()),
        lsp::Position::new(line, character),
    )
}

#[test]
fn requests_see_earlier_changes() {
    let (backend, _) = backend();
    let doc = uri("a.vs");

    // Nothing is waited on until the end; order alone decides.
    let opened = backend.did_open(open(&doc, "let p = Point(1, 2)\np\n"));
    let typed = backend.did_change(insert(&doc, 2, 1, 1, "."));
    let text = backend.source_text(doc.clone());
    let completion = backend.completion(CompletionParams {
        text_document_position: at(&doc, 1, 2),
        work_done_progress_params: lsp::WorkDoneProgressParams::default(),
        partial_result_params: lsp::PartialResultParams::default(),
        context: None,
    });

    opened.wait().unwrap();
    typed.wait().unwrap();
    assert_eq!(text.wait().unwrap().as_deref(), Some("let p = Point(1, 2)\np.\n"));
    assert_eq!(labels(&completion.wait().unwrap()), vec!["x", "y"]);
    backend.shutdown();
}

#[test]
fn navigation_requests() {
    let (backend, _) = backend();
    let doc = uri("a.vs");
    backend.did_open(open(&doc, "fn f(x) = x\nlet a = 1\nf(a)\n")).wait().unwrap();

    let hover = backend
        .hover(HoverParams {
            text_document_position_params: at(&doc, 2, 2),
            work_done_progress_params: lsp::WorkDoneProgressParams::default(),
        })
        .wait()
        .unwrap();
    assert!(matches!(hover.contents, HoverContents::Array(ref items) if items.len() == 1));

    let definition = backend
        .definition(GotoDefinitionParams {
            text_document_position_params: at(&doc, 2, 2),
            work_done_progress_params: lsp::WorkDoneProgressParams::default(),
            partial_result_params: lsp::PartialResultParams::default(),
        })
        .wait()
        .unwrap();
    assert_eq!(
        definition.iter().map(|l| l.range.start.line).collect::<Vec<_>>(),
        vec![1]
    );

    let symbols = backend
        .document_symbols(DocumentSymbolParams {
            text_document: TextDocumentIdentifier::new(doc.clone()),
            work_done_progress_params: lsp::WorkDoneProgressParams::default(),
            partial_result_params: lsp::PartialResultParams::default(),
        })
        .wait()
        .unwrap();
    assert_eq!(symbols.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["f"]);
    backend.shutdown();
}

#[test]
fn coverage_through_the_worker() {
    let (backend, diagnostics) = backend();
    let doc = uri("a.vs");
    backend.did_open(open(&doc, "exit 0\nprint(1)\n")).wait().unwrap();

    assert!(backend.run_coverage_analysis(doc.clone()).wait().unwrap());
    let flagged = diagnostics.last_published(doc.as_str()).unwrap_or_default();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].range.start.line, 1);

    diagnostics.clear_published();
    backend.show_coverage(doc.clone()).wait().unwrap();
    assert_eq!(diagnostics.last_published(doc.as_str()), Some(flagged));

    assert!(backend.reset_cached_context().wait().unwrap());
    backend.shutdown();
}

#[test]
fn parse_and_close() {
    let (backend, diagnostics) = backend();
    let doc = uri("a.vs");

    backend
        .parse(doc.clone(), "let = 1\n".to_owned(), LANGUAGE_ID.to_owned())
        .wait()
        .unwrap();
    assert_eq!(diagnostics.last_published(doc.as_str()).map(|d| d.len()), Some(1));

    let closed = backend.did_close(DidCloseTextDocumentParams {
        text_document: TextDocumentIdentifier::new(doc.clone()),
    });
    assert!(closed.wait().unwrap());
    assert_eq!(backend.source_text(doc).wait().unwrap(), None);
    backend.shutdown();
}

#[test]
fn errors_come_back_through_the_task() {
    let (backend, _) = backend();
    let result = backend.did_change(insert(&uri("missing.vs"), 1, 0, 0, "x")).wait();
    assert!(matches!(result, Err(AnalysisError::UnknownDocument(_))));
    backend.shutdown();
}
