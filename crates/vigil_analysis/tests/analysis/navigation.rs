//! Definition, hover, and document symbols.

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::{self as lsp, HoverContents, LanguageString, MarkedString, SymbolKind};
use vigil_analysis::AnalysisError;
use vigil_script::LANGUAGE_ID;
use vigil_text::Position;

use crate::common::{uri, Harness};

const PROGRAM: &str = "let a = 1\nfn f(x) = x\nf(a)\n";

fn range(start_line: u32, start: u32, end_line: u32, end: u32) -> lsp::Range {
    lsp::Range::new(lsp::Position::new(start_line, start), lsp::Position::new(end_line, end))
}

#[test]
fn definition_of_a_global() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", PROGRAM);

    let locations = h.analyzer.definition(&doc, Position::new(2, 2)).unwrap();

    assert_eq!(locations, vec![lsp::Location::new(doc, range(0, 0, 0, 9))]);
}

#[test]
fn definition_of_a_parameter_is_its_function() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", PROGRAM);

    let locations = h.analyzer.definition(&doc, Position::new(1, 10)).unwrap();

    assert_eq!(locations, vec![lsp::Location::new(doc, range(1, 0, 1, 11))]);
}

#[test]
fn hover_shows_the_definition_source() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", PROGRAM);

    let hover = h.analyzer.hover(&doc, Position::new(2, 2)).unwrap();

    assert_eq!(
        hover.contents,
        HoverContents::Array(vec![MarkedString::LanguageString(LanguageString {
            language: LANGUAGE_ID.to_owned(),
            value: "let a = 1".to_owned(),
        })])
    );
    assert_eq!(hover.range, None);
}

#[test]
fn nothing_to_resolve() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", PROGRAM);

    // Between `let` and `a`.
    assert!(h.analyzer.definition(&doc, Position::new(0, 3)).unwrap().is_empty());
    let hover = h.analyzer.hover(&doc, Position::new(0, 3)).unwrap();
    assert_eq!(hover.contents, HoverContents::Array(Vec::new()));
}

#[test]
fn symbols_are_the_functions() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "fn f(x) = x\nlet a = 1\nfn g(y) = 1\n");

    let symbols = h.analyzer.document_symbols(&doc).unwrap();

    let found: Vec<(&str, SymbolKind, lsp::Range)> = symbols
        .iter()
        .map(|s| (s.name.as_str(), s.kind, s.location.range))
        .collect();
    assert_eq!(
        found,
        vec![
            ("f", SymbolKind::FUNCTION, range(0, 0, 0, 11)),
            ("g", SymbolKind::FUNCTION, range(2, 0, 2, 11)),
        ]
    );
}

#[test]
fn navigation_needs_an_open_document() {
    let h = Harness::new();
    let doc = uri("missing.vs");

    assert!(matches!(
        h.analyzer.definition(&doc, Position::new(0, 0)),
        Err(AnalysisError::UnknownDocument(_))
    ));
    assert!(matches!(
        h.analyzer.hover(&doc, Position::new(0, 0)),
        Err(AnalysisError::UnknownDocument(_))
    ));
    assert!(matches!(
        h.analyzer.document_symbols(&doc),
        Err(AnalysisError::UnknownDocument(_))
    ));
}
