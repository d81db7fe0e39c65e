//! Keeping documents in sync with the editor.

use pretty_assertions::assert_eq;
use vigil_analysis::AnalysisError;
use vigil_diagnostic::Severity;
use vigil_text::{EditEvent, TextRange};

use crate::common::{messages, uri, Harness};

#[test]
fn open_parses_and_publishes_nothing_for_valid_text() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nprint(a)\n");

    assert!(h.analyzer.is_open(&doc));
    let document = h.analyzer.documents().get(&doc).unwrap();
    assert!(document.parse_succeeded());
    assert!(document.parsed().is_some());
    assert_eq!(h.diagnostics.last_published(doc.as_str()), Some(Vec::new()));
}

#[test]
fn open_reports_parse_errors() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let = 1\n");

    let published = h.published(&doc);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].severity, Severity::Error);
    assert_eq!(published[0].category, h.analyzer.config().diagnostic_source);
    assert!(!h.analyzer.documents().get(&doc).unwrap().parse_succeeded());
}

#[test]
fn unknown_language_is_rejected() {
    let mut h = Harness::new();
    let doc = uri("a.py");
    let result = h.analyzer.open(&doc, "x = 1\n", "python");

    match result {
        Err(AnalysisError::UnknownLanguage { language, known }) => {
            assert_eq!(language, "python");
            assert_eq!(known, vec![vigil_script::LANGUAGE_ID.to_owned()]);
        }
        other => panic!("expected an unknown language error, got {other:?}"),
    }
    assert!(!h.analyzer.is_open(&doc));
}

#[test]
fn edits_to_unknown_documents_fail() {
    let mut h = Harness::new();
    let doc = uri("missing.vs");
    let result = h.analyzer.apply_changes(&doc, &[EditEvent::full("a")]);
    assert!(matches!(result, Err(AnalysisError::UnknownDocument(u)) if u == doc));
}

#[test]
fn edit_batch_replaces_across_lines() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "abc\nefg\n\nhij");
    h.analyzer
        .apply_changes(&doc, &[EditEvent::replace(TextRange::from_coords(0, 0, 1, 0), "#")])
        .unwrap();
    assert_eq!(h.text(&doc), "#efg\n\nhij");
}

#[test]
fn empty_batch_publishes_nothing() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\n");
    let before = h.diagnostics.published().len();

    h.analyzer.apply_changes(&doc, &[]).unwrap();

    assert_eq!(h.diagnostics.published().len(), before);
    assert_eq!(h.text(&doc), "let a = 1\n");
}

#[test]
fn pending_edits_accumulate_until_the_text_parses() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\n");

    h.insert(&doc, 1, 0, "let");
    {
        let document = h.analyzer.documents().get(&doc).unwrap();
        assert!(!document.parse_succeeded());
        assert_eq!(document.pending_edits().len(), 1);
    }
    assert_eq!(h.published(&doc).len(), 1);

    h.insert(&doc, 1, 3, " b = a");
    let document = h.analyzer.documents().get(&doc).unwrap();
    assert!(document.parse_succeeded());
    assert!(document.pending_edits().is_empty());
    assert_eq!(document.parsed().map(|p| p.text()), Some("let a = 1\nlet b = a"));
    assert!(messages(&h.published(&doc)).is_empty());
}

#[test]
fn parse_creates_documents_on_demand() {
    let mut h = Harness::new();
    let doc = uri("fresh.vs");
    h.analyzer
        .parse(&doc, "let a = 1\n", vigil_script::LANGUAGE_ID)
        .unwrap();

    assert!(h.analyzer.is_open(&doc));
    assert_eq!(h.text(&doc), "let a = 1\n");
    assert_eq!(h.analyzer.documents().len(), 1);
}

#[test]
fn close_forgets_the_document() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\n");

    assert!(h.analyzer.close(&doc));
    assert!(!h.analyzer.close(&doc));
    assert!(h.analyzer.source_text(&doc).is_none());
    assert!(h.analyzer.documents().is_empty());
}
