//! Scope and member completion.

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::CompletionItemKind;
use vigil_analysis::AnalysisConfig;
use vigil_diagnostic::Severity;

use crate::common::{labels, messages, Harness};

#[test]
fn locals_come_before_globals() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nlet b = a\n");

    let list = h.complete(&doc, 1, 9);

    assert!(!list.is_incomplete);
    assert_eq!(labels(&list), vec!["a", "Point", "print"]);
    let sort: Vec<_> = list.items.iter().map(|i| i.sort_text.clone().unwrap_or_default()).collect();
    assert_eq!(sort, vec!["1.0001.a", "2.0001.Point", "2.0001.print"]);
    assert_eq!(list.items[0].kind, Some(CompletionItemKind::VARIABLE));
}

#[test]
fn inner_scopes_rank_first() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let g = 1\nfn f(x) = x\n");

    let list = h.complete(&doc, 1, 11);

    assert_eq!(labels(&list), vec!["x", "g", "Point", "print"]);
    assert_eq!(list.items[1].sort_text.as_deref(), Some("1.0002.g"));
    assert!(list.items[0].documentation.is_some());
}

#[test]
fn cursor_past_the_last_statement_sees_its_binding() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let zed = 1\nlet alpha = 2\n");

    let list = h.complete(&doc, 2, 0);

    assert_eq!(labels(&list), vec!["alpha", "zed", "Point", "print"]);
    assert_eq!(list.items[0].sort_text.as_deref(), Some("1.0001.alpha"));

    // Trailing blanks on the same line.
    let spaced = h.open("b.vs", "let zed = 1\nlet alpha = 2   \n");
    let list = h.complete(&spaced, 1, 16);
    assert_eq!(labels(&list), vec!["alpha", "zed", "Point", "print"]);
}

#[test]
fn shadowed_names_are_listed_once() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let print = 1\nlet b = print\n");

    let list = h.complete(&doc, 1, 13);

    assert_eq!(labels(&list), vec!["print", "Point"]);
    assert_eq!(list.items[0].sort_text.as_deref(), Some("1.0001.print"));
}

#[test]
fn member_completion_runs_to_the_section() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let p = Point(1, 2)\np\n");
    h.insert(&doc, 1, 1, ".");

    let list = h.complete(&doc, 1, 2);

    assert_eq!(labels(&list), vec!["x", "y"]);
    assert!(list
        .items
        .iter()
        .all(|item| item.kind == Some(CompletionItemKind::PROPERTY)));
    // The recovery text only lives for the request.
    let document = h.analyzer.documents().get(&doc).unwrap();
    assert_eq!(document.recovery_text(), None);
    assert_eq!(h.text(&doc), "let p = Point(1, 2)\np.\n");
}

#[test]
fn member_completion_after_a_coverage_run() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let p = Point(1, 2)\np\n");
    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());
    h.insert(&doc, 1, 1, ".");

    let list = h.complete(&doc, 1, 2);

    assert_eq!(labels(&list), vec!["x", "y"]);
}

#[test]
fn member_completion_of_a_literal() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let s = 1\n\"abc\"\n");
    h.insert(&doc, 1, 5, ".");

    let list = h.complete(&doc, 1, 6);

    assert_eq!(labels(&list), vec!["length"]);
}

#[test]
fn member_completion_replays_pending_edits_without_fixes() {
    let mut h = Harness::with_config(AnalysisConfig::default().with_language_specific_fixes(false));
    let doc = h.open("a.vs", "let p = Point(1, 2)\np\n");
    h.insert(&doc, 1, 1, ".");

    let list = h.complete(&doc, 1, 2);

    assert_eq!(labels(&list), vec!["x", "y"]);
}

#[test]
fn unresolved_object_reports_missing_coverage() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let p = Point(1, 2)\nq\n");
    h.insert(&doc, 1, 1, ".");

    let list = h.complete(&doc, 1, 2);

    assert!(list.items.is_empty());
    let published = h.published(&doc);
    // Running the document to the section fails on `q` itself.
    assert_eq!(
        messages(&published),
        vec![
            "undefined variable `q`",
            "No coverage information available for this source section.",
        ]
    );
    assert_eq!(published[0].severity, Severity::Error);
    assert_eq!(published[0].category, "Coverage analysis");
    assert_eq!(published[0].range.start.line, 1);
    assert_eq!(published[1].severity, Severity::Information);
}
