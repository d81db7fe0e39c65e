//! Coverage runs, the overlay, and keeping coverage in place across edits.

use std::fs;

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::Url;
use vigil_analysis::AnalysisError;
use vigil_diagnostic::{Diagnostic, Severity};
use vigil_text::{SourceLocation, TextRange};

use crate::common::{messages, uri, Harness};

fn not_covered(location: SourceLocation) -> Diagnostic {
    Diagnostic::warning(location.to_range(), "Not covered", "Coverage Analysis")
}

#[test]
fn every_statement_reached() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nprint(a)\n");

    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());

    let document = h.analyzer.documents().get(&doc).unwrap();
    assert!(document.coverage_analysed());
    assert!(document.coverage().is_covered(&SourceLocation::new(1, 1, 1, 9)));
    assert!(document.coverage().is_covered(&SourceLocation::new(2, 1, 2, 8)));
    assert_eq!(
        document.coverage().entry_points(&SourceLocation::new(2, 1, 2, 8)),
        vec![&doc]
    );
    // The run happens on the nested engine.
    assert!(h.analyzer.default_engine().output().is_empty());
    assert!(h.published(&doc).is_empty());
}

#[test]
fn exit_ends_the_run_and_leaves_the_rest_uncovered() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nexit 0\nprint(a)\n");

    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());

    assert_eq!(h.published(&doc), vec![not_covered(SourceLocation::new(3, 1, 3, 8))]);
}

#[test]
fn runtime_failure_is_reported_where_it_happened() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nfail \"boom\"\nprint(a)\n");

    assert!(!h.analyzer.run_coverage_analysis(&doc).unwrap());

    let published = h.published(&doc);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].severity, Severity::Error);
    assert_eq!(published[0].category, "Coverage analysis");
    assert!(published[0].message.contains("boom"), "{}", published[0].message);
}

#[test]
fn entry_point_that_does_not_parse() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let = 1\n");

    assert!(!h.analyzer.run_coverage_analysis(&doc).unwrap());

    let published = h.published(&doc);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].category, "Coverage analysis");
    assert!(!h.analyzer.documents().get(&doc).unwrap().coverage_analysed());
}

#[test]
fn broken_directive_is_reported_and_the_document_runs_itself() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "# COVERAGE_SCRIPT: gone.vs\nlet a = 1\n");

    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());

    let document = h.analyzer.documents().get(&doc).unwrap();
    assert!(document.coverage_analysed());
    assert!(document.coverage().is_covered(&SourceLocation::new(2, 1, 2, 9)));
    assert_eq!(document.coverage().entry_points(&SourceLocation::new(2, 1, 2, 9)), vec![&doc]);
    // Only the directive is flagged, the statement ran.
    assert_eq!(
        h.published(&doc),
        vec![Diagnostic::error(
            TextRange::from_coords(0, 18, 0, 26),
            "File not found: gone.vs",
            "Coverage analysis",
        )]
    );
}

#[test]
fn directive_runs_another_script() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("run.vs"), "let b = 2\nb\n").unwrap();
    let lib = Url::from_file_path(dir.path().join("lib.vs")).unwrap();
    let run = Url::from_file_path(dir.path().join("run.vs")).unwrap();

    let mut h = Harness::new();
    h.open_url(&lib, "# COVERAGE_SCRIPT: run.vs\nlet a = 1\n");

    assert!(h.analyzer.run_coverage_analysis(&lib).unwrap());

    let script = h.analyzer.documents().get(&run).unwrap();
    assert!(script.has_coverage());
    assert_eq!(script.coverage().entry_points(&SourceLocation::new(2, 1, 2, 1)), vec![&run]);
    assert_eq!(h.published(&lib), vec![not_covered(SourceLocation::new(2, 1, 2, 9))]);
}

#[test]
fn coverage_follows_inserted_lines() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\n\nprint(a)\n");
    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());

    h.insert(&doc, 1, 0, "\n");

    let coverage = h.analyzer.documents().get(&doc).unwrap().coverage();
    assert!(coverage.is_covered(&SourceLocation::new(4, 1, 4, 8)));
    assert!(!coverage.is_covered(&SourceLocation::new(3, 1, 3, 8)));
    // The overlay is refreshed with the edit and nothing is flagged.
    assert!(messages(&h.published(&doc)).is_empty());
}

#[test]
fn show_coverage_without_a_parse() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let = 1\n");

    h.analyzer.show_coverage(&doc).unwrap();

    assert_eq!(
        h.published(&doc),
        vec![Diagnostic::error(
            TextRange::default(),
            "No coverage information available",
            "Coverage Analysis",
        )]
    );
}

#[test]
fn show_coverage_before_any_run_flags_everything() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "let a = 1\nprint(a)\n");

    h.analyzer.show_coverage(&doc).unwrap();

    assert_eq!(
        h.published(&doc),
        vec![
            not_covered(SourceLocation::new(1, 1, 1, 9)),
            not_covered(SourceLocation::new(2, 1, 2, 8)),
        ]
    );
}

#[test]
fn show_coverage_of_unknown_document() {
    let mut h = Harness::new();
    let result = h.analyzer.show_coverage(&uri("missing.vs"));
    assert!(matches!(result, Err(AnalysisError::UnknownDocument(_))));
}

#[test]
fn cached_context_is_kept_between_runs() {
    let mut h = Harness::new();
    let doc = h.open("a.vs", "print(1)\n");

    assert!(!h.analyzer.reset_cached_context());
    assert!(h.analyzer.run_coverage_analysis(&doc).unwrap());
    assert!(h.analyzer.reset_cached_context());
    assert!(!h.analyzer.reset_cached_context());
}
