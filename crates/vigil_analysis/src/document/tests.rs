use std::fs;

use pretty_assertions::assert_eq;
use vigil_engine::{HookId, Source};
use vigil_script::{ScriptEngine, ScriptFrame, LANGUAGE_ID};
use vigil_text::SourceLocation;

use super::*;

fn uri(path: &str) -> Url {
    Url::parse(&format!("file:///work/{path}")).unwrap_or_else(|e| panic!("{e}"))
}

fn parsed_document(engine: &mut ScriptEngine, text: &str) -> Document<ScriptFrame> {
    let mut document = Document::new(uri("a.vs"), LANGUAGE_ID, text);
    let program = engine
        .parse(&Source::new(document.uri().as_str(), LANGUAGE_ID, text))
        .unwrap_or_else(|e| panic!("{e}"));
    document.record_parse_success(program);
    document
}

#[test]
fn test_edits_are_pending_until_a_parse_succeeds() {
    let mut engine = ScriptEngine::new();
    let mut document = parsed_document(&mut engine, "let a = 1\n");

    assert_eq!(document.apply_edits(&[]), "let a = 1\n");
    assert!(document.pending_edits().is_empty());

    let edit = EditEvent::insert(Position::new(1, 0), "a.");
    assert_eq!(document.apply_edits(&[edit.clone()]), "let a = 1\na.\n");
    document.record_parse_failure();
    assert_eq!(document.pending_edits(), &[edit]);
    assert!(!document.parse_succeeded());
    // The stale program is kept.
    assert_eq!(document.parsed().map(ParsedProgram::text), Some("let a = 1\n"));
}

#[test]
fn test_coverage_follows_edits() {
    let mut engine = ScriptEngine::new();
    let mut document = parsed_document(&mut engine, "let a = 1\nprint(a)\n");
    let entry = uri("run.vs");
    document
        .coverage_mut()
        .record(SourceLocation::new(2, 1, 2, 8), &entry, HookId::new(0), ScriptFrame::default());

    document.apply_edits(&[EditEvent::insert(Position::new(0, 0), "\n\n")]);
    assert!(document.coverage().is_covered(&SourceLocation::new(4, 1, 4, 8)));
    assert!(!document.coverage().is_covered(&SourceLocation::new(2, 1, 2, 8)));

    document.clear_coverage();
    assert!(!document.has_coverage());
}

#[test]
fn test_recovery_replays_all_but_last_edit() {
    let mut engine = ScriptEngine::new();
    let mut document = parsed_document(&mut engine, "a\n");
    document.apply_edits(&[EditEvent::insert(Position::new(0, 1), "x")]);
    document.apply_edits(&[EditEvent::insert(Position::new(0, 2), "(")]);
    document.record_parse_failure();
    assert_eq!(document.text(), "ax(\n");

    let fix = document.build_recovery_text(&engine, Position::new(0, 3), false);
    assert_eq!(
        fix,
        Some(SourceFix {
            text: "ax\n".to_owned(),
            character: 2,
            is_property_completion: false,
        })
    );
}

#[test]
fn test_recovery_recognizes_member_trigger() {
    let mut engine = ScriptEngine::new();
    let mut document = parsed_document(&mut engine, "let p = Point(1, 2)\np\n");
    document.apply_edits(&[EditEvent::insert(Position::new(1, 1), ".")]);
    document.record_parse_failure();

    let replayed = document.build_recovery_text(&engine, Position::new(1, 2), false);
    assert_eq!(
        replayed,
        Some(SourceFix {
            text: "let p = Point(1, 2)\np\n".to_owned(),
            character: 1,
            is_property_completion: true,
        })
    );

    // The engine's fix works on the current text instead.
    let hooked = document.build_recovery_text(&engine, Position::new(1, 2), true);
    assert_eq!(hooked.map(|fix| (fix.text, fix.character)), Some(("let p = Point(1, 2)\np\n".to_owned(), 1)));

    assert_eq!(document.build_recovery_text(&engine, Position::new(9, 0), true), None);
}

#[test]
fn test_recovery_text_shadows_editor_text() {
    let mut document: Document<ScriptFrame> = Document::new(uri("a.vs"), LANGUAGE_ID, "p.\n");
    document.set_recovery_text(Some("p\n".to_owned()));
    assert_eq!(document.current_text(), "p\n");
    assert_eq!(document.recovery_text(), Some("p\n"));
    document.set_recovery_text(None);
    assert_eq!(document.current_text(), "p.\n");
}

#[test]
fn test_store_lifecycle() {
    let mut store: DocumentStore<ScriptFrame> = DocumentStore::new();
    store.open(uri("a.vs"), LANGUAGE_ID, "1\n");
    store.open(uri("a.vs"), LANGUAGE_ID, "2\n");
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&uri("a.vs")).map(Document::text), Some("2\n"));

    assert!(store.close(&uri("a.vs")).is_some());
    assert!(store.is_empty());
    assert!(!store.contains(&uri("a.vs")));
}

#[test]
fn test_documents_created_on_demand_load_from_disk() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = dir.path().join("lib.vs");
    fs::write(&path, "let a = 1\n").unwrap_or_else(|e| panic!("{e}"));
    let file = Url::from_file_path(&path).unwrap_or_else(|()| panic!("relative path"));

    let mut store: DocumentStore<ScriptFrame> = DocumentStore::new();
    assert_eq!(store.get_or_create(&file, LANGUAGE_ID).text(), "let a = 1\n");
    assert_eq!(store.get_or_create(&uri("missing.vs"), LANGUAGE_ID).text(), "");
    assert_eq!(store.iter().count(), 2);
}
