//! Conversions between the backend's types and `lsp_types`.

use tower_lsp::lsp_types as lsp;
use vigil_diagnostic::{Diagnostic, Severity};
use vigil_text::{EditEvent, Position, TextRange};

pub fn to_lsp_position(position: Position) -> lsp::Position {
    lsp::Position::new(position.line, position.character)
}

pub fn from_lsp_position(position: lsp::Position) -> Position {
    Position::new(position.line, position.character)
}

pub fn to_lsp_range(range: TextRange) -> lsp::Range {
    lsp::Range::new(to_lsp_position(range.start), to_lsp_position(range.end))
}

pub fn from_lsp_range(range: lsp::Range) -> TextRange {
    TextRange::new(from_lsp_position(range.start), from_lsp_position(range.end))
}

/// One entry of a `didChange` notification. A missing range replaces the
/// whole document.
pub fn edit_from_change(change: lsp::TextDocumentContentChangeEvent) -> EditEvent {
    EditEvent {
        range: change.range.map(from_lsp_range),
        text: change.text,
    }
}

pub fn to_lsp_severity(severity: Severity) -> lsp::DiagnosticSeverity {
    match severity {
        Severity::Error => lsp::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp::DiagnosticSeverity::WARNING,
        Severity::Information => lsp::DiagnosticSeverity::INFORMATION,
        Severity::Hint => lsp::DiagnosticSeverity::HINT,
    }
}

/// The wire form of a diagnostic; its category becomes the source.
pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range: to_lsp_range(diagnostic.range),
        severity: Some(to_lsp_severity(diagnostic.severity)),
        source: Some(diagnostic.category.clone()),
        message: diagnostic.message.clone(),
        ..lsp::Diagnostic::default()
    }
}
