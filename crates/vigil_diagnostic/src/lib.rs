//! Diagnostics and the sink they are published through.
//!
//! The analysis backend adds diagnostics per document while it works and
//! asks the sink to publish them once a request is done. Transport to the
//! editor is the sink's business.

mod collector;
mod diagnostic;

pub use collector::{DiagnosticCollector, Published, DEFAULT_HISTORY};
pub use diagnostic::{Diagnostic, Severity};

/// Receiver of diagnostics.
pub trait DiagnosticSink: Send {
    /// Queue `diagnostic` for the document `uri`.
    fn add_diagnostic(&mut self, uri: &str, diagnostic: Diagnostic);

    /// Publish what was queued for `uri`, or for every document when `None`.
    ///
    /// Publishing for a single document happens even when nothing was
    /// queued, so that stale diagnostics are cleared.
    fn report_collected(&mut self, uri: Option<&str>);
}
