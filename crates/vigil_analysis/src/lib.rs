//! Analysis backend of the Vigil language server.
//!
//! Keeps an edit-consistent model of open documents and answers position
//! queries (completion, hover, definitions, symbols, coverage overlay)
//! against a parsed program and, where static information runs out,
//! against runtime data captured by executing the program.
//!
//! # Architecture
//!
//! ```text
//! Backend ──submit──▶ Worker thread ──▶ Analyzer
//!                                        ├── DocumentStore   text, pending edits, parsed program
//!                                        │     └── CoverageStore   frames keyed by SourceLocation
//!                                        ├── StructuralLocator  position → node, definition tables
//!                                        ├── ContextManager     default + nested ExecutionEngine
//!                                        ├── EvaluationChain    literal → replay → run-to-section → global
//!                                        └── DiagnosticSink
//! ```
//!
//! The language itself is behind [`vigil_engine::ExecutionEngine`].
//!
//! # Tracing
//!
//! Call [`init_tracing`] once at startup. Output is enabled by `VIGIL_LOG`
//! (or `RUST_LOG`) using `EnvFilter` syntax, e.g. `VIGIL_LOG=vigil_analysis=debug`.
//! Set `VIGIL_LOG_TREE=1` for hierarchical span output.

mod analyzer;
mod backend;
mod completion;
mod config;
mod context;
pub mod convert;
mod coverage;
mod directive;
mod document;
mod error;
pub mod eval;
mod locate;
mod worker;

use std::sync::Once;

use vigil_engine::EngineError;
use vigil_text::TextRange;

pub use analyzer::Analyzer;
pub use backend::Backend;
pub use completion::{CompletionAssembler, GLOBAL_PRIORITY, LOCAL_PRIORITY};
pub use config::{AnalysisConfig, WorkerConfig};
pub use context::{ContextManager, EngineFactory, NestedContext};
pub use coverage::{CoverageRecord, CoverageStore};
pub use directive::{parse_coverage_directive, CoverageScriptError};
pub use document::{Document, DocumentStore};
pub use error::{AnalysisError, AnalysisResult};
pub use locate::{location_text, NearestNode, NodeRelation, StructuralLocator};
pub use worker::{Task, Worker};

/// Category of diagnostics about coverage runs.
pub(crate) const COVERAGE_ANALYSIS: &str = "Coverage analysis";
/// Category of the coverage overlay.
pub(crate) const COVERAGE_OVERLAY: &str = "Coverage Analysis";

/// Editor range an engine error points at, or the document start.
pub(crate) fn engine_error_range(error: &EngineError) -> TextRange {
    error
        .location()
        .map(|at| at.location.to_range())
        .unwrap_or_default()
}

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// Safe to call more than once. Does nothing unless `VIGIL_LOG` or
/// `RUST_LOG` is set. Output goes to stderr, which leaves stdout to the
/// protocol transport.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = std::env::var("VIGIL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
        else {
            return;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);

        // A host may already have installed a subscriber; keep it.
        if std::env::var_os("VIGIL_LOG_TREE").is_some() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_targets(true);
            let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
        } else {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true);
            let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
        }
    });
}
