//! Errors surfaced to callers of the analysis backend.
//!
//! Problems that can be attributed to a document become diagnostics
//! instead; these are contract violations and infrastructure failures.

use thiserror::Error;
use tower_lsp::lsp_types::Url;
use vigil_engine::EngineError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown language `{language}` (known: {})", .known.join(", "))]
    UnknownLanguage { language: String, known: Vec<String> },

    #[error("document `{0}` is not open")]
    UnknownDocument(Url),

    #[error("could not start the analysis worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("the analysis worker has stopped")]
    WorkerStopped,

    #[error("analysis task panicked")]
    TaskPanicked,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
