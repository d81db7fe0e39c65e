//! Engine failures.

use thiserror::Error;
use vigil_text::SourceLocation;

/// Where in which source an engine failure happened.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorLocation {
    /// Name of the failing source (a document URI for documents).
    pub source_name: String,
    pub location: SourceLocation,
}

impl ErrorLocation {
    pub fn new(source_name: impl Into<String>, location: SourceLocation) -> Self {
        ErrorLocation {
            source_name: source_name.into(),
            location,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{message}")]
    Syntax {
        message: String,
        location: Option<ErrorLocation>,
    },

    #[error("{message}")]
    Runtime {
        message: String,
        location: Option<ErrorLocation>,
    },

    /// The program ended itself on purpose.
    #[error("program exited with status {status}")]
    Exit { status: i32 },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl EngineError {
    pub fn syntax(message: impl Into<String>, location: Option<ErrorLocation>) -> Self {
        EngineError::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn runtime(message: impl Into<String>, location: Option<ErrorLocation>) -> Self {
        EngineError::Runtime {
            message: message.into(),
            location,
        }
    }

    /// Whether the failure is an intentional program exit.
    pub fn is_exit(&self) -> bool {
        matches!(self, EngineError::Exit { .. })
    }

    pub fn location(&self) -> Option<&ErrorLocation> {
        match self {
            EngineError::Syntax { location, .. } | EngineError::Runtime { location, .. } => {
                location.as_ref()
            }
            EngineError::Exit { .. } | EngineError::Unsupported(_) => None,
        }
    }
}
