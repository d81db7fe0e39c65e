use std::fmt;

use vigil_text::TextRange;

/// How serious a diagnostic is.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        };
        f.write_str(name)
    }
}

/// A problem report attached to a range of one document.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub range: TextRange,
    pub message: String,
    pub severity: Severity,
    /// Which part of the backend produced it.
    pub category: String,
}

impl Diagnostic {
    pub fn new(
        range: TextRange,
        message: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
    ) -> Self {
        Diagnostic {
            range,
            message: message.into(),
            severity,
            category: category.into(),
        }
    }

    pub fn error(range: TextRange, message: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(range, message, Severity::Error, category)
    }

    pub fn warning(range: TextRange, message: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(range, message, Severity::Warning, category)
    }

    pub fn info(range: TextRange, message: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(range, message, Severity::Information, category)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.category, self.range, self.message
        )
    }
}
