//! Analysis configuration.

/// Knobs of the analysis backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Consult the engine's literal shortcut and source-fix hooks.
    pub language_specific_fixes: bool,
    /// Marker introducing a coverage entry point in the first line of a document.
    pub coverage_directive: String,
    /// Reuse one nested engine for speculative execution across requests.
    pub cache_nested_context: bool,
    /// Category given to parse diagnostics.
    pub diagnostic_source: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            language_specific_fixes: true,
            coverage_directive: "COVERAGE_SCRIPT:".to_owned(),
            cache_nested_context: true,
            diagnostic_source: "vigil".to_owned(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_language_specific_fixes(mut self, enabled: bool) -> Self {
        self.language_specific_fixes = enabled;
        self
    }

    #[must_use]
    pub fn with_coverage_directive(mut self, directive: impl Into<String>) -> Self {
        self.coverage_directive = directive.into();
        self
    }

    #[must_use]
    pub fn with_cache_nested_context(mut self, enabled: bool) -> Self {
        self.cache_nested_context = enabled;
        self
    }

    #[must_use]
    pub fn with_diagnostic_source(mut self, source: impl Into<String>) -> Self {
        self.diagnostic_source = source.into();
        self
    }
}

/// Settings of the analysis worker thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            thread_name: "vigil-analysis".to_owned(),
        }
    }
}

impl WorkerConfig {
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
