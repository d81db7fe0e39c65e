//! Shared fixtures: an analyzer over [`ScriptEngine`] publishing into a
//! [`DiagnosticCollector`] the test keeps a handle to.

use tower_lsp::lsp_types::{CompletionList, Url};
use vigil_analysis::{AnalysisConfig, Analyzer};
use vigil_diagnostic::{Diagnostic, DiagnosticCollector};
use vigil_script::{ScriptEngine, LANGUAGE_ID};
use vigil_text::{EditEvent, Position};

pub fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}")).unwrap()
}

/// An analyzer and the collector its diagnostics go to.
pub fn analyzer(config: AnalysisConfig) -> (Analyzer<ScriptEngine>, DiagnosticCollector) {
    // Honors VIGIL_LOG when debugging a failing test.
    vigil_analysis::init_tracing();
    let diagnostics = DiagnosticCollector::new();
    let analyzer = Analyzer::new(
        ScriptEngine::new(),
        ScriptEngine::new,
        Box::new(diagnostics.clone()),
        config,
    );
    (analyzer, diagnostics)
}

pub struct Harness {
    pub analyzer: Analyzer<ScriptEngine>,
    pub diagnostics: DiagnosticCollector,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        let (analyzer, diagnostics) = analyzer(config);
        Harness { analyzer, diagnostics }
    }

    /// Open `text` as `file:///workspace/{name}`.
    pub fn open(&mut self, name: &str, text: &str) -> Url {
        let uri = uri(name);
        self.analyzer.open(&uri, text, LANGUAGE_ID).unwrap();
        uri
    }

    pub fn open_url(&mut self, uri: &Url, text: &str) {
        self.analyzer.open(uri, text, LANGUAGE_ID).unwrap();
    }

    pub fn insert(&mut self, uri: &Url, line: u32, character: u32, text: &str) {
        self.analyzer
            .apply_changes(uri, &[EditEvent::insert(Position::new(line, character), text)])
            .unwrap();
    }

    pub fn complete(&mut self, uri: &Url, line: u32, character: u32) -> CompletionList {
        self.analyzer.completion(uri, Position::new(line, character)).unwrap()
    }

    /// The latest batch published for `uri`, or nothing.
    pub fn published(&self, uri: &Url) -> Vec<Diagnostic> {
        self.diagnostics.last_published(uri.as_str()).unwrap_or_default()
    }

    pub fn text(&self, uri: &Url) -> &str {
        self.analyzer.source_text(uri).unwrap()
    }
}

pub fn labels(list: &CompletionList) -> Vec<&str> {
    list.items.iter().map(|item| item.label.as_str()).collect()
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}
