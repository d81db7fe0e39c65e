//! The coverage-script directive.
//!
//! A document may name the entry point that exercises it in its first line:
//!
//! ```text
//! # COVERAGE_SCRIPT: ../tests/run_all.vs
//! ```
//!
//! The marker may appear anywhere in the line. Relative paths resolve
//! against the document's own location.

use thiserror::Error;
use tower_lsp::lsp_types::Url;
use vigil_text::{Position, TextRange};

/// A directive naming an entry point that cannot be used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct CoverageScriptError {
    /// Character where the malformed path starts.
    pub index: u32,
    /// Length of the malformed path in characters.
    pub length: u32,
    pub reason: String,
}

impl CoverageScriptError {
    /// Range of the malformed token, always on the first line.
    pub fn range(&self) -> TextRange {
        TextRange::new(
            Position::new(0, self.index),
            Position::new(0, self.index + self.length),
        )
    }
}

/// Entry point named by the first line of `text`, if any.
pub fn parse_coverage_directive(
    text: &str,
    document: &Url,
    directive: &str,
) -> Result<Option<Url>, CoverageScriptError> {
    if directive.is_empty() {
        return Ok(None);
    }
    let first_line = text.lines().next().unwrap_or_default();
    let Some(found) = first_line.find(directive) else {
        return Ok(None);
    };

    let path_start = found + directive.len();
    let index = utf16_len(&first_line[..path_start]);
    let error = |reason: String| CoverageScriptError {
        index,
        length: utf16_len(first_line).saturating_sub(index),
        reason,
    };

    let path = first_line[path_start..].trim();
    if path.is_empty() {
        return Err(error(format!("Missing path after `{}`", directive.trim_end())));
    }
    let resolved = document
        .join(path)
        .map_err(|e| error(format!("Invalid path `{path}`: {e}")))?;
    let exists = resolved
        .to_file_path()
        .is_ok_and(|file| file.is_file());
    if !exists {
        return Err(error(format!("File not found: {path}")));
    }
    tracing::debug!(%document, entry = %resolved, "coverage directive");
    Ok(Some(resolved))
}

fn utf16_len(text: &str) -> u32 {
    u32::try_from(text.encode_utf16().count()).unwrap_or(u32::MAX)
}
