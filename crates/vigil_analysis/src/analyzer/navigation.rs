use tower_lsp::lsp_types::{
    Hover, HoverContents, LanguageString, Location, MarkedString, SymbolInformation, SymbolKind, Url,
};
use vigil_engine::{ExecutionEngine, NodeTags};
use vigil_text::{zero_based_line_to_one_based_line, Position, PositionMap, SourceLocation};

use super::Analyzer;
use crate::convert::to_lsp_range;
use crate::error::{AnalysisError, AnalysisResult};
use crate::locate::{location_text, StructuralLocator};

impl<E: ExecutionEngine> Analyzer<E> {
    /// Where the name under the cursor is defined.
    pub fn definition(&self, uri: &Url, position: Position) -> AnalysisResult<Vec<Location>> {
        let target = self.definition_at(uri, position)?;
        Ok(target
            .map(|target| Location::new(uri.clone(), to_lsp_range(target.to_range())))
            .into_iter()
            .collect())
    }

    /// The source of the definition of the name under the cursor.
    pub fn hover(&self, uri: &Url, position: Position) -> AnalysisResult<Hover> {
        let document = self
            .documents
            .get(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?;
        let contents = self
            .definition_at(uri, position)?
            .and_then(|target| {
                let text = location_text(document.parsed()?.text(), &target)?;
                Some(MarkedString::LanguageString(LanguageString {
                    language: document.language_id().to_owned(),
                    value: text.to_owned(),
                }))
            })
            .into_iter()
            .collect();
        Ok(Hover {
            contents: HoverContents::Array(contents),
            range: None,
        })
    }

    /// Every function-like unit of the document.
    pub fn document_symbols(&self, uri: &Url) -> AnalysisResult<Vec<SymbolInformation>> {
        let document = self
            .documents
            .get(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?;
        let Some(program) = document.parsed() else {
            return Ok(Vec::new());
        };

        #[allow(deprecated)]
        let symbols = program
            .tree
            .iter()
            .filter(|(_, node)| node.has_tag(NodeTags::ROOT))
            .map(|(_, node)| SymbolInformation {
                name: node.name.clone().unwrap_or_else(|| "<anonymous>".to_owned()),
                kind: SymbolKind::FUNCTION,
                tags: None,
                deprecated: None,
                location: Location::new(uri.clone(), to_lsp_range(node.location.to_range())),
                container_name: None,
            })
            .collect();
        Ok(symbols)
    }

    fn definition_at(&self, uri: &Url, position: Position) -> AnalysisResult<Option<SourceLocation>> {
        let document = self
            .documents
            .get(uri)
            .ok_or_else(|| AnalysisError::UnknownDocument(uri.clone()))?;
        let Some(program) = document.parsed() else {
            return Ok(None);
        };
        let map = PositionMap::new(program.text());
        let Some(line) = zero_based_line_to_one_based_line(position.line, &map) else {
            return Ok(None);
        };
        Ok(StructuralLocator::containing(program, line, position.character)
            .and_then(|node| program.tree.get(node))
            .and_then(|node| self.locator.definition_of(uri, &node.location)))
    }
}
