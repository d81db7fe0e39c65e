//! Cursor positions to program nodes.
//!
//! Only instrumentable nodes are candidates. Structural wrappers are
//! skipped, their children are not.

use std::cmp::Reverse;

use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::Url;
use vigil_engine::{NodeId, ParsedProgram};
use vigil_text::{Position, PositionMap, SourceLocation};

/// How the cursor relates to the node found for it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeRelation {
    /// The cursor is inside the node.
    Contains,
    /// The cursor sits right at the end of the node.
    ContainsEnd,
    /// No node spans the cursor; this is the nearest node before it.
    Before,
    /// No node spans the cursor; this is the nearest node after it.
    After,
}

impl NodeRelation {
    pub fn is_containing(self) -> bool {
        matches!(self, NodeRelation::Contains | NodeRelation::ContainsEnd)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NearestNode {
    pub node: NodeId,
    pub relation: NodeRelation,
}

/// Finds nodes for positions and keeps the definition table of each document.
#[derive(Debug, Default)]
pub struct StructuralLocator {
    definitions: FxHashMap<Url, FxHashMap<SourceLocation, SourceLocation>>,
}

impl StructuralLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node nearest to `character` on the 1-based `line` of `program`.
    ///
    /// Among spanning nodes the smallest wins. On equal size a node ending
    /// at the cursor beats one continuing past it, then the deeper node wins.
    pub fn locate(program: &ParsedProgram, line: u32, character: u32) -> Option<NearestNode> {
        let map = PositionMap::new(program.text());
        let offset = map.offset_of(Position::new(line.checked_sub(1)?, character))?;
        let offset = u32::try_from(offset).ok()?;

        let mut containing: Option<((u32, bool, Reverse<NodeId>), NodeId)> = None;
        let mut before: Option<((u32, NodeId), NodeId)> = None;
        let mut after: Option<((u32, Reverse<NodeId>), NodeId)> = None;

        for (id, node) in program.tree.iter().filter(|(_, node)| node.instrumentable) {
            let span = node.span;
            if span.start <= offset && offset <= span.end {
                let key = (span.len(), span.end != offset, Reverse(id));
                if containing.as_ref().map_or(true, |(best, _)| key < *best) {
                    containing = Some((key, id));
                }
            } else if span.end < offset {
                let key = (span.end, id);
                if before.as_ref().map_or(true, |(best, _)| key > *best) {
                    before = Some((key, id));
                }
            } else {
                let key = (span.start, Reverse(id));
                if after.as_ref().map_or(true, |(best, _)| key < *best) {
                    after = Some((key, id));
                }
            }
        }

        if let Some((key, node)) = containing {
            let relation = if key.1 {
                NodeRelation::Contains
            } else {
                NodeRelation::ContainsEnd
            };
            return Some(NearestNode { node, relation });
        }
        before
            .map(|(_, node)| NearestNode {
                node,
                relation: NodeRelation::Before,
            })
            .or_else(|| {
                after.map(|(_, node)| NearestNode {
                    node,
                    relation: NodeRelation::After,
                })
            })
    }

    /// The innermost node spanning the cursor, if any.
    pub fn containing(program: &ParsedProgram, line: u32, character: u32) -> Option<NodeId> {
        Self::locate(program, line, character)
            .filter(|nearest| nearest.relation.is_containing())
            .map(|nearest| nearest.node)
    }

    /// Replace the definition table of `uri` with the pairs `program` reports.
    pub fn load_definitions(&mut self, uri: &Url, program: &ParsedProgram) {
        let table = program
            .definitions
            .iter()
            .map(|definition| (definition.usage, definition.target))
            .collect();
        self.definitions.insert(uri.clone(), table);
    }

    pub fn definition_of(&self, uri: &Url, usage: &SourceLocation) -> Option<SourceLocation> {
        self.definitions.get(uri)?.get(usage).copied()
    }

    pub fn forget(&mut self, uri: &Url) {
        self.definitions.remove(uri);
    }
}

/// The text `location` covers in `text`.
pub fn location_text<'text>(text: &'text str, location: &SourceLocation) -> Option<&'text str> {
    let map = PositionMap::new(text);
    let range = location.to_range();
    let start = map.offset_of(range.start)?;
    let end = map.offset_of(range.end)?;
    text.get(start..end.max(start))
}
