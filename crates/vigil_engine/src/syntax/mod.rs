//! Flat syntax tree of a parsed program.
//!
//! Nodes live in a single arena and refer to each other by [`NodeId`]. A
//! node is pushed after its parent, so ids grow with depth along any
//! root-to-leaf path.

use std::fmt;

use bitflags::bitflags;
use vigil_text::{SourceLocation, Span};

bitflags! {
    /// Structural tags an engine attaches to nodes.
    ///
    /// Instrumentation filters and the coverage overlay select nodes by tag.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeTags: u8 {
        /// Unit of code with its own name (function, program).
        const ROOT = 1 << 0;
        /// Statement boundary; the unit of coverage.
        const STATEMENT = 1 << 1;
        /// Expression producing a value.
        const EXPRESSION = 1 << 2;
        /// Call of a callable value.
        const CALL = 1 << 3;
    }
}

/// Index into a [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One node of the tree.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SyntaxNode {
    pub span: Span,
    pub location: SourceLocation,
    pub tags: NodeTags,
    /// Whether the node is a meaningful evaluation unit. Structural
    /// wrappers are not.
    pub instrumentable: bool,
    /// Name of root-tagged nodes.
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SyntaxNode {
    /// An instrumentable node without name or links.
    pub fn new(span: Span, location: SourceLocation, tags: NodeTags) -> Self {
        SyntaxNode {
            span,
            location,
            tags,
            instrumentable: true,
            name: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A non-instrumentable structural wrapper.
    pub fn wrapper(span: Span, location: SourceLocation) -> Self {
        SyntaxNode {
            instrumentable: false,
            ..SyntaxNode::new(span, location, NodeTags::empty())
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_tag(&self, tags: NodeTags) -> bool {
        self.tags.intersects(tags)
    }
}

/// Arena of [`SyntaxNode`]s.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    roots: Vec<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node` below `parent` (or as a new top-level node) and return its id.
    ///
    /// Any links already present on `node` are overwritten.
    pub fn push(&mut self, parent: Option<NodeId>, mut node: SyntaxNode) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        match parent.and_then(|p| self.nodes.get_mut(p.index())) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Top-level nodes, in source order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(u32::try_from(i).unwrap_or(u32::MAX)), node))
    }

    /// Children of the parent of `id`, including `id` itself.
    ///
    /// A top-level node's siblings are the other top-level nodes.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).and_then(|node| node.parent) {
            Some(parent) => self
                .get(parent)
                .map_or(&[][..], |parent| parent.children.as_slice()),
            None => &self.roots,
        }
    }

    /// Nearest ancestor of `id` (excluding itself) carrying any of `tags`.
    pub fn enclosing(&self, id: NodeId, tags: NodeTags) -> Option<NodeId> {
        let mut current = self.get(id)?.parent;
        while let Some(candidate) = current {
            let node = self.get(candidate)?;
            if node.has_tag(tags) {
                return Some(candidate);
            }
            current = node.parent;
        }
        None
    }

    /// Source text of `id` within `text`.
    pub fn text_of<'text>(&self, id: NodeId, text: &'text str) -> &'text str {
        self.get(id).map_or("", |node| node.span.slice(text))
    }
}
