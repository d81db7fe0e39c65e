//! What the analysis backend needs from a language implementation.
//!
//! The backend never interprets programs itself. It parses, runs, and
//! introspects them through [`ExecutionEngine`], and observes runs through
//! [`ExecutionHook`]s selected by a [`SectionFilter`].
//!
//! # Coordinates
//!
//! Nodes carry both a byte [`Span`](vigil_text::Span) into the parsed text
//! and a 1-based [`SourceLocation`](vigil_text::SourceLocation). The span is
//! used for cursor lookups, the location as the key that survives edits.

mod engine;
mod error;
mod hook;
mod syntax;
mod value;

pub use engine::{
    Definition, ExecutionEngine, ExecutionOutcome, HookBinding, ParsedProgram, Source, SourceFix,
};
pub use error::{EngineError, ErrorLocation};
pub use hook::{
    ExecutionEvent, ExecutionHook, HookAction, HookId, HookRegistry, SectionFilter,
};
pub use syntax::{NodeId, NodeTags, SyntaxNode, SyntaxTree};
pub use value::{RuntimeValue, Scope};
