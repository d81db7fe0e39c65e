//! The execution engine capability.

use std::fmt;
use std::ops::{Deref, DerefMut};

use vigil_text::{Position, SourceLocation};

use crate::{EngineError, ExecutionHook, HookId, NodeId, RuntimeValue, Scope, SectionFilter, SyntaxTree};

/// Text handed to an engine.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Source {
    /// Identity used by filters and error locations; a URI for documents.
    pub name: String,
    pub language_id: String,
    pub text: String,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        language_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Source {
            name: name.into(),
            language_id: language_id.into(),
            text: text.into(),
        }
    }
}

/// A use of a name and the section defining it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Definition {
    pub usage: SourceLocation,
    pub target: SourceLocation,
}

/// Result of a successful parse.
///
/// Programs are plain data: any engine instance of the same kind can
/// execute a program another instance parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedProgram {
    pub source: Source,
    pub tree: SyntaxTree,
    /// Name uses and their definitions, reported at parse time.
    pub definitions: Vec<Definition>,
}

impl ParsedProgram {
    /// The text this program was built from.
    pub fn text(&self) -> &str {
        &self.source.text
    }

    pub fn language_id(&self) -> &str {
        &self.source.language_id
    }

    /// Source text of node `id`.
    pub fn node_text(&self, id: NodeId) -> &str {
        self.tree.text_of(id, &self.source.text)
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome<V> {
    Completed(V),
    /// A hook asked the engine to stop.
    Stopped,
}

/// A best-effort edit of broken source around the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFix {
    pub text: String,
    /// Cursor character to use against the fixed text.
    pub character: u32,
    /// Whether the cursor followed a member-access trigger.
    pub is_property_completion: bool,
}

/// Parse, execute, and introspect programs of one or more languages.
///
/// Implementations need not be thread-safe; callers serialize access.
pub trait ExecutionEngine: Send {
    type Value: RuntimeValue;
    /// Captured variable state at one executed section.
    type Frame: Clone + fmt::Debug + Send + 'static;

    /// Ids of the languages this engine runs.
    fn languages(&self) -> Vec<String>;

    fn has_language(&self, language_id: &str) -> bool {
        self.languages().iter().any(|known| known == language_id)
    }

    fn parse(&mut self, source: &Source) -> Result<ParsedProgram, EngineError>;

    /// Run a program, notifying attached hooks.
    fn execute(&mut self, program: &ParsedProgram) -> Result<ExecutionOutcome<Self::Value>, EngineError>;

    /// Parse `text` as a fragment to evaluate at `node` of `program`.
    fn parse_inline(
        &mut self,
        text: &str,
        program: &ParsedProgram,
        node: NodeId,
        frame: Option<&Self::Frame>,
    ) -> Result<ParsedProgram, EngineError>;

    /// Evaluate an inline fragment against a captured frame.
    fn execute_inline(
        &mut self,
        unit: &ParsedProgram,
        frame: Option<&Self::Frame>,
    ) -> Result<Self::Value, EngineError>;

    /// Scopes visible at `node`, innermost first.
    fn local_scopes(
        &self,
        program: &ParsedProgram,
        node: NodeId,
        frame: Option<&Self::Frame>,
    ) -> Vec<Scope<Self::Value>>;

    /// Scopes visible just past the end of `node`, innermost first.
    ///
    /// Unlike [`local_scopes`](Self::local_scopes) this includes whatever
    /// the statement holding `node` binds.
    fn scopes_after(&self, program: &ParsedProgram, node: NodeId) -> Vec<Scope<Self::Value>> {
        self.local_scopes(program, node, None)
    }

    /// Global scopes of a language, innermost first.
    fn top_scopes(&self, language_id: &str) -> Vec<Scope<Self::Value>>;

    /// Display name of the type of `value`.
    fn meta_object(&self, language_id: &str, value: &Self::Value) -> Option<String>;

    /// Value of `text` when it is a literal, computed without execution.
    fn literal_value(&self, language_id: &str, text: &str) -> Option<Self::Value> {
        let _ = (language_id, text);
        None
    }

    /// Language-specific repair of `text` for a request at `position`.
    fn fix_source_at_position(
        &self,
        text: &str,
        language_id: &str,
        position: Position,
    ) -> Option<SourceFix> {
        let _ = (text, language_id, position);
        None
    }

    /// Whether typing `text` requests member completion.
    fn is_property_trigger(&self, language_id: &str, text: &str) -> bool {
        let _ = language_id;
        text == "."
    }

    fn attach_hook(
        &mut self,
        filter: SectionFilter,
        hook: Box<dyn ExecutionHook<Self::Value, Self::Frame>>,
    ) -> HookId;

    /// Remove a hook. Returns `false` if it was not attached.
    fn detach_hook(&mut self, id: HookId) -> bool;

    /// Attach `hook` for the lifetime of the returned binding.
    fn bind_hook(
        &mut self,
        filter: SectionFilter,
        hook: Box<dyn ExecutionHook<Self::Value, Self::Frame>>,
    ) -> HookBinding<'_, Self>
    where
        Self: Sized,
    {
        let id = self.attach_hook(filter, hook);
        HookBinding { engine: self, id }
    }
}

/// RAII guard detaching a hook when dropped, including during unwinding.
///
/// Access the engine through the guard; it implements `Deref`/`DerefMut`.
pub struct HookBinding<'engine, E: ExecutionEngine> {
    engine: &'engine mut E,
    id: HookId,
}

impl<E: ExecutionEngine> HookBinding<'_, E> {
    pub fn id(&self) -> HookId {
        self.id
    }
}

impl<E: ExecutionEngine> Drop for HookBinding<'_, E> {
    fn drop(&mut self) {
        self.engine.detach_hook(self.id);
    }
}

impl<E: ExecutionEngine> Deref for HookBinding<'_, E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        self.engine
    }
}

impl<E: ExecutionEngine> DerefMut for HookBinding<'_, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.engine
    }
}
