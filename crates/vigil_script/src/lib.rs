//! A small line-oriented scripting language.
//!
//! Implements [`ExecutionEngine`] so the analysis backend can be exercised
//! end to end without a full language behind it. One statement per line:
//!
//! ```text
//! let origin = Point(0, 0)      # bind a variable
//! fn shift(p, d) = {x: d, y: p.y}
//! print(shift(origin, 2).x)
//! exit 0                        # intentional exit
//! fail "unreachable"            # runtime failure
//! ```
//!
//! Values are integers, strings, records, functions, and the builtins
//! `print` and `Point`. Records and strings have members; strings expose
//! `length`.

mod ast;
mod interp;
mod lexer;
mod parser;
mod tree;
mod value;

use vigil_engine::{
    EngineError, ExecutionEngine, ExecutionHook, ExecutionOutcome, HookId, HookRegistry, NodeId,
    ParsedProgram, Scope, SectionFilter, Source, SourceFix,
};
use vigil_text::{Position, PositionMap};

pub use ast::FunctionDef;
pub use value::{Builtin, ScriptFrame, Value};

use crate::ast::StmtKind;
use crate::interp::{Interpreter, Interrupt, BUILTINS};
use crate::lexer::{lex, TokenKind};

/// Language id of this engine.
pub const LANGUAGE_ID: &str = "vigilscript";

/// Source name given to fragments evaluated inline.
const INLINE_SOURCE: &str = "inline eval";

#[derive(Default)]
pub struct ScriptEngine {
    hooks: HookRegistry<Value, ScriptFrame>,
    output: Vec<String>,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written by `print` so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Number of hooks currently attached.
    pub fn attached_hooks(&self) -> usize {
        self.hooks.len()
    }

    fn check_language(language_id: &str) -> Result<(), EngineError> {
        if language_id == LANGUAGE_ID {
            Ok(())
        } else {
            Err(EngineError::Unsupported(format!("language `{language_id}`")))
        }
    }

    fn run(
        &mut self,
        program: &ParsedProgram,
        frame: Option<&ScriptFrame>,
        hooked: bool,
    ) -> Result<ExecutionOutcome<Value>, EngineError> {
        let stmts = parser::parse(program.text(), &program.source.name)?;
        let mut no_hooks = HookRegistry::new();
        let hooks = if hooked { &mut self.hooks } else { &mut no_hooks };
        let result = Interpreter::new(&program.source.name, hooks, &mut self.output)
            .with_frame(frame)
            .run(&stmts);
        match result {
            Ok(value) => Ok(ExecutionOutcome::Completed(value)),
            Err(Interrupt::Stopped) => {
                tracing::debug!(source = %program.source.name, "run stopped by hook");
                Ok(ExecutionOutcome::Stopped)
            }
            Err(Interrupt::Failed(error)) => Err(error),
        }
    }

    /// Scopes of the top-level statement holding `node`.
    ///
    /// With `past_end` the statement's own binding is visible and the
    /// parameters of a function statement are not.
    fn statement_scopes(program: &ParsedProgram, node: NodeId, past_end: bool) -> Vec<Scope<Value>> {
        let Some(target) = program.tree.get(node).map(|n| n.span) else {
            return Vec::new();
        };
        let Ok(stmts) = parser::parse(program.text(), &program.source.name) else {
            return Vec::new();
        };
        let Some(index) = stmts
            .iter()
            .position(|stmt| stmt.span.start <= target.start && target.end <= stmt.span.end)
        else {
            return Vec::new();
        };

        let mut scopes = Vec::new();
        if let (false, StmtKind::Fn(def)) = (past_end, &stmts[index].kind) {
            let mut params = Scope::new(format!("fn {}", def.name));
            for param in &def.params {
                params = params.with_variable(param.clone(), None);
            }
            scopes.push(params);
        }
        let visible = if past_end { &stmts[..=index] } else { &stmts[..index] };
        let mut main = Scope::new("main");
        for stmt in visible.iter().rev() {
            if let Some(name) = stmt.binding() {
                main = main.with_variable(name, None);
            }
        }
        scopes.push(main);
        scopes
    }
}

impl ExecutionEngine for ScriptEngine {
    type Value = Value;
    type Frame = ScriptFrame;

    fn languages(&self) -> Vec<String> {
        vec![LANGUAGE_ID.to_owned()]
    }

    fn parse(&mut self, source: &Source) -> Result<ParsedProgram, EngineError> {
        Self::check_language(&source.language_id)?;
        let stmts = parser::parse(&source.text, &source.name)?;
        let (tree, definitions) = tree::build(&stmts, &source.text);
        tracing::trace!(source = %source.name, nodes = tree.len(), "parsed");
        Ok(ParsedProgram {
            source: source.clone(),
            tree,
            definitions,
        })
    }

    fn execute(&mut self, program: &ParsedProgram) -> Result<ExecutionOutcome<Value>, EngineError> {
        self.run(program, None, true)
    }

    fn parse_inline(
        &mut self,
        text: &str,
        program: &ParsedProgram,
        _node: NodeId,
        _frame: Option<&ScriptFrame>,
    ) -> Result<ParsedProgram, EngineError> {
        self.parse(&Source::new(INLINE_SOURCE, program.language_id(), text))
    }

    fn execute_inline(
        &mut self,
        unit: &ParsedProgram,
        frame: Option<&ScriptFrame>,
    ) -> Result<Value, EngineError> {
        match self.run(unit, frame, false)? {
            ExecutionOutcome::Completed(value) => Ok(value),
            ExecutionOutcome::Stopped => Err(EngineError::Unsupported("inline run stopped".to_owned())),
        }
    }

    fn local_scopes(
        &self,
        program: &ParsedProgram,
        node: NodeId,
        frame: Option<&ScriptFrame>,
    ) -> Vec<Scope<Value>> {
        if let Some(frame) = frame {
            let mut scope = Scope::new("frame");
            for (name, value) in frame.variables.iter().rev() {
                scope = scope.with_variable(name.clone(), Some(value.clone()));
            }
            return vec![scope];
        }

        Self::statement_scopes(program, node, false)
    }

    fn scopes_after(&self, program: &ParsedProgram, node: NodeId) -> Vec<Scope<Value>> {
        Self::statement_scopes(program, node, true)
    }

    fn top_scopes(&self, language_id: &str) -> Vec<Scope<Value>> {
        if Self::check_language(language_id).is_err() {
            return Vec::new();
        }
        let mut global = Scope::new("global");
        for builtin in BUILTINS {
            global = global.with_variable(builtin.name(), Some(Value::Builtin(builtin)));
        }
        vec![global]
    }

    fn meta_object(&self, language_id: &str, value: &Value) -> Option<String> {
        Self::check_language(language_id).ok()?;
        Some(value.meta_name().to_owned())
    }

    fn literal_value(&self, language_id: &str, text: &str) -> Option<Value> {
        Self::check_language(language_id).ok()?;
        let tokens = lex(text.trim()).ok()?;
        match tokens.as_slice() {
            [token] => match &token.kind {
                TokenKind::Int(n) => Some(Value::Int(*n)),
                TokenKind::Str(s) => Some(Value::Str(s.clone())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Drops a `.` typed right before the cursor, so that the object in
    /// front of it parses again.
    fn fix_source_at_position(
        &self,
        text: &str,
        language_id: &str,
        position: Position,
    ) -> Option<SourceFix> {
        Self::check_language(language_id).ok()?;
        let offset = PositionMap::new(text).offset_of(position)?;
        let before = text.get(..offset)?;
        if !before.ends_with('.') || position.character == 0 {
            return None;
        }
        let mut fixed = String::with_capacity(text.len());
        fixed.push_str(&before[..before.len() - 1]);
        fixed.push_str(&text[offset..]);
        Some(SourceFix {
            text: fixed,
            character: position.character - 1,
            is_property_completion: true,
        })
    }

    fn attach_hook(
        &mut self,
        filter: SectionFilter,
        hook: Box<dyn ExecutionHook<Value, ScriptFrame>>,
    ) -> HookId {
        self.hooks.attach(filter, hook)
    }

    fn detach_hook(&mut self, id: HookId) -> bool {
        self.hooks.detach(id)
    }
}
