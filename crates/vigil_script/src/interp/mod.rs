//! Tree-walking interpreter.
//!
//! Every statement and expression is reported to the attached hooks when it
//! is entered and when it produced its value. A hook asking to stop unwinds
//! the run through [`Interrupt::Stopped`].

use vigil_engine::{
    EngineError, ErrorLocation, ExecutionEvent, HookAction, HookRegistry, NodeTags,
};
use vigil_text::SourceLocation;

use crate::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::value::{Builtin, ScriptFrame, Value};

const MAX_CALL_DEPTH: usize = 200;

pub(crate) const BUILTINS: [Builtin; 2] = [Builtin::Print, Builtin::Point];

pub(crate) enum Interrupt {
    Stopped,
    Failed(EngineError),
}

impl From<EngineError> for Interrupt {
    fn from(error: EngineError) -> Self {
        Interrupt::Failed(error)
    }
}

type Flow<T> = Result<T, Interrupt>;

pub(crate) struct Interpreter<'a> {
    source_name: &'a str,
    hooks: &'a mut HookRegistry<Value, ScriptFrame>,
    output: &'a mut Vec<String>,
    globals: Vec<(String, Value)>,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        source_name: &'a str,
        hooks: &'a mut HookRegistry<Value, ScriptFrame>,
        output: &'a mut Vec<String>,
    ) -> Self {
        Interpreter {
            source_name,
            hooks,
            output,
            globals: Vec::new(),
            depth: 0,
        }
    }

    /// Start from the variables of a captured frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Option<&ScriptFrame>) -> Self {
        if let Some(frame) = frame {
            self.globals.clone_from(&frame.variables);
        }
        self
    }

    /// Run `stmts` and return the value of the last one.
    pub fn run(&mut self, stmts: &[Stmt]) -> Flow<Value> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = self.stmt(stmt)?;
        }
        Ok(last)
    }

    fn runtime_error(&self, message: impl Into<String>, location: SourceLocation) -> Interrupt {
        Interrupt::Failed(EngineError::runtime(
            message,
            Some(ErrorLocation::new(self.source_name, location)),
        ))
    }

    fn frame(&self, locals: &[(String, Value)]) -> ScriptFrame {
        let mut variables = self.globals.clone();
        variables.extend_from_slice(locals);
        ScriptFrame { variables }
    }

    fn enter(&mut self, location: SourceLocation, tags: NodeTags, locals: &[(String, Value)]) -> Flow<()> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let frame = self.frame(locals);
        let event = ExecutionEvent {
            source_name: self.source_name,
            location,
            tags,
            frame: &frame,
        };
        match self.hooks.enter(&event) {
            HookAction::Continue => Ok(()),
            HookAction::Stop => Err(Interrupt::Stopped),
        }
    }

    fn exit(
        &mut self,
        location: SourceLocation,
        tags: NodeTags,
        locals: &[(String, Value)],
        value: &Value,
    ) -> Flow<()> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let frame = self.frame(locals);
        let event = ExecutionEvent {
            source_name: self.source_name,
            location,
            tags,
            frame: &frame,
        };
        match self.hooks.exit(&event, value) {
            HookAction::Continue => Ok(()),
            HookAction::Stop => Err(Interrupt::Stopped),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) -> Flow<Value> {
        let tags = stmt.tags();
        self.enter(stmt.location, tags, &[])?;
        let value = match &stmt.kind {
            StmtKind::Let { name, value } => {
                let value = self.expr(value, &[])?;
                self.globals.push((name.clone(), value.clone()));
                value
            }
            StmtKind::Fn(def) => {
                let value = Value::Function(def.clone());
                self.globals.push((def.name.clone(), value.clone()));
                value
            }
            StmtKind::Exit(status) => {
                let status = match status {
                    Some(expr) => match self.expr(expr, &[])? {
                        Value::Int(n) => i32::try_from(n).unwrap_or(i32::MAX),
                        _ => 1,
                    },
                    None => 0,
                };
                tracing::debug!(status, "script exit");
                return Err(Interrupt::Failed(EngineError::Exit { status }));
            }
            StmtKind::Fail(message) => {
                let message = match message {
                    Some(expr) => self.expr(expr, &[])?.to_string(),
                    None => "failure".to_owned(),
                };
                return Err(self.runtime_error(message, stmt.location));
            }
            StmtKind::Expr(expr) => self.expr(expr, &[])?,
        };
        self.exit(stmt.location, tags, &[], &value)?;
        Ok(value)
    }

    fn lookup(&self, name: &str, locals: &[(String, Value)]) -> Option<Value> {
        locals
            .iter()
            .rev()
            .chain(self.globals.iter().rev())
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
            .or_else(|| {
                BUILTINS
                    .into_iter()
                    .find(|builtin| builtin.name() == name)
                    .map(Value::Builtin)
            })
    }

    fn expr(&mut self, expr: &Expr, locals: &[(String, Value)]) -> Flow<Value> {
        self.enter(expr.location, expr.tags, locals)?;
        let value = match &expr.kind {
            ExprKind::Int(n) => Value::Int(*n),
            ExprKind::Str(s) => Value::Str(s.clone()),
            ExprKind::Ident(name) => match self.lookup(name, locals) {
                Some(value) => value,
                None => {
                    return Err(self.runtime_error(format!("undefined variable `{name}`"), expr.location));
                }
            },
            ExprKind::Record(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, field) in fields {
                    values.push((name.clone(), self.expr(field, locals)?));
                }
                Value::Record(values)
            }
            ExprKind::Member { object, member } => {
                let object = self.expr(object, locals)?;
                match object.member(member) {
                    Some(value) => value,
                    None => {
                        return Err(self.runtime_error(
                            format!("no member `{member}` on {}", object.meta_name()),
                            expr.location,
                        ));
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                let callee = self.expr(callee, locals)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.expr(arg, locals)?);
                }
                self.call(&callee, values, expr.location)?
            }
        };
        self.exit(expr.location, expr.tags, locals, &value)?;
        Ok(value)
    }

    fn call(&mut self, callee: &Value, args: Vec<Value>, location: SourceLocation) -> Flow<Value> {
        match callee {
            Value::Builtin(Builtin::Print) => {
                let line: Vec<String> = args.iter().map(ToString::to_string).collect();
                self.output.push(line.join(" "));
                Ok(Value::Null)
            }
            Value::Builtin(Builtin::Point) => match <[Value; 2]>::try_from(args) {
                Ok([x, y]) => Ok(Value::Record(vec![("x".to_owned(), x), ("y".to_owned(), y)])),
                Err(args) => Err(self.runtime_error(
                    format!("Point takes 2 arguments, got {}", args.len()),
                    location,
                )),
            },
            Value::Function(def) => {
                if def.params.len() != args.len() {
                    return Err(self.runtime_error(
                        format!(
                            "{} takes {} arguments, got {}",
                            def.name,
                            def.params.len(),
                            args.len()
                        ),
                        location,
                    ));
                }
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(self.runtime_error("call depth exceeded", location));
                }
                let locals: Vec<(String, Value)> = def.params.iter().cloned().zip(args).collect();
                self.depth += 1;
                let result = self.expr(&def.body, &locals);
                self.depth -= 1;
                result
            }
            other => Err(self.runtime_error(format!("`{other}` is not callable"), location)),
        }
    }
}
