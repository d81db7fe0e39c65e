//! Statement and expression trees produced by the parser.

use vigil_engine::NodeTags;
use vigil_text::{SourceLocation, Span};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub location: SourceLocation,
    pub tags: NodeTags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ExprKind {
    Int(i64),
    Str(String),
    Ident(String),
    Record(Vec<(String, Expr)>),
    Member { object: Box<Expr>, member: String },
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    /// Direct subexpressions, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Ident(_) => Vec::new(),
            ExprKind::Record(fields) => fields.iter().map(|(_, value)| value).collect(),
            ExprKind::Member { object, .. } => vec![object.as_ref()],
            ExprKind::Call { callee, args } => {
                let mut children = vec![callee.as_ref()];
                children.extend(args);
                children
            }
        }
    }
}

/// A named function: `fn name(a, b) = body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub(crate) body: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StmtKind {
    Let { name: String, value: Expr },
    Fn(std::sync::Arc<FunctionDef>),
    Exit(Option<Expr>),
    Fail(Option<Expr>),
    Expr(Expr),
}

impl Stmt {
    pub fn tags(&self) -> NodeTags {
        match self.kind {
            StmtKind::Fn(_) => NodeTags::ROOT,
            _ => NodeTags::STATEMENT,
        }
    }

    /// The name this statement binds, if any.
    pub fn binding(&self) -> Option<&str> {
        match &self.kind {
            StmtKind::Let { name, .. } => Some(name),
            StmtKind::Fn(def) => Some(&def.name),
            StmtKind::Exit(_) | StmtKind::Fail(_) | StmtKind::Expr(_) => None,
        }
    }
}
