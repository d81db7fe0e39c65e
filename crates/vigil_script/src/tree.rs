//! Lowering of parsed statements into the engine-neutral syntax tree.
//!
//! Also resolves every identifier to the section defining it: a `let` or
//! `fn` statement seen earlier, or the enclosing function for parameters.

use vigil_engine::{Definition, NodeId, SyntaxNode, SyntaxTree};
use vigil_text::{SourceLocation, Span};

use crate::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::parser::Locator;

struct Builder {
    tree: SyntaxTree,
    definitions: Vec<Definition>,
    /// Top-level bindings seen so far.
    bindings: Vec<(String, SourceLocation)>,
}

pub(crate) fn build(stmts: &[Stmt], text: &str) -> (SyntaxTree, Vec<Definition>) {
    let whole = Span::new(0, u32::try_from(text.len()).unwrap_or(u32::MAX));
    let mut builder = Builder {
        tree: SyntaxTree::new(),
        definitions: Vec::new(),
        bindings: Vec::new(),
    };
    let program = builder
        .tree
        .push(None, SyntaxNode::wrapper(whole, Locator::new(text).location(whole)));

    for stmt in stmts {
        let mut node = SyntaxNode::new(stmt.span, stmt.location, stmt.tags());
        if let StmtKind::Fn(def) = &stmt.kind {
            node = node.with_name(def.name.clone());
        }
        let id = builder.tree.push(Some(program), node);
        match &stmt.kind {
            StmtKind::Let { value, .. } | StmtKind::Expr(value) => builder.expr(id, value, &[]),
            StmtKind::Exit(value) | StmtKind::Fail(value) => {
                if let Some(value) = value {
                    builder.expr(id, value, &[]);
                }
            }
            StmtKind::Fn(def) => {
                let params: Vec<(String, SourceLocation)> = def
                    .params
                    .iter()
                    .map(|param| (param.clone(), stmt.location))
                    .collect();
                builder.expr(id, &def.body, &params);
            }
        }
        if let Some(name) = stmt.binding() {
            builder.bindings.push((name.to_owned(), stmt.location));
        }
    }

    (builder.tree, builder.definitions)
}

impl Builder {
    fn expr(&mut self, parent: NodeId, expr: &Expr, params: &[(String, SourceLocation)]) {
        let id = self
            .tree
            .push(Some(parent), SyntaxNode::new(expr.span, expr.location, expr.tags));
        if let ExprKind::Ident(name) = &expr.kind {
            let target = params
                .iter()
                .rev()
                .chain(self.bindings.iter().rev())
                .find(|(bound, _)| bound == name)
                .map(|(_, location)| *location);
            if let Some(target) = target {
                self.definitions.push(Definition {
                    usage: expr.location,
                    target,
                });
            }
        }
        for child in expr.children() {
            self.expr(id, child, params);
        }
    }
}
