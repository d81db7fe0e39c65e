//! Resolving the runtime value of an expression for member completion.
//!
//! Strategies run in a fixed order and the first `Done` wins:
//!
//! 1. [`LiteralShortcut`]: literals need no execution.
//! 2. [`CoverageReplay`]: re-evaluate against frames captured by a coverage run.
//! 3. [`RunToSection`]: execute the entry point until it reaches the section.
//! 4. [`GlobalFallback`]: evaluate the expression on its own.
//!
//! Failures of a strategy never escape the chain.

mod global;
mod literal;
mod replay;
mod run_to_section;

use std::fmt;

use tower_lsp::lsp_types::Url;
use vigil_diagnostic::DiagnosticSink;
use vigil_engine::{ExecutionEngine, NodeId, ParsedProgram};

use crate::config::AnalysisConfig;
use crate::document::DocumentStore;

pub use global::GlobalFallback;
pub use literal::LiteralShortcut;
pub use replay::CoverageReplay;
pub use run_to_section::RunToSection;

/// Outcome of one strategy or of the whole chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluationResult<V> {
    Done(V),
    Error,
    SectionNotReached,
}

impl<V> EvaluationResult<V> {
    pub fn is_done(&self) -> bool {
        matches!(self, EvaluationResult::Done(_))
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            EvaluationResult::Done(value) => Some(value),
            EvaluationResult::Error | EvaluationResult::SectionNotReached => None,
        }
    }
}

impl<V> fmt::Display for EvaluationResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationResult::Done(_) => "done",
            EvaluationResult::Error => "error",
            EvaluationResult::SectionNotReached => "section not reached",
        })
    }
}

/// The expression whose value is wanted.
#[derive(Copy, Clone, Debug)]
pub struct EvalTarget<'a> {
    pub uri: &'a Url,
    pub program: &'a ParsedProgram,
    pub node: NodeId,
}

impl EvalTarget<'_> {
    pub fn text(&self) -> &str {
        self.program.node_text(self.node)
    }
}

/// What strategies may use and touch.
pub struct EvalContext<'a, E: ExecutionEngine> {
    /// The nested engine speculative execution runs on.
    pub engine: &'a mut E,
    pub documents: &'a mut DocumentStore<E::Frame>,
    pub sink: &'a mut dyn DiagnosticSink,
    pub config: &'a AnalysisConfig,
}

pub trait EvaluationStrategy<E: ExecutionEngine>: Send {
    fn name(&self) -> &'static str;

    fn evaluate(&self, cx: &mut EvalContext<'_, E>, target: &EvalTarget<'_>) -> EvaluationResult<E::Value>;
}

pub struct EvaluationChain<E: ExecutionEngine> {
    strategies: Vec<Box<dyn EvaluationStrategy<E>>>,
}

impl<E: ExecutionEngine + 'static> EvaluationChain<E> {
    /// Literal, replay, run-to-section, then global evaluation.
    pub fn standard() -> Self {
        EvaluationChain {
            strategies: vec![
                Box::new(LiteralShortcut),
                Box::new(CoverageReplay),
                Box::new(RunToSection),
                Box::new(GlobalFallback),
            ],
        }
    }
}

impl<E: ExecutionEngine> EvaluationChain<E> {
    pub fn new(strategies: Vec<Box<dyn EvaluationStrategy<E>>>) -> Self {
        EvaluationChain { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the strategies in order until one is done.
    ///
    /// When none is, the result of the last one is returned.
    pub fn evaluate(
        &self,
        cx: &mut EvalContext<'_, E>,
        target: &EvalTarget<'_>,
    ) -> EvaluationResult<E::Value> {
        let mut last = EvaluationResult::SectionNotReached;
        for strategy in &self.strategies {
            let result = strategy.evaluate(cx, target);
            tracing::debug!(strategy = strategy.name(), %result, "evaluation strategy");
            if result.is_done() {
                return result;
            }
            last = result;
        }
        last
    }
}
