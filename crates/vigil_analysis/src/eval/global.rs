use vigil_engine::{ExecutionEngine, ExecutionOutcome, Source};

use super::{EvalContext, EvalTarget, EvaluationResult, EvaluationStrategy};

const GLOBAL_SOURCE: &str = "eval in global scope";

/// Evaluates the target text as a program of its own.
pub struct GlobalFallback;

impl<E: ExecutionEngine> EvaluationStrategy<E> for GlobalFallback {
    fn name(&self) -> &'static str {
        "global"
    }

    fn evaluate(&self, cx: &mut EvalContext<'_, E>, target: &EvalTarget<'_>) -> EvaluationResult<E::Value> {
        let source = Source::new(GLOBAL_SOURCE, target.program.language_id(), target.text());
        let outcome = cx
            .engine
            .parse(&source)
            .and_then(|program| cx.engine.execute(&program));
        match outcome {
            Ok(ExecutionOutcome::Completed(value)) => EvaluationResult::Done(value),
            Ok(ExecutionOutcome::Stopped) => EvaluationResult::Error,
            Err(error) => {
                tracing::trace!(%error, "global evaluation failed");
                EvaluationResult::Error
            }
        }
    }
}
