use vigil_engine::ExecutionEngine;

use super::{EvalContext, EvalTarget, EvaluationResult, EvaluationStrategy};

/// Values of literals, recognized by the engine without running anything.
pub struct LiteralShortcut;

impl<E: ExecutionEngine> EvaluationStrategy<E> for LiteralShortcut {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn evaluate(&self, cx: &mut EvalContext<'_, E>, target: &EvalTarget<'_>) -> EvaluationResult<E::Value> {
        if !cx.config.language_specific_fixes {
            return EvaluationResult::SectionNotReached;
        }
        cx.engine
            .literal_value(target.program.language_id(), target.text())
            .map_or(EvaluationResult::SectionNotReached, EvaluationResult::Done)
    }
}
