use vigil_engine::ExecutionEngine;

use super::{EvalContext, EvalTarget, EvaluationResult, EvaluationStrategy};

/// Evaluates the target inline against frames captured next to it.
///
/// Every sibling of the target (the target included) with coverage is
/// tried, newest frame first. The first evaluation that succeeds wins.
pub struct CoverageReplay;

impl<E: ExecutionEngine> EvaluationStrategy<E> for CoverageReplay {
    fn name(&self) -> &'static str {
        "coverage replay"
    }

    fn evaluate(&self, cx: &mut EvalContext<'_, E>, target: &EvalTarget<'_>) -> EvaluationResult<E::Value> {
        let Some(document) = cx.documents.get(target.uri) else {
            return EvaluationResult::SectionNotReached;
        };
        let coverage = document.coverage();
        if coverage.is_empty() {
            return EvaluationResult::SectionNotReached;
        }

        let tree = &target.program.tree;
        for &sibling in tree.siblings(target.node) {
            let Some(location) = tree.get(sibling).map(|node| node.location) else {
                continue;
            };
            for record in coverage.records_for(&location).iter().rev() {
                for frame in record.frames.iter().rev() {
                    let value = cx
                        .engine
                        .parse_inline(target.text(), target.program, target.node, Some(frame))
                        .and_then(|unit| cx.engine.execute_inline(&unit, Some(frame)));
                    match value {
                        Ok(value) => return EvaluationResult::Done(value),
                        Err(error) => tracing::trace!(%location, %error, "replay failed"),
                    }
                }
            }
        }
        EvaluationResult::SectionNotReached
    }
}
