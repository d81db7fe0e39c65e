use crossbeam::channel::{self, Sender};
use tower_lsp::lsp_types::Url;
use vigil_diagnostic::Diagnostic;
use vigil_engine::{
    EngineError, ExecutionEngine, ExecutionEvent, ExecutionHook, HookAction, RuntimeValue, SectionFilter,
    Source,
};
use vigil_text::SourceLocation;

use super::{EvalContext, EvalTarget, EvaluationResult, EvaluationStrategy};
use crate::directive::parse_coverage_directive;
use crate::{engine_error_range, COVERAGE_ANALYSIS};

/// Executes an entry point and stops it the first time the target section
/// produces a value.
///
/// The entry point is one that reached the target in an earlier coverage
/// run, the one named by the coverage directive, or the document itself.
pub struct RunToSection;

/// Hands the first value of the watched section to the waiting request.
struct SectionCapture<V> {
    slot: Sender<V>,
}

impl<V: RuntimeValue, F> ExecutionHook<V, F> for SectionCapture<V> {
    fn on_return(&mut self, _event: &ExecutionEvent<'_, F>, value: &V) -> HookAction {
        // The slot holds one value; later sends can only be duplicates.
        let _ = self.slot.try_send(value.clone());
        HookAction::Stop
    }
}

impl<E: ExecutionEngine> EvaluationStrategy<E> for RunToSection {
    fn name(&self) -> &'static str {
        "run to section"
    }

    fn evaluate(&self, cx: &mut EvalContext<'_, E>, target: &EvalTarget<'_>) -> EvaluationResult<E::Value> {
        let Some(node) = target.program.tree.get(target.node) else {
            return EvaluationResult::SectionNotReached;
        };
        if !node.instrumentable {
            return EvaluationResult::SectionNotReached;
        }
        let location = node.location;
        let language = target.program.language_id();

        let entry = entry_point(cx, target, &location);
        let text = cx.documents.get_or_create(&entry, language).current_text().to_owned();
        let program = match cx.engine.parse(&Source::new(entry.as_str(), language, text)) {
            Ok(program) => program,
            Err(error) => {
                report_failure(cx, &entry, &error);
                return EvaluationResult::SectionNotReached;
            }
        };

        let (slot, captured) = channel::bounded(1);
        let filter = SectionFilter::exact(location)
            .source(target.uri.as_str())
            .source(target.uri.path());
        let outcome = {
            let mut binding = cx.engine.bind_hook(filter, Box::new(SectionCapture { slot }));
            binding.execute(&program)
        };

        match outcome {
            Ok(_) => captured
                .try_recv()
                .map_or(EvaluationResult::SectionNotReached, EvaluationResult::Done),
            Err(error) if error.is_exit() => {
                tracing::debug!(%entry, %error, "entry point exited before the section");
                EvaluationResult::SectionNotReached
            }
            Err(error) => {
                tracing::debug!(%entry, %error, "entry point failed");
                report_failure(cx, &entry, &error);
                EvaluationResult::Error
            }
        }
    }
}

/// Attach `error` to the source it happened in, or to `entry`.
fn report_failure<E: ExecutionEngine>(cx: &mut EvalContext<'_, E>, entry: &Url, error: &EngineError) {
    let failing = error
        .location()
        .and_then(|at| Url::parse(&at.source_name).ok())
        .unwrap_or_else(|| entry.clone());
    cx.sink.add_diagnostic(
        failing.as_str(),
        Diagnostic::error(engine_error_range(error), error.to_string(), COVERAGE_ANALYSIS),
    );
}

fn entry_point<E: ExecutionEngine>(
    cx: &mut EvalContext<'_, E>,
    target: &EvalTarget<'_>,
    location: &SourceLocation,
) -> Url {
    let document = cx.documents.get(target.uri);
    if let Some(recorded) = document.and_then(|d| d.coverage().entry_points(location).first().copied()) {
        return recorded.clone();
    }

    let text = document.map_or(target.program.text(), |d| d.current_text());
    match parse_coverage_directive(text, target.uri, &cx.config.coverage_directive) {
        Ok(Some(entry)) => entry,
        Ok(None) => target.uri.clone(),
        Err(error) => {
            cx.sink.add_diagnostic(
                target.uri.as_str(),
                Diagnostic::error(error.range(), error.reason.clone(), COVERAGE_ANALYSIS),
            );
            target.uri.clone()
        }
    }
}
