use tower_lsp::lsp_types::{CompletionItemKind, CompletionList, Url};
use vigil_diagnostic::Diagnostic;
use vigil_engine::{ExecutionEngine, NodeId, ParsedProgram, Scope, Source};
use vigil_text::{zero_based_line_to_one_based_line, Position, PositionMap};

use super::Analyzer;
use crate::completion::{CompletionAssembler, GLOBAL_PRIORITY, LOCAL_PRIORITY};
use crate::error::AnalysisResult;
use crate::eval::{EvalContext, EvalTarget, EvaluationResult};
use crate::locate::{NodeRelation, StructuralLocator};

const NO_COVERAGE_FOR_SECTION: &str = "No coverage information available for this source section.";

/// What the cursor asks to be completed.
struct CompletionRequest<V> {
    locals: Vec<Scope<V>>,
    object: Option<V>,
    is_property: bool,
}

impl<E: ExecutionEngine> Analyzer<E> {
    /// Completion items at `position`.
    ///
    /// After a member-access trigger the value in front of it is resolved
    /// through the evaluation chain and its members are listed. Otherwise
    /// the scopes visible at the cursor are listed, then the globals.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(uri = %uri, line = position.line, character = position.character)
    )]
    pub fn completion(&mut self, uri: &Url, position: Position) -> AnalysisResult<CompletionList> {
        let language = self.language_of(uri)?;
        let request = self.completion_request(uri, &language, position);
        if let Some(document) = self.documents.get_mut(uri) {
            document.set_recovery_text(None);
        }

        let engine = self.contexts.default_engine();
        let mut assembler = CompletionAssembler::new(engine, &language);
        if let Some(object) = &request.object {
            if !assembler.add_members(object) {
                tracing::debug!(%object, "no members");
            }
        }
        assembler.add_scopes(&request.locals, Some(CompletionItemKind::VARIABLE), LOCAL_PRIORITY);
        if !request.is_property {
            assembler.add_scopes(&engine.top_scopes(&language), None, GLOBAL_PRIORITY);
        }
        let list = assembler.finish();

        self.sink.report_collected(None);
        tracing::debug!(items = list.items.len(), "completion");
        Ok(list)
    }

    fn completion_request(
        &mut self,
        uri: &Url,
        language: &str,
        position: Position,
    ) -> CompletionRequest<E::Value> {
        let mut request = CompletionRequest {
            locals: Vec::new(),
            object: None,
            is_property: false,
        };
        let mut character = position.character;
        let Some(program) = self.completion_program(uri, language, position, &mut character, &mut request.is_property)
        else {
            return request;
        };

        let map = PositionMap::new(program.text());
        let Some(mut line) = zero_based_line_to_one_based_line(position.line, &map) else {
            return request;
        };
        // The line after a final newline lies past every statement.
        if position.line == map.line_count() && map.has_trailing_newline() {
            line = position.line + 1;
        }
        let Some(nearest) = StructuralLocator::locate(&program, line, character) else {
            return request;
        };

        if !request.is_property {
            let engine = self.contexts.default_engine();
            request.locals = if nearest.relation == NodeRelation::Before {
                engine.scopes_after(&program, nearest.node)
            } else {
                engine.local_scopes(&program, nearest.node, None)
            };
        } else if nearest.relation == NodeRelation::ContainsEnd {
            match self.evaluate(uri, &program, nearest.node) {
                EvaluationResult::Done(value) => request.object = Some(value),
                EvaluationResult::Error | EvaluationResult::SectionNotReached => {
                    let range = program
                        .tree
                        .get(nearest.node)
                        .map(|node| node.location.to_range())
                        .unwrap_or_default();
                    self.sink.add_diagnostic(
                        uri.as_str(),
                        Diagnostic::info(range, NO_COVERAGE_FOR_SECTION, &self.config.diagnostic_source),
                    );
                }
            }
        }
        request
    }

    /// The program to complete against.
    ///
    /// When the current text does not parse, a recovery text is built,
    /// stored on the document for the rest of the request, and parsed.
    fn completion_program(
        &mut self,
        uri: &Url,
        language: &str,
        position: Position,
        character: &mut u32,
        is_property: &mut bool,
    ) -> Option<ParsedProgram> {
        let document = self.documents.get_mut(uri)?;
        if document.parse_succeeded() {
            return document.parsed().cloned();
        }

        let fix = document.build_recovery_text(
            self.contexts.default_engine(),
            position,
            self.config.language_specific_fixes,
        )?;
        *character = fix.character;
        *is_property = fix.is_property_completion;
        document.set_recovery_text(Some(fix.text.clone()));

        let source = Source::new(uri.as_str(), language, fix.text);
        match self.contexts.with_default(|engine| engine.parse(&source)) {
            Ok(program) => Some(program),
            Err(error) => {
                tracing::debug!(%error, "recovery text does not parse either");
                None
            }
        }
    }

    /// Run the evaluation chain on a nested engine.
    fn evaluate(&mut self, uri: &Url, program: &ParsedProgram, node: NodeId) -> EvaluationResult<E::Value> {
        let Analyzer {
            config,
            contexts,
            documents,
            chain,
            sink,
            ..
        } = self;
        contexts.with_nested(config.cache_nested_context, |engine| {
            let mut cx = EvalContext {
                engine,
                documents,
                sink: sink.as_mut(),
                config,
            };
            chain.evaluate(&mut cx, &EvalTarget { uri, program, node })
        })
    }
}
