//! Completion items from scopes and from member lists.
//!
//! Scopes arrive innermost first. The first scope to bind a name wins and
//! later bindings of the same name are dropped, across every scope added
//! to the assembler. Items sort by `"{priority}.{depth:04}.{name}"`.

use rustc_hash::FxHashSet;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, CompletionList, Documentation};
use vigil_engine::{ExecutionEngine, RuntimeValue, Scope};

/// Sort priority of local scopes.
pub const LOCAL_PRIORITY: u32 = 1;
/// Sort priority of global scopes.
pub const GLOBAL_PRIORITY: u32 = 2;

pub struct CompletionAssembler<'e, E: ExecutionEngine> {
    engine: &'e E,
    language_id: &'e str,
    items: Vec<CompletionItem>,
    seen: FxHashSet<String>,
}

impl<'e, E: ExecutionEngine> CompletionAssembler<'e, E> {
    pub fn new(engine: &'e E, language_id: &'e str) -> Self {
        CompletionAssembler {
            engine,
            language_id,
            items: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Add the variables of `scopes`. Unknown kinds fall back to `default_kind`.
    pub fn add_scopes(
        &mut self,
        scopes: &[Scope<E::Value>],
        default_kind: Option<CompletionItemKind>,
        priority: u32,
    ) {
        let mut depth = 0u32;
        for scope in scopes.iter().filter(|scope| !scope.is_empty()) {
            depth += 1;
            for (name, value) in &scope.variables {
                if !self.seen.insert(name.clone()) {
                    continue;
                }
                let item = CompletionItem {
                    label: name.clone(),
                    kind: value.as_ref().and_then(kind_of).or(default_kind),
                    detail: value.as_ref().map(|value| self.detail(value)),
                    documentation: Some(Documentation::String(format!("in {}", scope.name))),
                    sort_text: Some(format!("{priority}.{depth:04}.{name}")),
                    ..CompletionItem::default()
                };
                self.items.push(item);
            }
        }
    }

    /// Add the members of `object`. Returns `false` if it has none.
    pub fn add_members(&mut self, object: &E::Value) -> bool {
        if !object.has_properties() {
            return false;
        }
        let properties = object.properties();
        if properties.is_empty() {
            return false;
        }
        let documentation = self
            .engine
            .meta_object(self.language_id, object)
            .map(|meta| Documentation::String(format!("of meta object: {meta}")));
        for (name, value) in properties {
            let item = CompletionItem {
                label: name,
                kind: Some(kind_of(&value).unwrap_or(CompletionItemKind::PROPERTY)),
                detail: Some(self.detail(&value)),
                documentation: documentation.clone(),
                ..CompletionItem::default()
            };
            self.items.push(item);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The assembled list, ordered by sort text. Items without one keep
    /// their insertion order ahead of the rest.
    pub fn finish(mut self) -> CompletionList {
        self.items.sort_by(|a, b| a.sort_text.cmp(&b.sort_text));
        CompletionList {
            is_incomplete: false,
            items: self.items,
        }
    }

    fn detail(&self, value: &E::Value) -> String {
        match self.engine.meta_object(self.language_id, value) {
            Some(meta) => format!("{meta} -> {value}"),
            None => value.to_string(),
        }
    }
}

fn kind_of<V: RuntimeValue>(value: &V) -> Option<CompletionItemKind> {
    if value.is_instantiable() {
        Some(CompletionItemKind::CLASS)
    } else if value.is_executable() {
        Some(CompletionItemKind::FUNCTION)
    } else {
        None
    }
}
