//! Execution instrumentation.
//!
//! A hook is attached together with a [`SectionFilter`]; the engine reports
//! every executed section that passes the filter. A hook may ask the engine
//! to stop the current run, which is how a caller captures a value at one
//! exact section without running the rest of the program.

use std::fmt;
use std::ops::RangeInclusive;

use vigil_text::SourceLocation;

use crate::NodeTags;

/// Handle of an attached hook.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HookId(u32);

impl HookId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        HookId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookId({})", self.0)
    }
}

/// What the engine should do after notifying a hook.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HookAction {
    Continue,
    /// Abort the current run. The run reports itself as stopped.
    Stop,
}

/// A section being executed.
#[derive(Debug)]
pub struct ExecutionEvent<'a, F> {
    pub source_name: &'a str,
    pub location: SourceLocation,
    pub tags: NodeTags,
    /// Variables visible at the section.
    pub frame: &'a F,
}

/// Receiver of execution events.
pub trait ExecutionHook<V, F>: Send {
    /// A matching section is about to execute.
    fn on_enter(&mut self, event: &ExecutionEvent<'_, F>) -> HookAction {
        let _ = event;
        HookAction::Continue
    }

    /// A matching section produced `value`.
    fn on_return(&mut self, event: &ExecutionEvent<'_, F>, value: &V) -> HookAction {
        let _ = (event, value);
        HookAction::Continue
    }
}

/// Selects the sections a hook is notified about.
///
/// Every criterion left unset matches anything. Line and column bounds are
/// inclusive and use the 1-based coordinates of [`SourceLocation`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionFilter {
    sources: Vec<String>,
    start_lines: Option<RangeInclusive<u32>>,
    end_lines: Option<RangeInclusive<u32>>,
    start_columns: Option<RangeInclusive<u32>>,
    end_columns: Option<RangeInclusive<u32>>,
    tags: NodeTags,
}

impl SectionFilter {
    /// A filter matching every section.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match exactly the coordinates of `location`.
    pub fn exact(location: SourceLocation) -> Self {
        SectionFilter::any()
            .lines_between(location.start_line, location.end_line)
            .columns_between(location.start_column, location.end_column)
    }

    /// Also accept sections of the source called `name`.
    ///
    /// With several names a section matches if its source has any of them.
    #[must_use]
    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.sources.push(name.into());
        self
    }

    /// Sections starting on `start` and ending on `end`.
    #[must_use]
    pub fn lines_between(mut self, start: u32, end: u32) -> Self {
        self.start_lines = Some(start..=start);
        self.end_lines = Some(end..=end);
        self
    }

    /// Sections lying within lines `range`.
    #[must_use]
    pub fn lines_in(mut self, range: RangeInclusive<u32>) -> Self {
        self.start_lines = Some(range.clone());
        self.end_lines = Some(range);
        self
    }

    /// Sections starting at column `start` and ending at column `end`.
    #[must_use]
    pub fn columns_between(mut self, start: u32, end: u32) -> Self {
        self.start_columns = Some(start..=start);
        self.end_columns = Some(end..=end);
        self
    }

    /// Sections carrying any of `tags`.
    #[must_use]
    pub fn tagged(mut self, tags: NodeTags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn matches(&self, source_name: &str, location: &SourceLocation, tags: NodeTags) -> bool {
        fn within(range: Option<&RangeInclusive<u32>>, value: u32) -> bool {
            range.map_or(true, |range| range.contains(&value))
        }

        (self.sources.is_empty() || self.sources.iter().any(|s| s == source_name))
            && within(self.start_lines.as_ref(), location.start_line)
            && within(self.end_lines.as_ref(), location.end_line)
            && within(self.start_columns.as_ref(), location.start_column)
            && within(self.end_columns.as_ref(), location.end_column)
            && (self.tags.is_empty() || tags.intersects(self.tags))
    }
}

struct Attached<V, F> {
    id: HookId,
    filter: SectionFilter,
    hook: Box<dyn ExecutionHook<V, F>>,
}

/// Attached hooks of one engine, for engines to dispatch events through.
pub struct HookRegistry<V, F> {
    attached: Vec<Attached<V, F>>,
    next_id: u32,
}

impl<V, F> Default for HookRegistry<V, F> {
    fn default() -> Self {
        HookRegistry {
            attached: Vec::new(),
            next_id: 0,
        }
    }
}

impl<V, F> HookRegistry<V, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, filter: SectionFilter, hook: Box<dyn ExecutionHook<V, F>>) -> HookId {
        let id = HookId::new(self.next_id);
        self.next_id += 1;
        tracing::trace!(?id, "hook attached");
        self.attached.push(Attached { id, filter, hook });
        id
    }

    /// Remove a hook. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: HookId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|attached| attached.id != id);
        let removed = self.attached.len() != before;
        tracing::trace!(?id, removed, "hook detached");
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Notify matching hooks that a section is entered.
    ///
    /// All matching hooks are notified even if one of them asks to stop.
    pub fn enter(&mut self, event: &ExecutionEvent<'_, F>) -> HookAction {
        self.dispatch(event, |hook, event| hook.on_enter(event))
    }

    /// Notify matching hooks that a section returned `value`.
    pub fn exit(&mut self, event: &ExecutionEvent<'_, F>, value: &V) -> HookAction {
        self.dispatch(event, |hook, event| hook.on_return(event, value))
    }

    fn dispatch(
        &mut self,
        event: &ExecutionEvent<'_, F>,
        mut notify: impl FnMut(&mut dyn ExecutionHook<V, F>, &ExecutionEvent<'_, F>) -> HookAction,
    ) -> HookAction {
        let mut action = HookAction::Continue;
        for attached in &mut self.attached {
            if attached
                .filter
                .matches(event.source_name, &event.location, event.tags)
                && notify(attached.hook.as_mut(), event) == HookAction::Stop
            {
                action = HookAction::Stop;
            }
        }
        action
    }
}
