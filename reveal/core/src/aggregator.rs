//! List Item Aggregator
//!
//! Fans a variable-length list out to one [`CharacterStreamRenderer`] per
//! item and fans completion back in as a single event.
//!
//! Only the last item carries the completion hook. Items run concurrently
//! (their reveals interleave on the timer queue) and nothing checks that the
//! earlier ones have finished when the last one does. With a uniform cadence
//! a longer earlier item can still be typing after the aggregate completion
//! fires; that ordering gap is a known sharp edge and is kept as is.

use std::time::Duration;

use crate::renderer::{CharacterStreamRenderer, CompletionCallback};
use crate::stage::{RendererId, Stage};
use crate::timer::{TimerHandle, TimerQueue};

/// Renders a list of strings and reports when the last one completes
#[derive(Debug)]
pub struct ListItemAggregator {
    stage: Stage,
    items: Vec<CharacterStreamRenderer>,
    started: bool,
}

impl ListItemAggregator {
    /// Create an empty aggregator for a list stage
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            items: Vec::new(),
            started: false,
        }
    }

    /// Start one renderer per item, in index order
    ///
    /// `on_complete` is attached to the item at index N−1 only. With no
    /// items it fires immediately. A second call before `reset()` is a no-op
    /// returning `false`.
    pub fn start(
        &mut self,
        items: &[String],
        interval: Duration,
        timers: &mut TimerQueue<RendererId>,
        on_complete: CompletionCallback,
    ) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        let Some(last) = items.len().checked_sub(1) else {
            tracing::debug!(stage = %self.stage, "empty list, completing immediately");
            on_complete();
            return true;
        };

        let mut on_complete = Some(on_complete);
        self.items.reserve(items.len());
        for (index, text) in items.iter().enumerate() {
            let mut renderer = CharacterStreamRenderer::new(RendererId::item(self.stage, index));
            let hook = if index == last { on_complete.take() } else { None };
            renderer.start(text.as_str(), interval, timers, hook);
            self.items.push(renderer);
        }
        tracing::debug!(stage = %self.stage, items = items.len(), "list items started");
        true
    }

    /// Route a fired timer to the item it belongs to
    pub fn on_timer(
        &mut self,
        id: RendererId,
        handle: TimerHandle,
        timers: &mut TimerQueue<RendererId>,
    ) -> bool {
        match self.items.get_mut(id.item) {
            Some(renderer) if id.stage == self.stage => renderer.on_timer(handle, timers),
            _ => false,
        }
    }

    /// Stop every item, keeping revealed content
    pub fn stop(&mut self, timers: &mut TimerQueue<RendererId>) {
        for renderer in &mut self.items {
            renderer.stop(timers);
        }
    }

    /// Cancel every item and forget the list
    pub fn reset(&mut self, timers: &mut TimerQueue<RendererId>) {
        for renderer in &mut self.items {
            renderer.reset(timers);
        }
        self.items.clear();
        self.started = false;
    }

    /// Revealed prefix of every item, in index order
    #[must_use]
    pub fn revealed_items(&self) -> Vec<&str> {
        self.items.iter().map(CharacterStreamRenderer::revealed).collect()
    }

    /// Item renderers
    #[must_use]
    pub fn items(&self) -> &[CharacterStreamRenderer] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any item still has a pending timer
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.items.iter().any(CharacterStreamRenderer::is_active)
    }
}
