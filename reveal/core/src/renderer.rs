//! Character Stream Renderer
//!
//! Reveals a string one code point at a time on the timer queue.
//!
//! # Lifecycle
//!
//! ```text
//!            start()                 last code point
//!   Idle ─────────────► Active ──────────────────────► Complete
//!    ▲                   │  │                            │
//!    │      reset()      │  │ stop()                     │
//!    └───────────────────┘  └──► Stopped (keeps text)    │
//!    └────────────────────────────────────────────────────┘
//!                              reset()
//! ```
//!
//! While active exactly one timer is pending. Its handle is kept so that
//! `stop()`/`reset()` can cancel it, and so a tick carrying any other handle
//! is ignored.

use std::sync::Arc;
use std::time::Duration;

use crate::stage::RendererId;
use crate::timer::{TimerHandle, TimerQueue};

/// Called once when the final code point has been revealed
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Snapshot of a renderer's progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderState {
    /// Full text being revealed
    pub source_text: Arc<str>,
    /// Number of code points revealed so far
    pub revealed_prefix_len: usize,
    /// Whether a reveal timer is pending
    pub is_active: bool,
}

/// Reveals one string at a fixed per-character interval
pub struct CharacterStreamRenderer {
    /// Identity used as the timer payload
    id: RendererId,
    /// Text being revealed
    source: Arc<str>,
    /// Byte offset of the revealed prefix
    revealed_bytes: usize,
    /// Code points in the revealed prefix
    revealed_chars: usize,
    /// Delay between reveals
    interval: Duration,
    /// Pending reveal timer, present exactly while active
    pending: Option<TimerHandle>,
    /// Completion hook, consumed on completion
    on_complete: Option<CompletionCallback>,
    /// Whether the whole source has been revealed by a run
    complete: bool,
}

impl CharacterStreamRenderer {
    /// Create an idle renderer
    #[must_use]
    pub fn new(id: RendererId) -> Self {
        Self {
            id,
            source: Arc::from(""),
            revealed_bytes: 0,
            revealed_chars: 0,
            interval: Duration::ZERO,
            pending: None,
            on_complete: None,
            complete: false,
        }
    }

    /// Renderer identity
    #[must_use]
    pub fn id(&self) -> RendererId {
        self.id
    }

    /// Begin revealing `text`, one code point every `interval`
    ///
    /// A no-op returning `false` while already active. Starting after
    /// `stop()` resumes from the revealed prefix. Reusing the renderer for
    /// different text requires `reset()` first; nothing here watches for the
    /// text changing.
    ///
    /// The revealed prefix must stay a prefix of the source, on a code point
    /// boundary. Starting without `reset()` on text that breaks that drops
    /// the stale progress rather than slicing the new text mid-character.
    ///
    /// Empty text completes immediately without scheduling a timer.
    pub fn start(
        &mut self,
        text: impl Into<Arc<str>>,
        interval: Duration,
        timers: &mut TimerQueue<RendererId>,
        on_complete: Option<CompletionCallback>,
    ) -> bool {
        if self.is_active() {
            tracing::trace!(renderer = ?self.id, "start ignored, already active");
            return false;
        }

        let text = text.into();
        // Keep the revealed offset inside the new source
        if !text.starts_with(self.revealed()) {
            self.revealed_bytes = 0;
            self.revealed_chars = 0;
        }
        self.source = text;
        self.interval = interval;
        self.on_complete = on_complete;
        self.complete = false;

        if self.revealed_bytes >= self.source.len() {
            self.finish();
        } else {
            self.pending = Some(timers.schedule(interval, self.id));
        }
        true
    }

    /// Handle a fired reveal timer
    ///
    /// Reveals the next code point and either schedules the following one
    /// or completes. Returns `false` for a handle that is not the pending one.
    pub fn on_timer(&mut self, handle: TimerHandle, timers: &mut TimerQueue<RendererId>) -> bool {
        if self.pending != Some(handle) {
            tracing::trace!(renderer = ?self.id, "ignoring stale reveal timer");
            return false;
        }
        self.pending = None;

        if let Some(c) = self.source[self.revealed_bytes..].chars().next() {
            self.revealed_bytes += c.len_utf8();
            self.revealed_chars += 1;
        }

        if self.revealed_bytes >= self.source.len() {
            self.finish();
        } else {
            self.pending = Some(timers.schedule(self.interval, self.id));
        }
        true
    }

    /// Halt the pending timer, keeping revealed content
    pub fn stop(&mut self, timers: &mut TimerQueue<RendererId>) {
        if let Some(handle) = self.pending.take() {
            timers.cancel(handle);
        }
    }

    /// Cancel any pending timer and clear all progress
    ///
    /// The completion hook is dropped without being called.
    pub fn reset(&mut self, timers: &mut TimerQueue<RendererId>) {
        self.stop(timers);
        self.source = Arc::from("");
        self.revealed_bytes = 0;
        self.revealed_chars = 0;
        self.on_complete = None;
        self.complete = false;
    }

    /// Revealed prefix of the source text
    #[must_use]
    pub fn revealed(&self) -> &str {
        &self.source[..self.revealed_bytes]
    }

    /// Full source text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Code points revealed so far
    #[must_use]
    pub fn revealed_len(&self) -> usize {
        self.revealed_chars
    }

    /// Whether a reveal timer is pending
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the last run revealed the whole text
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Progress snapshot
    #[must_use]
    pub fn state(&self) -> RenderState {
        RenderState {
            source_text: Arc::clone(&self.source),
            revealed_prefix_len: self.revealed_chars,
            is_active: self.is_active(),
        }
    }

    fn finish(&mut self) {
        self.pending = None;
        self.complete = true;
        tracing::trace!(renderer = ?self.id, chars = self.revealed_chars, "reveal complete");
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl std::fmt::Debug for CharacterStreamRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterStreamRenderer")
            .field("id", &self.id)
            .field("revealed", &self.revealed())
            .field("active", &self.is_active())
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}
