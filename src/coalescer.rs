//! Persistence coalescer: debounced write-out of local element edits.
//!
//! DESIGN
//! ======
//! Every local mutation is merged into a per-element pending patch (last
//! writer wins per field) and pushes a single trailing deadline out to
//! `now + 1000ms`. When the host's `tick` reaches the deadline, or a caller
//! forces a flush (pointer-up, save hotkey, text blur, teardown), each pending
//! element is written with one call carrying the union of its changed fields.
//! A continuous drag therefore costs one write per gesture, not one per
//! pointer-move.
//!
//! ERROR HANDLING
//! ==============
//! Pending entries are removed before the write is attempted and are not
//! restored when the collaborator rejects it. Rejected updates are returned
//! in [`FlushError`] so the host chooses the policy; [`Coalescer::requeue`]
//! exists for hosts that decide to retry.

#[cfg(test)]
#[path = "coalescer_test.rs"]
mod coalescer_test;

use std::time::Duration;

use tracing::{debug, warn};

use crate::consts::FLUSH_DEBOUNCE;
use crate::element::{ElementId, ElementPatch};
use crate::error::{FailedUpdate, FlushError, SinkError};

/// The external "update element" collaborator.
///
/// Implementations typically hand the write to an async task and return
/// immediately; the engine never waits for the backing store.
pub trait Persistence {
    /// Write the accumulated `fields` for element `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the write could not be issued.
    fn update_element(&mut self, id: ElementId, fields: &ElementPatch) -> Result<(), SinkError>;
}

/// Pending element updates plus the trailing debounce deadline.
#[derive(Debug)]
pub struct Coalescer {
    pending: Vec<(ElementId, ElementPatch)>,
    deadline: Option<Duration>,
    delay: Duration,
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new()
    }
}

impl Coalescer {
    #[must_use]
    pub fn new() -> Self {
        Self { pending: Vec::new(), deadline: None, delay: FLUSH_DEBOUNCE }
    }

    /// Merge `patch` into the pending update for `id` and restart the timer.
    pub fn update(&mut self, id: ElementId, patch: ElementPatch, now: Duration) {
        if patch.is_empty() {
            return;
        }
        match self.pending.iter_mut().find(|(pending_id, _)| *pending_id == id) {
            Some((_, existing)) => existing.merge(patch),
            None => self.pending.push((id, patch)),
        }
        self.deadline = Some(now + self.delay);
    }

    /// Accumulated, not yet written fields for `id`.
    #[must_use]
    pub fn pending(&self, id: &ElementId) -> Option<&ElementPatch> {
        self.pending.iter().find(|(pending_id, _)| pending_id == id).map(|(_, p)| p)
    }

    /// Whether any element has unwritten changes (drives a "saving…" indicator).
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of elements with unwritten changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// When the trailing timer fires, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Whether the trailing timer has expired at `now`.
    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Fire the trailing timer if it has expired. Returns `None` when nothing was due.
    pub fn poll<P: Persistence + ?Sized>(
        &mut self,
        now: Duration,
        sink: &mut P,
    ) -> Option<Result<usize, FlushError>> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.flush(sink))
    }

    /// Write every pending update, clear the map and disarm the timer.
    ///
    /// # Errors
    ///
    /// Returns [`FlushError`] listing the updates the collaborator rejected.
    /// Accepted updates are not affected.
    pub fn flush<P: Persistence + ?Sized>(&mut self, sink: &mut P) -> Result<usize, FlushError> {
        self.deadline = None;
        let drained = std::mem::take(&mut self.pending);
        let attempted = drained.len();
        let mut failed = Vec::new();

        for (id, fields) in drained {
            if let Err(e) = sink.update_element(id, &fields) {
                warn!(%id, error = %e, "element update rejected; dropping pending fields");
                failed.push(FailedUpdate { id, fields, reason: e.0 });
            }
        }

        if failed.is_empty() {
            if attempted > 0 {
                debug!(count = attempted, "flushed pending element updates");
            }
            Ok(attempted)
        } else {
            Err(FlushError { attempted, failed })
        }
    }

    /// Flush immediately regardless of the timer.
    ///
    /// # Errors
    ///
    /// Same as [`Coalescer::flush`].
    pub fn force_flush<P: Persistence + ?Sized>(&mut self, sink: &mut P) -> Result<usize, FlushError> {
        if self.has_pending() {
            debug!(count = self.pending.len(), "forcing flush");
        }
        self.flush(sink)
    }

    /// Drop the pending update for one element (e.g. it was deleted).
    pub fn discard(&mut self, id: &ElementId) {
        self.pending.retain(|(pending_id, _)| pending_id != id);
        if self.pending.is_empty() {
            self.deadline = None;
        }
    }

    /// Drop every pending update and disarm the timer.
    ///
    /// Called when the host replaces the element snapshot so stale local edits
    /// are not written over fresh server data.
    pub fn clear(&mut self) {
        if self.has_pending() {
            debug!(count = self.pending.len(), "discarding pending updates for replaced snapshot");
        }
        self.pending.clear();
        self.deadline = None;
    }

    /// Put rejected updates back in the queue and restart the timer.
    ///
    /// Fields edited again since the failed flush take precedence over the
    /// re-queued ones.
    pub fn requeue(&mut self, failed: Vec<FailedUpdate>, now: Duration) {
        for update in failed {
            let mut fields = update.fields;
            if let Some(index) = self.pending.iter().position(|(id, _)| *id == update.id) {
                let (_, newer) = self.pending.remove(index);
                fields.merge(newer);
            }
            self.update(update.id, fields, now);
        }
    }
}
