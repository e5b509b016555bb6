//! Stroke session state
//!
//! `StampPhase` is the tool's state machine position, `StrokeSession` the
//! per-gesture data, and `OperationSlot` the single-occupancy guard used for
//! each async operation category (preview updates, finalization).

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use super::snapshot::SourceSnapshot;
use super::surface::ObjectId;
use super::types::ScenePoint;

/// Where the copy-stamp tool is in its stroke lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StampPhase {
    /// No anchor; plain strokes do nothing
    #[default]
    Idle,
    /// Anchor recorded, waiting for a stroke
    SourceSet,
    /// Stroke open, no preview update running
    Stroking,
    /// Stroke open, one preview update in flight
    Previewing,
    /// Final composite of the stroke in flight
    Finalizing,
}

impl StampPhase {
    pub fn has_open_stroke(self) -> bool {
        matches!(self, StampPhase::Stroking | StampPhase::Previewing)
    }
}

/// One paint gesture, from plain pointer-down to path completion
#[derive(Debug)]
pub struct StrokeSession {
    pub id: u64,
    /// Scene point where the stroke began
    pub start: ScenePoint,
    /// Set once finalization has claimed the stroke; no more previews
    pub complete: bool,
    /// The one scratch preview currently on the surface
    pub preview: Option<ObjectId>,
    /// Source pixels shared by every composite of this stroke
    pub snapshot: SourceSnapshot,
}

impl StrokeSession {
    pub fn new(id: u64, start: ScenePoint, snapshot: SourceSnapshot) -> Self {
        Self {
            id,
            start,
            complete: false,
            preview: None,
            snapshot,
        }
    }
}

pub type SlotGuard<'a> = MutexGuard<'a, ()>;

/// At most one operation of a category runs at a time.
///
/// `try_acquire` is for callers that drop work when busy, `acquire` for
/// callers that must run after the in-flight one, `settle` for callers that
/// only need the in-flight one to be over. Waiters are served in FIFO order.
#[derive(Debug)]
pub struct OperationSlot {
    name: &'static str,
    lock: Mutex<()>,
}

impl OperationSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        self.lock.try_lock().ok()
    }

    pub async fn acquire(&self) -> SlotGuard<'_> {
        self.lock.lock().await
    }

    pub async fn settle(&self) {
        let _done = self.lock.lock().await;
    }

    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn open_stroke_phases() {
        assert!(StampPhase::Stroking.has_open_stroke());
        assert!(StampPhase::Previewing.has_open_stroke());
        assert!(!StampPhase::SourceSet.has_open_stroke());
        assert!(!StampPhase::Finalizing.has_open_stroke());
    }

    #[test]
    fn slot_admits_one_holder() {
        let slot = OperationSlot::new("preview");
        let held = slot.try_acquire();
        assert!(held.is_some());
        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        drop(held);
        assert!(!slot.is_busy());
    }

    #[tokio::test]
    async fn settle_waits_for_the_holder() {
        let slot = Arc::new(OperationSlot::new("finalize"));
        let guard = slot.acquire().await;

        let waiter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.settle().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.ok();
        assert!(!slot.is_busy());
    }
}
