use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::model::FeedbackToken;

/// Cancellation handle for a scheduled feedback event.
#[derive(Debug, Clone, Default)]
pub struct ScheduleHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScheduleHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Schedules delivery of a feedback-elapsed event after the display pause.
///
/// Implementations must honor cancellation: a cancelled handle's token is
/// never delivered. The session additionally ignores tokens from a
/// superseded round, so a scheduler that races its cancellation check
/// stays harmless.
pub trait FeedbackScheduler: Send + Sync {
    fn schedule_after(&self, delay: Duration, token: FeedbackToken) -> ScheduleHandle;
}

/// Test scheduler: queues entries and fires them on demand.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, FeedbackToken, ScheduleHandle)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver the oldest pending token, skipping cancelled entries.
    pub fn fire_next(&self) -> Option<FeedbackToken> {
        let mut pending = self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while !pending.is_empty() {
            let (_, token, handle) = pending.remove(0);
            if !handle.is_cancelled() {
                return Some(token);
            }
        }
        None
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl FeedbackScheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, token: FeedbackToken) -> ScheduleHandle {
        let handle = ScheduleHandle::new();
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((delay, token, handle.clone()));
        handle
    }
}
