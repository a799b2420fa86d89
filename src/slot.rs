use crate::snapshot::HistogramSource;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Outcome of one bounded wait on the slot.
pub enum SlotWake {
    /// A snapshot is pending. The slot stays occupied until [`SubmissionSlot::clear`].
    Pending(Arc<dyn HistogramSource>),
    Shutdown,
    Idle,
}

struct SlotState {
    pending: Option<Arc<dyn HistogramSource>>,
    quit: bool,
}

/// Single-capacity mailbox shared by producers and the upload worker.
///
/// The pending snapshot and the shutdown flag live under one lock, paired with
/// one condition variable for wake-ups.
pub struct SubmissionSlot {
    state: Mutex<SlotState>,
    cv: Condvar,
}

impl Default for SubmissionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                pending: None,
                quit: false,
            }),
            cv: Condvar::new(),
        }
    }

    /// Stores `snapshot` if the slot is empty and wakes the worker. Returns
    /// `false` without touching the slot when a snapshot is already pending.
    pub fn try_submit(&self, snapshot: Arc<dyn HistogramSource>) -> bool {
        let mut guard = self.lock();
        if guard.pending.is_some() {
            return false;
        }
        guard.pending = Some(snapshot);
        self.cv.notify_one();
        true
    }

    pub fn is_occupied(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Waits up to `tick` for a submission or a shutdown request.
    ///
    /// Shutdown wins over a pending snapshot, so nothing is drained once stop
    /// has been requested.
    pub fn wait(&self, tick: Duration) -> SlotWake {
        let mut guard = self.lock();
        if !guard.quit && guard.pending.is_none() {
            guard = match self.cv.wait_timeout(guard, tick) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        if guard.quit {
            return SlotWake::Shutdown;
        }
        match &guard.pending {
            Some(snapshot) => SlotWake::Pending(Arc::clone(snapshot)),
            None => SlotWake::Idle,
        }
    }

    /// Releases the pending snapshot, re-opening the slot.
    pub fn clear(&self) {
        self.lock().pending = None;
    }

    /// Empties the slot and lowers the shutdown flag ahead of a new worker.
    pub(crate) fn reset(&self) {
        let mut guard = self.lock();
        guard.pending = None;
        guard.quit = false;
    }

    pub(crate) fn request_shutdown(&self) {
        let mut guard = self.lock();
        guard.quit = true;
        self.cv.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
