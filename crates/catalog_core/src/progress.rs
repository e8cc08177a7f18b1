use std::sync::{Mutex, MutexGuard, PoisonError};

use catalog_logging::catalog_warn;

/// Page (or block) tally shared by all workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            failed: 0,
            total,
        }
    }

    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.finished() == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Completed,
    Failed,
}

/// Rendering collaborator notified after every report. Called from worker
/// tasks at high frequency, so implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn update(&self, state: ProgressState);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn update(&self, _state: ProgressState) {}
}

/// Thread-safe counter over a fixed total. Every `report` is one increment
/// under a short critical section.
#[derive(Debug)]
pub struct ProgressAggregator {
    state: Mutex<ProgressState>,
}

impl ProgressAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(ProgressState::new(total)),
        }
    }

    /// Records one event and returns the state right after it.
    ///
    /// Reports past the total are ignored and logged so that
    /// `completed + failed <= total` holds.
    pub fn report(&self, event: ProgressEvent) -> ProgressState {
        self.report_to(event, &NullProgressSink)
    }

    /// Records one event and hands the new state to `sink` before the next
    /// report can run, so the sink sees states in order. `sink` must not call
    /// back into this aggregator.
    pub fn report_to(&self, event: ProgressEvent, sink: &dyn ProgressSink) -> ProgressState {
        let mut state = self.lock();
        if state.is_terminal() {
            let snapshot = *state;
            drop(state);
            catalog_warn!("progress report {:?} after all {} units finished", event, snapshot.total);
            return snapshot;
        }
        match event {
            ProgressEvent::Completed => state.completed += 1,
            ProgressEvent::Failed => state.failed += 1,
        }
        sink.update(*state);
        *state
    }

    pub fn snapshot(&self) -> ProgressState {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        // Counters stay consistent even if a holder panicked mid-report.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
