//! Latest-submission-wins task handling.
//!
//! Submitting new work aborts whatever was still in flight, so only the
//! most recent submission can deliver a result.

use log::{debug, warn};
use std::future::Future;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Default)]
pub struct SubmissionGate {
    in_flight: Option<AbortHandle>,
    submitted: u64,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `work`, aborting the previous submission if it has not
    /// finished.
    pub fn submit<F>(&mut self, work: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                debug!("Cancelling submission {}", self.submitted);
                previous.abort();
            }
        }
        self.submitted += 1;
        let handle = tokio::spawn(work);
        self.in_flight = Some(handle.abort_handle());
        handle
    }

    /// Number of submissions so far.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

/// Wait for a submission. `None` if a newer submission superseded it.
pub async fn outcome<T>(handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(err) if err.is_cancelled() => None,
        Err(err) => {
            warn!("Submission task failed: {}", err);
            None
        }
    }
}
