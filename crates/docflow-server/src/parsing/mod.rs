//! Background extraction pipeline.
//!
//! Uploads never parse on the request path. The upload command submits a
//! [`ParseJob`] to a [`ParseQueue`]; a single dispatch loop owned by the
//! server ([`ParseWorker`]) receives jobs and spawns one task per job,
//! so each in-flight file has exactly one extraction task and queries
//! are never blocked behind parsing.
//!
//! Job failures are terminal status, not propagated errors: every
//! outcome lands in the `files` row and the progress tracker, and
//! callers observe it by polling.

mod worker;

pub use worker::ParseWorker;

use thiserror::Error;
use tokio::sync::mpsc;

/// One unit of background work: extract content for a stored blob.
#[derive(Debug, Clone)]
pub struct ParseJob {
    pub file_id: String,
    pub storage_key: String,
    pub filename: String,
}

#[derive(Debug, Error)]
#[error("Parse queue is closed")]
pub struct SubmitError;

/// Submission handle for the parse pipeline. Cheap to clone.
#[derive(Clone)]
pub struct ParseQueue {
    tx: mpsc::UnboundedSender<ParseJob>,
}

impl ParseQueue {
    /// Create a queue and the receiver half the worker consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ParseJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hand a job to the background worker. Fails only if the worker
    /// has shut down.
    pub fn submit(&self, job: ParseJob) -> Result<(), SubmitError> {
        self.tx.send(job).map_err(|_| SubmitError)
    }
}
