//! In-memory generation job lifecycle.
//!
//! A job is created on submission, mutated only by the orchestration loop,
//! and dropped once the caller has its outcome. Nothing here survives a
//! process restart.

use chrono::{DateTime, Utc};

use fotomat_core::types::JobId;

/// Lifecycle states of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted by the service, not yet polled.
    Submitted,
    /// The poller is actively checking for outputs.
    Polling,
    /// An output was retrieved.
    Completed,
    /// The service rejected the submission or upload.
    Failed,
    /// The polling deadline elapsed with no output.
    TimedOut,
}

impl JobStatus {
    /// Whether the job has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }
}

/// One request to the external generation service.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// Identifier issued by the service at submission.
    pub id: JobId,
    pub submitted_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl GenerationJob {
    /// Record a freshly accepted submission.
    pub fn submitted(id: JobId) -> Self {
        Self {
            id,
            submitted_at: Utc::now(),
            status: JobStatus::Submitted,
        }
    }

    pub fn mark_polling(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = JobStatus::Polling;
    }

    pub fn mark_completed(&mut self) {
        self.status = JobStatus::Completed;
    }

    pub fn mark_timed_out(&mut self) {
        self.status = JobStatus::TimedOut;
    }

    pub fn mark_failed(&mut self) {
        self.status = JobStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let mut job = GenerationJob::submitted(JobId("j-1".to_string()));
        assert_eq!(job.status, JobStatus::Submitted);
        assert!(!job.status.is_terminal());

        job.mark_polling();
        assert_eq!(job.status, JobStatus::Polling);

        job.mark_completed();
        assert!(job.status.is_terminal());
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
        assert!(!JobStatus::Submitted.is_terminal());
        assert!(!JobStatus::Polling.is_terminal());
    }
}
