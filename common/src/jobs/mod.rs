use serde::{Deserialize, Serialize};

/// Lifecycle of a background job as reported by `GET /api/scan/jobs/{job_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of the job done so far.
    InProgress(u32),
    /// Carries the id of the record the job produced.
    Completed(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }
}
