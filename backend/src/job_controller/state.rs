//! Tracks background jobs that outlive the request that started them.
//!
//! The scan service hands OCR work to `spawn_blocking` and answers with a job
//! id straight away; clients then poll `GET /api/scan/jobs/{job_id}`.
//!
//! - `JobsState` is cloned into every worker and shared with actix as
//!   `web::Data`.
//! - Workers never write the map directly. They push a `JobUpdate` down the
//!   channel and `start_job_updater` applies it.
//! - Finished jobs stay readable for `FINISHED_RETENTION`, then the next
//!   `register` drops them.

use std::time::{Duration, Instant};
use std::{collections::HashMap, sync::Arc};

use common::jobs::JobStatus;
use log::{debug, warn};
use tokio::sync::{mpsc, RwLock};

const CHANNEL_CAPACITY: usize = 100;

const FINISHED_RETENTION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct JobEntry {
    status: JobStatus,
    updated_at: Instant,
}

impl JobEntry {
    fn new(status: JobStatus, updated_at: Instant) -> Self {
        Self { status, updated_at }
    }

    fn expired(&self, now: Instant) -> bool {
        self.status.is_finished() && now.saturating_duration_since(self.updated_at) >= FINISHED_RETENTION
    }
}

#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest status. Read by the polling endpoint, written
    /// only by the updater task and `register`.
    pub jobs: Arc<RwLock<HashMap<String, JobEntry>>>,

    /// Where workers send progress.
    pub tx: mpsc::Sender<JobUpdate>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// The receiver must be handed to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Creates a `Pending` entry and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut jobs = self.jobs.write().await;
        prune(&mut jobs, now);
        jobs.insert(job_id.clone(), JobEntry::new(JobStatus::Pending, now));
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).map(|entry| entry.status.clone())
    }

    /// For use from blocking worker threads.
    pub fn report_blocking(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if self.tx.blocking_send(update).is_err() {
            warn!("job updater is gone, dropping update for {job_id}");
        }
    }

    pub async fn report(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if self.tx.send(update).await.is_err() {
            warn!("job updater is gone, dropping update for {job_id}");
        }
    }
}

/// Applies `JobUpdate`s until every sender is dropped. Spawned once at
/// startup.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        // A late progress report must not overwrite a final status.
        let finished = jobs.get(&update.job_id).is_some_and(|entry| entry.status.is_finished());
        if !finished {
            jobs.insert(update.job_id, JobEntry::new(update.status, Instant::now()));
        }
    }
}

/// Drops finished jobs older than `FINISHED_RETENTION`. Pending and running
/// jobs are never dropped.
fn prune(jobs: &mut HashMap<String, JobEntry>, now: Instant) {
    let before = jobs.len();
    jobs.retain(|_, entry| !entry.expired(now));
    let dropped = before - jobs.len();
    if dropped > 0 {
        debug!("pruned {dropped} finished jobs");
    }
}
