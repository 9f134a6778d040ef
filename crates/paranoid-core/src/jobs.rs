//! In-memory job registry for long-running commands (`summarize`, `index`).
//!
//! Status is process-local and lost on restart — jobs do not resume
//! automatically, matching the concurrency model's job-registry note.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

pub struct JobRegistry {
    next_id: AtomicU64,
    statuses: DashMap<JobId, JobStatus>,
}

impl JobRegistry {
    pub fn new() -> Self {
        JobRegistry {
            next_id: AtomicU64::new(1),
            statuses: DashMap::new(),
        }
    }

    pub fn start(&self) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.statuses.insert(id, JobStatus::Running);
        id
    }

    pub fn finish(&self, id: JobId, status: JobStatus) {
        self.statuses.insert(id, status);
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.statuses.get(&id).map(|r| *r.value())
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_start_running_and_can_be_finished() {
        let registry = JobRegistry::new();
        let id = registry.start();
        assert_eq!(registry.status(id), Some(JobStatus::Running));
        registry.finish(id, JobStatus::Completed);
        assert_eq!(registry.status(id), Some(JobStatus::Completed));
    }

    #[test]
    fn unknown_job_id_has_no_status() {
        let registry = JobRegistry::new();
        assert_eq!(registry.status(JobId(999)), None);
    }
}
