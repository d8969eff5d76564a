//! Lifetime-bound background downloads.
//!
//! A [`DownloadScope`] stands in for the screen that requested the downloads:
//! every task it launches is owned by its `JoinSet`, capped by a semaphore,
//! and aborted when the scope is shut down or dropped. Each task's result
//! comes back to the owner as a [`DownloadOutcome`]; nothing is swallowed.

use crate::error::FetchError;
use crate::fetcher::{DownloadResult, ImageFetcher};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};

pub type TaskId = u64;

#[derive(Debug)]
pub struct DownloadOutcome {
    pub id: TaskId,
    pub url: String,
    pub result: DownloadResult,
}

/// What `shutdown` found: tasks it cut short, and tasks that had already
/// finished but were not yet collected.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    pub cancelled: usize,
    pub finished: Vec<DownloadOutcome>,
}

pub struct DownloadScope {
    fetcher: Arc<ImageFetcher>,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<DownloadOutcome>,
    launched: HashMap<task::Id, (TaskId, String)>,
    next_id: TaskId,
}

impl DownloadScope {
    /// `max_concurrent` of 0 is treated as 1.
    pub fn new(fetcher: Arc<ImageFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: JoinSet::new(),
            launched: HashMap::new(),
            next_id: 1,
        }
    }

    /// Start downloading `url` in the background. Must be called from within a tokio runtime.
    pub fn launch(&mut self, url: impl Into<String>) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;

        let url = url.into();
        let fetcher = Arc::clone(&self.fetcher);
        let semaphore = Arc::clone(&self.semaphore);

        tracing::debug!("[task {}] queued {}", id, url);
        let task_url = url.clone();
        self.track(id, url, async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => fetcher.fetch(&task_url).await,
                Err(_) => Err(FetchError::Cancelled),
            };
            DownloadOutcome {
                id,
                url: task_url,
                result,
            }
        });
        id
    }

    /// Spawn `task` and remember which download it is, so a panic can still
    /// be reported against its id and URL.
    fn track<F>(&mut self, id: TaskId, url: String, task: F)
    where
        F: Future<Output = DownloadOutcome> + Send + 'static,
    {
        let handle = self.tasks.spawn(task);
        self.launched.insert(handle.id(), (id, url));
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Collect one joined task. `None` for tasks that were cancelled.
    fn settle(
        &mut self,
        joined: Result<(task::Id, DownloadOutcome), JoinError>,
    ) -> Option<DownloadOutcome> {
        match joined {
            Ok((task_id, outcome)) => {
                self.launched.remove(&task_id);
                Some(outcome)
            }
            Err(e) => {
                let (id, url) = self.launched.remove(&e.id())?;
                if e.is_cancelled() {
                    return None;
                }
                tracing::error!("[task {}] download of {} panicked: {}", id, url, e);
                Some(DownloadOutcome {
                    id,
                    url,
                    result: Err(FetchError::Panicked),
                })
            }
        }
    }

    /// Wait for the next task to finish. `None` once every task has been collected.
    pub async fn next_outcome(&mut self) -> Option<DownloadOutcome> {
        loop {
            let joined = self.tasks.join_next_with_id().await?;
            if let Some(outcome) = self.settle(joined) {
                return Some(outcome);
            }
        }
    }

    /// Drain every outstanding task in completion order.
    pub async fn join_all(&mut self) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Cancel everything still running. Tasks that already finished are
    /// returned rather than dropped.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        self.tasks.abort_all();
        let mut report = ShutdownReport::default();
        while let Some(joined) = self.tasks.join_next_with_id().await {
            match self.settle(joined) {
                Some(outcome) => report.finished.push(outcome),
                None => report.cancelled += 1,
            }
        }
        if report.cancelled > 0 {
            tracing::debug!("cancelled {} outstanding downloads", report.cancelled);
        }
        report
    }
}
