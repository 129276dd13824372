//! Handle for a ranking run executing on a tokio task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use super::error::PipelineError;
use super::types::{RankingResult, RankingStatus};

pub struct RankingJob {
    run_id: Uuid,
    pub(super) status: Arc<RwLock<RankingStatus>>,
    handle: JoinHandle<Result<RankingResult, PipelineError>>,
}

impl std::fmt::Debug for RankingJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingJob")
            .field("run_id", &self.run_id)
            .field("status", &*self.status.read())
            .finish()
    }
}

impl RankingJob {
    pub(crate) fn new(
        run_id: Uuid,
        status: Arc<RwLock<RankingStatus>>,
        handle: JoinHandle<Result<RankingResult, PipelineError>>,
    ) -> Self {
        Self {
            run_id,
            status,
            handle,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn status(&self) -> RankingStatus {
        self.status.read().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Aborts the run. No result is published for an aborted run; a run that has
    /// already finished keeps its outcome.
    pub fn cancel(&self) {
        let mut status = self.status.write();
        if status.is_terminal() || self.handle.is_finished() {
            return;
        }
        *status = RankingStatus::Cancelled;
        self.handle.abort();
    }

    pub async fn wait(self) -> Result<RankingResult, PipelineError> {
        let joined = self.handle.await;
        settle(&self.status, joined)
    }

    /// Waits up to `timeout`, cancelling the run when it elapses.
    pub async fn wait_with_timeout(
        mut self,
        timeout: Duration,
    ) -> Result<RankingResult, PipelineError> {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(joined) => settle(&self.status, joined),
            Err(_) => {
                self.handle.abort();
                set_if_running(&self.status, RankingStatus::TimedOut);
                warn!(run_id = %self.run_id, timeout_ms = timeout.as_millis() as u64, "Ranking run timed out");
                Err(PipelineError::TimedOut {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

fn set_if_running(status: &RwLock<RankingStatus>, next: RankingStatus) {
    let mut status = status.write();
    if !status.is_terminal() {
        *status = next;
    }
}

/// A run marked cancelled publishes nothing, even if its task got to the end.
fn settle(
    status: &RwLock<RankingStatus>,
    joined: Result<Result<RankingResult, PipelineError>, tokio::task::JoinError>,
) -> Result<RankingResult, PipelineError> {
    if *status.read() == RankingStatus::Cancelled {
        return Err(PipelineError::Cancelled);
    }
    flatten(joined)
}

fn flatten(
    joined: Result<Result<RankingResult, PipelineError>, tokio::task::JoinError>,
) -> Result<RankingResult, PipelineError> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(PipelineError::Cancelled),
        Err(e) => Err(PipelineError::TaskFailed {
            reason: e.to_string(),
        }),
    }
}

/// Publishes the final status of a run from inside its task.
pub(crate) fn record_outcome(
    status: &RwLock<RankingStatus>,
    outcome: &Result<RankingResult, PipelineError>,
) {
    let next = match outcome {
        Ok(_) => RankingStatus::Complete,
        Err(e) => RankingStatus::Failed {
            reason: e.to_string(),
        },
    };
    set_if_running(status, next);
}
