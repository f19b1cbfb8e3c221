//! In-memory checkpoint store.
//!
//! Survives re-delivery within one process. Tests use it to simulate a
//! crash by sharing the store between two runner instances.
//!
//! The store holds at most `max_runs` runs. Starting a run beyond that
//! evicts the run that started earliest.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::RunId;
use crate::domain::workflow::Checkpoint;
use crate::ports::{CheckpointError, CheckpointStore};

/// Runs kept when no limit is given.
pub const DEFAULT_MAX_RUNS: usize = 1024;

#[derive(Debug, Default)]
struct Runs {
    steps: HashMap<RunId, HashMap<String, Checkpoint>>,
    /// Run ids, oldest first.
    order: VecDeque<RunId>,
}

impl Runs {
    fn remove(&mut self, run_id: &RunId) -> Option<HashMap<String, Checkpoint>> {
        let removed = self.steps.remove(run_id)?;
        self.order.retain(|id| id != run_id);
        Some(removed)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryCheckpointStore {
    runs: Arc<RwLock<Runs>>,
    max_runs: usize,
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::with_max_runs(DEFAULT_MAX_RUNS)
    }
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `max_runs` runs (at least one).
    pub fn with_max_runs(max_runs: usize) -> Self {
        Self {
            runs: Arc::new(RwLock::new(Runs::default())),
            max_runs: max_runs.max(1),
        }
    }

    /// Number of checkpoints recorded for a run.
    pub async fn checkpoint_count(&self, run_id: &RunId) -> usize {
        self.runs.read().await.steps.get(run_id).map_or(0, HashMap::len)
    }

    /// Number of runs with at least one checkpoint.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.steps.len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, run_id: &RunId, step: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self
            .runs
            .read()
            .await
            .steps
            .get(run_id)
            .and_then(|steps| steps.get(step))
            .cloned())
    }

    async fn save(&self, run_id: &RunId, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let mut runs = self.runs.write().await;

        if !runs.steps.contains_key(run_id) {
            while runs.steps.len() >= self.max_runs {
                let Some(oldest) = runs.order.pop_front() else {
                    break;
                };
                runs.steps.remove(&oldest);
                tracing::debug!(run_id = %oldest, "Evicted checkpoints of oldest run");
            }
            runs.order.push_back(run_id.clone());
        }

        runs.steps
            .entry(run_id.clone())
            .or_default()
            .insert(checkpoint.step.clone(), checkpoint.clone());
        Ok(())
    }

    async fn clear_run(&self, run_id: &RunId) -> Result<usize, CheckpointError> {
        Ok(self
            .runs
            .write()
            .await
            .remove(run_id)
            .map_or(0, |steps| steps.len()))
    }
}
