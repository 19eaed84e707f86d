//! Background generation jobs and the poll protocol.
//!
//! Small galaxies generate synchronously in the request path; anything past
//! the complexity threshold is dispatched to a worker thread that publishes
//! progress through the [`ProgressStore`]. Workers go through
//! [`SharedStore`], which locks per store operation, so runs over different
//! galaxies interleave and new requests never wait on a running job.
//! Pollers drive a small state machine:
//!
//! - no record, galaxy known: create a record, dispatch, answer "started";
//! - record generating: answer with a snapshot, never re-dispatch;
//! - record complete or error: answer with the terminal snapshot and delete
//!   the record;
//! - no record after expiry: answer "absent", which callers surface as an
//!   unknown failure.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{error, info};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::orchestrator::{Orchestrator, PipelineReport};
use crate::progress::{ProgressRecord, ProgressStatus, ProgressStore};
use crate::store::{SharedStore, Store};

/// Tuning for the job layer.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Progress record TTL; a worker that dies leaves a record that expires.
    pub ttl: Duration,
    /// `width × height × total stars` above which requests go async.
    pub complexity_threshold: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            // Small tier (500 × 500 × 250 = 62.5M) stays synchronous.
            complexity_threshold: 100_000_000,
        }
    }
}

/// Outcome of a generation request.
pub enum RequestOutcome {
    /// Ran synchronously; the report is final.
    Completed(Box<PipelineReport>),
    /// Dispatched to a worker; poll with the galaxy id.
    Started { galaxy_id: u64 },
}

/// Outcome of a poll.
#[derive(Debug, Clone)]
pub enum PollStatus {
    /// No record: never started, or the record expired.
    Absent,
    /// This poll created the record and dispatched the job.
    Started(ProgressRecord),
    Generating(ProgressRecord),
    Complete(ProgressRecord),
    Error(ProgressRecord),
}

/// Dispatch and poll generation runs against a shared store.
pub struct GenerationJobs<S: Store + 'static> {
    store: Arc<Mutex<S>>,
    progress: Arc<dyn ProgressStore>,
    orchestrator: Arc<Orchestrator>,
    job_config: JobConfig,
}

impl<S: Store + 'static> GenerationJobs<S> {
    pub fn new(
        store: Arc<Mutex<S>>,
        progress: Arc<dyn ProgressStore>,
        orchestrator: Arc<Orchestrator>,
        job_config: JobConfig,
    ) -> Self {
        Self {
            store,
            progress,
            orchestrator,
            job_config,
        }
    }

    /// Estimated work for a config.
    fn complexity(config: &GenerationConfig) -> u64 {
        let (width, height) = config.dimensions();
        (width * height) as u64 * config.tier.total_stars() as u64
    }

    /// Generate now or dispatch, by complexity.
    pub fn request(
        &self,
        config: GenerationConfig,
        force_async: bool,
    ) -> Result<RequestOutcome, GenerationError> {
        let go_async = force_async || Self::complexity(&config) > self.job_config.complexity_threshold;

        // The store is locked per operation, never across a run, so other
        // galaxies keep generating while this one does.
        let mut store = SharedStore::new(Arc::clone(&self.store));

        if !go_async {
            let report = self.orchestrator.generate(&mut store, &config)?;
            return Ok(RequestOutcome::Completed(Box::new(report)));
        }

        let galaxy_id = self.orchestrator.create_galaxy(&mut store, &config);
        self.progress
            .put(galaxy_id, ProgressRecord::started(), self.job_config.ttl);
        self.dispatch(galaxy_id, config);
        Ok(RequestOutcome::Started { galaxy_id })
    }

    /// Read-only poll step of the state machine.
    pub fn poll(&self, galaxy_id: u64) -> PollStatus {
        match self.progress.get(galaxy_id) {
            None => PollStatus::Absent,
            Some(record) => match record.status {
                ProgressStatus::Generating => PollStatus::Generating(record),
                ProgressStatus::Complete => {
                    self.progress.delete(galaxy_id);
                    PollStatus::Complete(record)
                }
                ProgressStatus::Error => {
                    self.progress.delete(galaxy_id);
                    PollStatus::Error(record)
                }
            },
        }
    }

    /// Poll, dispatching a run for `galaxy_id` when no record exists yet.
    pub fn poll_or_dispatch(
        &self,
        galaxy_id: u64,
        config: &GenerationConfig,
    ) -> Result<PollStatus, GenerationError> {
        match self.poll(galaxy_id) {
            PollStatus::Absent => {
                SharedStore::new(Arc::clone(&self.store))
                    .galaxy(galaxy_id)
                    .ok_or(GenerationError::UnknownGalaxy(galaxy_id))?;
                let record = ProgressRecord::started();
                self.progress
                    .put(galaxy_id, record.clone(), self.job_config.ttl);
                self.dispatch(galaxy_id, config.clone());
                Ok(PollStatus::Started(record))
            }
            status => Ok(status),
        }
    }

    fn dispatch(&self, galaxy_id: u64, config: GenerationConfig) {
        let store = Arc::clone(&self.store);
        let progress = Arc::clone(&self.progress);
        let orchestrator = Arc::clone(&self.orchestrator);
        let ttl = self.job_config.ttl;
        let started_at = crate::tables::now_ms();

        thread::spawn(move || {
            info!("galaxy {galaxy_id}: background generation dispatched");
            let mut store = SharedStore::new(store);
            let progress_ref = Arc::clone(&progress);
            let mut observer = move |index: usize, total: usize, name: &str| {
                let percent = (index * 100 / total.max(1)) as u8;
                progress_ref.put(
                    galaxy_id,
                    ProgressRecord {
                        status: ProgressStatus::Generating,
                        progress: format!("Running {name}"),
                        percent,
                        started_at,
                        message: None,
                    },
                    ttl,
                );
            };
            let result = orchestrator.run(&mut store, galaxy_id, &config, &mut observer);

            let record = match result {
                Ok(report) if report.success => ProgressRecord {
                    status: ProgressStatus::Complete,
                    progress: "Generation complete".to_string(),
                    percent: 100,
                    started_at,
                    message: None,
                },
                Ok(report) => {
                    let stage = report.failed_stage.unwrap_or_default();
                    error!("galaxy {galaxy_id}: generation failed at '{stage}'");
                    ProgressRecord {
                        status: ProgressStatus::Error,
                        progress: format!("Failed during {stage}"),
                        percent: 0,
                        started_at,
                        message: Some(format!("stage '{stage}' failed")),
                    }
                }
                Err(e) => {
                    error!("galaxy {galaxy_id}: generation error: {e}");
                    ProgressRecord {
                        status: ProgressStatus::Error,
                        progress: "Generation error".to_string(),
                        percent: 0,
                        started_at,
                        message: Some(e.to_string()),
                    }
                }
            };
            progress.put(galaxy_id, record, ttl);
        });
    }
}
