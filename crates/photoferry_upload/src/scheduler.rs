//! Bounded worker pool over the uploader.

use crate::{NoProgress, ProgressReporter, Uploader};
use photoferry_core::{UploadReport, UploadResult, UploadTask};
use photoferry_error::{CancelledError, ConfigError, InternalError, PhotoferryResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

/// Runs upload tasks on a fixed number of concurrent workers.
///
/// One failing file never stops the others: the report holds exactly one
/// result per task. Results do not depend on the worker count, only their
/// completion order does.
#[derive(Debug, Clone)]
pub struct UploadScheduler {
    uploader: Uploader,
    threads: usize,
    cancel: Option<watch::Receiver<bool>>,
}

impl UploadScheduler {
    /// Schedule with the worker count from the uploader's options.
    pub fn new(uploader: Uploader) -> Self {
        let threads = *uploader.options().threads();
        Self {
            uploader,
            threads,
            cancel: None,
        }
    }

    /// Override the worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Stop starting tasks once `cancel` turns true.
    ///
    /// Tasks that have not started resolve to a cancellation error. Running
    /// tasks finish or abandon before their commit.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.uploader = self.uploader.with_cancellation(cancel.clone());
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run every task without progress reporting.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the worker count is zero. Per-file
    /// failures are in the report, not here.
    pub async fn run(&self, tasks: Vec<UploadTask>) -> PhotoferryResult<UploadReport> {
        self.run_with_progress(tasks, NoProgress).await
    }

    /// Run every task, reporting each completion to `reporter`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the worker count is zero.
    pub async fn run_with_progress<P>(
        &self,
        tasks: Vec<UploadTask>,
        mut reporter: P,
    ) -> PhotoferryResult<UploadReport>
    where
        P: ProgressReporter + 'static,
    {
        if self.threads == 0 {
            return Err(ConfigError::new("threads must be at least 1").into());
        }

        let run_id = Uuid::new_v4();
        let total = tasks.len();
        let span = tracing::info_span!("upload_run", run_id = %run_id, total, threads = self.threads);

        async move {
            info!("Starting upload run");
            let (events, mut received) = mpsc::unbounded_channel::<(PathBuf, UploadResult)>();

            let consumer = tokio::spawn(async move {
                reporter.on_start(total);
                let mut report = UploadReport::new(run_id);
                let mut completed = 0;
                while let Some((path, result)) = received.recv().await {
                    completed += 1;
                    reporter.on_advance(completed, &path, &result);
                    report.insert(path, result);
                }
                reporter.on_finish(&report);
                report
            });

            let semaphore = Arc::new(Semaphore::new(self.threads));
            let finished = Arc::new(AtomicUsize::new(0));
            let mut handles = Vec::with_capacity(total);

            for task in tasks {
                let path = task.path().to_path_buf();
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let _ = events.send((path, Err(InternalError::new(e.to_string()).into())));
                        continue;
                    }
                };

                if self.is_cancelled() {
                    debug!(file = %path.display(), "Not started, run cancelled");
                    let error = CancelledError::new(format!("{} not started", path.display()));
                    let _ = events.send((path, Err(error.into())));
                    continue;
                }

                let uploader = self.uploader.clone();
                let events = events.clone();
                let finished = Arc::clone(&finished);
                let worker_path = path.clone();
                let handle = tokio::spawn(
                    async move {
                        let _permit = permit;
                        let result = uploader.upload(&task).await;
                        if let Err(e) = &result {
                            warn!(file = %worker_path.display(), class = %e.class(), error = %e, "Upload failed");
                        }
                        let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(done, total, "Task finished");
                        let _ = events.send((worker_path, result));
                    }
                    .in_current_span(),
                );
                handles.push((path, handle));
            }

            for (path, handle) in handles {
                if let Err(e) = handle.await {
                    warn!(file = %path.display(), error = %e, "Upload task panicked");
                    let error = InternalError::new(format!("upload task for {} failed: {}", path.display(), e));
                    let _ = events.send((path, Err(error.into())));
                }
            }
            drop(events);

            let report = consumer
                .await
                .map_err(|e| InternalError::new(format!("progress consumer failed: {}", e)))?;
            info!(
                succeeded = report.succeeded(),
                failed = report.failed(),
                dedup_hits = report.dedup_hits(),
                transferred = report.transferred(),
                "Upload run finished"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }
}
