//! Run progress reporting.

use photoferry_core::{UploadReport, UploadResult};
use std::path::Path;

/// Observer for an upload run.
///
/// All calls come from one consumer task, in order, so implementations need
/// no synchronization of their own. `completed` increases by exactly one
/// per call to [`on_advance`](ProgressReporter::on_advance).
pub trait ProgressReporter: Send {
    /// The run is starting with `total` tasks.
    fn on_start(&mut self, _total: usize) {}

    /// One task finished, successfully or not.
    fn on_advance(&mut self, _completed: usize, _path: &Path, _result: &UploadResult) {}

    /// Every task has finished.
    fn on_finish(&mut self, _report: &UploadReport) {}
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

impl<P: ProgressReporter + ?Sized> ProgressReporter for Box<P> {
    fn on_start(&mut self, total: usize) {
        (**self).on_start(total);
    }

    fn on_advance(&mut self, completed: usize, path: &Path, result: &UploadResult) {
        (**self).on_advance(completed, path, result);
    }

    fn on_finish(&mut self, report: &UploadReport) {
        (**self).on_finish(report);
    }
}
