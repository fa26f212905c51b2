//! Terminal progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use photoferry_core::{UploadReport, UploadResult};
use photoferry_upload::ProgressReporter;
use std::path::Path;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Draws an upload run as an indicatif bar on stderr.
#[derive(Debug, Clone)]
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatifProgress {
    /// A bar with no length yet; the length is set when the run starts.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl ProgressReporter for IndicatifProgress {
    fn on_start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("Uploading");
    }

    fn on_advance(&mut self, completed: usize, path: &Path, result: &UploadResult) {
        self.bar.set_position(completed as u64);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match result {
            Ok(success) => self.bar.set_message(format!("{} ({})", name, success.outcome())),
            Err(e) => self.bar.println(format!("failed: {}: {}", path.display(), e)),
        }
    }

    fn on_finish(&mut self, report: &UploadReport) {
        self.bar.finish_with_message(format!(
            "{} uploaded, {} already present, {} failed",
            report.transferred(),
            report.dedup_hits(),
            report.failed()
        ));
    }
}
