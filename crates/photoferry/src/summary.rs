//! Machine-readable run summary.

use photoferry_core::UploadReport;
use serde::Serialize;

/// One file in a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Input path
    pub path: String,
    /// Whether the file now has a remote reference
    pub success: bool,
    /// Remote reference on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_key: Option<String>,
    /// Failure description otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `--json` output of an upload run.
///
/// ```json
/// {"total": 2, "succeeded": 1, "failed": 1,
///  "results": [{"path": "a.jpg", "success": true, "media_key": "AF1Qip..."},
///              {"path": "b.jpg", "success": false, "error": "..."}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files attempted
    pub total: usize,
    /// Files with a remote reference
    pub succeeded: usize,
    /// Files that failed
    pub failed: usize,
    /// Per-file outcomes in path order
    pub results: Vec<FileSummary>,
}

impl From<&UploadReport> for RunSummary {
    fn from(report: &UploadReport) -> Self {
        let results = report
            .iter()
            .map(|(path, result)| match result {
                Ok(success) => FileSummary {
                    path: path.display().to_string(),
                    success: true,
                    media_key: Some(success.remote_ref().as_str().to_string()),
                    error: None,
                },
                Err(e) => FileSummary {
                    path: path.display().to_string(),
                    success: false,
                    media_key: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        Self {
            total: report.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            results,
        }
    }
}
