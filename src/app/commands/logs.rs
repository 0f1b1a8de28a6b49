//! Job logs for run reports.

use tracing::{debug, warn};

use crate::domain::{AppError, RepoSlug, RunJob};
use crate::ports::WorkflowHost;

/// Characters of log text kept before truncating.
pub const LOG_LIMIT: usize = 15_000;
pub const TRUNCATION_NOTICE: &str = "\n\n... (truncated, see GitHub for full logs)";

/// Which jobs to fetch logs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogScope {
    /// Jobs that finished without succeeding.
    Failed,
    All,
}

impl LogScope {
    pub fn title(self) -> &'static str {
        match self {
            Self::Failed => "Failed job logs",
            Self::All => "Full workflow logs",
        }
    }

    fn includes(self, job: &RunJob) -> bool {
        self == Self::All || job.is_failed()
    }
}

/// Logs of the selected jobs, one section per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogs {
    pub scope: LogScope,
    pub text: String,
    pub truncated: bool,
}

impl RunLogs {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fetch and join the logs of `jobs` in `scope`, cut at [`LOG_LIMIT`] characters.
///
/// A job whose log is gone is skipped; any other failure is returned.
pub fn collect<H: WorkflowHost>(
    host: &H,
    repo: &RepoSlug,
    jobs: &[RunJob],
    scope: LogScope,
) -> Result<RunLogs, AppError> {
    let mut text = String::new();

    for job in jobs.iter().filter(|job| scope.includes(job)) {
        let log = match host.job_logs(repo, job.id) {
            Ok(log) => log,
            Err(AppError::NotFound(reason)) => {
                warn!(job_id = job.id, "log unavailable: {}", reason);
                continue;
            }
            Err(err) => return Err(err),
        };
        debug!(job_id = job.id, bytes = log.len(), "fetched job log");

        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!("── {} ──\n", job.name));
        text.push_str(log.trim_end());
        text.push('\n');

        if text.chars().count() > LOG_LIMIT {
            break;
        }
    }

    let (text, truncated) = truncate(&text, LOG_LIMIT);
    Ok(RunLogs { scope, text, truncated })
}

/// Keep the first `limit` characters, appending [`TRUNCATION_NOTICE`] when cut.
pub fn truncate(text: &str, limit: usize) -> (String, bool) {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => (format!("{}{}", &text[..cut], TRUNCATION_NOTICE), true),
        None => (text.to_string(), false),
    }
}
