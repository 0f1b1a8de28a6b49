//! Workflow runs, jobs and the poll state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status reported by the workflow host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    /// `waiting`, `requested`, `pending` and anything newer.
    #[serde(other)]
    Pending,
}

/// Final result of a completed run or job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    Skipped,
    Neutral,
    ActionRequired,
    StartupFailure,
    Stale,
    #[serde(other)]
    Unknown,
}

impl RunConclusion {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::Skipped => "skipped",
            Self::Neutral => "neutral",
            Self::ActionRequired => "action_required",
            Self::StartupFailure => "startup_failure",
            Self::Stale => "stale",
            Self::Unknown => "unknown",
        }
    }
}

/// One execution of a workflow. Always re-fetched, never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Poller state for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Queued,
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
    TimedOut,
}

impl RunOutcome {
    /// Classify the host-reported state of a run.
    pub fn from_run(run: &WorkflowRun) -> Self {
        match run.status {
            RunStatus::Queued | RunStatus::Pending => Self::Queued,
            RunStatus::InProgress => Self::InProgress,
            RunStatus::Completed => match run.conclusion {
                Some(RunConclusion::Success) => Self::Succeeded,
                Some(RunConclusion::Cancelled) => Self::Cancelled,
                _ => Self::Failed,
            },
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Queued | Self::InProgress)
    }

    /// Succeeded, or still on its way there.
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Queued | Self::InProgress | Self::Succeeded)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::InProgress => "IN PROGRESS",
            Self::Succeeded => "SUCCESS",
            Self::Failed => "FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::TimedOut => "TIMED OUT",
        }
    }
}

/// Pick the run most likely started by a dispatch.
///
/// Runs created before `not_before` are ignored. Among the rest the newest
/// `created_at` wins and ties go to the highest id.
pub fn select_latest_run(
    runs: &[WorkflowRun],
    not_before: Option<DateTime<Utc>>,
) -> Option<&WorkflowRun> {
    runs.iter()
        .filter(|run| not_before.is_none_or(|cutoff| run.created_at >= cutoff))
        .max_by_key(|run| (run.created_at, run.id))
}

/// A job inside a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunJob {
    pub id: u64,
    pub name: String,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    #[serde(default)]
    pub steps: Vec<JobStep>,
}

impl RunJob {
    /// Finished without succeeding, the jobs `--log-failed` style output covers.
    pub fn is_failed(&self) -> bool {
        matches!(
            self.conclusion,
            Some(RunConclusion::Failure | RunConclusion::TimedOut | RunConclusion::StartupFailure)
        )
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &JobStep> {
        self.steps.iter().filter(|step| step.conclusion == Some(RunConclusion::Failure))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStep {
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
}

/// A workflow as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowSummary {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub state: String,
}

impl WorkflowSummary {
    /// File name without the `.github/workflows/` prefix.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
