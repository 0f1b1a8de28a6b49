//! Workflow-hosting API port definition.

use std::collections::BTreeMap;

use crate::domain::{AppError, ParameterSpec, RepoSlug, RunJob, WorkflowRun, WorkflowSummary};

/// Filter for listing the runs of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery<'a> {
    pub workflow: &'a str,
    pub branch: Option<&'a str>,
    /// Only runs started by this event, e.g. `workflow_dispatch`.
    pub event: Option<&'a str>,
    pub limit: u32,
}

/// Port for workflow-hosting operations.
///
/// Implementations must be shareable across the status-all workers.
pub trait WorkflowHost: Sync {
    /// Start a run of `workflow` on `branch`. The host returns no run id.
    fn dispatch_workflow(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), AppError>;

    /// Runs matching the query, newest first.
    fn list_runs(&self, repo: &RepoSlug, query: &RunQuery<'_>)
    -> Result<Vec<WorkflowRun>, AppError>;

    /// Current state of a single run.
    fn get_run(&self, repo: &RepoSlug, run_id: u64) -> Result<WorkflowRun, AppError>;

    /// Workflows defined in the repository.
    fn list_workflows(&self, repo: &RepoSlug) -> Result<Vec<WorkflowSummary>, AppError>;

    /// Declared `workflow_dispatch` inputs of the workflow file at `branch`.
    fn workflow_inputs(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        branch: Option<&str>,
    ) -> Result<Vec<ParameterSpec>, AppError>;

    /// Jobs of a run with their steps.
    fn list_jobs(&self, repo: &RepoSlug, run_id: u64) -> Result<Vec<RunJob>, AppError>;

    /// Plain-text log of one job.
    fn job_logs(&self, repo: &RepoSlug, job_id: u64) -> Result<String, AppError>;
}
