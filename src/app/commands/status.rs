//! `workflow-status`: the latest run of a project's workflow.

use tracing::debug;

use crate::app::AppContext;
use crate::domain::run::select_latest_run;
use crate::domain::workflow_file::name_variants;
use crate::domain::{AppError, Project, ProjectCatalog, RepoSlug, RunJob, RunOutcome, WorkflowRun};
use crate::ports::{RunQuery, Sleeper, WorkflowHost};

const LATEST_PAGE: u32 = 5;

/// The most recent run of one workflow.
#[derive(Debug, Clone)]
pub struct LatestRun {
    pub project: String,
    pub repo: RepoSlug,
    /// Workflow file the run was found under.
    pub workflow: String,
    pub run: WorkflowRun,
    pub outcome: RunOutcome,
}

impl LatestRun {
    pub fn run_url(&self) -> String {
        self.run.html_url.clone().unwrap_or_else(|| self.repo.run_url(self.run.id))
    }
}

/// `workflow-status` report.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub latest: LatestRun,
    /// Populated only when jobs were requested.
    pub jobs: Vec<RunJob>,
}

/// Execute `workflow-status`.
pub fn execute<H, S>(
    ctx: &AppContext<H, S>,
    catalog: &ProjectCatalog,
    project: &str,
    workflow: Option<&str>,
    with_jobs: bool,
) -> Result<StatusReport, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
{
    let project = catalog.get(project)?;
    let latest = latest_run(ctx.host(), project, workflow, None)?;
    let jobs = if with_jobs || !latest.outcome.is_healthy() {
        ctx.host().list_jobs(&latest.repo, latest.run.id)?
    } else {
        Vec::new()
    };
    Ok(StatusReport { latest, jobs })
}

/// Find the newest run of the project's workflow, on `branch` when given and
/// on any branch otherwise.
///
/// Both `.yml` and `.yaml` spellings are tried; a variant that is unknown to
/// the host or has no runs falls through to the next one.
pub fn latest_run<H: WorkflowHost>(
    host: &H,
    project: &Project,
    workflow: Option<&str>,
    branch: Option<&str>,
) -> Result<LatestRun, AppError> {
    let configured = workflow.unwrap_or(&project.workflow);

    for candidate in name_variants(configured) {
        let query = RunQuery { workflow: &candidate, branch, event: None, limit: LATEST_PAGE };
        let runs = match host.list_runs(&project.repo, &query) {
            Ok(runs) => runs,
            Err(AppError::NotFound(reason)) => {
                debug!(workflow = %candidate, %reason, "workflow variant not found");
                continue;
            }
            Err(err) => return Err(err),
        };

        if let Some(run) = select_latest_run(&runs, None) {
            return Ok(LatestRun {
                project: project.name.clone(),
                repo: project.repo.clone(),
                outcome: RunOutcome::from_run(run),
                run: run.clone(),
                workflow: candidate,
            });
        }
    }

    Err(AppError::NotFound(match branch {
        Some(branch) => format!("No runs found for {} in {} on {}", configured, project.repo, branch),
        None => format!("No runs found for {} in {}", configured, project.repo),
    }))
}
