//! `workflow-status-all`: latest run of every configured project.

use std::io;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::app::AppContext;
use crate::app::commands::status::{LatestRun, latest_run};
use crate::domain::{AppError, ProjectCatalog};
use crate::ports::{Sleeper, WorkflowHost};

/// Status fetch result for one project.
#[derive(Debug)]
pub struct ProjectStatus {
    pub project: String,
    /// Configured branch the runs were filtered on.
    pub branch: String,
    pub result: Result<LatestRun, AppError>,
}

impl ProjectStatus {
    /// Fetched, and succeeded or still running.
    pub fn is_healthy(&self) -> bool {
        self.result.as_ref().is_ok_and(|latest| latest.outcome.is_healthy())
    }
}

/// Aggregate over all projects.
#[derive(Debug)]
pub struct StatusAllReport {
    /// One entry per configured project, in catalog order.
    pub statuses: Vec<ProjectStatus>,
}

impl StatusAllReport {
    pub fn all_healthy(&self) -> bool {
        self.statuses.iter().all(ProjectStatus::is_healthy)
    }

    pub fn failures(&self) -> usize {
        self.statuses.iter().filter(|status| status.result.is_err()).count()
    }
}

/// Execute `workflow-status-all`.
///
/// Only runs on each project's configured branch are considered. Fetches run
/// on a pool of at most `max_parallel` workers. A failed fetch is
/// recorded in its project's slot and never aborts the others.
pub fn execute<H, S>(
    ctx: &AppContext<H, S>,
    catalog: &ProjectCatalog,
) -> Result<StatusAllReport, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
{
    if catalog.is_empty() {
        return Err(AppError::config_error("No projects configured"));
    }

    let workers = catalog.len().min(ctx.settings().max_parallel);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("wfd-status-{index}"))
        .build()
        .map_err(|e| AppError::Io(io::Error::other(e)))?;
    debug!(projects = catalog.len(), workers, "fetching latest runs");

    let host = ctx.host();
    let projects: Vec<_> = catalog.iter().collect();
    let statuses = pool.install(|| {
        projects
            .par_iter()
            .map(|project| {
                let result = latest_run(host, project, None, Some(&project.branch));
                if let Err(err) = &result {
                    warn!(project = %project.name, "status fetch failed: {}", err);
                }
                ProjectStatus {
                    project: project.name.clone(),
                    branch: project.branch.clone(),
                    result,
                }
            })
            .collect()
    });

    Ok(StatusAllReport { statuses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RunConclusion, RunOutcome, RunStatus, Settings, WorkflowRun};
    use crate::testing::{FakeFailure, FakeWorkflowHost, RecordingSleeper, dispatched_run};
    use chrono::Utc;

    const PROJECTS: &str = r#"
projects:
  alpha:
    repo: acme/alpha
    workflow: ci.yml
  beta:
    repo: acme/beta
    workflow: ci.yml
  gamma:
    repo: acme/gamma
    workflow: ci.yml
    branch: develop
"#;

    fn run_on(branch: &str, id: u64, status: RunStatus, conclusion: Option<RunConclusion>) -> WorkflowRun {
        WorkflowRun { head_branch: Some(branch.into()), ..dispatched_run(id, Utc::now(), status, conclusion) }
    }

    fn settings(max_parallel: usize) -> Settings {
        Settings { max_parallel, ..Settings::default() }
    }

    #[test]
    fn returns_one_result_per_project_when_most_fail() {
        let host = FakeWorkflowHost::new()
            .with_runs(
                "acme/alpha",
                "ci.yml",
                vec![dispatched_run(1, Utc::now(), RunStatus::Completed, Some(RunConclusion::Success))],
            )
            .with_list_failure("acme/beta", FakeFailure::Network)
            .with_list_failure("acme/gamma", FakeFailure::RateLimit);
        let ctx = AppContext::new(host, RecordingSleeper::new(), settings(2));
        let catalog = ProjectCatalog::parse_yaml(PROJECTS).unwrap();

        let report = execute(&ctx, &catalog).unwrap();

        assert_eq!(report.statuses.len(), 3);
        assert_eq!(report.failures(), 2);
        assert!(!report.all_healthy());

        let names: Vec<&str> = report.statuses.iter().map(|s| s.project.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(report.statuses[0].result.as_ref().unwrap().outcome, RunOutcome::Succeeded);
        assert!(matches!(report.statuses[1].result, Err(AppError::Network(_))));
        assert!(matches!(report.statuses[2].result, Err(AppError::RateLimit(_))));
        assert_eq!(report.statuses[2].branch, "develop");
    }

    #[test]
    fn every_project_failing_still_reports_all() {
        let host = FakeWorkflowHost::new();
        let ctx = AppContext::new(host, RecordingSleeper::new(), settings(8));
        let catalog = ProjectCatalog::parse_yaml(PROJECTS).unwrap();

        let report = execute(&ctx, &catalog).unwrap();

        assert_eq!(report.statuses.len(), 3);
        assert_eq!(report.failures(), 3);
        assert!(report
            .statuses
            .iter()
            .all(|s| matches!(s.result, Err(AppError::NotFound(_)))));
    }

    #[test]
    fn running_projects_count_as_healthy() {
        let host = [("acme/alpha", "main"), ("acme/beta", "main"), ("acme/gamma", "develop")]
            .into_iter()
            .fold(FakeWorkflowHost::new(), |host, (repo, branch)| {
                host.with_runs(repo, "ci.yml", vec![run_on(branch, 7, RunStatus::InProgress, None)])
            });
        let ctx = AppContext::new(host, RecordingSleeper::new(), settings(1));
        let catalog = ProjectCatalog::parse_yaml(PROJECTS).unwrap();

        let report = execute(&ctx, &catalog).unwrap();
        assert!(report.all_healthy());
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn runs_on_other_branches_are_not_reported() {
        let host = FakeWorkflowHost::new()
            .with_runs("acme/alpha", "ci.yml", vec![run_on("main", 1, RunStatus::Completed, Some(RunConclusion::Success))])
            .with_runs("acme/beta", "ci.yml", vec![run_on("main", 2, RunStatus::Completed, Some(RunConclusion::Success))])
            .with_runs(
                "acme/gamma",
                "ci.yml",
                vec![run_on("main", 3, RunStatus::Completed, Some(RunConclusion::Failure))],
            );
        let ctx = AppContext::new(host, RecordingSleeper::new(), settings(3));
        let catalog = ProjectCatalog::parse_yaml(PROJECTS).unwrap();

        let report = execute(&ctx, &catalog).unwrap();

        let gamma = &report.statuses[2];
        assert_eq!(gamma.branch, "develop");
        assert!(matches!(&gamma.result, Err(AppError::NotFound(message)) if message.contains("on develop")));
        let alpha = report.statuses[0].result.as_ref().unwrap();
        assert_eq!(alpha.run.head_branch.as_deref(), Some("main"));
    }

    #[test]
    fn empty_catalog_is_config_error() {
        let ctx = AppContext::new(FakeWorkflowHost::new(), RecordingSleeper::new(), settings(5));
        let catalog = ProjectCatalog::parse_yaml("projects: {}\n").unwrap();
        assert!(matches!(execute(&ctx, &catalog), Err(AppError::Configuration(_))));
    }
}
