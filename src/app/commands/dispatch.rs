//! `workflow-dispatch`: trigger a run, identify it, optionally wait for it.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::app::AppContext;
use crate::app::commands::poll::{self, PollReport};
use crate::domain::params::{allowed_values, merge_params, validate_params};
use crate::domain::run::select_latest_run;
use crate::domain::workflow_file::name_variants;
use crate::domain::{
    AppError, ParamCorrection, ProjectCatalog, RepoSlug, RunOutcome, UnresolvedParam, WorkflowRun,
};
use crate::ports::{RunQuery, Sleeper, WorkflowHost};

const DISPATCH_EVENT: &str = "workflow_dispatch";
const DISCOVERY_PAGE: u32 = 10;
const CLOCK_SKEW_SECS: i64 = 10;

/// Options for `workflow-dispatch`.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub project: String,
    pub workflow: Option<String>,
    pub branch: Option<String>,
    /// Raw `KEY=VALUE` overrides, applied in order.
    pub params: Vec<String>,
    pub wait: bool,
}

/// What was dispatched and how it ended.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub project: String,
    pub repo: RepoSlug,
    pub workflow: String,
    pub branch: String,
    pub params: BTreeMap<String, String>,
    pub corrections: Vec<ParamCorrection>,
    pub unresolved: Vec<UnresolvedParam>,
    pub run: WorkflowRun,
    pub outcome: RunOutcome,
    /// Set when the run was waited for.
    pub poll: Option<PollReport>,
}

impl DispatchOutcome {
    pub fn run_url(&self) -> String {
        self.run.html_url.clone().unwrap_or_else(|| self.repo.run_url(self.run.id))
    }

    /// Wall time spent waiting, zero for `--no-wait`.
    pub fn elapsed(&self) -> Duration {
        self.poll.as_ref().map(|poll| poll.elapsed).unwrap_or_default()
    }
}

/// Execute `workflow-dispatch`.
///
/// `on_pending` is forwarded to the poller when waiting.
pub fn execute<H, S, F>(
    ctx: &AppContext<H, S>,
    catalog: &ProjectCatalog,
    options: DispatchOptions,
    on_pending: F,
) -> Result<DispatchOutcome, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
    F: FnMut(&WorkflowRun, u32),
{
    let project = catalog.get(&options.project)?;
    let repo = project.repo.clone();
    let configured = options.workflow.unwrap_or_else(|| project.workflow.clone());
    let branch = options.branch.unwrap_or_else(|| project.branch.clone());
    let params = merge_params(&project.defaults, &options.params)?;

    let workflow = resolve_workflow_file(ctx.host(), &repo, &configured)?;
    if workflow != configured {
        info!(configured = %configured, resolved = %workflow, "resolved workflow file");
    }

    let specs = match ctx.host().workflow_inputs(&repo, &workflow, Some(&branch)) {
        Ok(specs) => specs,
        Err(err) => {
            warn!("Could not read inputs of {}; skipping validation: {}", workflow, err);
            Vec::new()
        }
    };
    let validation = validate_params(&params, &allowed_values(&specs));
    for correction in &validation.corrections {
        warn!(
            "Correcting '{}' to '{}' for '{}'",
            correction.supplied, correction.corrected, correction.key
        );
    }

    let dispatched_at = Utc::now();
    ctx.host().dispatch_workflow(&repo, &workflow, &branch, &validation.params)?;
    info!(%repo, workflow = %workflow, branch = %branch, "dispatched workflow");

    let not_before = dispatched_at - TimeDelta::seconds(CLOCK_SKEW_SECS);
    let run = discover_run(ctx, &repo, &workflow, &branch, not_before)?;
    info!(run_id = run.id, "identified dispatched run");

    let (outcome, poll) = if options.wait {
        let report = poll::wait_for_completion(ctx, &repo, run.id, on_pending)?;
        (report.outcome, Some(report))
    } else {
        (RunOutcome::Queued, None)
    };

    Ok(DispatchOutcome {
        project: project.name.clone(),
        run: poll.as_ref().map(|p| p.run.clone()).unwrap_or(run),
        repo,
        workflow,
        branch,
        params: validation.params,
        corrections: validation.corrections,
        unresolved: validation.unresolved,
        outcome,
        poll,
    })
}

/// Match the configured workflow name against the repository's workflow files,
/// trying the alternate `.yml`/`.yaml` extension second.
pub fn resolve_workflow_file<H: WorkflowHost>(
    host: &H,
    repo: &RepoSlug,
    workflow: &str,
) -> Result<String, AppError> {
    let workflows = host.list_workflows(repo)?;
    let resolved = name_variants(workflow).into_iter().find(|candidate| {
        workflows.iter().any(|wf| wf.path.ends_with(&format!("/{}", candidate)))
    });
    Ok(resolved.unwrap_or_else(|| workflow.to_string()))
}

/// Find the run the dispatch created: the newest dispatch-triggered run on the
/// branch created no earlier than `not_before`.
fn discover_run<H, S>(
    ctx: &AppContext<H, S>,
    repo: &RepoSlug,
    workflow: &str,
    branch: &str,
    not_before: DateTime<Utc>,
) -> Result<WorkflowRun, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
{
    let settings = ctx.settings();
    let query = RunQuery {
        workflow,
        branch: Some(branch),
        event: Some(DISPATCH_EVENT),
        limit: DISCOVERY_PAGE,
    };

    for attempt in 1..=settings.discovery_attempts {
        ctx.sleeper().sleep(settings.dispatch_settle);
        let runs = ctx.host().list_runs(repo, &query)?;
        if let Some(run) = select_latest_run(&runs, Some(not_before)) {
            return Ok(run.clone());
        }
        debug!(attempt, "dispatched run not visible yet");
    }

    Err(AppError::NotFound(format!(
        "Dispatched run of {} on {} did not appear after {} attempts",
        workflow, branch, settings.discovery_attempts
    )))
}
