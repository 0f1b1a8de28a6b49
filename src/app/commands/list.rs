//! `workflow-list`: workflows of a project's repository and their inputs.

use tracing::warn;

use crate::app::AppContext;
use crate::domain::{AppError, ParameterSpec, ProjectCatalog, RepoSlug, WorkflowSummary};
use crate::ports::{Sleeper, WorkflowHost};

/// One workflow and what it accepts.
#[derive(Debug, Clone)]
pub struct WorkflowEntry {
    pub workflow: WorkflowSummary,
    /// `None` when the definition could not be read.
    pub inputs: Option<Vec<ParameterSpec>>,
}

#[derive(Debug, Clone)]
pub struct WorkflowListing {
    pub project: String,
    pub repo: RepoSlug,
    pub branch: String,
    pub workflows: Vec<WorkflowEntry>,
}

/// Execute `workflow-list`. A repository without workflows is NotFound.
pub fn execute<H, S>(
    ctx: &AppContext<H, S>,
    catalog: &ProjectCatalog,
    project: &str,
) -> Result<WorkflowListing, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
{
    let project = catalog.get(project)?;
    let workflows = ctx.host().list_workflows(&project.repo)?;
    if workflows.is_empty() {
        return Err(AppError::NotFound(format!("No workflows found in {}", project.repo)));
    }

    let workflows = workflows
        .into_iter()
        .map(|workflow| {
            let inputs = match ctx.host().workflow_inputs(
                &project.repo,
                &workflow.path,
                Some(&project.branch),
            ) {
                Ok(inputs) => Some(inputs),
                Err(err) => {
                    warn!(workflow = %workflow.path, "could not read inputs: {}", err);
                    None
                }
            };
            WorkflowEntry { workflow, inputs }
        })
        .collect();

    Ok(WorkflowListing {
        project: project.name.clone(),
        repo: project.repo.clone(),
        branch: project.branch.clone(),
        workflows,
    })
}
