//! API Facade for the application.
//!
//! Glues configuration discovery, context creation and command execution
//! together for the CLI and for library callers.

use crate::adapters::{ConfigFiles, GitHubApiConfig, HttpWorkflowHost, ThreadSleeper};
use crate::app::AppContext;
use crate::app::commands::{dispatch, file_reader, list, logs, status, status_all};
use crate::domain::{ProjectCatalog, RepoSlug, RunJob, Settings, WorkflowRun};
use crate::ports::WorkflowHost;

pub use crate::app::commands::dispatch::{DispatchOptions, DispatchOutcome};
pub use crate::app::commands::file_reader::{FileEntry, FileReaderOptions};
pub use crate::app::commands::list::{WorkflowEntry, WorkflowListing};
pub use crate::app::commands::logs::{LogScope, RunLogs};
pub use crate::app::commands::status::{LatestRun, StatusReport};
pub use crate::app::commands::status_all::{ProjectStatus, StatusAllReport};
pub use crate::domain::AppError;

/// Loaded configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub catalog: ProjectCatalog,
    pub settings: Settings,
}

impl Workspace {
    /// Load projects and settings from the standard locations.
    pub fn discover() -> Result<Self, AppError> {
        Self::load(&ConfigFiles::discover())
    }

    pub fn load(files: &ConfigFiles) -> Result<Self, AppError> {
        Ok(Self { catalog: files.load_projects()?, settings: files.load_settings()? })
    }

    /// Fail with the catalog's NotFound before any credentials are needed.
    fn require_project(&self, project: &str) -> Result<(), AppError> {
        self.catalog.get(project).map(|_| ())
    }

    fn context(&self) -> Result<AppContext<HttpWorkflowHost, ThreadSleeper>, AppError> {
        let config = GitHubApiConfig::from_env()?;
        let host = HttpWorkflowHost::from_env_with_config(&config)?;
        Ok(AppContext::new(host, ThreadSleeper, self.settings.clone()))
    }

    /// Trigger a workflow; `on_pending` sees every non-terminal poll tick.
    pub fn dispatch<F>(
        &self,
        options: DispatchOptions,
        on_pending: F,
    ) -> Result<DispatchOutcome, AppError>
    where
        F: FnMut(&WorkflowRun, u32),
    {
        self.require_project(&options.project)?;
        dispatch::execute(&self.context()?, &self.catalog, options, on_pending)
    }

    /// Latest run of a project's workflow, with jobs when requested or failed.
    pub fn status(
        &self,
        project: &str,
        workflow: Option<&str>,
        with_jobs: bool,
    ) -> Result<StatusReport, AppError> {
        self.require_project(project)?;
        status::execute(&self.context()?, &self.catalog, project, workflow, with_jobs)
    }

    /// Workflows of a project's repository with their declared inputs.
    pub fn list(&self, project: &str) -> Result<WorkflowListing, AppError> {
        self.require_project(project)?;
        list::execute(&self.context()?, &self.catalog, project)
    }

    /// Latest run of every configured project.
    pub fn status_all(&self) -> Result<StatusAllReport, AppError> {
        status_all::execute(&self.context()?, &self.catalog)
    }

    /// Jobs of a run, for failure reports.
    pub fn jobs(&self, repo: &RepoSlug, run_id: u64) -> Result<Vec<RunJob>, AppError> {
        self.context()?.host().list_jobs(repo, run_id)
    }

    /// Logs of the jobs in `scope`, truncated for display.
    pub fn logs(&self, repo: &RepoSlug, jobs: &[RunJob], scope: LogScope) -> Result<RunLogs, AppError> {
        logs::collect(self.context()?.host(), repo, jobs, scope)
    }
}

/// List or read local files.
pub fn read_files(options: &FileReaderOptions) -> Result<Vec<FileEntry>, AppError> {
    file_reader::execute(options)
}
