use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    AppError, ParameterSpec, RepoSlug, RunConclusion, RunJob, RunStatus, WorkflowRun,
    WorkflowSummary,
};
use crate::ports::{RunQuery, WorkflowHost};

/// Error to raise from a scripted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    Auth,
    NotFound,
    RateLimit,
    Network,
    Rejected,
}

impl FakeFailure {
    fn to_error(self, what: &str) -> AppError {
        match self {
            Self::Auth => AppError::Auth(format!("bad credentials for {what}")),
            Self::NotFound => AppError::NotFound(what.to_string()),
            Self::RateLimit => AppError::RateLimit(format!("quota exhausted for {what}")),
            Self::Network => AppError::Network(format!("connection reset for {what}")),
            Self::Rejected => AppError::Validation(format!("{what} rejected")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub repo: String,
    pub workflow: String,
    pub branch: String,
    pub inputs: BTreeMap<String, String>,
}

/// Scriptable in-memory workflow host.
#[derive(Default)]
pub struct FakeWorkflowHost {
    dispatches: Mutex<Vec<DispatchCall>>,
    dispatch_failure: Mutex<Option<FakeFailure>>,
    runs: Mutex<HashMap<(String, String), Vec<WorkflowRun>>>,
    list_failures: Mutex<HashMap<String, FakeFailure>>,
    hidden_listings: Mutex<u32>,
    run_states: Mutex<HashMap<u64, VecDeque<WorkflowRun>>>,
    get_run_calls: Mutex<u32>,
    get_run_delay: Mutex<Option<Duration>>,
    list_run_calls: Mutex<u32>,
    workflows: Mutex<HashMap<String, Vec<WorkflowSummary>>>,
    inputs: Mutex<HashMap<(String, String), Vec<ParameterSpec>>>,
    inputs_failure: Mutex<Option<FakeFailure>>,
    jobs: Mutex<HashMap<u64, Vec<RunJob>>>,
    job_logs: Mutex<HashMap<u64, String>>,
    log_requests: Mutex<Vec<u64>>,
    logs_failure: Mutex<Option<FakeFailure>>,
}

impl FakeWorkflowHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs listed for `repo`/`workflow`, any branch.
    pub fn with_runs(self, repo: &str, workflow: &str, runs: Vec<WorkflowRun>) -> Self {
        self.runs.lock().unwrap().insert((repo.to_string(), workflow.to_string()), runs);
        self
    }

    /// Successive `get_run` answers for a run; the last one repeats.
    pub fn with_run_states(self, states: Vec<WorkflowRun>) -> Self {
        if let Some(first) = states.first() {
            self.run_states.lock().unwrap().insert(first.id, states.into());
        }
        self
    }

    /// Every `get_run` blocks for `delay` before answering.
    pub fn with_get_run_delay(self, delay: Duration) -> Self {
        *self.get_run_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn with_list_failure(self, repo: &str, failure: FakeFailure) -> Self {
        self.list_failures.lock().unwrap().insert(repo.to_string(), failure);
        self
    }

    /// The first `count` run listings come back empty.
    pub fn with_hidden_listings(self, count: u32) -> Self {
        *self.hidden_listings.lock().unwrap() = count;
        self
    }

    pub fn with_dispatch_failure(self, failure: FakeFailure) -> Self {
        *self.dispatch_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn with_workflows(self, repo: &str, workflows: Vec<WorkflowSummary>) -> Self {
        self.workflows.lock().unwrap().insert(repo.to_string(), workflows);
        self
    }

    pub fn with_inputs(self, repo: &str, workflow: &str, specs: Vec<ParameterSpec>) -> Self {
        self.inputs.lock().unwrap().insert((repo.to_string(), workflow.to_string()), specs);
        self
    }

    pub fn with_inputs_failure(self, failure: FakeFailure) -> Self {
        *self.inputs_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn with_jobs(self, run_id: u64, jobs: Vec<RunJob>) -> Self {
        self.jobs.lock().unwrap().insert(run_id, jobs);
        self
    }

    pub fn with_job_logs(self, job_id: u64, text: &str) -> Self {
        self.job_logs.lock().unwrap().insert(job_id, text.to_string());
        self
    }

    pub fn with_logs_failure(self, failure: FakeFailure) -> Self {
        *self.logs_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Job ids whose logs were requested, in order.
    pub fn log_requests(&self) -> Vec<u64> {
        self.log_requests.lock().unwrap().clone()
    }

    pub fn dispatches(&self) -> Vec<DispatchCall> {
        self.dispatches.lock().unwrap().clone()
    }

    pub fn get_run_calls(&self) -> u32 {
        *self.get_run_calls.lock().unwrap()
    }

    pub fn list_run_calls(&self) -> u32 {
        *self.list_run_calls.lock().unwrap()
    }
}

impl WorkflowHost for FakeWorkflowHost {
    fn dispatch_workflow(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), AppError> {
        if let Some(failure) = *self.dispatch_failure.lock().unwrap() {
            return Err(failure.to_error(&format!("dispatch of {workflow}")));
        }
        self.dispatches.lock().unwrap().push(DispatchCall {
            repo: repo.to_string(),
            workflow: workflow.to_string(),
            branch: branch.to_string(),
            inputs: inputs.clone(),
        });
        Ok(())
    }

    fn list_runs(&self, repo: &RepoSlug, query: &RunQuery<'_>) -> Result<Vec<WorkflowRun>, AppError> {
        *self.list_run_calls.lock().unwrap() += 1;
        if let Some(failure) = self.list_failures.lock().unwrap().get(&repo.to_string()) {
            return Err(failure.to_error(&format!("runs of {repo}")));
        }

        let mut hidden = self.hidden_listings.lock().unwrap();
        if *hidden > 0 {
            *hidden -= 1;
            return Ok(Vec::new());
        }

        let mut runs: Vec<WorkflowRun> = self
            .runs
            .lock()
            .unwrap()
            .get(&(repo.to_string(), query.workflow.to_string()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|run| query.branch.is_none_or(|b| run.head_branch.as_deref() == Some(b)))
            .filter(|run| query.event.is_none_or(|e| run.event.as_deref() == Some(e)))
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs.truncate(query.limit as usize);
        Ok(runs)
    }

    fn get_run(&self, repo: &RepoSlug, run_id: u64) -> Result<WorkflowRun, AppError> {
        *self.get_run_calls.lock().unwrap() += 1;
        if let Some(delay) = *self.get_run_delay.lock().unwrap() {
            std::thread::sleep(delay);
        }
        let mut states = self.run_states.lock().unwrap();
        let queue = states
            .get_mut(&run_id)
            .ok_or_else(|| AppError::NotFound(format!("run {run_id} in {repo}")))?;
        if queue.len() > 1 {
            Ok(queue.pop_front().expect("queue is non-empty"))
        } else {
            queue.front().cloned().ok_or_else(|| AppError::NotFound(format!("run {run_id}")))
        }
    }

    fn list_workflows(&self, repo: &RepoSlug) -> Result<Vec<WorkflowSummary>, AppError> {
        self.workflows
            .lock()
            .unwrap()
            .get(&repo.to_string())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("workflows of {repo}")))
    }

    fn workflow_inputs(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        _branch: Option<&str>,
    ) -> Result<Vec<ParameterSpec>, AppError> {
        if let Some(failure) = *self.inputs_failure.lock().unwrap() {
            return Err(failure.to_error(workflow));
        }
        let file = workflow.rsplit('/').next().unwrap_or(workflow);
        Ok(self
            .inputs
            .lock()
            .unwrap()
            .get(&(repo.to_string(), file.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn list_jobs(&self, _repo: &RepoSlug, run_id: u64) -> Result<Vec<RunJob>, AppError> {
        Ok(self.jobs.lock().unwrap().get(&run_id).cloned().unwrap_or_default())
    }

    fn job_logs(&self, repo: &RepoSlug, job_id: u64) -> Result<String, AppError> {
        self.log_requests.lock().unwrap().push(job_id);
        if let Some(failure) = *self.logs_failure.lock().unwrap() {
            return Err(failure.to_error(&format!("logs of job {job_id}")));
        }
        self.job_logs
            .lock()
            .unwrap()
            .get(&job_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("logs of job {job_id} in {repo}")))
    }
}

/// A finished job without steps.
pub fn finished_job(id: u64, name: &str, conclusion: RunConclusion) -> RunJob {
    RunJob {
        id,
        name: name.to_string(),
        status: RunStatus::Completed,
        conclusion: Some(conclusion),
        steps: Vec::new(),
    }
}

/// A run on `main` started by a dispatch.
pub fn dispatched_run(
    id: u64,
    created_at: DateTime<Utc>,
    status: RunStatus,
    conclusion: Option<RunConclusion>,
) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("Deploy".into()),
        status,
        conclusion,
        created_at,
        head_branch: Some("main".into()),
        event: Some("workflow_dispatch".into()),
        path: None,
        html_url: None,
    }
}

pub fn workflow(name: &str, file: &str) -> WorkflowSummary {
    WorkflowSummary {
        id: 1,
        name: name.to_string(),
        path: format!(".github/workflows/{file}"),
        state: "active".to_string(),
    }
}

pub fn choice_input(name: &str, options: &[&str]) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        input_type: "choice".to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        default: None,
        required: true,
        description: format!("{name} selection"),
    }
}
