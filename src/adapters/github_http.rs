//! GitHub REST API client implementation using reqwest.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::workflow_file::{parse_dispatch_inputs, workflow_path};
use crate::domain::{AppError, ParameterSpec, RepoSlug, RunJob, WorkflowRun, WorkflowSummary};
use crate::ports::{RunQuery, WorkflowHost};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const PAGE_SIZE: &str = "100";

/// Connection settings for the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubApiConfig {
    pub api_url: Url,
    pub timeout_secs: u64,
}

impl Default for GitHubApiConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout_secs: 30,
        }
    }
}

impl GitHubApiConfig {
    /// Default configuration with `GITHUB_API_URL` honored when set.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(raw) = std::env::var("GITHUB_API_URL").ok().filter(|v| !v.trim().is_empty()) {
            config.api_url = Url::parse(raw.trim()).map_err(|e| {
                AppError::config_error(format!("Invalid GITHUB_API_URL '{}': {}", raw, e))
            })?;
        }
        Ok(config)
    }
}

/// HTTP client for the GitHub Actions API.
///
/// One request per call; nothing is retried.
#[derive(Clone)]
pub struct HttpWorkflowHost {
    token: String,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpWorkflowHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWorkflowHost")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl HttpWorkflowHost {
    /// Create a new HTTP client with the given token and configuration.
    pub fn new(token: String, config: &GitHubApiConfig) -> Result<Self, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::Auth("GitHub token is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        // A base without a trailing slash would lose its last segment on join.
        let mut api_url = config.api_url.clone();
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self { token, api_url, client })
    }

    /// Create from `GITHUB_TOKEN` (or `GH_TOKEN`) with the given configuration.
    pub fn from_env_with_config(config: &GitHubApiConfig) -> Result<Self, AppError> {
        Self::new(token_from_env()?, config)
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, AppError> {
        let mut url = self.api_url.join(path).map_err(|e| {
            AppError::config_error(format!("Invalid API path '{}': {}", path, e))
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(ACCEPT, "application/vnd.github+json")
            .header(API_VERSION_HEADER, API_VERSION)
            .header(USER_AGENT, concat!("wfd/", env!("CARGO_PKG_VERSION")))
            .bearer_auth(&self.token)
    }

    fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response, AppError> {
        let response = self
            .request(builder)
            .send()
            .map_err(|e| AppError::Network(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().unwrap_or_default();
        Err(classify_failure(status, &headers, &body, context))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, AppError> {
        let url = self.url(path, query)?;
        debug!(%url, "GET");
        let response = self.send(self.client.get(url), context)?;
        let body = response.text().map_err(|e| AppError::Network(format!("{}: {}", context, e)))?;
        serde_json::from_str(&body)
            .map_err(|e| AppError::ParseError { what: context.to_string(), details: e.to_string() })
    }
}

/// Token from `GITHUB_TOKEN`, falling back to `GH_TOKEN`.
pub fn token_from_env() -> Result<String, AppError> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|value| !value.trim().is_empty()))
        .ok_or_else(|| {
            AppError::Auth("GITHUB_TOKEN (or GH_TOKEN) environment variable not set".into())
        })
}

/// Map a non-success response onto the error taxonomy.
fn classify_failure(status: StatusCode, headers: &HeaderMap, body: &str, context: &str) -> AppError {
    let message = extract_error_message(body)
        .or_else(|| status.canonical_reason().map(ToOwned::to_owned))
        .unwrap_or_else(|| "request failed".to_string());
    let quota_exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim() == "0");

    match status {
        StatusCode::UNAUTHORIZED => AppError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimit(message),
        StatusCode::FORBIDDEN if quota_exhausted || message.to_lowercase().contains("rate limit") => {
            AppError::RateLimit(message)
        }
        StatusCode::FORBIDDEN => AppError::Auth(message),
        StatusCode::NOT_FOUND => AppError::NotFound(format!("{}: {}", context, message)),
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("No ref found") => {
            AppError::NotFound(format!("{}: {}", context, message))
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::Validation(format!("{} rejected: {}", context, message))
        }
        _ => AppError::Api { status: status.as_u16(), message: format!("{}: {}", context, message) },
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;
    parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowsPage {
    workflows: Vec<WorkflowSummary>,
}

#[derive(Debug, Deserialize)]
struct JobsPage {
    jobs: Vec<RunJob>,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

impl WorkflowHost for HttpWorkflowHost {
    fn dispatch_workflow(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        branch: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), AppError> {
        let url = self.url(
            &format!("repos/{}/actions/workflows/{}/dispatches", repo, workflow),
            &[],
        )?;
        debug!(%url, branch, inputs = inputs.len(), "POST dispatch");

        let body = DispatchRequest { git_ref: branch, inputs };
        self.send(
            self.client.post(url).json(&body),
            &format!("dispatch of {} on {}@{}", workflow, repo, branch),
        )?;
        Ok(())
    }

    fn list_runs(
        &self,
        repo: &RepoSlug,
        query: &RunQuery<'_>,
    ) -> Result<Vec<WorkflowRun>, AppError> {
        let limit = query.limit.clamp(1, 100).to_string();
        let mut params = vec![("per_page", limit.as_str())];
        if let Some(branch) = query.branch {
            params.push(("branch", branch));
        }
        if let Some(event) = query.event {
            params.push(("event", event));
        }

        let page: RunsPage = self.get_json(
            &format!("repos/{}/actions/workflows/{}/runs", repo, query.workflow),
            &params,
            &format!("runs of {} in {}", query.workflow, repo),
        )?;
        Ok(page.workflow_runs)
    }

    fn get_run(&self, repo: &RepoSlug, run_id: u64) -> Result<WorkflowRun, AppError> {
        self.get_json(
            &format!("repos/{}/actions/runs/{}", repo, run_id),
            &[],
            &format!("run {} in {}", run_id, repo),
        )
    }

    fn list_workflows(&self, repo: &RepoSlug) -> Result<Vec<WorkflowSummary>, AppError> {
        let page: WorkflowsPage = self.get_json(
            &format!("repos/{}/actions/workflows", repo),
            &[("per_page", PAGE_SIZE)],
            &format!("workflows of {}", repo),
        )?;
        Ok(page.workflows)
    }

    fn workflow_inputs(
        &self,
        repo: &RepoSlug,
        workflow: &str,
        branch: Option<&str>,
    ) -> Result<Vec<ParameterSpec>, AppError> {
        let path = workflow_path(workflow);
        let query: Vec<(&str, &str)> = branch.map(|b| vec![("ref", b)]).unwrap_or_default();
        let file: ContentFile = self.get_json(
            &format!("repos/{}/contents/{}", repo, path),
            &query,
            &format!("{} in {}", path, repo),
        )?;

        if file.encoding.as_deref().is_some_and(|encoding| encoding != "base64") {
            return Err(AppError::ParseError {
                what: path,
                details: format!("unsupported encoding {:?}", file.encoding),
            });
        }

        let compact: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| AppError::ParseError { what: path.clone(), details: e.to_string() })?;
        let text = String::from_utf8(bytes)
            .map_err(|e| AppError::ParseError { what: path.clone(), details: e.to_string() })?;

        parse_dispatch_inputs(&text)
    }

    fn list_jobs(&self, repo: &RepoSlug, run_id: u64) -> Result<Vec<RunJob>, AppError> {
        let page: JobsPage = self.get_json(
            &format!("repos/{}/actions/runs/{}/jobs", repo, run_id),
            &[("per_page", PAGE_SIZE)],
            &format!("jobs of run {} in {}", run_id, repo),
        )?;
        Ok(page.jobs)
    }

    fn job_logs(&self, repo: &RepoSlug, job_id: u64) -> Result<String, AppError> {
        // The host answers with a redirect to a short-lived download URL.
        let url = self.url(&format!("repos/{}/actions/jobs/{}/logs", repo, job_id), &[])?;
        debug!(%url, "GET logs");
        let context = format!("logs of job {} in {}", job_id, repo);
        let response = self.send(self.client.get(url), &context)?;
        response.text().map_err(|e| AppError::Network(format!("{}: {}", context, e)))
    }
}
