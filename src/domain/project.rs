//! Project definitions loaded from `projects.yaml`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::domain::AppError;

const DEFAULT_WORKFLOW: &str = "workflow.yaml";
const DEFAULT_BRANCH: &str = "main";

/// Repository slug in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    owner: String,
    name: String,
}

impl RepoSlug {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self { owner: owner.to_string(), name: name.to_string() })
            }
            _ => Err(AppError::config_error(format!(
                "Invalid repository '{}': expected owner/name",
                value
            ))),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Browser URL of a run in this repository.
    pub fn run_url(&self, run_id: u64) -> String {
        format!("https://github.com/{}/actions/runs/{}", self, run_id)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A configured project: where its workflow lives and how to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub repo: RepoSlug,
    pub workflow: String,
    pub branch: String,
    pub defaults: BTreeMap<String, String>,
}

/// All projects, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCatalog {
    projects: BTreeMap<String, Project>,
}

impl ProjectCatalog {
    /// Parse a `projects.yaml` document.
    pub fn parse_yaml(content: &str) -> Result<Self, AppError> {
        let dto: ProjectsFileDto = serde_yaml::from_str(content)
            .map_err(|e| AppError::config_error(format!("Malformed projects file: {}", e)))?;

        let mut projects = BTreeMap::new();
        for (name, entry) in dto.projects {
            let repo = RepoSlug::parse(&entry.repo).map_err(|e| {
                AppError::config_error(format!("Project '{}': {}", name, e))
            })?;
            let mut defaults = BTreeMap::new();
            for (key, value) in entry.defaults {
                let Some(value) = scalar_to_string(&value) else {
                    return Err(AppError::config_error(format!(
                        "Project '{}': default '{}' must be a scalar value",
                        name, key
                    )));
                };
                defaults.insert(key, value);
            }

            projects.insert(
                name.clone(),
                Project {
                    name,
                    repo,
                    workflow: entry.workflow.unwrap_or_else(|| DEFAULT_WORKFLOW.to_string()),
                    branch: entry.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                    defaults,
                },
            );
        }

        Ok(Self { projects })
    }

    /// Look up a project by name; the error lists what is available.
    pub fn get(&self, name: &str) -> Result<&Project, AppError> {
        self.projects.get(name).ok_or_else(|| {
            AppError::NotFound(format!(
                "Project '{}' not found. Available projects: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Stringify a YAML scalar the way a workflow input receives it.
pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ProjectsFileDto {
    #[serde(default)]
    projects: BTreeMap<String, ProjectDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectDto {
    repo: String,
    #[serde(default)]
    workflow: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    defaults: BTreeMap<String, serde_yaml::Value>,
}
