//! Discovery and loading of `projects.yaml` and `config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{AppError, ProjectCatalog, Settings};

pub const PROJECTS_FILE: &str = "projects.yaml";
pub const SETTINGS_FILE: &str = "config.yaml";
const PROJECTS_ENV: &str = "WFD_PROJECTS";
const SETTINGS_ENV: &str = "WFD_CONFIG";

/// Where configuration files are looked up, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ConfigFiles {
    projects_override: Option<PathBuf>,
    settings_override: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
}

impl ConfigFiles {
    /// Env overrides, then the working directory, `/app`, and `~/.config/agents`.
    pub fn discover() -> Self {
        let mut search_dirs = vec![PathBuf::from("."), PathBuf::from("/app")];
        if let Some(home) = dirs::home_dir() {
            search_dirs.push(home.join(".config").join("agents"));
        }

        Self {
            projects_override: env_path(PROJECTS_ENV),
            settings_override: env_path(SETTINGS_ENV),
            search_dirs,
        }
    }

    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs, ..Self::default() }
    }

    /// Load the project catalog. A missing file is an error.
    pub fn load_projects(&self) -> Result<ProjectCatalog, AppError> {
        let path = self.locate(self.projects_override.as_deref(), PROJECTS_FILE)?.ok_or_else(|| {
            AppError::config_error(format!(
                "{} not found (searched {}; set {} to override)",
                PROJECTS_FILE,
                self.describe_search(PROJECTS_FILE),
                PROJECTS_ENV
            ))
        })?;

        debug!(path = %path.display(), "loading projects");
        ProjectCatalog::parse_yaml(&read(&path)?)
            .map_err(|e| AppError::config_error(format!("{}: {}", path.display(), e)))
    }

    /// Load settings. A missing file yields defaults.
    pub fn load_settings(&self) -> Result<Settings, AppError> {
        let Some(path) = self.locate(self.settings_override.as_deref(), SETTINGS_FILE)? else {
            debug!("no {} found, using defaults", SETTINGS_FILE);
            return Ok(Settings::default());
        };

        debug!(path = %path.display(), "loading settings");
        Settings::parse_yaml(&read(&path)?)
            .map_err(|e| AppError::config_error(format!("{}: {}", path.display(), e)))
    }

    fn locate(&self, explicit: Option<&Path>, file: &str) -> Result<Option<PathBuf>, AppError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(AppError::config_error(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        Ok(self.search_dirs.iter().map(|dir| dir.join(file)).find(|path| path.is_file()))
    }

    fn describe_search(&self, file: &str) -> String {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(file).display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).filter(|value| !value.is_empty()).map(PathBuf::from)
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|e| {
        AppError::config_error(format!("Failed to read {}: {}", path.display(), e))
    })
}
