//! Polling and dispatch settings loaded from `config.yaml`.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::AppError;

/// Settings for the `workflow` section of the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Overall poll budget; `None` waits forever.
    pub timeout: Option<Duration>,
    pub show_progress: bool,
    /// Upper bound on concurrent status fetches.
    pub max_parallel: usize,
    /// Delay between dispatching and looking for the new run.
    pub dispatch_settle: Duration,
    pub discovery_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            timeout: Some(Duration::from_secs(3600)),
            show_progress: true,
            max_parallel: 5,
            dispatch_settle: Duration::from_secs(3),
            discovery_attempts: 5,
        }
    }
}

impl Settings {
    /// Parse a settings document. Absent keys keep their defaults.
    pub fn parse_yaml(content: &str) -> Result<Self, AppError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let dto: SettingsFileDto = serde_yaml::from_str(content)
            .map_err(|e| AppError::config_error(format!("Malformed settings file: {}", e)))?;
        let section = dto.workflow.unwrap_or_default();
        let defaults = Self::default();

        let poll_interval = section.poll_interval.unwrap_or(defaults.poll_interval.as_secs());
        if poll_interval == 0 {
            return Err(AppError::config_error("workflow.poll_interval must be greater than zero"));
        }

        let max_parallel = section.max_parallel.unwrap_or(defaults.max_parallel);
        if max_parallel == 0 {
            return Err(AppError::config_error("workflow.max_parallel must be greater than zero"));
        }

        let discovery_attempts =
            section.discovery_attempts.unwrap_or(defaults.discovery_attempts);
        if discovery_attempts == 0 {
            return Err(AppError::config_error(
                "workflow.discovery_attempts must be greater than zero",
            ));
        }

        let timeout = match section.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.timeout,
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval),
            timeout,
            show_progress: section.show_progress.unwrap_or(defaults.show_progress),
            max_parallel,
            dispatch_settle: section
                .dispatch_settle
                .map(Duration::from_secs)
                .unwrap_or(defaults.dispatch_settle),
            discovery_attempts,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFileDto {
    #[serde(default)]
    workflow: Option<WorkflowSectionDto>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowSectionDto {
    poll_interval: Option<u64>,
    timeout: Option<u64>,
    show_progress: Option<bool>,
    max_parallel: Option<usize>,
    dispatch_settle: Option<u64>,
    discovery_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(Settings::parse_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::parse_yaml("other: 1\n").unwrap(), Settings::default());
    }

    #[test]
    fn overrides_apply_per_key() {
        let settings = Settings::parse_yaml(
            "workflow:\n  poll_interval: 10\n  timeout: 120\n  show_progress: false\n",
        )
        .unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert_eq!(settings.timeout, Some(Duration::from_secs(120)));
        assert!(!settings.show_progress);
        assert_eq!(settings.max_parallel, 5);
    }

    #[test]
    fn zero_timeout_means_unlimited() {
        let settings = Settings::parse_yaml("workflow:\n  timeout: 0\n").unwrap();
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Settings::parse_yaml("workflow:\n  poll_interval: 0\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn wrong_type_is_configuration_error() {
        assert!(matches!(
            Settings::parse_yaml("workflow:\n  timeout: soon\n"),
            Err(AppError::Configuration(_))
        ));
    }
}
