//! Workflow parameters: declared inputs, `KEY=VALUE` parsing, and case correction.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::AppError;

/// A declared `workflow_dispatch` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub input_type: String,
    pub options: Vec<String>,
    pub default: Option<String>,
    pub required: bool,
    pub description: String,
}

/// A value rewritten to the canonical casing of an allowed option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamCorrection {
    pub key: String,
    pub supplied: String,
    pub corrected: String,
}

/// A value that is not allowed and could not be corrected unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedParam {
    pub key: String,
    pub value: String,
    pub allowed: Vec<String>,
}

/// Result of checking supplied parameters against allowed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamValidation {
    /// Parameters to dispatch, corrections applied.
    pub params: BTreeMap<String, String>,
    pub corrections: Vec<ParamCorrection>,
    /// Passed through unchanged; the host will reject them.
    pub unresolved: Vec<UnresolvedParam>,
}

/// Parse one `KEY=VALUE` argument. Only the first `=` separates.
pub fn parse_assignment(raw: &str) -> Result<(String, String), AppError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(AppError::Validation(format!(
            "Invalid parameter '{}': expected KEY=VALUE",
            raw
        ))),
    }
}

/// Start from project defaults and apply each override in order.
pub fn merge_params(
    defaults: &BTreeMap<String, String>,
    overrides: &[String],
) -> Result<BTreeMap<String, String>, AppError> {
    let mut merged = defaults.clone();
    for raw in overrides {
        let (key, value) = parse_assignment(raw)?;
        merged.insert(key, value);
    }
    Ok(merged)
}

/// Allowed-value sets keyed by input name; inputs without options are omitted.
pub fn allowed_values(specs: &[ParameterSpec]) -> BTreeMap<String, Vec<String>> {
    specs
        .iter()
        .filter(|spec| !spec.options.is_empty())
        .map(|spec| (spec.name.clone(), spec.options.clone()))
        .collect()
}

/// Correct values that differ only in case from exactly one allowed value.
///
/// Values already allowed, keys without an allowed set, and values with zero
/// or several case-insensitive matches are passed through unchanged.
pub fn validate_params(
    supplied: &BTreeMap<String, String>,
    allowed: &BTreeMap<String, Vec<String>>,
) -> ParamValidation {
    let mut validation = ParamValidation::default();

    for (key, value) in supplied {
        let Some(options) = allowed.get(key).filter(|options| !options.is_empty()) else {
            validation.params.insert(key.clone(), value.clone());
            continue;
        };

        if options.iter().any(|option| option == value) {
            validation.params.insert(key.clone(), value.clone());
            continue;
        }

        let lowered = value.to_lowercase();
        let mut matches = options.iter().filter(|option| option.to_lowercase() == lowered);
        match (matches.next(), matches.next()) {
            (Some(canonical), None) => {
                validation.corrections.push(ParamCorrection {
                    key: key.clone(),
                    supplied: value.clone(),
                    corrected: canonical.clone(),
                });
                validation.params.insert(key.clone(), canonical.clone());
            }
            _ => {
                validation.unresolved.push(UnresolvedParam {
                    key: key.clone(),
                    value: value.clone(),
                    allowed: options.clone(),
                });
                validation.params.insert(key.clone(), value.clone());
            }
        }
    }

    validation
}
