//! Reading `workflow_dispatch` inputs out of a workflow definition.

use serde_yaml::Value;

use crate::domain::project::scalar_to_string;
use crate::domain::{AppError, ParameterSpec};

/// Extract the declared `on.workflow_dispatch.inputs` of a workflow YAML document.
///
/// Workflows without a dispatch trigger, or with a bare `workflow_dispatch:`,
/// declare no inputs.
pub fn parse_dispatch_inputs(content: &str) -> Result<Vec<ParameterSpec>, AppError> {
    let document: Value = serde_yaml::from_str(content).map_err(|e| AppError::ParseError {
        what: "workflow definition".into(),
        details: e.to_string(),
    })?;

    // YAML 1.1 loaders turn a bare `on` key into `true`.
    let trigger = document.get("on").or_else(|| {
        document.as_mapping().and_then(|mapping| mapping.get(Value::Bool(true)))
    });

    let Some(inputs) = trigger
        .and_then(|on| on.get("workflow_dispatch"))
        .and_then(|dispatch| dispatch.get("inputs"))
        .and_then(Value::as_mapping)
    else {
        return Ok(Vec::new());
    };

    let mut specs = Vec::with_capacity(inputs.len());
    for (name, config) in inputs {
        let (Some(name), Some(config)) = (name.as_str(), config.as_mapping()) else {
            continue;
        };

        let options = config
            .get("options")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(scalar_to_string).collect())
            .unwrap_or_default();

        specs.push(ParameterSpec {
            name: name.to_string(),
            input_type: config
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("string")
                .to_string(),
            options,
            default: config.get("default").and_then(scalar_to_string),
            required: config.get("required").and_then(Value::as_bool).unwrap_or(false),
            description: config
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    Ok(specs)
}

/// Candidate file names for a workflow: as configured first, then the other extension.
pub fn name_variants(workflow: &str) -> Vec<String> {
    let base = workflow.strip_suffix(".yml").or_else(|| workflow.strip_suffix(".yaml"));
    match base {
        Some(base) if workflow.ends_with(".yml") => {
            vec![format!("{base}.yml"), format!("{base}.yaml")]
        }
        Some(base) => vec![format!("{base}.yaml"), format!("{base}.yml")],
        None => vec![format!("{workflow}.yml"), format!("{workflow}.yaml")],
    }
}

/// Repository path of a workflow file.
pub fn workflow_path(workflow: &str) -> String {
    if workflow.starts_with(".github/") {
        workflow.to_string()
    } else {
        format!(".github/workflows/{}", workflow)
    }
}
