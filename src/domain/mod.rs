pub mod error;
pub mod params;
pub mod project;
pub mod run;
pub mod settings;
pub mod workflow_file;

pub use error::AppError;
pub use params::{ParamCorrection, ParamValidation, ParameterSpec, UnresolvedParam};
pub use project::{Project, ProjectCatalog, RepoSlug};
pub use run::{
    JobStep, RunConclusion, RunJob, RunOutcome, RunStatus, WorkflowRun, WorkflowSummary,
};
pub use settings::Settings;
