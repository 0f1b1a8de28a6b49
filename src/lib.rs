//! wfd: dispatch GitHub Actions workflows and track their runs across configured projects.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    DispatchOptions, DispatchOutcome, FileEntry, FileReaderOptions, LatestRun, LogScope,
    ProjectStatus, RunLogs, StatusAllReport, StatusReport, WorkflowEntry, WorkflowListing,
    Workspace, read_files,
};
pub use domain::{AppError, ProjectCatalog, RunOutcome, Settings};
