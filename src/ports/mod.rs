mod sleeper;
mod workflow_host;

pub use sleeper::Sleeper;
pub use workflow_host::{RunQuery, WorkflowHost};
