pub mod fake_workflow_host;
pub mod recording_sleeper;

pub use fake_workflow_host::{
    FakeFailure, FakeWorkflowHost, choice_input, dispatched_run, finished_job, workflow,
};
pub use recording_sleeper::RecordingSleeper;
