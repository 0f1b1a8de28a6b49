use crate::domain::Settings;
use crate::ports::{Sleeper, WorkflowHost};

/// Application context holding dependencies for command execution.
pub struct AppContext<H: WorkflowHost, S: Sleeper> {
    host: H,
    sleeper: S,
    settings: Settings,
}

impl<H: WorkflowHost, S: Sleeper> AppContext<H, S> {
    /// Create a new application context.
    pub fn new(host: H, sleeper: S, settings: Settings) -> Self {
        Self { host, sleeper, settings }
    }

    /// Get a reference to the workflow host.
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
