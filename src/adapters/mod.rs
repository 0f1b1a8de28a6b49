pub mod config_files;
pub mod github_http;
pub mod thread_sleeper;

pub use config_files::ConfigFiles;
pub use github_http::{GitHubApiConfig, HttpWorkflowHost};
pub use thread_sleeper::ThreadSleeper;
