pub mod dispatch;
pub mod file_reader;
pub mod list;
pub mod logs;
pub mod poll;
pub mod status;
pub mod status_all;

/// A registered subcommand, as shown by `--list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Every subcommand in display order.
pub fn registry() -> &'static [CommandInfo] {
    const COMMANDS: &[CommandInfo] = &[
        CommandInfo {
            name: "file-reader",
            description: "List or print local files matching a glob pattern",
            version: VERSION,
        },
        CommandInfo {
            name: "workflow-dispatch",
            description: "Trigger a GitHub Actions workflow and optionally wait for it",
            version: VERSION,
        },
        CommandInfo {
            name: "workflow-status",
            description: "Show the latest run of a project's workflow",
            version: VERSION,
        },
        CommandInfo {
            name: "workflow-list",
            description: "List a project's workflows and their inputs",
            version: VERSION,
        },
        CommandInfo {
            name: "workflow-status-all",
            description: "Show the latest run of every configured project",
            version: VERSION,
        },
    ];
    COMMANDS
}
