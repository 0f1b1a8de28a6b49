//! CLI Adapter.

mod file_reader;
mod workflow;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::commands::registry;
use crate::app::render;
use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "wfd")]
#[command(version)]
#[command(
    about = "Dispatch and monitor GitHub Actions workflows across projects",
    long_about = None
)]
struct Cli {
    /// List available commands
    #[arg(short, long)]
    list: bool,
    /// Show debug logs and extra report detail
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List or print local files matching a glob pattern
    FileReader {
        /// Directory to search
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Glob pattern relative to the directory
        #[arg(long, default_value = "*")]
        pattern: String,
    },
    /// Trigger a workflow run and optionally wait for it
    WorkflowDispatch {
        /// Project name from projects.yaml
        #[arg(short, long)]
        project: String,
        /// Workflow file overriding the project's
        #[arg(short, long)]
        workflow: Option<String>,
        /// Branch overriding the project's
        #[arg(short, long)]
        branch: Option<String>,
        /// Workflow input as KEY=VALUE (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Return once the run is identified instead of waiting for it
        #[arg(long)]
        no_wait: bool,
    },
    /// Show the latest run of a project's workflow
    WorkflowStatus {
        /// Project name from projects.yaml
        #[arg(short, long)]
        project: String,
        /// Workflow file overriding the project's
        #[arg(short, long)]
        workflow: Option<String>,
    },
    /// List a project's workflows and their inputs
    WorkflowList {
        /// Project name from projects.yaml
        #[arg(short, long)]
        project: String,
    },
    /// Show the latest run of every configured project
    WorkflowStatusAll,
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<i32, AppError> = match cli.command {
        _ if cli.list => {
            print_registry();
            Ok(0)
        }
        None => {
            println!("No command given. Available commands:\n");
            print_registry();
            Ok(2)
        }
        Some(Commands::FileReader { path, pattern }) => {
            file_reader::run_file_reader(path, pattern, cli.verbose).map(|_| 0)
        }
        Some(Commands::WorkflowDispatch { project, workflow, branch, params, no_wait }) => {
            workflow::run_dispatch(
                crate::app::api::DispatchOptions { project, workflow, branch, params, wait: !no_wait },
                cli.verbose,
            )
        }
        Some(Commands::WorkflowStatus { project, workflow }) => {
            workflow::run_status(&project, workflow.as_deref(), cli.verbose)
        }
        Some(Commands::WorkflowList { project }) => workflow::run_list(&project, cli.verbose).map(|_| 0),
        Some(Commands::WorkflowStatusAll) => workflow::run_status_all(cli.verbose),
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "wfd=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn print_registry() {
    let rows: Vec<Vec<String>> = registry()
        .iter()
        .map(|command| {
            vec![command.name.to_string(), command.description.to_string(), command.version.to_string()]
        })
        .collect();
    println!("{}", render::table(&["COMMAND", "DESCRIPTION", "VERSION"], &rows));
}
