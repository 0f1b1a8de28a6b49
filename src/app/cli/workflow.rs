//! Workflow command reports.

use std::io::Write;

use chrono::{Local, Utc};
use tracing::warn;

use crate::app::api::{DispatchOptions, DispatchOutcome, LatestRun, LogScope, Workspace};
use crate::app::render;
use crate::domain::{AppError, RepoSlug, RunConclusion, RunJob, RunOutcome};

pub fn run_dispatch(options: DispatchOptions, verbose: bool) -> Result<i32, AppError> {
    let workspace = Workspace::discover()?;
    let show_progress = options.wait && workspace.settings.show_progress;

    println!("🚀 Dispatching {} ...", options.project);
    let mut progress_started = false;
    let outcome = workspace.dispatch(options, |run, _tick| {
        if !show_progress {
            return;
        }
        if !progress_started {
            print!("⏳ Waiting for run {} ", run.id);
            progress_started = true;
        }
        print!(".");
        let _ = std::io::stdout().flush();
    });
    if progress_started {
        println!();
    }
    let outcome = outcome?;

    for unresolved in &outcome.unresolved {
        println!(
            "⚠️  '{}' is not an allowed value for '{}' (allowed: {})",
            unresolved.value,
            unresolved.key,
            unresolved.allowed.join(", ")
        );
    }

    print_dispatch(&outcome);
    let log_scope = match outcome.outcome {
        _ if verbose => Some(LogScope::All),
        RunOutcome::Failed => Some(LogScope::Failed),
        _ => None,
    };
    if verbose || !outcome.outcome.is_healthy() {
        print_jobs(&workspace, &outcome.repo, outcome.run.id, log_scope);
    }

    match outcome.outcome {
        RunOutcome::Queued | RunOutcome::InProgress | RunOutcome::Succeeded => Ok(0),
        RunOutcome::TimedOut => Err(AppError::Timeout {
            run_id: outcome.run.id,
            elapsed_secs: outcome.elapsed().as_secs(),
        }),
        RunOutcome::Failed | RunOutcome::Cancelled => Ok(1),
    }
}

fn print_dispatch(outcome: &DispatchOutcome) {
    let (icon, headline) = match outcome.outcome {
        RunOutcome::Queued | RunOutcome::InProgress => ("✅", "Workflow dispatched"),
        RunOutcome::Succeeded => ("✅", "Workflow succeeded"),
        RunOutcome::TimedOut => ("⏱️ ", "Gave up waiting for workflow"),
        RunOutcome::Failed | RunOutcome::Cancelled => ("❌", "Workflow did not succeed"),
    };
    println!("{} {}", icon, headline);

    let mut rows = vec![
        ("Status", outcome.outcome.label().to_string()),
        ("Project", outcome.project.clone()),
        ("Repository", outcome.repo.to_string()),
        ("Workflow", outcome.workflow.clone()),
        ("Branch", outcome.branch.clone()),
        ("Run ID", outcome.run.id.to_string()),
    ];
    if outcome.poll.is_some() {
        rows.push(("Duration", render::format_duration(outcome.elapsed())));
    }
    rows.push(("URL", outcome.run_url()));
    println!("{}", render::fields(&rows));

    if !outcome.params.is_empty() {
        println!("  Parameters:");
        for (key, value) in &outcome.params {
            println!("    {}={}", key, value);
        }
    }
}

pub fn run_status(project: &str, workflow: Option<&str>, verbose: bool) -> Result<i32, AppError> {
    let workspace = Workspace::discover()?;
    let report = workspace.status(project, workflow, verbose)?;
    let latest = &report.latest;

    println!("📋 Latest run of {} ({})", latest.project, latest.workflow);
    println!("{}", render::fields(&status_fields(latest)));
    if !report.jobs.is_empty() {
        println!("{}", format_jobs(&report.jobs));
    }
    if verbose {
        print_logs(&workspace, &latest.repo, &report.jobs, LogScope::All);
    }

    Ok(if latest.outcome.is_healthy() { 0 } else { 1 })
}

fn status_fields(latest: &LatestRun) -> Vec<(&'static str, String)> {
    let run = &latest.run;
    vec![
        ("Status", latest.outcome.label().to_string()),
        ("Repository", latest.repo.to_string()),
        ("Workflow", latest.workflow.clone()),
        ("Run ID", run.id.to_string()),
        ("Branch", run.head_branch.clone().unwrap_or_else(|| "-".into())),
        ("Event", run.event.clone().unwrap_or_else(|| "-".into())),
        (
            "Created",
            run.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        ("URL", latest.run_url()),
    ]
}

pub fn run_list(project: &str, verbose: bool) -> Result<(), AppError> {
    let workspace = Workspace::discover()?;
    let listing = workspace.list(project)?;

    println!("📋 Workflows of {} ({}, branch {})", listing.project, listing.repo, listing.branch);
    for entry in &listing.workflows {
        println!();
        println!("• {} [{}] ({})", entry.workflow.name, entry.workflow.state, entry.workflow.file_name());
        let Some(inputs) = &entry.inputs else {
            println!("    inputs unavailable");
            continue;
        };
        if inputs.is_empty() {
            println!("    no inputs");
            continue;
        }
        for input in inputs {
            let name = if input.required { format!("{}*", input.name) } else { input.name.clone() };
            let values = if input.options.is_empty() {
                format!("({})", input.input_type)
            } else {
                input.options.join(" | ")
            };
            let mut line = format!("    {}: {}", name, values);
            if let Some(default) = &input.default {
                line.push_str(&format!(" [default: {}]", default));
            }
            println!("{}", line);
            if verbose && !input.description.is_empty() {
                println!("      {}", input.description);
            }
        }
    }
    Ok(())
}

pub fn run_status_all(verbose: bool) -> Result<i32, AppError> {
    let workspace = Workspace::discover()?;
    let report = workspace.status_all()?;
    let now = Utc::now();

    let rows: Vec<Vec<String>> = report
        .statuses
        .iter()
        .map(|status| match &status.result {
            Ok(latest) => vec![
                status.project.clone(),
                latest.outcome.label().to_string(),
                latest.run.head_branch.clone().unwrap_or_else(|| status.branch.clone()),
                render::relative_time(latest.run.created_at, now),
            ],
            Err(_) => vec![status.project.clone(), "N/A".into(), "-".into(), "N/A".into()],
        })
        .collect();

    println!("📊 Workflow status for {} project(s)", report.statuses.len());
    println!("{}", render::table(&["PROJECT", "STATUS", "BRANCH", "LAST RUN"], &rows));

    if report.failures() > 0 {
        println!();
        for status in &report.statuses {
            if let Err(err) = &status.result {
                println!("❌ {}: {}", status.project, err);
            }
        }
    }
    if verbose {
        for latest in report.statuses.iter().filter_map(|s| s.result.as_ref().ok()) {
            println!("  {} → {}", latest.project, latest.run_url());
        }
    }

    Ok(if report.all_healthy() { 0 } else { 1 })
}

fn print_jobs(workspace: &Workspace, repo: &RepoSlug, run_id: u64, log_scope: Option<LogScope>) {
    let jobs = match workspace.jobs(repo, run_id) {
        Ok(jobs) => jobs,
        Err(err) => {
            warn!(run_id, "could not list jobs: {}", err);
            return;
        }
    };
    if !jobs.is_empty() {
        println!("{}", format_jobs(&jobs));
    }
    if let Some(scope) = log_scope {
        print_logs(workspace, repo, &jobs, scope);
    }
}

fn print_logs(workspace: &Workspace, repo: &RepoSlug, jobs: &[RunJob], scope: LogScope) {
    match workspace.logs(repo, jobs, scope) {
        Ok(logs) if logs.is_empty() => {
            if scope == LogScope::Failed {
                println!("  No failed job logs available");
            }
        }
        Ok(logs) => {
            println!();
            println!("📜 {}", scope.title());
            println!("{}", logs.text);
        }
        Err(err) => warn!(%repo, "could not fetch logs: {}", err),
    }
}

fn format_jobs(jobs: &[RunJob]) -> String {
    let mut lines = vec!["  Jobs:".to_string()];
    for job in jobs {
        let state = job.conclusion.map(|c| c.label()).unwrap_or("pending");
        lines.push(format!("    {} {} ({})", job_icon(job), job.name, state));
        for step in job.failed_steps() {
            lines.push(format!("      ✗ step {}: {}", step.number, step.name));
        }
    }
    lines.join("\n")
}

fn job_icon(job: &RunJob) -> &'static str {
    match job.conclusion {
        Some(RunConclusion::Success) => "✅",
        Some(RunConclusion::Skipped) | Some(RunConclusion::Neutral) => "➖",
        Some(_) => "❌",
        None => "⏳",
    }
}
