//! Poll a run until it reaches a terminal state or the budget runs out.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::app::AppContext;
use crate::domain::{AppError, RepoSlug, RunOutcome, WorkflowRun};
use crate::ports::{Sleeper, WorkflowHost};

/// Where polling stopped.
#[derive(Debug, Clone)]
pub struct PollReport {
    /// Last state fetched from the host.
    pub run: WorkflowRun,
    pub outcome: RunOutcome,
    /// Status fetches issued.
    pub ticks: u32,
    pub elapsed: Duration,
}

impl PollReport {
    /// Poll budget consumed: ticks × interval.
    pub fn budget_used(&self, interval: Duration) -> Duration {
        interval.saturating_mul(self.ticks)
    }
}

/// Re-fetch the run every `poll_interval` until it completes.
///
/// At each tick boundary the run is `TimedOut` once either the wall-clock time
/// since polling began or `ticks × poll_interval` exceeds the configured
/// timeout; with no timeout it is polled until it completes. `on_pending` is
/// called after every non-terminal tick, before sleeping.
pub fn wait_for_completion<H, S, F>(
    ctx: &AppContext<H, S>,
    repo: &RepoSlug,
    run_id: u64,
    mut on_pending: F,
) -> Result<PollReport, AppError>
where
    H: WorkflowHost,
    S: Sleeper,
    F: FnMut(&WorkflowRun, u32),
{
    let interval = ctx.settings().poll_interval;
    let timeout = ctx.settings().timeout;
    let started = Instant::now();
    let mut ticks = 0_u32;

    info!(run_id, %repo, ?interval, ?timeout, "waiting for run");

    loop {
        ticks += 1;
        let run = ctx.host().get_run(repo, run_id)?;
        let outcome = RunOutcome::from_run(&run);
        debug!(run_id, ticks, ?outcome, "polled run");

        if outcome.is_terminal() {
            return Ok(PollReport { run, outcome, ticks, elapsed: started.elapsed() });
        }

        if timeout.is_some_and(|limit| {
            started.elapsed() > limit || interval.saturating_mul(ticks) > limit
        }) {
            info!(run_id, ticks, "poll budget exhausted");
            return Ok(PollReport {
                run,
                outcome: RunOutcome::TimedOut,
                ticks,
                elapsed: started.elapsed(),
            });
        }

        on_pending(&run, ticks);
        ctx.sleeper().sleep(interval);
    }
}
