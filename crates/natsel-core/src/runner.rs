//! Timer-driven simulation loop.
//!
//! [`run_simulation`] wraps [`Simulation::tick`] with the control plane
//! around it:
//!
//! - **Bounded runs**: stop after `max_ticks` (0 = unlimited)
//! - **Pause/resume** and **variable speed** through [`RunControl`]
//! - **Clean stop**: a stop request is honoured before the next tick
//!
//! A tick always runs to completion; the loop only yields between ticks.

use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use crate::control::{EndReason, RunControl};
use crate::simulation::{Simulation, TickReport};

/// Errors that can occur when starting a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The simulation has no entities at all.
    #[error("simulation is empty; initialize it before running")]
    NotInitialized,
}

/// Result of a run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Why the run ended.
    pub end_reason: EndReason,
    /// The report of the last completed tick, if any.
    pub final_report: Option<TickReport>,
    /// Ticks executed by this run.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Drivers use this to log statistics or hand a snapshot to a renderer.
pub trait TickCallback<R>: Send {
    /// Called after every tick.
    fn on_tick(&mut self, report: &TickReport, sim: &Simulation<R>);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl<R> TickCallback<R> for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport, _sim: &Simulation<R>) {}
}

/// Run the simulation until the tick limit is reached or a stop is
/// requested.
///
/// # Errors
///
/// Returns [`RunnerError::NotInitialized`] if the simulation holds no
/// entities.
pub async fn run_simulation<R: Rng>(
    sim: &mut Simulation<R>,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback<R>,
) -> Result<SimulationResult, RunnerError> {
    if sim.entities().next().is_none() {
        return Err(RunnerError::NotInitialized);
    }

    let mut last_report: Option<TickReport> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: EndReason::Stopped,
                final_report: last_report,
                total_ticks,
            });
        }

        sim.tick();
        total_ticks = total_ticks.saturating_add(1);
        let report = *sim.last_report();
        callback.on_tick(&report, sim);
        last_report = Some(report);

        if control.tick_limit_reached(total_ticks) {
            info!(
                tick = report.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: EndReason::MaxTicksReached,
                final_report: last_report,
                total_ticks,
            });
        }

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log how a run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_report.as_ref().map(|r| r.tick),
        "Simulation ended"
    );

    if let Some(ref report) = result.final_report {
        info!(
            tick = report.tick,
            regenerated = report.regenerated,
            preys_born = report.preys_born,
            predators_born = report.predators_born,
            "Final tick report"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
