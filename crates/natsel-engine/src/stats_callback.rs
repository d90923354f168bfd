//! Tick callback that logs population statistics.

use natsel_core::Simulation;
use natsel_core::TickReport;
use natsel_core::runner::TickCallback;
use natsel_types::PopulationStats;
use rand::Rng;
use tracing::info;

/// Logs head counts and species averages every `interval` ticks, and every
/// regeneration as it happens.
pub struct StatsCallback {
    interval: u64,
}

impl StatsCallback {
    /// Log every `interval` ticks (0 = only on regeneration).
    pub const fn new(interval: u64) -> Self {
        Self { interval }
    }

    fn due(&self, report: &TickReport) -> bool {
        report.regenerated || report.tick.checked_rem(self.interval) == Some(0)
    }
}

impl<R: Rng> TickCallback<R> for StatsCallback {
    fn on_tick(&mut self, report: &TickReport, sim: &Simulation<R>) {
        if self.due(report) {
            log_stats(report.tick, &sim.stats());
        }
    }
}

fn log_stats(tick: u64, stats: &PopulationStats) {
    let prey = stats.prey.as_ref();
    let predator = stats.predator.as_ref();
    info!(
        tick,
        foods = stats.food_count,
        preys = stats.prey_count,
        predators = stats.predator_count,
        prey_size = prey.map(|a| round(a.size)),
        prey_speed = prey.map(|a| round(a.speed)),
        prey_vision = prey.map(|a| round(a.vision)),
        prey_energy = prey.map(|a| round(a.energy)),
        predator_size = predator.map(|a| round(a.size)),
        predator_speed = predator.map(|a| round(a.speed)),
        predator_vision = predator.map(|a| round(a.vision)),
        predator_energy = predator.map(|a| round(a.energy)),
        "Population"
    );
}

/// Two decimals, for log readability.
fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
