use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::simulation::{Simulation, TickReport};

/// Why a [`Scheduler::run_loop`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was raised by the host.
    Signal,
    /// The configured tick budget was used up.
    TickBudget,
}

/// A completed tick together with how long the simulation work took.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub report: TickReport,
    pub busy: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: Duration,
    pub stopped_by: StopReason,
}

/// Drives a [`Simulation`] tick by tick, optionally pacing ticks to a fixed
/// timestep. Ticks are atomic: the stop flag is only read between them.
#[derive(Debug, Default)]
pub struct Scheduler {
    fixed_timestep: Option<Duration>,
    tick_budget: Option<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed timestep; each tick then takes at least this long.
    pub fn with_fixed_timestep(&mut self, timestep: Duration) -> &mut Self {
        self.fixed_timestep = Some(timestep);
        self
    }

    /// Stop after this many ticks of a single `run_loop` call.
    pub fn with_tick_budget(&mut self, ticks: u64) -> &mut Self {
        self.tick_budget = Some(ticks);
        self
    }

    /// Run one tick, then sleep out the rest of the timestep.
    pub fn execute_once(&mut self, simulation: &mut Simulation) -> TickOutcome {
        let start = Instant::now();
        let report = simulation.step();
        let busy = start.elapsed();

        if let Some(target) = self.fixed_timestep {
            if busy < target {
                spin_sleep::sleep(target - busy);
            }
        }
        TickOutcome { report, busy }
    }

    /// Tick until `stop` is raised or the tick budget runs out, handing every
    /// finished tick to `observer`.
    pub fn run_loop<F>(&mut self, simulation: &mut Simulation, stop: &AtomicBool, mut observer: F) -> RunSummary
    where
        F: FnMut(&Simulation, &TickOutcome),
    {
        let start = Instant::now();
        let mut ticks = 0;

        let stopped_by = loop {
            if stop.load(Ordering::SeqCst) {
                break StopReason::Signal;
            }
            if matches!(self.tick_budget, Some(budget) if ticks >= budget) {
                break StopReason::TickBudget;
            }

            let outcome = self.execute_once(simulation);
            ticks += 1;
            observer(simulation, &outcome);
        };

        RunSummary {
            ticks,
            elapsed: start.elapsed(),
            stopped_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;

    fn simulation() -> Simulation {
        Simulation::new(SimulationParams {
            flower_count: 200,
            seed: Some(5),
            ..SimulationParams::default()
        })
        .unwrap()
    }

    #[test]
    fn stops_at_tick_budget() {
        let mut sim = simulation();
        let stop = AtomicBool::new(false);
        let mut seen = Vec::new();

        let summary = Scheduler::new()
            .with_tick_budget(25)
            .run_loop(&mut sim, &stop, |_, outcome| seen.push(outcome.report.tick));

        assert_eq!(summary.ticks, 25);
        assert_eq!(summary.stopped_by, StopReason::TickBudget);
        assert_eq!(seen, (1..=25).collect::<Vec<_>>());
        assert_eq!(sim.tick(), 25);
    }

    #[test]
    fn stop_signal_ends_the_loop_between_ticks() {
        let mut sim = simulation();
        let stop = AtomicBool::new(false);

        let summary = Scheduler::new().run_loop(&mut sim, &stop, |sim, _| {
            if sim.tick() == 10 {
                stop.store(true, Ordering::SeqCst);
            }
        });

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.stopped_by, StopReason::Signal);
    }

    #[test]
    fn raised_flag_runs_no_ticks() {
        let mut sim = simulation();
        let stop = AtomicBool::new(true);
        let summary = Scheduler::new().run_loop(&mut sim, &stop, |_, _| {});
        assert_eq!(summary.ticks, 0);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn fixed_timestep_paces_ticks() {
        let mut sim = simulation();
        let mut scheduler = Scheduler::new();
        scheduler.with_fixed_timestep(Duration::from_millis(5));

        let start = Instant::now();
        for _ in 0..4 {
            scheduler.execute_once(&mut sim);
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
