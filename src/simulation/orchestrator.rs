//! Main simulation orchestrator
//!
//! Validates the run parameters and the shop floor, builds the
//! [`EventEngine`] and drives it slice by slice until the run ends.

use super::{
    assignment::Assignment,
    engine::{EventEngine, SliceReport},
    error::SimulationResult,
    logging::LogRecord,
    sink::SimulationSink,
    state::SimulationSnapshot,
    statistics::RunStatistics,
};
use crate::shop::{ShopFloor, ShopFloorConfig};
use crate::types::{Minutes, OutcomeStatus, RunState, SimulationConfig};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Condensed view of one slice for the run report
#[derive(Debug, Clone, Serialize)]
pub struct SliceSummary {
    /// Start of the slice window
    pub slice_start: Minutes,
    /// End of the slice window
    pub slice_end: Minutes,
    /// Events processed
    pub processed: usize,
    /// Events that failed
    pub errored: usize,
    /// Clock after the slice
    pub clock: Minutes,
    /// Run state after the slice
    pub state: RunState,
}

impl From<&SliceReport> for SliceSummary {
    fn from(report: &SliceReport) -> Self {
        Self {
            slice_start: report.slice_start,
            slice_end: report.slice_end,
            processed: report.processed.len(),
            errored: report.errored_count(),
            clock: report.clock,
            state: report.state,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Final snapshot
    pub snapshot: SimulationSnapshot,
    /// Consolidated statistics
    pub statistics: RunStatistics,
    /// One entry per slice
    pub slices: Vec<SliceSummary>,
    /// Every assignment in creation order
    pub assignments: Vec<Assignment>,
    /// Run log, one record per processed event
    pub log: Vec<LogRecord>,
    /// Wall-clock time the run took
    #[serde(with = "duration_secs")]
    pub wall_time: Duration,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(value.as_secs_f64())
    }
}

/// Main simulation orchestrator that coordinates all components
#[derive(Debug)]
pub struct SimulationOrchestrator {
    /// Run parameters
    config: SimulationConfig,
    /// The engine being driven
    engine: EventEngine,
    /// Slices executed so far
    slices: Vec<SliceReport>,
}

impl SimulationOrchestrator {
    /// Create a new simulation orchestrator
    ///
    /// Both the run parameters and the shop floor are validated first; a
    /// rejected configuration never reaches the engine.
    #[instrument(skip_all, fields(horizon = config.horizon_minutes, slice = config.slice_minutes))]
    pub fn new(config: SimulationConfig, shop_floor: ShopFloorConfig) -> SimulationResult<Self> {
        config.validate()?;
        let floor = ShopFloor::from_config(shop_floor)?;
        info!(
            "Initializing simulation with {} operators, {} machines, {} tasks ({} units)",
            floor.operators().len(),
            floor.machines().len(),
            floor.tasks().len(),
            floor.total_units()
        );

        let engine = EventEngine::new(floor, &config)?;
        Ok(Self { config, engine, slices: Vec::new() })
    }

    /// Replace the persistence sink
    pub fn with_sink(mut self, sink: Box<dyn SimulationSink>) -> Self {
        self.engine = self.engine.with_sink(sink);
        self
    }

    /// Run parameters
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The engine being driven
    pub fn engine(&self) -> &EventEngine {
        &self.engine
    }

    /// Mutable access to the engine, for halting or injecting events
    pub fn engine_mut(&mut self) -> &mut EventEngine {
        &mut self.engine
    }

    /// Slices executed so far
    pub fn slices(&self) -> &[SliceReport] {
        &self.slices
    }

    /// Statistics of the run so far
    pub fn statistics(&self) -> RunStatistics {
        RunStatistics::collect(&self.engine, &self.slices)
    }

    /// Run one configured slice
    pub fn step(&mut self) -> SimulationResult<&SliceReport> {
        let report = self.engine.run_slice(self.config.slice_minutes)?;
        let assigned: usize = report.processed.iter().map(|p| p.assignments.len()).sum();
        let unassigned = report
            .processed
            .iter()
            .filter(|p| p.outcome == OutcomeStatus::NoOperator)
            .count();
        info!(
            "Slice {:.1}-{:.1}: {} events, {} assignments, {} without operator, state {}",
            report.slice_start,
            report.slice_end,
            report.processed.len(),
            assigned,
            unassigned,
            report.state
        );
        self.slices.push(report);
        let index = self.slices.len() - 1;
        Ok(&self.slices[index])
    }

    /// Run slices until the run reaches a terminal state
    pub fn run(&mut self) -> SimulationResult<RunReport> {
        self.run_with_progress(|_| {})
    }

    /// Like [`run`](Self::run), calling `on_slice` after every slice
    pub fn run_with_progress<F>(&mut self, mut on_slice: F) -> SimulationResult<RunReport>
    where
        F: FnMut(&SliceReport),
    {
        let started = Instant::now();
        info!(simulation = %self.engine.state().id(), "Starting simulation run");

        while !self.engine.state().run_state().is_terminal() {
            let report = self.step()?;
            on_slice(report);
        }

        let report = self.report(started.elapsed());
        info!("{}", report.statistics.generate_compact_summary());
        debug!(wall_time = ?report.wall_time, "Simulation run finished");
        Ok(report)
    }

    fn report(&self, wall_time: Duration) -> RunReport {
        let state = self.engine.state();
        RunReport {
            snapshot: self.engine.snapshot(),
            statistics: self.statistics(),
            slices: self.slices.iter().map(SliceSummary::from).collect(),
            assignments: state.assignments().to_vec(),
            log: state.log().to_vec(),
            wall_time,
        }
    }
}
