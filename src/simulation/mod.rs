//! Simulation engine, orchestration and control
//!
//! This module contains the discrete-event engine, its state and event queue,
//! persistence sinks, the orchestrator, statistics collection and error
//! handling.
//!
//! # Overview
//!
//! - **EventEngine**: Pops events in time order and applies their transitions
//! - **SimulationState**: Clock, assignments, resource occupancy and queue
//! - **EventQueue**: Min-heap of events keyed by (time, insertion order)
//! - **SimulationSink**: Receiver of assignments, samples, events and log records
//! - **SimulationOrchestrator**: Validates configuration and drives fixed slices
//! - **RunStatistics**: Consolidated counts and per-operator utilization
//! - **SimulationError**: Error taxonomy with recovery strategies
//!
//! # Usage Example
//!
//! ```rust
//! use shop_floor_simulator::shop::*;
//! use shop_floor_simulator::simulation::*;
//! use shop_floor_simulator::types::*;
//!
//! let shop_floor = ShopFloorConfig::new()
//!     .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["T1"]))
//!     .with_machine(MachineSpec::new("M1"))
//!     .with_product(ProductSpec::new("P1", 1, 2.0))
//!     .with_task(TaskSpec::new("T1", "P1", 1, "M1", 30.0));
//!
//! let mut orchestrator =
//!     SimulationOrchestrator::new(SimulationConfig::default(), shop_floor).unwrap();
//! let report = orchestrator.run().unwrap();
//!
//! assert_eq!(report.snapshot.state, RunState::Exhausted);
//! assert_eq!(report.statistics.completed_tasks, 1);
//! ```

pub mod assignment;
pub mod clock;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod orchestrator;
pub mod sink;
pub mod state;
pub mod statistics;

// Re-export all public types for convenience
pub use assignment::*;
pub use clock::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use logging::*;
pub use orchestrator::*;
pub use sink::*;
pub use state::*;
pub use statistics::*;
