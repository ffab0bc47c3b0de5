//! Shop Floor Simulator
//!
//! A discrete-event simulation of a manufacturing shop floor in which human
//! operators with learning and forgetting behavior are dispatched to tasks on
//! exclusive machines.
//!
//! # Overview
//!
//! Products are built through chains of tasks. Each task runs on one machine
//! and needs an operator holding the task's skill. Operators get faster with
//! repetition and slower when a task goes unpracticed. Whenever a task becomes
//! available, every idle operator is offered the candidate with the best
//! weighted score of cost, performance, workload equity and makespan.
//!
//! ## Key Features
//!
//! - **Performance Model**: Power-law learning with exponential forgetting per (operator, task)
//! - **Availability Resolution**: Precedence and machine exclusivity with wait estimates
//! - **Multi-Criteria Dispatching**: Configurable weights, deterministic tie-breaking
//! - **Event Engine**: Time-ordered processing with atomic transitions and sliced execution
//! - **Persistence Sinks**: In-memory, discarding, or JSON-lines output of every record
//! - **Configurable Simulation**: JSON config files, CLI overrides and validation
//!
//! ## Quick Start
//!
//! ```rust
//! use shop_floor_simulator::*;
//!
//! let shop_floor = ShopFloorConfig::new()
//!     .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["CUT", "WELD"]))
//!     .with_machine(MachineSpec::new("M1"))
//!     .with_product(ProductSpec::new("P1", 2, 1.5))
//!     .with_task(TaskSpec::new("CUT", "P1", 1, "M1", 20.0))
//!     .with_task(TaskSpec::new("WELD", "P1", 2, "M1", 15.0).with_predecessor("CUT"));
//!
//! let mut orchestrator = SimulationOrchestrator::new(SimulationConfig::default(), shop_floor)?;
//! let report = orchestrator.run()?;
//! println!("{}", report.statistics.generate_compact_summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Core types, identifiers, and configuration
//! - [`shop`]: Operators, machines, products, tasks and the shop floor registry
//! - [`performance`]: Learning and forgetting model
//! - [`dispatch`]: Task availability and the dispatch policy
//! - [`simulation`]: Event engine, orchestration, sinks and statistics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │    Shop     │    │ Performance │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Registry    │    │ Learning    │
//! │ Enums       │    │ Validation  │    │ Forgetting  │
//! │ Config      │    │ Generator   │    │ History     │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌─────────────┐            │
//! │  Dispatch   │    │ Simulation  │────────────┘
//! │             │    │             │
//! │ Availability│◄───┤ Engine      │
//! │ Policy      │    │ Orchestrator│
//! │             │    │ Statistics  │
//! └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod dispatch;
pub mod performance;
pub mod shop;
pub mod simulation;
pub mod types;

// Core types and identifiers
pub use types::{
    BlockReason,
    ConfigRejection,
    ConfigValidationError,
    DispatchWeights,
    // Enums
    EventKind,
    // Identifiers
    MachineId,
    Minutes,
    OperatorId,
    OutcomeStatus,
    ProductId,
    RunState,
    // Configuration
    SimulationConfig,
    SimulationId,
    TaskId,
};

// Shop floor entities
pub use shop::{
    MachineSpec, Operator, OperatorSpec, ProductSpec, ScenarioGenerator, ShopFloor,
    ShopFloorConfig, Task, TaskSpec,
};

// Performance model
pub use performance::{LearningParameters, PerformanceModel, PerformanceSample};

// Dispatching
pub use dispatch::{AvailabilityResolver, BlockedTask, Candidate, DispatchPolicy};

// Simulation types and functionality
pub use simulation::{
    Assignment, EventEngine, JsonLinesSink, MemorySink, NullSink, RunReport, RunStatistics,
    SimEvent, SimulationError, SimulationOrchestrator, SimulationResult, SimulationSink,
    SimulationSnapshot, SimulationState, SliceReport,
};
