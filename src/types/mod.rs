//! Core types and identifiers for the shop floor simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: entity codes (`OperatorId`, `TaskId`, ...), UUID-based
//!   `SimulationId`, and per-run sequence numbers for events and assignments
//! - **Enums**: event kinds, run states, outcome statuses, blocking reasons
//! - **Configuration**: run configuration, dispatch weights, CLI arguments and validation
//!
//! # Usage Example
//!
//! ```rust
//! use shop_floor_simulator::types::*;
//!
//! let task = TaskId::new("T1");
//! assert!(task.is_well_formed());
//!
//! let config = SimulationConfig {
//!     horizon_minutes: 480.0,
//!     weights: DispatchWeights::new(0.25, 0.25, 0.25, 0.25),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;

/// Virtual time, in minutes since the start of the run
pub type Minutes = f64;

/// Number of virtual minutes in one day
pub const MINUTES_PER_DAY: Minutes = 1440.0;
