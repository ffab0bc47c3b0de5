//! Task dispatch
//!
//! This module decides which task an idle operator takes next.
//!
//! # Overview
//!
//! - **AvailabilityResolver**: filters tasks by skill, precedence, machine
//!   occupancy and remaining quantity; reports blocked tasks with their
//!   estimated wait
//! - **DispatchPolicy**: scores candidates on cost, performance, equity and
//!   makespan with a configurable weight vector and picks the best
//!
//! # Usage Example
//!
//! ```rust
//! use shop_floor_simulator::dispatch::*;
//! use shop_floor_simulator::types::DispatchWeights;
//!
//! // Scenario: standard 100 min, performance 0.5, cost rate 2 per minute
//! assert!((cost_score(100.0, 0.5, 2.0) - 0.8).abs() < 1e-12);
//!
//! let policy = DispatchPolicy::new(DispatchWeights::new(0.25, 0.25, 0.25, 0.25));
//! let score = policy.composite(0.8, 0.5, 1.0, 1.0, 0.0);
//! assert!(score.composite > 0.8);
//! ```

pub mod availability;
pub mod policy;

pub use availability::{AvailabilityResolver, BlockedTask, CandidateTask};
pub use policy::{
    cost_score, equity_score, makespan_score, performance_score, select_best,
    sub_performance_cost, Candidate, DispatchPolicy, ScoreBreakdown,
};
