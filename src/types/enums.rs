//! Enumeration types for the shop floor simulator
//!
//! This module contains the enumerations shared across the simulation: event
//! kinds, run states, event outcome statuses and task blocking reasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of events processed by the event engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A task has become ready for assignment
    TaskBecameAvailable,
    /// An assignment begins execution
    TaskStarted,
    /// An assignment finishes execution
    TaskCompleted,
    /// Terminal event, nothing is processed after it
    SimulationHalted,
}

impl EventKind {
    /// All event kinds in declaration order
    pub const ALL: [EventKind; 4] = [
        EventKind::TaskBecameAvailable,
        EventKind::TaskStarted,
        EventKind::TaskCompleted,
        EventKind::SimulationHalted,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::TaskBecameAvailable => write!(f, "Task Became Available"),
            EventKind::TaskStarted => write!(f, "Task Started"),
            EventKind::TaskCompleted => write!(f, "Task Completed"),
            EventKind::SimulationHalted => write!(f, "Simulation Halted"),
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").as_str() {
            "task became available" | "taskbecameavailable" => Ok(EventKind::TaskBecameAvailable),
            "task started" | "taskstarted" => Ok(EventKind::TaskStarted),
            "task completed" | "taskcompleted" => Ok(EventKind::TaskCompleted),
            "simulation halted" | "simulationhalted" => Ok(EventKind::SimulationHalted),
            _ => Err(format!("Unknown event kind: {}", s)),
        }
    }
}

/// Lifecycle state of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Seed events created, nothing processed yet
    Initialized,
    /// At least one slice has been processed
    Running,
    /// Stopped by a `SimulationHalted` event
    Halted,
    /// No unprocessed event remains at or before the horizon
    Exhausted,
    /// Stopped on an invariant violation
    Aborted,
}

impl RunState {
    /// Whether no further events will be processed
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Halted | RunState::Exhausted | RunState::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Initialized => write!(f, "Initialized"),
            RunState::Running => write!(f, "Running"),
            RunState::Halted => write!(f, "Halted"),
            RunState::Exhausted => write!(f, "Exhausted"),
            RunState::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Status of a processed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The transition was applied
    Success,
    /// No operator/task pairing could be made
    NoOperator,
    /// The transition failed and the event was marked errored
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::NoOperator => write!(f, "no_operator"),
            OutcomeStatus::Error => write!(f, "error"),
        }
    }
}

/// Why a task with remaining quantity cannot be assigned right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The required machine holds an active assignment
    MachineBusy,
    /// The predecessor task has not completed
    PredecessorIncomplete,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::MachineBusy => write!(f, "machine busy"),
            BlockReason::PredecessorIncomplete => write!(f, "predecessor incomplete"),
        }
    }
}
