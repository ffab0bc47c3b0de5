//! Error types and handling
//!
//! This module contains the runtime error taxonomy of a simulation run and the
//! policy deciding which failures a run survives.

use crate::types::{ConfigError, ConfigRejection};
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration was rejected before the run started
    #[error("{0}")]
    Configuration(#[from] ConfigRejection),

    /// Configuration could not be loaded
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] ConfigError),

    /// No eligible (operator, task) pairing exists for an event
    #[error("No candidate: {0}")]
    NoCandidate(String),

    /// Applying an event transition failed
    #[error("Event processing failed: {0}")]
    EventProcessing(String),

    /// A guarantee of the engine was broken, e.g. a double-booked machine
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// An event could not be scheduled
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// A persistence sink failed
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by a persistence sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the backing store failed
    #[error("sink write failed: {0}")]
    Write(#[from] std::io::Error),

    /// A record could not be encoded
    #[error("sink encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The sink refused the record
    #[error("sink rejected record: {0}")]
    Rejected(String),
}

impl SimulationError {
    /// Create a no-candidate error
    pub fn no_candidate(msg: impl Into<String>) -> Self {
        Self::NoCandidate(msg.into())
    }

    /// Create an event processing error
    pub fn event_processing(msg: impl Into<String>) -> Self {
        Self::EventProcessing(msg.into())
    }

    /// Create an invariant violation
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create a scheduling error
    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    /// Check if a run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::Configuration(_) => false,
            SimulationError::ConfigLoad(_) => false,
            SimulationError::InvariantViolation(_) => false,
            SimulationError::NoCandidate(_) => true,
            SimulationError::EventProcessing(_) => true,
            SimulationError::Scheduling(_) => true,
            SimulationError::Sink(_) => true,
            SimulationError::Io(_) => true,
            SimulationError::Serialization(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::Configuration(_) => "Configuration",
            SimulationError::ConfigLoad(_) => "Configuration",
            SimulationError::NoCandidate(_) => "No Candidate",
            SimulationError::EventProcessing(_) => "Event Processing",
            SimulationError::InvariantViolation(_) => "Invariant Violation",
            SimulationError::Scheduling(_) => "Scheduling",
            SimulationError::Sink(_) => "Sink",
            SimulationError::Io(_) => "IO",
            SimulationError::Serialization(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// What the engine does after a failed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Mark the event errored and continue with the next one
    Skip,
    /// Stop the run
    Abort,
}

/// Per-event failure policy
#[derive(Debug, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self
    }

    /// Log the error with its context and decide how the run proceeds
    pub fn handle_error(&self, error: &SimulationError, context: &str) -> RecoveryStrategy {
        if error.is_recoverable() {
            warn!(category = error.category(), context, "Recoverable error: {}", error);
            RecoveryStrategy::Skip
        } else {
            error!(category = error.category(), context, "Non-recoverable error: {}", error);
            RecoveryStrategy::Abort
        }
    }
}
