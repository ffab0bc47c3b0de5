//! Assignments: one unit of a task handed to an operator on a machine

use crate::types::{AssignmentId, MachineId, Minutes, OperatorId, TaskId};
use serde::{Deserialize, Serialize};

/// One unit of work executed by one operator on one machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assignment identifier
    pub id: AssignmentId,
    /// Operator doing the work
    pub operator: OperatorId,
    /// Task the unit belongs to
    pub task: TaskId,
    /// Machine occupied
    pub machine: MachineId,
    /// Virtual start time
    pub start: Minutes,
    /// Virtual end time, `start + duration`
    pub end: Minutes,
    /// Actual duration, `standard / performance`
    pub duration: Minutes,
    /// Performance the duration was derived from
    pub performance: f64,
    /// Set by the start event
    pub in_progress: bool,
    /// Set by the completion event
    pub completed: bool,
}

impl Assignment {
    /// Whether the assignment still holds its operator and machine
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Whether the `[start, end)` intervals of two assignments intersect
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.start < other.end && other.start < self.end
    }
}
