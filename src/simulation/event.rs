//! Simulation events and the time-ordered event queue
//!
//! Events live in an arena indexed by [`EventId`] so their `processed` and
//! `errored` flags survive after they leave the heap. The heap only orders
//! pending events: earliest scheduled time first, equal times in insertion
//! order.

use crate::types::{AssignmentId, EventId, EventKind, Minutes, OperatorId, SimulationId, TaskId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Kind-specific payload of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
    /// No payload
    None,
    /// The assignment a start or completion event belongs to
    Assignment {
        /// Assignment identifier
        assignment: AssignmentId,
    },
    /// Why the run was halted
    Halt {
        /// Caller-supplied reason
        reason: String,
    },
}

impl EventDetail {
    /// Assignment carried by the payload, if any
    pub fn assignment(&self) -> Option<AssignmentId> {
        match self {
            EventDetail::Assignment { assignment } => Some(*assignment),
            _ => None,
        }
    }
}

/// A scheduled occurrence on the virtual timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Event identifier, also the insertion sequence number
    pub id: EventId,
    /// Simulation the event belongs to
    pub simulation: SimulationId,
    /// Event kind
    pub kind: EventKind,
    /// Scheduled virtual time
    pub scheduled_at: Minutes,
    /// Associated task
    pub task: Option<TaskId>,
    /// Associated operator
    pub operator: Option<OperatorId>,
    /// Kind-specific payload
    pub detail: EventDetail,
    /// Set once the event has been applied
    pub processed: bool,
    /// Set when applying the event failed
    pub errored: bool,
}

impl SimEvent {
    /// One-line human-readable description
    pub fn describe(&self) -> String {
        let mut text = format!("[{:>8.2}] {} {}", self.scheduled_at, self.id, self.kind);
        if let Some(task) = &self.task {
            text.push_str(&format!(" task={}", task));
        }
        if let Some(operator) = &self.operator {
            text.push_str(&format!(" operator={}", operator));
        }
        match &self.detail {
            EventDetail::Assignment { assignment } => text.push_str(&format!(" ({})", assignment)),
            EventDetail::Halt { reason } => text.push_str(&format!(" ({})", reason)),
            EventDetail::None => {}
        }
        text
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Heap entry ordering pending events
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    at: Minutes,
    id: EventId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the earliest time, then the lowest id
        other.at.total_cmp(&self.at).then_with(|| other.id.cmp(&self.id))
    }
}

/// Arena of all events of a run plus the heap of pending ones
#[derive(Debug, Clone)]
pub struct EventQueue {
    simulation: SimulationId,
    events: Vec<SimEvent>,
    pending: BinaryHeap<QueueEntry>,
}

impl EventQueue {
    /// Create an empty queue for a simulation
    pub fn new(simulation: SimulationId) -> Self {
        Self { simulation, events: Vec::new(), pending: BinaryHeap::new() }
    }

    /// Append an event and return its identifier
    ///
    /// No time check happens here; callers reject events in the past.
    pub fn push(
        &mut self,
        kind: EventKind,
        at: Minutes,
        task: Option<TaskId>,
        operator: Option<OperatorId>,
        detail: EventDetail,
    ) -> EventId {
        let id = EventId(self.events.len() as u64 + 1);
        self.events.push(SimEvent {
            id,
            simulation: self.simulation,
            kind,
            scheduled_at: at,
            task,
            operator,
            detail,
            processed: false,
            errored: false,
        });
        self.pending.push(QueueEntry { at, id });
        id
    }

    fn index_of(id: EventId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Look up an event
    pub fn get(&self, id: EventId) -> Option<&SimEvent> {
        Self::index_of(id).and_then(|idx| self.events.get(idx))
    }

    /// Identifier and time of the next pending event
    pub fn peek(&self) -> Option<(EventId, Minutes)> {
        self.pending.peek().map(|entry| (entry.id, entry.at))
    }

    /// Remove the next pending event if it is due at or before `limit`
    pub fn pop_due(&mut self, limit: Minutes) -> Option<EventId> {
        match self.pending.peek() {
            Some(entry) if entry.at <= limit => self.pending.pop().map(|entry| entry.id),
            _ => None,
        }
    }

    /// Record the outcome of applying an event
    pub fn mark_processed(&mut self, id: EventId, errored: bool) {
        if let Some(event) = Self::index_of(id).and_then(|idx| self.events.get_mut(idx)) {
            event.processed = true;
            event.errored = errored;
        }
    }

    /// Every event ever pushed, in insertion order
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Number of events not yet processed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no event is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a pending event of `kind` for `task` exists
    pub fn has_pending(&self, kind: EventKind, task: &TaskId) -> bool {
        self.pending.iter().any(|entry| {
            self.get(entry.id)
                .is_some_and(|event| event.kind == kind && event.task.as_ref() == Some(task))
        })
    }
}
