//! Simulation state
//!
//! The single object every component reads: clock, horizon, makespan, the
//! shop floor registry, performance history, assignments, resource
//! occupancy and the event queue. Only the engine mutates it.

use super::{
    assignment::Assignment,
    clock::VirtualClock,
    error::{SimulationError, SimulationResult},
    event::{EventDetail, EventQueue},
    logging::LogRecord,
};
use crate::performance::PerformanceModel;
use crate::shop::ShopFloor;
use crate::types::{
    AssignmentId, EventId, EventKind, MachineId, Minutes, OperatorId, RunState, SimulationId,
    TaskId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Which assignment holds each exclusive resource
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    machines: HashMap<MachineId, AssignmentId>,
    operators: HashMap<OperatorId, AssignmentId>,
}

impl Occupancy {
    /// Assignment currently holding a machine
    pub fn machine(&self, machine: &MachineId) -> Option<AssignmentId> {
        self.machines.get(machine).copied()
    }

    /// Assignment currently holding an operator
    pub fn operator(&self, operator: &OperatorId) -> Option<AssignmentId> {
        self.operators.get(operator).copied()
    }

    /// Take the machine and operator of `assignment`
    ///
    /// Either resource already being held is a double booking.
    pub fn claim(&mut self, assignment: &Assignment) -> SimulationResult<()> {
        if let Some(holder) = self.machine(&assignment.machine) {
            return Err(SimulationError::invariant_violation(format!(
                "machine {} already held by {} when assigning {}",
                assignment.machine, holder, assignment.id
            )));
        }
        if let Some(holder) = self.operator(&assignment.operator) {
            return Err(SimulationError::invariant_violation(format!(
                "operator {} already held by {} when assigning {}",
                assignment.operator, holder, assignment.id
            )));
        }
        self.machines.insert(assignment.machine.clone(), assignment.id);
        self.operators.insert(assignment.operator.clone(), assignment.id);
        Ok(())
    }

    /// Free the machine and operator held by `assignment`
    pub fn release(&mut self, assignment: &Assignment) -> SimulationResult<()> {
        let machine_holder = self.machine(&assignment.machine);
        let operator_holder = self.operator(&assignment.operator);
        if machine_holder != Some(assignment.id) || operator_holder != Some(assignment.id) {
            return Err(SimulationError::invariant_violation(format!(
                "{} completing without holding its resources \
                 (machine held by {:?}, operator held by {:?})",
                assignment.id, machine_holder, operator_holder
            )));
        }
        self.machines.remove(&assignment.machine);
        self.operators.remove(&assignment.operator);
        Ok(())
    }
}

/// Work and idle time of one operator at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorLoad {
    /// Operator identifier
    pub operator: OperatorId,
    /// Cumulative work time
    pub work_minutes: Minutes,
    /// Cumulative idle time including the open idle period
    pub idle_minutes: Minutes,
    /// Assignment currently held
    pub current_assignment: Option<AssignmentId>,
}

/// Read-only view of a run for dashboards and export
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    /// Simulation identifier
    pub simulation_id: SimulationId,
    /// Run state
    pub state: RunState,
    /// Virtual clock
    pub clock: Minutes,
    /// Calendar time of the clock, when an epoch is configured
    pub clock_at: Option<DateTime<Utc>>,
    /// Horizon of the run
    pub horizon: Minutes,
    /// Latest end time across all assignments
    pub makespan: Minutes,
    /// Completed tasks, sorted
    pub completed_tasks: Vec<TaskId>,
    /// Assignments not yet completed
    pub active_assignments: Vec<Assignment>,
    /// Per-operator time accounting
    pub operator_loads: Vec<OperatorLoad>,
    /// Events still waiting in the queue
    pub pending_events: usize,
}

/// Mutable state of one simulation run
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) id: SimulationId,
    pub(crate) run_state: RunState,
    pub(crate) clock: VirtualClock,
    pub(crate) horizon: Minutes,
    pub(crate) makespan: Minutes,
    pub(crate) floor: ShopFloor,
    pub(crate) performance: PerformanceModel,
    pub(crate) completed: BTreeSet<TaskId>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) occupancy: Occupancy,
    pub(crate) queue: EventQueue,
    pub(crate) log: Vec<LogRecord>,
}

impl SimulationState {
    /// Fresh state at minute zero
    pub fn new(
        floor: ShopFloor,
        performance: PerformanceModel,
        horizon: Minutes,
        clock: VirtualClock,
    ) -> Self {
        let id = SimulationId::new();
        Self {
            id,
            run_state: RunState::Initialized,
            clock,
            horizon,
            makespan: 0.0,
            floor,
            performance,
            completed: BTreeSet::new(),
            assignments: Vec::new(),
            occupancy: Occupancy::default(),
            queue: EventQueue::new(id),
            log: Vec::new(),
        }
    }

    /// Simulation identifier
    pub fn id(&self) -> SimulationId {
        self.id
    }

    /// Run state
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Current virtual time
    pub fn now(&self) -> Minutes {
        self.clock.now()
    }

    /// Virtual clock
    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    /// Maximum virtual time of the run
    pub fn horizon(&self) -> Minutes {
        self.horizon
    }

    /// Latest end time across all assignments so far
    pub fn makespan(&self) -> Minutes {
        self.makespan
    }

    /// Shop floor registry
    pub fn floor(&self) -> &ShopFloor {
        &self.floor
    }

    /// Performance history
    pub fn performance(&self) -> &PerformanceModel {
        &self.performance
    }

    /// Event queue
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Run log, one record per processed event
    pub fn log(&self) -> &[LogRecord] {
        &self.log
    }

    /// Resource occupancy
    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Completed tasks
    pub fn completed_tasks(&self) -> &BTreeSet<TaskId> {
        &self.completed
    }

    /// Whether a task has finished all its units
    pub fn is_task_complete(&self, task: &TaskId) -> bool {
        self.completed.contains(task)
    }

    /// All assignments in creation order
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Look up an assignment
    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        (id.0 as usize).checked_sub(1).and_then(|idx| self.assignments.get(idx))
    }

    pub(crate) fn assignment_mut(&mut self, id: AssignmentId) -> Option<&mut Assignment> {
        (id.0 as usize).checked_sub(1).and_then(|idx| self.assignments.get_mut(idx))
    }

    pub(crate) fn next_assignment_id(&self) -> AssignmentId {
        AssignmentId(self.assignments.len() as u64 + 1)
    }

    /// Assignments not yet completed
    pub fn active_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(|a| a.is_active())
    }

    /// Assignment currently holding a machine
    pub fn machine_holder(&self, machine: &MachineId) -> Option<&Assignment> {
        self.occupancy.machine(machine).and_then(|id| self.assignment(id))
    }

    /// Whether an operator holds no assignment
    pub fn is_operator_idle(&self, operator: &OperatorId) -> bool {
        self.occupancy.operator(operator).is_none()
    }

    /// Schedule an event
    ///
    /// Events before the current clock or with a non-finite time are refused.
    pub fn enqueue(
        &mut self,
        kind: EventKind,
        at: Minutes,
        task: Option<TaskId>,
        operator: Option<OperatorId>,
        detail: EventDetail,
    ) -> SimulationResult<EventId> {
        if !at.is_finite() || at < self.now() {
            return Err(SimulationError::scheduling(format!(
                "cannot schedule {} at {} (clock is {})",
                kind,
                at,
                self.now()
            )));
        }
        Ok(self.queue.push(kind, at, task, operator, detail))
    }

    /// Read-only view of the run
    pub fn snapshot(&self) -> SimulationSnapshot {
        let now = self.now();
        let operator_loads = self
            .floor
            .operators()
            .iter()
            .map(|operator| OperatorLoad {
                operator: operator.id().clone(),
                work_minutes: operator.work_minutes,
                idle_minutes: operator.idle_minutes_at(now),
                current_assignment: self.occupancy.operator(operator.id()),
            })
            .collect();

        SimulationSnapshot {
            simulation_id: self.id,
            state: self.run_state,
            clock: now,
            clock_at: self.clock.current_timestamp(),
            horizon: self.horizon,
            makespan: self.makespan,
            completed_tasks: self.completed.iter().cloned().collect(),
            active_assignments: self.active_assignments().cloned().collect(),
            operator_loads,
            pending_events: self.queue.pending_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::{MachineSpec, OperatorSpec, ProductSpec, ShopFloorConfig, TaskSpec};

    fn state() -> SimulationState {
        let config = ShopFloorConfig::new()
            .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["T1"]))
            .with_machine(MachineSpec::new("M1"))
            .with_product(ProductSpec::new("P1", 1, 1.0))
            .with_task(TaskSpec::new("T1", "P1", 1, "M1", 10.0));
        let floor = ShopFloor::from_config(config).unwrap();
        SimulationState::new(floor, PerformanceModel::default(), 480.0, VirtualClock::new())
    }

    fn assignment(id: u64, operator: &str, machine: &str) -> Assignment {
        Assignment {
            id: AssignmentId(id),
            operator: operator.into(),
            task: "T1".into(),
            machine: machine.into(),
            start: 0.0,
            end: 10.0,
            duration: 10.0,
            performance: 1.0,
            in_progress: false,
            completed: false,
        }
    }

    #[test]
    fn test_double_booking_is_an_invariant_violation() {
        let mut occupancy = Occupancy::default();
        occupancy.claim(&assignment(1, "OP1", "M1")).unwrap();

        let same_machine = occupancy.claim(&assignment(2, "OP2", "M1")).unwrap_err();
        assert!(matches!(same_machine, SimulationError::InvariantViolation(_)));
        let same_operator = occupancy.claim(&assignment(3, "OP1", "M2")).unwrap_err();
        assert!(matches!(same_operator, SimulationError::InvariantViolation(_)));

        occupancy.release(&assignment(1, "OP1", "M1")).unwrap();
        occupancy.claim(&assignment(2, "OP2", "M1")).unwrap();
        assert!(occupancy.release(&assignment(1, "OP1", "M1")).is_err());
    }

    #[test]
    fn test_enqueue_rejects_past_times() {
        let mut state = state();
        state.clock.advance_to(30.0).unwrap();

        let err = state
            .enqueue(EventKind::TaskBecameAvailable, 10.0, None, None, EventDetail::None)
            .unwrap_err();
        assert!(matches!(err, SimulationError::Scheduling(_)));
        assert!(state
            .enqueue(EventKind::TaskBecameAvailable, 30.0, None, None, EventDetail::None)
            .is_ok());
        assert!(state
            .enqueue(EventKind::TaskStarted, f64::NAN, None, None, EventDetail::None)
            .is_err());
    }

    #[test]
    fn test_fresh_snapshot() {
        let snapshot = state().snapshot();
        assert_eq!(snapshot.state, RunState::Initialized);
        assert_eq!(snapshot.clock, 0.0);
        assert!(snapshot.completed_tasks.is_empty());
        assert_eq!(snapshot.operator_loads.len(), 1);
        assert!(snapshot.clock_at.is_none());
    }
}
