//! Task availability
//!
//! Decides which tasks an operator may start right now and which tasks are
//! blocked, together with an estimate of how long they stay blocked. This and
//! the engine's transition code are the only places exclusivity of machines
//! is checked; the dispatch policy trusts the candidates it is given.

use crate::shop::Task;
use crate::simulation::SimulationState;
use crate::types::{BlockReason, Minutes, OperatorId, TaskId};
use serde::Serialize;

/// A task that cannot start now
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockedTask {
    /// Blocked task
    pub task: TaskId,
    /// Why it is blocked
    pub reason: BlockReason,
    /// Estimated minutes until it unblocks; infinite while the predecessor is open
    pub wait_minutes: Minutes,
}

/// A task an operator could be dispatched to, now or after a wait
#[derive(Debug, Clone, Copy)]
pub struct CandidateTask<'a> {
    /// The task
    pub task: &'a Task,
    /// Estimated wait before it can start, zero when available
    pub wait_minutes: Minutes,
    /// Whether the task can start immediately
    pub available: bool,
}

/// Read-only availability queries over a simulation state
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityResolver<'a> {
    state: &'a SimulationState,
}

impl<'a> AvailabilityResolver<'a> {
    /// Wrap a state
    pub fn new(state: &'a SimulationState) -> Self {
        Self { state }
    }

    /// Whether the predecessor of `task`, if any, has completed
    pub fn predecessor_complete(&self, task: &Task) -> bool {
        task.predecessor.as_ref().map_or(true, |pred| self.state.is_task_complete(pred))
    }

    /// Whether the task's machine holds no active assignment
    pub fn machine_free(&self, task: &Task) -> bool {
        self.state.occupancy().machine(&task.machine).is_none()
    }

    /// Whether a task has units left and its predecessor is done
    ///
    /// Machine state is not considered.
    pub fn is_ready(&self, task: &Task) -> bool {
        task.has_remaining() && self.predecessor_complete(task)
    }

    /// Tasks `operator` may start now, in registry order
    ///
    /// Empty for an unknown operator.
    pub fn available_tasks(&self, operator: &OperatorId) -> Vec<&'a Task> {
        let Some(operator) = self.state.floor().operator(operator) else {
            return Vec::new();
        };
        self.state
            .floor()
            .tasks()
            .iter()
            .filter(|task| operator.has_skill(&task.capability))
            .filter(|task| self.is_ready(task) && self.machine_free(task))
            .collect()
    }

    /// Every task with units left that cannot start now
    ///
    /// An open predecessor is reported before a busy machine.
    pub fn blocked_tasks(&self) -> Vec<BlockedTask> {
        self.state
            .floor()
            .tasks()
            .iter()
            .filter(|task| task.has_remaining())
            .filter_map(|task| self.block_of(task))
            .collect()
    }

    fn block_of(&self, task: &Task) -> Option<BlockedTask> {
        if !self.predecessor_complete(task) {
            return Some(BlockedTask {
                task: task.id.clone(),
                reason: BlockReason::PredecessorIncomplete,
                wait_minutes: f64::INFINITY,
            });
        }
        self.state.machine_holder(&task.machine).map(|holder| BlockedTask {
            task: task.id.clone(),
            reason: BlockReason::MachineBusy,
            wait_minutes: (holder.end - self.state.now()).max(0.0),
        })
    }

    /// Tasks worth scoring for `operator`
    ///
    /// Available tasks plus tasks the operator is qualified for that wait on a
    /// busy machine. Tasks behind an open predecessor have no finite wait and
    /// are left out.
    pub fn candidates(&self, operator: &OperatorId) -> Vec<CandidateTask<'a>> {
        let Some(operator) = self.state.floor().operator(operator) else {
            return Vec::new();
        };
        let now = self.state.now();

        self.state
            .floor()
            .tasks()
            .iter()
            .filter(|task| operator.has_skill(&task.capability) && self.is_ready(task))
            .map(|task| match self.state.machine_holder(&task.machine) {
                None => CandidateTask { task, wait_minutes: 0.0, available: true },
                Some(holder) => CandidateTask {
                    task,
                    wait_minutes: (holder.end - now).max(0.0),
                    available: false,
                },
            })
            .collect()
    }
}
