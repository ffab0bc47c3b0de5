//! Discrete-event engine
//!
//! Pops events in time order, applies their transitions to the
//! [`SimulationState`], asks the [`DispatchPolicy`] for new pairings and
//! enqueues follow-on events. Each event is applied as one unit: all checks
//! run before the first mutation, so a failed event leaves no partial
//! assignment behind.
//!
//! Failures inside an event mark that event errored and the run moves on.
//! Only an invariant violation (a double-booked machine or operator) stops
//! the run, which then enters [`RunState::Aborted`].

use super::{
    assignment::Assignment,
    clock::VirtualClock,
    error::{ErrorHandler, RecoveryStrategy, SimulationError, SimulationResult, SinkError},
    event::{EventDetail, SimEvent},
    logging::LogRecord,
    sink::{MemorySink, SimulationSink},
    state::{SimulationSnapshot, SimulationState},
};
use crate::dispatch::{
    policy::PERFORMANCE_FLOOR, AvailabilityResolver, BlockedTask, DispatchPolicy,
};
use crate::performance::PerformanceModel;
use crate::shop::ShopFloor;
use crate::types::{
    AssignmentId, EventId, EventKind, Minutes, OperatorId, OutcomeStatus, RunState,
    SimulationConfig, TaskId,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// Result of applying one event
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedEvent {
    /// The event with its final flags
    pub event: SimEvent,
    /// Outcome status
    pub outcome: OutcomeStatus,
    /// Human-readable description, also written to the run log
    pub message: String,
    /// Assignments created while applying the event
    pub assignments: Vec<AssignmentId>,
}

/// What one call to [`EventEngine::run_slice`] did
#[derive(Debug, Clone, Serialize)]
pub struct SliceReport {
    /// Start of the slice window
    pub slice_start: Minutes,
    /// End of the slice window
    pub slice_end: Minutes,
    /// Events processed, in processing order
    pub processed: Vec<ProcessedEvent>,
    /// Clock after the slice
    pub clock: Minutes,
    /// Run state after the slice
    pub state: RunState,
}

impl SliceReport {
    /// Number of events that failed
    pub fn errored_count(&self) -> usize {
        self.processed.iter().filter(|p| p.outcome == OutcomeStatus::Error).count()
    }
}

/// Outcome of a handler before it is logged
struct Applied {
    outcome: OutcomeStatus,
    message: String,
    assignments: Vec<AssignmentId>,
}

impl Applied {
    fn success(message: String) -> Self {
        Self { outcome: OutcomeStatus::Success, message, assignments: Vec::new() }
    }
}

/// Discrete-event simulation engine
pub struct EventEngine {
    state: SimulationState,
    policy: DispatchPolicy,
    sink: Box<dyn SimulationSink>,
    error_handler: ErrorHandler,
    slice_cursor: Minutes,
    sink_failures: Vec<String>,
}

impl fmt::Debug for EventEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEngine")
            .field("simulation", &self.state.id())
            .field("state", &self.state.run_state())
            .field("clock", &self.state.now())
            .field("policy", &self.policy)
            .field("slice_cursor", &self.slice_cursor)
            .field("sink_failures", &self.sink_failures.len())
            .finish()
    }
}

impl EventEngine {
    /// Build an engine for a validated shop floor
    ///
    /// Every operator is registered with the performance model and a
    /// `TaskBecameAvailable` event is seeded at minute zero for every task
    /// without a predecessor.
    #[instrument(skip_all, fields(horizon = config.horizon_minutes))]
    pub fn new(floor: ShopFloor, config: &SimulationConfig) -> SimulationResult<Self> {
        let mut performance = PerformanceModel::new(config.default_performance);
        for operator in floor.operators() {
            performance.register_operator(operator.id().clone(), (&operator.spec).into());
        }
        let clock = match config.epoch {
            Some(epoch) => VirtualClock::with_epoch(epoch),
            None => VirtualClock::new(),
        };

        let mut state = SimulationState::new(floor, performance, config.horizon_minutes, clock);
        let roots: Vec<TaskId> = state.floor().root_tasks().map(|task| task.id.clone()).collect();
        for task in roots {
            state.enqueue(
                EventKind::TaskBecameAvailable,
                0.0,
                Some(task),
                None,
                EventDetail::None,
            )?;
        }

        info!(
            simulation = %state.id(),
            operators = state.floor().operators().len(),
            tasks = state.floor().tasks().len(),
            seeded = state.queue().pending_len(),
            "Simulation initialized"
        );

        Ok(Self {
            state,
            policy: DispatchPolicy::new(config.weights),
            sink: Box::new(MemorySink::new()),
            error_handler: ErrorHandler::new(),
            slice_cursor: 0.0,
            sink_failures: Vec::new(),
        })
    }

    /// Replace the persistence sink
    pub fn with_sink(mut self, sink: Box<dyn SimulationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Dispatch policy in use
    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Sink failures reported so far
    pub fn sink_failures(&self) -> &[String] {
        &self.sink_failures
    }

    /// Read-only view of the run
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.state.snapshot()
    }

    /// Blocked tasks at the current clock
    pub fn blocked_tasks(&self) -> Vec<BlockedTask> {
        AvailabilityResolver::new(&self.state).blocked_tasks()
    }

    /// Schedule an arbitrary event
    pub fn enqueue(
        &mut self,
        kind: EventKind,
        at: Minutes,
        task: Option<TaskId>,
        operator: Option<OperatorId>,
    ) -> SimulationResult<EventId> {
        self.state.enqueue(kind, at, task, operator, EventDetail::None)
    }

    /// Ask the run to stop at the current clock
    ///
    /// Events already due at the current time are processed first.
    pub fn request_halt(&mut self, reason: impl Into<String>) -> SimulationResult<EventId> {
        if self.state.run_state().is_terminal() {
            return Err(SimulationError::scheduling(format!(
                "run already finished in state {}",
                self.state.run_state()
            )));
        }
        let now = self.state.now();
        self.state.enqueue(
            EventKind::SimulationHalted,
            now,
            None,
            None,
            EventDetail::Halt { reason: reason.into() },
        )
    }

    /// Process every event due within the next `minutes` of virtual time
    ///
    /// The window starts where the previous slice ended and is capped at the
    /// horizon. Per-event failures are part of the report; only an invariant
    /// violation is returned as an error.
    #[instrument(skip(self), fields(simulation = %self.state.id()))]
    pub fn run_slice(&mut self, minutes: Minutes) -> SimulationResult<SliceReport> {
        let slice_start = self.slice_cursor;
        let slice_end = (self.slice_cursor + minutes.max(0.0)).min(self.state.horizon());
        let mut processed = Vec::new();

        if self.state.run_state().is_terminal() {
            return Ok(self.slice_report(slice_start, slice_start, processed));
        }
        if self.state.run_state() == RunState::Initialized {
            self.state.run_state = RunState::Running;
            info!(simulation = %self.state.id(), "Simulation running");
        }

        while let Some((id, at)) = self.state.queue().peek() {
            if at > slice_end {
                break;
            }
            if let Some(result) = self.process_event(id)? {
                processed.push(result);
            }
            if self.state.run_state().is_terminal() {
                break;
            }
        }
        self.slice_cursor = slice_end;

        if self.state.run_state() == RunState::Running && self.nothing_due_before_horizon() {
            self.state.run_state = RunState::Exhausted;
            info!(
                simulation = %self.state.id(),
                clock = self.state.now(),
                makespan = self.state.makespan(),
                "Simulation exhausted"
            );
        }
        self.flush_sink();

        debug!(
            slice_start,
            slice_end,
            processed = processed.len(),
            state = %self.state.run_state(),
            "Slice finished"
        );
        Ok(self.slice_report(slice_start, slice_end, processed))
    }

    /// Run slices of `slice_minutes` until the run reaches a terminal state
    pub fn run_to_completion(
        &mut self,
        slice_minutes: Minutes,
    ) -> SimulationResult<Vec<SliceReport>> {
        if slice_minutes.is_nan() || slice_minutes <= 0.0 {
            return Err(SimulationError::scheduling(format!(
                "slice length must be positive, got {}",
                slice_minutes
            )));
        }
        let mut reports = Vec::new();
        while !self.state.run_state().is_terminal() {
            reports.push(self.run_slice(slice_minutes)?);
        }
        Ok(reports)
    }

    fn nothing_due_before_horizon(&self) -> bool {
        self.state.queue().peek().map_or(true, |(_, at)| at > self.state.horizon())
    }

    fn slice_report(
        &self,
        slice_start: Minutes,
        slice_end: Minutes,
        processed: Vec<ProcessedEvent>,
    ) -> SliceReport {
        SliceReport {
            slice_start,
            slice_end,
            processed,
            clock: self.state.now(),
            state: self.state.run_state(),
        }
    }

    /// Apply one event
    ///
    /// Returns `Ok(None)` for an event that was already processed or when the
    /// run has reached a terminal state. Only the next due event may be
    /// processed, which keeps the clock monotonic.
    pub fn process_event(&mut self, id: EventId) -> SimulationResult<Option<ProcessedEvent>> {
        let event = match self.state.queue().get(id) {
            Some(event) => event.clone(),
            None => return Err(SimulationError::scheduling(format!("unknown event {}", id))),
        };
        if event.processed || self.state.run_state().is_terminal() {
            return Ok(None);
        }
        if self.state.queue().peek().map(|(next, _)| next) != Some(id) {
            return Err(SimulationError::scheduling(format!(
                "{} is not the next due event",
                id
            )));
        }
        if event.scheduled_at > self.state.horizon() {
            return Err(SimulationError::scheduling(format!(
                "{} is scheduled after the horizon",
                id
            )));
        }

        self.state.queue.pop_due(event.scheduled_at);
        if let Err(err) = self.state.clock.advance_to(event.scheduled_at) {
            return Err(self.abort(err, &event));
        }
        if self.state.run_state() == RunState::Initialized {
            self.state.run_state = RunState::Running;
        }

        let applied = match event.kind {
            EventKind::TaskBecameAvailable => self.on_task_available(&event),
            EventKind::TaskStarted => self.on_task_started(&event),
            EventKind::TaskCompleted => self.on_task_completed(&event),
            EventKind::SimulationHalted => Ok(self.on_halt(&event)),
        };

        let (applied, errored) = match applied {
            Ok(applied) => (applied, false),
            Err(err) => match self.error_handler.handle_error(&err, &event.describe()) {
                RecoveryStrategy::Abort => return Err(self.abort(err, &event)),
                RecoveryStrategy::Skip => (
                    Applied {
                        outcome: OutcomeStatus::Error,
                        message: format!("{} failed: {}", event.id, err),
                        assignments: Vec::new(),
                    },
                    true,
                ),
            },
        };

        Ok(Some(self.finish_event(event, applied, errored)))
    }

    fn finish_event(
        &mut self,
        event: SimEvent,
        applied: Applied,
        errored: bool,
    ) -> ProcessedEvent {
        self.state.queue.mark_processed(event.id, errored);
        let event = self.state.queue().get(event.id).cloned().unwrap_or(SimEvent {
            processed: true,
            errored,
            ..event
        });

        let record = if errored {
            LogRecord::error(applied.message.clone(), event.scheduled_at)
        } else {
            LogRecord::info(applied.message.clone(), event.scheduled_at)
        };
        debug!(event = %event.id, outcome = %applied.outcome, "{}", applied.message);

        let persisted_event = self.sink.persist_event(&event);
        self.record_sink_result(persisted_event, "event");
        let persisted_log = self.sink.append_log(&record);
        self.record_sink_result(persisted_log, "log record");
        self.state.log.push(record);

        ProcessedEvent {
            event,
            outcome: applied.outcome,
            message: applied.message,
            assignments: applied.assignments,
        }
    }

    fn abort(&mut self, err: SimulationError, event: &SimEvent) -> SimulationError {
        error!(event = %event.id, "Aborting simulation: {}", err);
        self.state.run_state = RunState::Aborted;
        self.state.queue.mark_processed(event.id, true);
        let record =
            LogRecord::error(format!("{} aborted the run: {}", event.id, err), self.state.now());
        let persisted = self.sink.append_log(&record);
        self.record_sink_result(persisted, "log record");
        self.state.log.push(record);
        self.flush_sink();
        err
    }

    fn record_sink_result(&mut self, result: Result<(), SinkError>, what: &str) {
        if let Err(err) = result {
            warn!(what, "Persistence sink failed: {}", err);
            self.sink_failures.push(format!("{} at {:.2}: {}", what, self.state.now(), err));
        }
    }

    fn flush_sink(&mut self) {
        let flushed = self.sink.flush();
        self.record_sink_result(flushed, "flush");
    }

    fn on_task_available(&mut self, event: &SimEvent) -> SimulationResult<Applied> {
        let task_id = event.task.as_ref().ok_or_else(|| {
            SimulationError::event_processing("availability event without a task")
        })?;
        if self.state.floor().task(task_id).is_none() {
            return Err(SimulationError::event_processing(format!("unknown task {}", task_id)));
        }

        let idle: Vec<OperatorId> = self
            .state
            .floor()
            .operators()
            .iter()
            .map(|operator| operator.id().clone())
            .filter(|operator| self.state.is_operator_idle(operator))
            .collect();

        let consulted = idle.len();
        let mut created = Vec::new();
        let mut waiting = Vec::new();
        for operator in idle {
            let Some(choice) = self.policy.choose_task(&operator, &self.state) else {
                continue;
            };
            if choice.available {
                let assignment = self.create_assignment(&operator, &choice.task)?;
                created.push(assignment);
            } else {
                debug!(
                    operator = %operator,
                    task = %choice.task,
                    wait = choice.wait_minutes,
                    "Operator waits for a blocked task"
                );
                waiting.push(format!("{} waits for {}", operator, choice.task));
            }
        }

        if created.is_empty() {
            let remaining = self.state.floor().task(task_id).map_or(0, |task| task.remaining);
            if remaining == 0 {
                return Ok(Applied {
                    outcome: OutcomeStatus::Success,
                    message: format!("Task {} already assigned", task_id),
                    assignments: created,
                });
            }
            // Operators are re-offered work on the next completion
            if consulted == 0 {
                return Ok(Applied {
                    outcome: OutcomeStatus::Success,
                    message: format!("Task {} deferred: no idle operator", task_id),
                    assignments: created,
                });
            }
            let mut message = format!("No operator assigned for task {}", task_id);
            if !waiting.is_empty() {
                message.push_str(&format!(" ({})", waiting.join(", ")));
            }
            return Ok(Applied {
                outcome: OutcomeStatus::NoOperator,
                message,
                assignments: created,
            });
        }

        let described: Vec<String> = created
            .iter()
            .filter_map(|id| self.state.assignment(*id))
            .map(|a| format!("{} -> {} on {} until {:.2}", a.operator, a.task, a.machine, a.end))
            .collect();
        Ok(Applied {
            outcome: OutcomeStatus::Success,
            message: format!("Task {} available: {}", task_id, described.join("; ")),
            assignments: created,
        })
    }

    /// Create one assignment and its start and completion events as one unit
    fn create_assignment(
        &mut self,
        operator: &OperatorId,
        task_id: &TaskId,
    ) -> SimulationResult<AssignmentId> {
        let now = self.state.now();
        let task = self.state.floor().task(task_id).ok_or_else(|| {
            SimulationError::event_processing(format!("unknown task {}", task_id))
        })?;
        if !task.has_remaining() {
            return Err(SimulationError::event_processing(format!(
                "task {} has no remaining units",
                task_id
            )));
        }

        let performance = self.state.performance().most_recent_performance(operator, task_id);
        let duration = task.standard_minutes / performance.max(PERFORMANCE_FLOOR);
        let assignment = Assignment {
            id: self.state.next_assignment_id(),
            operator: operator.clone(),
            task: task_id.clone(),
            machine: task.machine.clone(),
            start: now,
            end: now + duration,
            duration,
            performance,
            in_progress: false,
            completed: false,
        };

        // Every check is done; from here on the unit commits
        self.state.occupancy.claim(&assignment)?;
        if let Some(task) = self.state.floor.task_mut(task_id) {
            task.take_unit();
        }
        if let Some(op) = self.state.floor.operator_mut(operator) {
            op.begin_work(now);
        }
        self.state.makespan = self.state.makespan.max(assignment.end);

        let detail = EventDetail::Assignment { assignment: assignment.id };
        self.state.enqueue(
            EventKind::TaskStarted,
            assignment.start,
            Some(task_id.clone()),
            Some(operator.clone()),
            detail.clone(),
        )?;
        self.state.enqueue(
            EventKind::TaskCompleted,
            assignment.end,
            Some(task_id.clone()),
            Some(operator.clone()),
            detail,
        )?;

        let persisted = self.sink.persist_assignment(&assignment);
        self.record_sink_result(persisted, "assignment");

        let id = assignment.id;
        self.state.assignments.push(assignment);
        Ok(id)
    }

    fn assignment_of(&self, event: &SimEvent) -> SimulationResult<&Assignment> {
        let id = event.detail.assignment().ok_or_else(|| {
            SimulationError::event_processing(format!("{} carries no assignment", event.id))
        })?;
        self.state
            .assignment(id)
            .ok_or_else(|| SimulationError::event_processing(format!("unknown assignment {}", id)))
    }

    fn on_task_started(&mut self, event: &SimEvent) -> SimulationResult<Applied> {
        let id = self.assignment_of(event)?.id;
        let assignment = self.state.assignment_mut(id).ok_or_else(|| {
            SimulationError::event_processing(format!("unknown assignment {}", id))
        })?;
        assignment.in_progress = true;

        Ok(Applied::success(format!(
            "Task {} started by {} on {} ({})",
            assignment.task, assignment.operator, assignment.machine, assignment.id
        )))
    }

    fn on_task_completed(&mut self, event: &SimEvent) -> SimulationResult<Applied> {
        let assignment = self.assignment_of(event)?.clone();
        if assignment.completed {
            return Err(SimulationError::event_processing(format!(
                "{} is already completed",
                assignment.id
            )));
        }
        let now = self.state.now();

        self.state.occupancy.release(&assignment)?;
        if let Some(stored) = self.state.assignment_mut(assignment.id) {
            stored.in_progress = false;
            stored.completed = true;
        }
        if let Some(operator) = self.state.floor.operator_mut(&assignment.operator) {
            operator.end_work(now, assignment.duration);
        }

        let sample =
            self.state.performance.current_performance(&assignment.operator, &assignment.task, now);
        let performance_note = match &sample {
            Some(sample) => {
                let persisted = self.sink.persist_performance_sample(sample);
                self.record_sink_result(persisted, "performance sample");
                format!("performance now {:.4}", sample.value)
            }
            None => "no performance parameters".to_string(),
        };

        let task_done =
            self.state.floor().task(&assignment.task).is_some_and(|t| !t.has_remaining())
                && !self.state.active_assignments().any(|a| a.task == assignment.task);
        if task_done {
            self.state.completed.insert(assignment.task.clone());
        }

        let offered = self.offer_ready_tasks()?;

        let mut message = format!(
            "Task {} completed by {} on {} ({}, {})",
            assignment.task,
            assignment.operator,
            assignment.machine,
            assignment.id,
            performance_note
        );
        if task_done {
            message.push_str(&format!("; task {} complete", assignment.task));
        }
        if !offered.is_empty() {
            message.push_str(&format!("; offering {}", offered.join(", ")));
        }
        Ok(Applied::success(message))
    }

    /// Enqueue an availability event now for every ready task not already offered
    fn offer_ready_tasks(&mut self) -> SimulationResult<Vec<String>> {
        let resolver = AvailabilityResolver::new(&self.state);
        let ready: Vec<TaskId> = self
            .state
            .floor()
            .tasks()
            .iter()
            .filter(|task| resolver.is_ready(task))
            .filter(|task| {
                !self.state.queue().has_pending(EventKind::TaskBecameAvailable, &task.id)
            })
            .map(|task| task.id.clone())
            .collect();

        let now = self.state.now();
        for task in &ready {
            self.state.enqueue(
                EventKind::TaskBecameAvailable,
                now,
                Some(task.clone()),
                None,
                EventDetail::None,
            )?;
        }
        Ok(ready.into_iter().map(|task| task.to_string()).collect())
    }

    fn on_halt(&mut self, event: &SimEvent) -> Applied {
        self.state.run_state = RunState::Halted;
        let reason = match &event.detail {
            EventDetail::Halt { reason } => reason.as_str(),
            _ => "halt requested",
        };
        info!(
            simulation = %self.state.id(),
            clock = self.state.now(),
            reason,
            "Simulation halted"
        );
        Applied::success(format!("Simulation halted: {}", reason))
    }
}
