//! Statistics collection and reporting
//!
//! [`RunStatistics`] is built from the final engine state plus the slice
//! reports of a run. It is the single source of truth for the counts shown in
//! the CLI summary and written to the JSON report.

use super::engine::{EventEngine, SliceReport};
use crate::performance::PerformanceSample;
use crate::types::{defaults, EventKind, Minutes, OperatorId, OutcomeStatus, RunState, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Work accounting of one operator over a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorUtilization {
    /// Operator identifier
    pub operator: OperatorId,
    /// Cumulative work time
    pub work_minutes: Minutes,
    /// Cumulative idle time up to the final clock
    pub idle_minutes: Minutes,
    /// Work time divided by the makespan, zero for an empty run
    pub utilization: f64,
    /// Assignments executed
    pub assignments: usize,
    /// Latest performance sample per task, in task order
    pub final_performance: Vec<PerformanceSample>,
    /// Mean performance per task over the latest samples, in task order
    pub average_performance: Vec<PerformanceAverage>,
}

/// Mean performance of an operator on one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAverage {
    /// Task the samples belong to
    pub task: TaskId,
    /// Mean of the samples in the window
    pub average: f64,
    /// Samples that went into the mean
    pub samples: usize,
}

/// Consolidated statistics of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Final run state
    pub final_state: RunState,
    /// Final virtual clock
    pub final_clock: Minutes,
    /// Latest end time across all assignments
    pub makespan: Minutes,
    /// Slices executed
    pub slices: usize,
    /// Processed events per kind, keyed by the kind's display name
    pub events_by_kind: BTreeMap<String, usize>,
    /// Total processed events
    pub total_events: usize,
    /// Events still pending when the run ended
    pub pending_events: usize,
    /// Assignments created
    pub assignments_created: usize,
    /// Availability events that produced no assignment
    pub no_operator_events: usize,
    /// Events that failed
    pub errored_events: usize,
    /// Tasks whose every unit completed
    pub completed_tasks: usize,
    /// Tasks registered on the shop floor
    pub total_tasks: usize,
    /// Performance samples recorded
    pub performance_samples: usize,
    /// Per-operator accounting, in registry order
    pub operators: Vec<OperatorUtilization>,
    /// Persistence sink failures
    pub sink_failures: usize,
}

impl RunStatistics {
    /// Collect statistics from an engine and the slices it ran
    pub fn collect(engine: &EventEngine, slices: &[SliceReport]) -> Self {
        let state = engine.state();
        let mut events_by_kind: BTreeMap<String, usize> =
            EventKind::ALL.iter().map(|kind| (kind.to_string(), 0)).collect();
        let mut no_operator_events = 0;
        let mut errored_events = 0;
        let mut total_events = 0;

        for processed in slices.iter().flat_map(|slice| slice.processed.iter()) {
            total_events += 1;
            *events_by_kind.entry(processed.event.kind.to_string()).or_default() += 1;
            match processed.outcome {
                OutcomeStatus::NoOperator => no_operator_events += 1,
                OutcomeStatus::Error => errored_events += 1,
                OutcomeStatus::Success => {}
            }
        }

        let makespan = state.makespan();
        let now = state.now();
        let operators = state
            .floor()
            .operators()
            .iter()
            .map(|operator| {
                let id = operator.id();
                let performance = state.performance();
                let latest = performance.latest_for_operator(id);
                let average_performance = latest
                    .iter()
                    .map(|sample| PerformanceAverage {
                        task: sample.task.clone(),
                        average: performance.average_performance(
                            id,
                            &sample.task,
                            defaults::PERFORMANCE_WINDOW,
                        ),
                        samples: performance
                            .repetitions(id, &sample.task)
                            .min(defaults::PERFORMANCE_WINDOW),
                    })
                    .collect();
                OperatorUtilization {
                    operator: id.clone(),
                    work_minutes: operator.work_minutes,
                    idle_minutes: operator.idle_minutes_at(now),
                    utilization: utilization(operator.work_minutes, makespan),
                    assignments: state
                        .assignments()
                        .iter()
                        .filter(|a| &a.operator == id)
                        .count(),
                    final_performance: latest.into_iter().cloned().collect(),
                    average_performance,
                }
            })
            .collect();

        Self {
            final_state: state.run_state(),
            final_clock: now,
            makespan,
            slices: slices.len(),
            events_by_kind,
            total_events,
            pending_events: state.queue().pending_len(),
            assignments_created: state.assignments().len(),
            no_operator_events,
            errored_events,
            completed_tasks: state.completed_tasks().len(),
            total_tasks: state.floor().tasks().len(),
            performance_samples: state.performance().sample_count(),
            operators,
            sink_failures: engine.sink_failures().len(),
        }
    }

    /// Processed events of one kind
    pub fn events_of(&self, kind: EventKind) -> usize {
        self.events_by_kind.get(&kind.to_string()).copied().unwrap_or(0)
    }

    /// Share of tasks completed, in percent
    pub fn completion_percentage(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            (self.completed_tasks as f64 / self.total_tasks as f64) * 100.0
        }
    }

    /// Mean utilization across operators
    pub fn average_utilization(&self) -> f64 {
        if self.operators.is_empty() {
            0.0
        } else {
            self.operators.iter().map(|op| op.utilization).sum::<f64>()
                / self.operators.len() as f64
        }
    }

    /// Generate a comprehensive summary report
    pub fn generate_summary_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Simulation Summary Report ===\n\n");
        report.push_str(&format!("Final State: {}\n", self.final_state));
        report.push_str(&format!("Final Clock: {:.2} min\n", self.final_clock));
        report.push_str(&format!("Makespan: {:.2} min\n", self.makespan));
        report.push_str(&format!("Slices: {}\n\n", self.slices));

        report.push_str("Event Statistics:\n");
        report.push_str(&format!("  • Total Events: {}\n", self.total_events));
        for (kind, count) in &self.events_by_kind {
            report.push_str(&format!("  • {}: {}\n", kind, count));
        }
        report.push_str(&format!("  • No Operator: {}\n", self.no_operator_events));
        report.push_str(&format!("  • Errored: {}\n", self.errored_events));
        report.push_str(&format!("  • Still Pending: {}\n\n", self.pending_events));

        report.push_str("Production:\n");
        report.push_str(&format!("  • Assignments: {}\n", self.assignments_created));
        report.push_str(&format!(
            "  • Completed Tasks: {} of {} ({:.1}%)\n",
            self.completed_tasks,
            self.total_tasks,
            self.completion_percentage()
        ));
        report.push_str(&format!("  • Performance Samples: {}\n\n", self.performance_samples));

        report.push_str("Operators:\n");
        for op in &self.operators {
            report.push_str(&format!(
                "  • {}: {} assignments, {:.1} min worked, {:.1}% utilization\n",
                op.operator,
                op.assignments,
                op.work_minutes,
                op.utilization * 100.0
            ));
            for avg in &op.average_performance {
                report.push_str(&format!(
                    "      {}: mean performance {:.3} over {} samples\n",
                    avg.task, avg.average, avg.samples
                ));
            }
        }

        if self.sink_failures > 0 {
            report.push_str(&format!("\nSink Failures: {}\n", self.sink_failures));
        }

        report
    }

    /// Generate a compact one-line summary suitable for logging
    pub fn generate_compact_summary(&self) -> String {
        format!(
            "Simulation {}: {} events, {} assignments, {}/{} tasks complete, \
             makespan {:.2} min, avg utilization {:.1}%",
            self.final_state,
            self.total_events,
            self.assignments_created,
            self.completed_tasks,
            self.total_tasks,
            self.makespan,
            self.average_utilization() * 100.0
        )
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_report())
    }
}

fn utilization(work_minutes: Minutes, makespan: Minutes) -> f64 {
    if makespan > 0.0 {
        work_minutes / makespan
    } else {
        0.0
    }
}
