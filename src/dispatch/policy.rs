//! Multi-criteria dispatch policy
//!
//! Each candidate (operator, task) pairing is scored on four criteria, each
//! normalized to `[0, 1]`:
//!
//! | criterion   | score                                                       |
//! |-------------|-------------------------------------------------------------|
//! | cost        | `1 - min(sub_performance_cost / 1000, 1)`                   |
//! | performance | `performance / 1.15`                                        |
//! | equity      | `1 - min(stddev(work minutes of all operators) / 480, 1)`   |
//! | makespan    | `1 - min(max(0, est_completion - makespan) / 240, 1)`       |
//!
//! The composite is the weighted sum minus `wait / 1440`, clamped to `[0, 1]`.
//! The highest composite wins; scores within `1e-9` of each other are broken
//! by the shorter wait, then by registry order.

use super::availability::{AvailabilityResolver, CandidateTask};
use crate::simulation::SimulationState;
use crate::types::{defaults, DispatchWeights, Minutes, OperatorId, TaskId, MINUTES_PER_DAY};
use serde::Serialize;
use tracing::trace;

/// Sub-performance cost at which the cost score reaches zero
pub const COST_SCALE: f64 = 1000.0;

/// Work-time standard deviation at which the equity score reaches zero
pub const EQUITY_SCALE_MINUTES: Minutes = 480.0;

/// Makespan extension at which the makespan score reaches zero
pub const MAKESPAN_SCALE_MINUTES: Minutes = 240.0;

/// Lowest performance used to derive durations and costs
pub const PERFORMANCE_FLOOR: f64 = 0.01;

const SCORE_EPSILON: f64 = 1e-9;

/// Cost of the minutes spent beyond standard on one unit
///
/// `((standard / performance) - standard) * CR`, with performance floored at
/// [`PERFORMANCE_FLOOR`]. Negative when faster than standard.
pub fn sub_performance_cost(standard_minutes: Minutes, performance: f64, cost_rate: f64) -> f64 {
    let actual = standard_minutes / performance.max(PERFORMANCE_FLOOR);
    (actual - standard_minutes) * cost_rate
}

/// Cost score of executing a unit of `standard_minutes` at `performance`
pub fn cost_score(standard_minutes: Minutes, performance: f64, cost_rate: f64) -> f64 {
    let cost = sub_performance_cost(standard_minutes, performance, cost_rate);
    // Faster than standard earns no bonus
    (1.0 - (cost / COST_SCALE).min(1.0)).clamp(0.0, 1.0)
}

/// Performance score
pub fn performance_score(performance: f64) -> f64 {
    (performance / defaults::MAX_PERFORMANCE).clamp(0.0, 1.0)
}

/// Equity score from every operator's cumulative work time
///
/// Uses the population standard deviation.
pub fn equity_score(work_minutes: &[Minutes]) -> f64 {
    if work_minutes.is_empty() {
        return 1.0;
    }
    let n = work_minutes.len() as f64;
    let mean = work_minutes.iter().sum::<f64>() / n;
    let variance = work_minutes.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
    1.0 - (variance.sqrt() / EQUITY_SCALE_MINUTES).min(1.0)
}

/// Makespan score of finishing at `estimated_completion`
pub fn makespan_score(estimated_completion: Minutes, makespan: Minutes) -> f64 {
    let extension = (estimated_completion - makespan).max(0.0);
    1.0 - (extension / MAKESPAN_SCALE_MINUTES).min(1.0)
}

/// Per-criterion scores of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Cost score
    pub cost: f64,
    /// Performance score
    pub performance: f64,
    /// Equity score
    pub equity: f64,
    /// Makespan score
    pub makespan: f64,
    /// `wait / 1440`
    pub wait_penalty: f64,
    /// Weighted, penalized and clamped total
    pub composite: f64,
}

/// A scored (operator, task) pairing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Operator the candidate was scored for
    pub operator: OperatorId,
    /// Candidate task
    pub task: TaskId,
    /// Estimated wait before the task can start
    pub wait_minutes: Minutes,
    /// Whether the task can start now
    pub available: bool,
    /// Performance used for scoring
    pub performance: f64,
    /// Estimated duration of one unit
    pub estimated_duration: Minutes,
    /// `now + wait + duration`
    pub estimated_completion: Minutes,
    /// Scores
    pub score: ScoreBreakdown,
}

/// Weighted dispatch policy
#[derive(Debug, Clone, Default)]
pub struct DispatchPolicy {
    weights: DispatchWeights,
}

impl DispatchPolicy {
    /// Create a policy with the given weight vector
    pub fn new(weights: DispatchWeights) -> Self {
        Self { weights }
    }

    /// Weight vector in use
    pub fn weights(&self) -> &DispatchWeights {
        &self.weights
    }

    /// Combine the criteria into the composite score
    pub fn composite(
        &self,
        cost: f64,
        performance: f64,
        equity: f64,
        makespan: f64,
        wait_minutes: Minutes,
    ) -> ScoreBreakdown {
        let wait_penalty = wait_minutes / MINUTES_PER_DAY;
        let weighted = self.weights.cost * cost
            + self.weights.performance * performance
            + self.weights.equity * equity
            + self.weights.makespan * makespan;
        let composite = (weighted - wait_penalty).clamp(0.0, 1.0);
        ScoreBreakdown { cost, performance, equity, makespan, wait_penalty, composite }
    }

    /// Score every candidate of `operator` in registry order
    pub fn score_candidates(
        &self,
        operator: &OperatorId,
        state: &SimulationState,
    ) -> Vec<Candidate> {
        let resolver = AvailabilityResolver::new(state);
        let work: Vec<Minutes> =
            state.floor().operators().iter().map(|op| op.work_minutes).collect();
        let equity = equity_score(&work);
        let now = state.now();

        resolver
            .candidates(operator)
            .into_iter()
            .map(|candidate| self.score_candidate(operator, candidate, state, equity, now))
            .collect()
    }

    fn score_candidate(
        &self,
        operator: &OperatorId,
        candidate: CandidateTask<'_>,
        state: &SimulationState,
        equity: f64,
        now: Minutes,
    ) -> Candidate {
        let task = candidate.task;
        let performance = state.performance().most_recent_performance(operator, &task.id);
        let estimated_duration = task.standard_minutes / performance.max(PERFORMANCE_FLOOR);
        let estimated_completion = now + candidate.wait_minutes + estimated_duration;

        let score = self.composite(
            cost_score(task.standard_minutes, performance, task.cost_rate),
            performance_score(performance),
            equity,
            makespan_score(estimated_completion, state.makespan()),
            candidate.wait_minutes,
        );

        trace!(
            operator = %operator,
            task = %task.id,
            wait = candidate.wait_minutes,
            composite = score.composite,
            "Scored candidate"
        );

        Candidate {
            operator: operator.clone(),
            task: task.id.clone(),
            wait_minutes: candidate.wait_minutes,
            available: candidate.available,
            performance,
            estimated_duration,
            estimated_completion,
            score,
        }
    }

    /// Pick the best task for `operator`, or `None` when nothing is eligible
    ///
    /// The chosen task may be blocked; the caller then lets the operator wait.
    pub fn choose_task(
        &self,
        operator: &OperatorId,
        state: &SimulationState,
    ) -> Option<Candidate> {
        select_best(self.score_candidates(operator, state))
    }
}

/// Highest composite, then shortest wait, then first in order
pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            let delta = candidate.score.composite - current.score.composite;
            let better = delta > SCORE_EPSILON
                || (delta.abs() <= SCORE_EPSILON && candidate.wait_minutes < current.wait_minutes);
            if better {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}
