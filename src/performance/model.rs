//! Learning and forgetting curve
//!
//! Performance of an operator on a task is a time series. Every call to
//! [`PerformanceModel::current_performance`] computes a new value from the
//! history of the pair and appends it; earlier samples are never touched.

use crate::types::{defaults, Minutes, OperatorId, TaskId, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Idle gap tolerated before forgetting sets in
const FORGETTING_GRACE_DAYS: f64 = 1.0;

/// Learning and forgetting parameters of one operator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParameters {
    /// Learning coefficient LC, in (0, 1]
    pub learning_coefficient: f64,
    /// Forgetting coefficient FC, in [0, ∞)
    pub forgetting_coefficient: f64,
    /// Baseline performance P0, in (0, 1.15]
    pub initial_performance: f64,
}

impl LearningParameters {
    /// Bundle the three coefficients
    pub fn new(
        learning_coefficient: f64,
        forgetting_coefficient: f64,
        initial_performance: f64,
    ) -> Self {
        Self { learning_coefficient, forgetting_coefficient, initial_performance }
    }

    /// Learning exponent `b = log2(LC)`
    pub fn learning_exponent(&self) -> f64 {
        self.learning_coefficient.ln() / 2f64.ln()
    }

    /// Performance after `repetitions` prior executions and `idle_days` without practice
    ///
    /// Pure evaluation of the curve, clamped to `[0, 1.15]`.
    pub fn evaluate(&self, repetitions: usize, idle_days: f64) -> f64 {
        let learning_effect = if repetitions > 0 {
            (repetitions as f64).powf(-self.learning_exponent())
        } else {
            1.0
        };
        let forgetting_effect = (-self.forgetting_coefficient
            * (idle_days - FORGETTING_GRACE_DAYS).max(0.0))
        .exp();

        let value = self.initial_performance * learning_effect * forgetting_effect;
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, defaults::MAX_PERFORMANCE)
    }
}

impl From<&crate::shop::OperatorSpec> for LearningParameters {
    fn from(spec: &crate::shop::OperatorSpec) -> Self {
        Self::new(spec.learning_coefficient, spec.forgetting_coefficient, spec.initial_performance)
    }
}

/// One computed performance value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// Operator the value belongs to
    pub operator: OperatorId,
    /// Task the value belongs to
    pub task: TaskId,
    /// Performance, in `[0, 1.15]`
    pub value: f64,
    /// Virtual time the sample was taken
    pub at: Minutes,
}

/// Performance history of every (operator, task) pair in a run
#[derive(Debug, Clone)]
pub struct PerformanceModel {
    parameters: HashMap<OperatorId, LearningParameters>,
    history: HashMap<(OperatorId, TaskId), Vec<PerformanceSample>>,
    default_performance: f64,
    sample_count: usize,
}

impl PerformanceModel {
    /// Create an empty model using `default_performance` for pairs with no history
    pub fn new(default_performance: f64) -> Self {
        Self {
            parameters: HashMap::new(),
            history: HashMap::new(),
            default_performance,
            sample_count: 0,
        }
    }

    /// Register the learning parameters of an operator
    pub fn register_operator(&mut self, operator: OperatorId, parameters: LearningParameters) {
        self.parameters.insert(operator, parameters);
    }

    /// Parameters of an operator
    pub fn parameters(&self, operator: &OperatorId) -> Option<&LearningParameters> {
        self.parameters.get(operator)
    }

    /// Compute the performance of `operator` on `task` at `now` and record it
    ///
    /// Returns `None` when the operator was never registered. Otherwise the
    /// value is appended to the history of the pair before being returned, so
    /// this is an observable mutation rather than a query.
    pub fn current_performance(
        &mut self,
        operator: &OperatorId,
        task: &TaskId,
        now: Minutes,
    ) -> Option<PerformanceSample> {
        let parameters = *self.parameters.get(operator)?;
        let key = (operator.clone(), task.clone());
        let samples = self.history.entry(key).or_default();

        let repetitions = samples.len();
        let idle_days = samples
            .last()
            .map(|last| ((now - last.at) / MINUTES_PER_DAY).max(0.0))
            .unwrap_or(0.0);

        let sample = PerformanceSample {
            operator: operator.clone(),
            task: task.clone(),
            value: parameters.evaluate(repetitions, idle_days),
            at: now,
        };
        samples.push(sample.clone());
        self.sample_count += 1;

        Some(sample)
    }

    /// Value of the latest sample for the pair, or the default when none exists
    pub fn most_recent_performance(&self, operator: &OperatorId, task: &TaskId) -> f64 {
        self.latest_sample(operator, task).map_or(self.default_performance, |sample| sample.value)
    }

    /// Mean of the last `window` samples of the pair
    ///
    /// Falls back to the default when the pair has no history or the window
    /// is empty. Used for reporting; dispatch reads the latest sample only.
    pub fn average_performance(&self, operator: &OperatorId, task: &TaskId, window: usize) -> f64 {
        let history = self.history(operator, task);
        let recent = &history[history.len().saturating_sub(window)..];
        if recent.is_empty() {
            return self.default_performance;
        }
        recent.iter().map(|sample| sample.value).sum::<f64>() / recent.len() as f64
    }

    /// Latest sample for the pair
    pub fn latest_sample(
        &self,
        operator: &OperatorId,
        task: &TaskId,
    ) -> Option<&PerformanceSample> {
        self.history.get(&(operator.clone(), task.clone())).and_then(|samples| samples.last())
    }

    /// Number of samples recorded for the pair
    pub fn repetitions(&self, operator: &OperatorId, task: &TaskId) -> usize {
        self.history.get(&(operator.clone(), task.clone())).map_or(0, Vec::len)
    }

    /// Full history of the pair, oldest first
    pub fn history(&self, operator: &OperatorId, task: &TaskId) -> &[PerformanceSample] {
        self.history
            .get(&(operator.clone(), task.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Latest sample of every pair the operator has worked on, ordered by task
    pub fn latest_for_operator(&self, operator: &OperatorId) -> Vec<&PerformanceSample> {
        let mut latest: Vec<&PerformanceSample> = self
            .history
            .iter()
            .filter(|((op, _), _)| op == operator)
            .filter_map(|(_, samples)| samples.last())
            .collect();
        latest.sort_by(|a, b| a.task.cmp(&b.task));
        latest
    }

    /// Default used before a pair has any sample
    pub fn default_performance(&self) -> f64 {
        self.default_performance
    }

    /// Total number of samples across all pairs
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

impl Default for PerformanceModel {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_PERFORMANCE)
    }
}
