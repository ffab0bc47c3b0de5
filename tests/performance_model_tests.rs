//! Tests for the learning and forgetting performance model
//!
//! Covers the worked examples for first and repeated executions, the clamp
//! law and the append-only history.

use shop_floor_simulator::performance::{LearningParameters, PerformanceModel};
use shop_floor_simulator::types::{OperatorId, TaskId, MINUTES_PER_DAY};

fn operator_and_task() -> (OperatorId, TaskId) {
    (OperatorId::new("OP1"), TaskId::new("T1"))
}

fn model_with(parameters: LearningParameters) -> PerformanceModel {
    let mut model = PerformanceModel::default();
    model.register_operator(OperatorId::new("OP1"), parameters);
    model
}

/// First execution: no repetitions and no idle gap leave P0 untouched
#[test]
fn test_first_execution_returns_baseline() {
    let (op, task) = operator_and_task();
    let mut model = model_with(LearningParameters::new(0.8, 0.1, 0.6));

    let sample = model.current_performance(&op, &task, 0.0).unwrap();
    assert!((sample.value - 0.6).abs() < 1e-12);
    assert_eq!(sample.at, 0.0);
    assert_eq!(model.repetitions(&op, &task), 1);
}

/// Second execution three days later: one repetition, two days of forgetting
#[test]
fn test_second_execution_after_three_days() {
    let (op, task) = operator_and_task();
    let mut model = model_with(LearningParameters::new(0.8, 0.1, 0.6));

    model.current_performance(&op, &task, 0.0).unwrap();
    let sample = model.current_performance(&op, &task, 3.0 * MINUTES_PER_DAY).unwrap();

    let expected = 0.6 * (-0.2f64).exp();
    assert!((sample.value - expected).abs() < 1e-9);
    assert!((sample.value - 0.491).abs() < 1e-3);
}

/// Gaps of at most one day cost nothing
#[test]
fn test_no_forgetting_within_one_day() {
    let (op, task) = operator_and_task();
    let mut model = model_with(LearningParameters::new(1.0, 5.0, 0.7));

    model.current_performance(&op, &task, 0.0).unwrap();
    let sample = model.current_performance(&op, &task, MINUTES_PER_DAY).unwrap();
    assert!((sample.value - 0.7).abs() < 1e-12);
}

/// Repetition improves performance when LC < 1
#[test]
fn test_learning_improves_with_repetition() {
    let (op, task) = operator_and_task();
    let mut model = model_with(LearningParameters::new(0.8, 0.0, 0.5));

    let values: Vec<f64> = (0..6)
        .map(|i| model.current_performance(&op, &task, i as f64 * 10.0).unwrap().value)
        .collect();
    for pair in values.windows(2).skip(1) {
        assert!(pair[1] > pair[0], "expected improvement, got {:?}", values);
    }
}

/// Every computed sample stays within [0, 1.15]
#[test]
fn test_samples_are_clamped() {
    let (op, task) = operator_and_task();
    let mut fast = model_with(LearningParameters::new(0.5, 0.0, 1.15));
    for i in 0..50 {
        let value = fast.current_performance(&op, &task, i as f64).unwrap().value;
        assert!((0.0..=1.15).contains(&value), "value {} out of range", value);
    }
    assert_eq!(fast.most_recent_performance(&op, &task), 1.15);

    let mut forgetful = model_with(LearningParameters::new(1.0, 50.0, 0.9));
    forgetful.current_performance(&op, &task, 0.0).unwrap();
    let value = forgetful.current_performance(&op, &task, 30.0 * MINUTES_PER_DAY).unwrap().value;
    assert!((0.0..=1.15).contains(&value));
    assert!(value < 1e-6);
}

/// Samples are appended, never overwritten
#[test]
fn test_history_is_append_only() {
    let (op, task) = operator_and_task();
    let mut model = model_with(LearningParameters::new(0.8, 0.1, 0.6));

    let first = model.current_performance(&op, &task, 0.0).unwrap();
    model.current_performance(&op, &task, 60.0).unwrap();
    model.current_performance(&op, &task, 120.0).unwrap();

    let history = model.history(&op, &task);
    assert_eq!(history.len(), 3);
    assert_eq!(history[0], first);
    assert!(history.windows(2).all(|w| w[0].at <= w[1].at));
    assert_eq!(model.sample_count(), 3);
}

/// Pairs with no history read as the configured default
#[test]
fn test_default_before_first_sample() {
    let (op, task) = operator_and_task();
    let model = model_with(LearningParameters::new(0.8, 0.1, 0.6));
    assert_eq!(model.most_recent_performance(&op, &task), 0.35);
    assert!(model.latest_sample(&op, &task).is_none());

    let custom = PerformanceModel::new(0.5);
    assert_eq!(custom.most_recent_performance(&op, &task), 0.5);
}

/// Unknown operators produce no sample and leave the history alone
#[test]
fn test_unregistered_operator() {
    let mut model = PerformanceModel::default();
    let sample = model.current_performance(&OperatorId::new("NOBODY"), &TaskId::new("T1"), 0.0);
    assert!(sample.is_none());
    assert_eq!(model.sample_count(), 0);
}

/// Each task keeps its own history
#[test]
fn test_histories_are_per_task() {
    let op = OperatorId::new("OP1");
    let mut model = model_with(LearningParameters::new(0.8, 0.1, 0.6));

    model.current_performance(&op, &TaskId::new("T1"), 0.0).unwrap();
    model.current_performance(&op, &TaskId::new("T1"), 5.0).unwrap();
    model.current_performance(&op, &TaskId::new("T2"), 10.0).unwrap();

    assert_eq!(model.repetitions(&op, &TaskId::new("T1")), 2);
    assert_eq!(model.repetitions(&op, &TaskId::new("T2")), 1);

    let latest = model.latest_for_operator(&op);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].task, TaskId::new("T1"));
    assert_eq!(latest[0].at, 5.0);
}
