//! Tests for task availability and the weighted dispatch policy
//!
//! Covers cost scoring, wait-based tie-breaking, precedence blocking, machine
//! blocking and determinism of repeated choices.

use shop_floor_simulator::dispatch::{
    cost_score, select_best, sub_performance_cost, AvailabilityResolver, Candidate,
    DispatchPolicy, ScoreBreakdown,
};
use shop_floor_simulator::shop::{
    MachineSpec, OperatorSpec, ProductSpec, ShopFloor, ShopFloorConfig, TaskSpec,
};
use shop_floor_simulator::simulation::EventEngine;
use shop_floor_simulator::types::{
    BlockReason, DispatchWeights, OperatorId, SimulationConfig, TaskId,
};

fn engine_for(shop_floor: ShopFloorConfig) -> EventEngine {
    let floor = ShopFloor::from_config(shop_floor).unwrap();
    EventEngine::new(floor, &SimulationConfig::default()).unwrap()
}

fn chained_floor() -> ShopFloorConfig {
    ShopFloorConfig::new()
        .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["T1", "T2"]))
        .with_machine(MachineSpec::new("M1"))
        .with_machine(MachineSpec::new("M2"))
        .with_product(ProductSpec::new("P1", 1, 2.0))
        .with_task(TaskSpec::new("T1", "P1", 1, "M1", 100.0))
        .with_task(TaskSpec::new("T2", "P1", 2, "M2", 50.0).with_predecessor("T1"))
}

/// Two products competing for one machine, two qualified operators
fn shared_machine_floor() -> ShopFloorConfig {
    ShopFloorConfig::new()
        .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["A1", "B1"]))
        .with_operator(OperatorSpec::new("OP2", 0.8, 0.1, 0.6).with_skills(["A1", "B1"]))
        .with_machine(MachineSpec::new("M1"))
        .with_product(ProductSpec::new("PA", 1, 1.0))
        .with_product(ProductSpec::new("PB", 1, 1.0))
        .with_task(TaskSpec::new("A1", "PA", 1, "M1", 10.0))
        .with_task(TaskSpec::new("B1", "PB", 1, "M1", 10.0))
}

fn candidate(task: &str, wait_minutes: f64, composite: f64) -> Candidate {
    Candidate {
        operator: OperatorId::new("OP1"),
        task: TaskId::new(task),
        wait_minutes,
        available: wait_minutes == 0.0,
        performance: 0.5,
        estimated_duration: 20.0,
        estimated_completion: 20.0 + wait_minutes,
        score: ScoreBreakdown {
            cost: 0.0,
            performance: 0.0,
            equity: 0.0,
            makespan: 0.0,
            wait_penalty: wait_minutes / 1440.0,
            composite,
        },
    }
}

/// Standard 100 min at performance 0.5 and CR 2 costs 200, scoring 0.8
#[test]
fn test_cost_score_example() {
    assert!((cost_score(100.0, 0.5, 2.0) - 0.8).abs() < 1e-12);

    let engine = engine_for(chained_floor());
    let task = engine.state().floor().task(&TaskId::new("T1")).unwrap();
    let cost = sub_performance_cost(task.standard_minutes, 0.5, task.cost_rate);
    assert!((cost - 200.0).abs() < 1e-9);
}

/// Equal composites go to the shorter wait
#[test]
fn test_tie_prefers_shorter_wait() {
    let chosen = select_best(vec![candidate("Y", 30.0, 0.75), candidate("X", 0.0, 0.75)]);
    assert_eq!(chosen.unwrap().task, TaskId::new("X"));

    let within_epsilon =
        select_best(vec![candidate("Y", 30.0, 0.75 + 1e-12), candidate("X", 0.0, 0.75)]);
    assert_eq!(within_epsilon.unwrap().task, TaskId::new("X"));
}

/// Full ties keep the first candidate in order
#[test]
fn test_full_tie_keeps_registry_order() {
    let chosen = select_best(vec![candidate("FIRST", 0.0, 0.5), candidate("SECOND", 0.0, 0.5)]);
    assert_eq!(chosen.unwrap().task, TaskId::new("FIRST"));
    assert!(select_best(Vec::new()).is_none());
}

/// A clearly higher composite wins over a shorter wait
#[test]
fn test_higher_score_beats_wait() {
    let chosen = select_best(vec![candidate("X", 0.0, 0.6), candidate("Y", 30.0, 0.7)]);
    assert_eq!(chosen.unwrap().task, TaskId::new("Y"));
}

/// A task behind an open predecessor is never available and waits forever
#[test]
fn test_predecessor_blocks_task() {
    let engine = engine_for(chained_floor());
    let resolver = AvailabilityResolver::new(engine.state());
    let op = OperatorId::new("OP1");

    let available: Vec<&TaskId> =
        resolver.available_tasks(&op).into_iter().map(|task| &task.id).collect();
    assert_eq!(available, vec![&TaskId::new("T1")]);

    let blocked = engine.blocked_tasks();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].task, TaskId::new("T2"));
    assert_eq!(blocked[0].reason, BlockReason::PredecessorIncomplete);
    assert!(blocked[0].wait_minutes.is_infinite());

    // Never scored either
    let candidates = DispatchPolicy::default().score_candidates(&op, engine.state());
    assert!(candidates.iter().all(|c| c.task != TaskId::new("T2")));
}

/// Missing skills hide a task from an operator
#[test]
fn test_skills_filter_available_tasks() {
    let floor = chained_floor()
        .with_operator(OperatorSpec::new("OP2", 0.8, 0.1, 0.6).with_skills(["T2"]));
    let engine = engine_for(floor);
    let resolver = AvailabilityResolver::new(engine.state());

    assert!(resolver.available_tasks(&OperatorId::new("OP2")).is_empty());
    assert!(resolver.available_tasks(&OperatorId::new("GHOST")).is_empty());
}

/// A busy machine blocks with the remaining time of its assignment
#[test]
fn test_busy_machine_reports_finite_wait() {
    let mut engine = engine_for(shared_machine_floor());
    // Only the events due at minute zero
    let report = engine.run_slice(0.0).unwrap();
    assert!(!report.processed.is_empty());

    let state = engine.state();
    assert_eq!(state.active_assignments().count(), 1);
    let holder = state.active_assignments().next().unwrap().clone();
    assert_eq!(holder.task, TaskId::new("A1"));

    let blocked = engine.blocked_tasks();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].task, TaskId::new("B1"));
    assert_eq!(blocked[0].reason, BlockReason::MachineBusy);
    assert!((blocked[0].wait_minutes - holder.end).abs() < 1e-9);

    // The idle operator may still pick the blocked task, but it waits
    let op2 = OperatorId::new("OP2");
    let resolver = AvailabilityResolver::new(state);
    assert!(resolver.available_tasks(&op2).is_empty());
    let choice = DispatchPolicy::default().choose_task(&op2, state).unwrap();
    assert_eq!(choice.task, TaskId::new("B1"));
    assert!(!choice.available);
    assert!((choice.wait_minutes - holder.end).abs() < 1e-9);
    assert!(choice.score.wait_penalty > 0.0);
}

/// Repeated choices on identical state return the same task
#[test]
fn test_choice_is_deterministic() {
    let engine = engine_for(shared_machine_floor());
    let policy = DispatchPolicy::default();
    let op = OperatorId::new("OP1");

    let first = policy.choose_task(&op, engine.state()).unwrap();
    for _ in 0..10 {
        assert_eq!(policy.choose_task(&op, engine.state()).unwrap(), first);
    }

    let other_engine = engine_for(shared_machine_floor());
    assert_eq!(policy.choose_task(&op, other_engine.state()).unwrap().task, first.task);
}

/// Scores stay within [0, 1] and reflect the default performance
#[test]
fn test_candidate_scores_are_normalized() {
    let engine = engine_for(shared_machine_floor());
    let candidates =
        DispatchPolicy::default().score_candidates(&OperatorId::new("OP1"), engine.state());
    assert_eq!(candidates.len(), 2);

    for candidate in &candidates {
        assert_eq!(candidate.performance, 0.35);
        assert!((candidate.estimated_duration - 10.0 / 0.35).abs() < 1e-9);
        for value in [
            candidate.score.cost,
            candidate.score.performance,
            candidate.score.equity,
            candidate.score.makespan,
            candidate.score.composite,
        ] {
            assert!((0.0..=1.0).contains(&value), "score {} out of range", value);
        }
    }
}

/// The weight vector is taken from configuration
#[test]
fn test_policy_uses_configured_weights() {
    let weights = DispatchWeights::new(0.1, 0.3, 0.3, 0.3);
    let policy = DispatchPolicy::new(weights);
    assert_eq!(policy.weights(), &weights);

    let score = policy.composite(1.0, 0.0, 0.0, 0.0, 0.0);
    assert!((score.composite - 0.1).abs() < 1e-12);
}
