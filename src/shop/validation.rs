//! Shop floor validation
//!
//! Checks the structural integrity of a shop floor description before a run:
//! - identifier syntax and uniqueness per entity kind
//! - numeric parameter ranges
//! - product, machine and predecessor references
//! - machine/capability compatibility
//! - precedence forming acyclic chains within one product

use super::ShopFloorConfig;
use crate::types::{defaults, is_well_formed_id, ConfigValidationError};
use std::collections::{HashMap, HashSet};

/// Collect every violation found in `config`
pub fn validate_shop_floor(config: &ShopFloorConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.operators.is_empty() {
        errors.push(ConfigValidationError::EmptyOperators);
    }
    if config.tasks.is_empty() {
        errors.push(ConfigValidationError::EmptyTasks);
    }

    check_ids("operator", config.operators.iter().map(|o| o.id.as_str()), &mut errors);
    check_ids("machine", config.machines.iter().map(|m| m.id.as_str()), &mut errors);
    check_ids("product", config.products.iter().map(|p| p.id.as_str()), &mut errors);
    check_ids("task", config.tasks.iter().map(|t| t.id.as_str()), &mut errors);

    for operator in &config.operators {
        let id = operator.id.as_str();
        let lc = operator.learning_coefficient;
        if !(lc > 0.0 && lc <= 1.0) {
            errors.push(invalid("operator", id, "learning coefficient", lc, "(0, 1]"));
        }
        let fc = operator.forgetting_coefficient;
        if !(fc.is_finite() && fc >= 0.0) {
            errors.push(invalid("operator", id, "forgetting coefficient", fc, "[0, ∞)"));
        }
        let p0 = operator.initial_performance;
        if !(p0 > 0.0 && p0 <= defaults::MAX_PERFORMANCE) {
            errors.push(invalid("operator", id, "initial performance", p0, "(0, 1.15]"));
        }
    }

    for product in &config.products {
        let id = product.id.as_str();
        if product.quantity == 0 {
            errors.push(invalid("product", id, "quantity", 0.0, "at least 1"));
        }
        if !(product.cost_rate.is_finite() && product.cost_rate >= 0.0) {
            errors.push(invalid("product", id, "cost rate", product.cost_rate, "[0, ∞)"));
        }
    }

    let machines: HashMap<&str, _> = config.machines.iter().map(|m| (m.id.as_str(), m)).collect();
    let products: HashSet<&str> = config.products.iter().map(|p| p.id.as_str()).collect();
    let tasks: HashMap<&str, _> = config.tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut successor_count: HashMap<&str, usize> = HashMap::new();

    for task in &config.tasks {
        let id = task.id.as_str();

        if !(task.standard_minutes.is_finite() && task.standard_minutes > 0.0) {
            errors.push(invalid("task", id, "standard duration", task.standard_minutes, "> 0"));
        }
        if task.quantity == Some(0) {
            errors.push(invalid("task", id, "quantity", 0.0, "at least 1"));
        }

        if !products.contains(task.product.as_str()) {
            errors.push(unknown("task", id, "product", task.product.as_str()));
        }

        match machines.get(task.machine.as_str()) {
            Some(machine) if !machine.accepts(task.required_capability()) => {
                errors.push(ConfigValidationError::IncompatibleMachine {
                    task: id.to_string(),
                    machine: machine.id.to_string(),
                    capability: task.required_capability().to_string(),
                });
            }
            Some(_) => {}
            None => errors.push(unknown("task", id, "machine", task.machine.as_str())),
        }

        if let Some(predecessor) = &task.predecessor {
            match tasks.get(predecessor.as_str()) {
                Some(pred) => {
                    if pred.product != task.product {
                        errors.push(ConfigValidationError::CrossProductPredecessor {
                            task: id.to_string(),
                            predecessor: predecessor.to_string(),
                        });
                    }
                    *successor_count.entry(pred.id.as_str()).or_default() += 1;
                }
                None => errors.push(unknown("task", id, "predecessor", predecessor.as_str())),
            }
        }
    }

    // Report in configuration order
    for task in &config.tasks {
        if successor_count.get(task.id.as_str()).copied().unwrap_or(0) > 1 {
            errors.push(ConfigValidationError::MultipleSuccessors { task: task.id.to_string() });
        }
    }

    errors.extend(detect_cycles(config));

    errors
}

fn check_ids<'a>(
    entity: &'static str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ConfigValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !is_well_formed_id(id) {
            errors.push(ConfigValidationError::MalformedIdentifier { entity, id: id.to_string() });
        }
        if !seen.insert(id) {
            errors.push(ConfigValidationError::DuplicateId { entity, id: id.to_string() });
        }
    }
}

fn invalid(
    entity: &'static str,
    id: &str,
    field: &'static str,
    value: f64,
    expected: &'static str,
) -> ConfigValidationError {
    ConfigValidationError::InvalidParameter { entity, id: id.to_string(), field, value, expected }
}

fn unknown(
    entity: &'static str,
    id: &str,
    target: &'static str,
    reference: &str,
) -> ConfigValidationError {
    ConfigValidationError::UnknownReference {
        entity,
        id: id.to_string(),
        target,
        reference: reference.to_string(),
    }
}

/// Detect precedence cycles with a depth-first walk over successor edges
///
/// Every cycle is reported once, through the first task of the cycle in
/// configuration order.
fn detect_cycles(config: &ShopFloorConfig) -> Vec<ConfigValidationError> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in &config.tasks {
        if let Some(pred) = &task.predecessor {
            adj.entry(pred.as_str()).or_default().push(task.id.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut errors = Vec::new();

    for task in &config.tasks {
        let node = task.id.as_str();
        if visited.contains(node) {
            continue;
        }
        let mut in_stack = HashSet::new();
        if let Some(on_cycle) = cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            errors.push(ConfigValidationError::CyclicPrecedence { task: on_cycle.to_string() });
        }
    }

    errors
}

fn cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> Option<&'a str> {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(successors) = adj.get(node) {
        for &next in successors {
            if in_stack.contains(next) {
                return Some(next);
            }
            if !visited.contains(next) {
                if let Some(found) = cycle_dfs(next, adj, visited, in_stack) {
                    return Some(found);
                }
            }
        }
    }

    in_stack.remove(node);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::{MachineSpec, OperatorSpec, ProductSpec, TaskSpec};

    fn base_config() -> ShopFloorConfig {
        ShopFloorConfig::new()
            .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["T1", "T2"]))
            .with_machine(MachineSpec::new("M1"))
            .with_product(ProductSpec::new("P1", 1, 2.0))
            .with_task(TaskSpec::new("T1", "P1", 1, "M1", 10.0))
            .with_task(TaskSpec::new("T2", "P1", 2, "M1", 10.0).with_predecessor("T1"))
    }

    #[test]
    fn test_valid_config_has_no_violations() {
        assert!(validate_shop_floor(&base_config()).is_empty());
    }

    #[test]
    fn test_empty_lists_rejected() {
        let errors = validate_shop_floor(&ShopFloorConfig::new());
        assert!(errors.contains(&ConfigValidationError::EmptyOperators));
        assert!(errors.contains(&ConfigValidationError::EmptyTasks));
    }

    #[test]
    fn test_duplicate_and_malformed_ids() {
        let config = base_config()
            .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6))
            .with_machine(MachineSpec::new("bad id"));
        let errors = validate_shop_floor(&config);

        assert!(errors.contains(&ConfigValidationError::DuplicateId {
            entity: "operator",
            id: "OP1".to_string()
        }));
        assert!(errors.contains(&ConfigValidationError::MalformedIdentifier {
            entity: "machine",
            id: "bad id".to_string()
        }));
    }

    #[test]
    fn test_parameter_ranges() {
        let config = base_config()
            .with_operator(OperatorSpec::new("OP2", 0.0, -1.0, 1.5))
            .with_task(TaskSpec::new("T3", "P1", 3, "M1", 0.0).with_quantity(0));
        let errors = validate_shop_floor(&config);

        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigValidationError::InvalidParameter { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert!(fields.contains(&"learning coefficient"));
        assert!(fields.contains(&"forgetting coefficient"));
        assert!(fields.contains(&"initial performance"));
        assert!(fields.contains(&"standard duration"));
        assert!(fields.contains(&"quantity"));
    }

    #[test]
    fn test_unknown_references() {
        let config = base_config().with_task(
            TaskSpec::new("T3", "P9", 1, "M9", 5.0).with_predecessor("T9"),
        );
        let errors = validate_shop_floor(&config);

        let targets: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigValidationError::UnknownReference { target, .. } => Some(*target),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec!["product", "machine", "predecessor"]);
    }

    #[test]
    fn test_incompatible_machine() {
        let config = ShopFloorConfig::new()
            .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6))
            .with_machine(MachineSpec::new("M1").with_compatible(["mill"]))
            .with_product(ProductSpec::new("P1", 1, 1.0))
            .with_task(TaskSpec::new("T1", "P1", 1, "M1", 5.0).with_capability("turn"));
        let errors = validate_shop_floor(&config);

        assert!(matches!(errors.as_slice(), [ConfigValidationError::IncompatibleMachine { .. }]));
    }

    #[test]
    fn test_chain_rules() {
        let config = base_config()
            .with_product(ProductSpec::new("P2", 1, 1.0))
            .with_task(TaskSpec::new("T3", "P1", 3, "M1", 5.0).with_predecessor("T1"))
            .with_task(TaskSpec::new("T4", "P2", 1, "M1", 5.0).with_predecessor("T2"));
        let errors = validate_shop_floor(&config);

        let expected = ConfigValidationError::MultipleSuccessors { task: "T1".to_string() };
        assert!(errors.contains(&expected));
        assert!(errors.contains(&ConfigValidationError::CrossProductPredecessor {
            task: "T4".to_string(),
            predecessor: "T2".to_string()
        }));
    }

    #[test]
    fn test_cycle_detection() {
        let config = ShopFloorConfig::new()
            .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6))
            .with_machine(MachineSpec::new("M1"))
            .with_product(ProductSpec::new("P1", 1, 1.0))
            .with_task(TaskSpec::new("A", "P1", 1, "M1", 5.0).with_predecessor("C"))
            .with_task(TaskSpec::new("B", "P1", 2, "M1", 5.0).with_predecessor("A"))
            .with_task(TaskSpec::new("C", "P1", 3, "M1", 5.0).with_predecessor("B"));
        let errors = validate_shop_floor(&config);

        let cycles = errors
            .iter()
            .filter(|e| matches!(e, ConfigValidationError::CyclicPrecedence { .. }))
            .count();
        assert_eq!(cycles, 1);
    }

    #[test]
    fn test_self_predecessor_is_a_cycle() {
        let config = base_config()
            .with_task(TaskSpec::new("T3", "P1", 3, "M1", 5.0).with_predecessor("T3"));
        let errors = validate_shop_floor(&config);

        let expected = ConfigValidationError::CyclicPrecedence { task: "T3".to_string() };
        assert!(errors.contains(&expected));
    }
}
