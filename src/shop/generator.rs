//! Synthetic scenario generation
//!
//! Builds a random but valid shop floor from the generator sizes of a
//! [`SimulationConfig`], for runs that have no shop floor file.

use super::{MachineSpec, OperatorSpec, ProductSpec, ShopFloorConfig, TaskSpec};
use crate::types::{SimulationConfig, TaskId};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

/// Random shop floor generator
#[derive(Debug)]
pub struct ScenarioGenerator {
    rng: StdRng,
}

impl ScenarioGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Create a generator with a fixed seed for reproducible scenarios
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Create a generator honoring the configured seed, if any
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// Generate a shop floor
    ///
    /// Products share a routing of `phases_per_product` phases; phase `k`
    /// requires capability `PH{k}` and runs on machine `M{((k - 1) % m) + 1}`.
    /// Every phase capability is held by at least one operator.
    pub fn generate(&mut self, config: &SimulationConfig) -> ShopFloorConfig {
        let operator_count = config.operator_count.max(1);
        let machine_count = config.machine_count.max(1);
        let phases = config.phases_per_product.max(1);

        let phase_capability = |phase: usize| format!("PH{}", phase);
        let phase_machine = |phase: usize| format!("M{}", ((phase - 1) % machine_count) + 1);

        let mut shop_floor = ShopFloorConfig::new();

        let mut skills: Vec<Vec<String>> = vec![Vec::new(); operator_count];
        for phase in 1..=phases {
            // Round robin guarantees coverage
            skills[(phase - 1) % operator_count].push(phase_capability(phase));
        }
        for operator_skills in skills.iter_mut() {
            for phase in 1..=phases {
                let capability = phase_capability(phase);
                if !operator_skills.contains(&capability) && self.rng.gen_bool(0.5) {
                    operator_skills.push(capability);
                }
            }
            operator_skills.sort();
        }

        for (i, operator_skills) in skills.into_iter().enumerate() {
            let spec = OperatorSpec::new(
                format!("OP{}", i + 1),
                self.rng.gen_range(0.70..=0.95),
                self.rng.gen_range(0.01..=0.30),
                self.rng.gen_range(0.50..=1.00),
            )
            .with_skills(operator_skills);
            shop_floor = shop_floor.with_operator(spec);
        }

        for i in 1..=machine_count {
            let machine_id = format!("M{}", i);
            let compatible: Vec<String> = (1..=phases)
                .filter(|&k| phase_machine(k) == machine_id)
                .map(phase_capability)
                .collect();
            shop_floor =
                shop_floor.with_machine(MachineSpec::new(machine_id).with_compatible(compatible));
        }

        for p in 1..=config.product_count.max(1) {
            let product_id = format!("P{}", p);
            shop_floor = shop_floor.with_product(ProductSpec::new(
                product_id.as_str(),
                config.units_per_product.max(1),
                self.rng.gen_range(0.5..=3.0),
            ));

            let mut previous: Option<TaskId> = None;
            for phase in 1..=phases {
                let task_id = TaskId::new(format!("{}-T{}", product_id, phase));
                let standard = f64::from(self.rng.gen_range(10u32..=60));
                let mut task = TaskSpec::new(
                    task_id.clone(),
                    product_id.as_str(),
                    phase as u32,
                    phase_machine(phase),
                    standard,
                )
                .with_capability(phase_capability(phase));
                if let Some(pred) = previous.take() {
                    task = task.with_predecessor(pred);
                }
                shop_floor = shop_floor.with_task(task);
                previous = Some(task_id);
            }
        }

        debug!(
            operators = shop_floor.operators.len(),
            machines = shop_floor.machines.len(),
            products = shop_floor.products.len(),
            tasks = shop_floor.tasks.len(),
            "Generated shop floor scenario"
        );

        shop_floor
    }
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::ShopFloor;

    #[test]
    fn test_generated_scenario_is_valid() {
        let config = SimulationConfig {
            operator_count: 3,
            machine_count: 2,
            product_count: 4,
            phases_per_product: 5,
            ..Default::default()
        };
        let shop_floor = ScenarioGenerator::with_seed(11).generate(&config);

        assert_eq!(shop_floor.operators.len(), 3);
        assert_eq!(shop_floor.machines.len(), 2);
        assert_eq!(shop_floor.products.len(), 4);
        assert_eq!(shop_floor.tasks.len(), 20);

        let floor = ShopFloor::from_config(shop_floor).unwrap();
        for task in floor.tasks() {
            assert!(floor.operators().iter().any(|op| op.has_skill(&task.capability)));
        }
    }

    #[test]
    fn test_same_seed_same_scenario() {
        let config = SimulationConfig::default();
        let first = ScenarioGenerator::with_seed(42).generate(&config);
        let second = ScenarioGenerator::with_seed(42).generate(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_routing_is_a_chain() {
        let config =
            SimulationConfig { product_count: 1, phases_per_product: 3, ..Default::default() };
        let shop_floor = ScenarioGenerator::with_seed(1).generate(&config);

        let preds: Vec<Option<&str>> =
            shop_floor.tasks.iter().map(|t| t.predecessor.as_ref().map(|p| p.as_str())).collect();
        assert_eq!(preds, vec![None, Some("P1-T1"), Some("P1-T2")]);
    }
}
