//! Shop floor description and the validated, indexed registry built from it

use super::{
    validation::validate_shop_floor, MachineSpec, Operator, OperatorSpec, ProductSpec, Task,
    TaskSpec,
};
use crate::types::config::read_json_file;
use crate::types::{ConfigError, ConfigRejection, MachineId, OperatorId, ProductId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Raw shop floor description as loaded from JSON or built in code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopFloorConfig {
    /// Operators available for dispatch
    #[serde(default)]
    pub operators: Vec<OperatorSpec>,
    /// Machines on the floor
    #[serde(default)]
    pub machines: Vec<MachineSpec>,
    /// Product orders
    #[serde(default)]
    pub products: Vec<ProductSpec>,
    /// Tasks of every product routing
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl ShopFloorConfig {
    /// Create an empty description
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a description from a `.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_json_file(path)
    }

    /// Add an operator
    pub fn with_operator(mut self, operator: OperatorSpec) -> Self {
        self.operators.push(operator);
        self
    }

    /// Add a machine
    pub fn with_machine(mut self, machine: MachineSpec) -> Self {
        self.machines.push(machine);
        self
    }

    /// Add a product
    pub fn with_product(mut self, product: ProductSpec) -> Self {
        self.products.push(product);
        self
    }

    /// Add a task
    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Validated shop floor with O(1) lookups by identifier
///
/// Iteration order of operators and tasks is the configuration order, which
/// keeps dispatch decisions reproducible.
#[derive(Debug, Clone)]
pub struct ShopFloor {
    operators: Vec<Operator>,
    machines: Vec<MachineSpec>,
    products: Vec<ProductSpec>,
    tasks: Vec<Task>,
    operator_index: HashMap<OperatorId, usize>,
    machine_index: HashMap<MachineId, usize>,
    product_index: HashMap<ProductId, usize>,
    task_index: HashMap<TaskId, usize>,
    successors: HashMap<TaskId, Vec<TaskId>>,
}

impl ShopFloor {
    /// Validate a description and build the registry
    ///
    /// Every violation is reported in the returned rejection; nothing is built
    /// from an invalid description.
    pub fn from_config(config: ShopFloorConfig) -> Result<Self, ConfigRejection> {
        ConfigRejection::from_violations(validate_shop_floor(&config))?;

        let ShopFloorConfig { operators, machines, products, tasks } = config;

        let product_index: HashMap<ProductId, usize> =
            products.iter().enumerate().map(|(idx, p)| (p.id.clone(), idx)).collect();
        let machine_index: HashMap<MachineId, usize> =
            machines.iter().enumerate().map(|(idx, m)| (m.id.clone(), idx)).collect();

        let operators: Vec<Operator> = operators.into_iter().map(Operator::new).collect();
        let operator_index: HashMap<OperatorId, usize> =
            operators.iter().enumerate().map(|(idx, o)| (o.id().clone(), idx)).collect();

        let mut successors: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut runtime_tasks = Vec::with_capacity(tasks.len());
        for spec in tasks {
            // Validation guarantees the product exists
            let (quantity, cost_rate) = product_index
                .get(&spec.product)
                .map(|&idx| (products[idx].quantity, products[idx].cost_rate))
                .unwrap_or((1, 0.0));
            if let Some(pred) = &spec.predecessor {
                successors.entry(pred.clone()).or_default().push(spec.id.clone());
            }
            runtime_tasks.push(Task::from_spec(spec, quantity, cost_rate));
        }
        let task_index: HashMap<TaskId, usize> =
            runtime_tasks.iter().enumerate().map(|(idx, t)| (t.id.clone(), idx)).collect();

        Ok(Self {
            operators,
            machines,
            products,
            tasks: runtime_tasks,
            operator_index,
            machine_index,
            product_index,
            task_index,
            successors,
        })
    }

    /// All operators in configuration order
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// All machines in configuration order
    pub fn machines(&self) -> &[MachineSpec] {
        &self.machines
    }

    /// All products in configuration order
    pub fn products(&self) -> &[ProductSpec] {
        &self.products
    }

    /// All tasks in configuration order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Get an operator by ID
    pub fn operator(&self, id: &OperatorId) -> Option<&Operator> {
        self.operator_index.get(id).and_then(|&idx| self.operators.get(idx))
    }

    /// Get a mutable operator by ID
    pub fn operator_mut(&mut self, id: &OperatorId) -> Option<&mut Operator> {
        match self.operator_index.get(id) {
            Some(&idx) => self.operators.get_mut(idx),
            None => None,
        }
    }

    /// Get a machine by ID
    pub fn machine(&self, id: &MachineId) -> Option<&MachineSpec> {
        self.machine_index.get(id).and_then(|&idx| self.machines.get(idx))
    }

    /// Get a product by ID
    pub fn product(&self, id: &ProductId) -> Option<&ProductSpec> {
        self.product_index.get(id).and_then(|&idx| self.products.get(idx))
    }

    /// Get a task by ID
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.task_index.get(id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Get a mutable task by ID
    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        match self.task_index.get(id) {
            Some(&idx) => self.tasks.get_mut(idx),
            None => None,
        }
    }

    /// Predecessor of a task, if it has one
    pub fn predecessor_of(&self, id: &TaskId) -> Option<&TaskId> {
        self.task(id).and_then(|task| task.predecessor.as_ref())
    }

    /// Direct successors of a task
    pub fn successors_of(&self, id: &TaskId) -> &[TaskId] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks with no predecessor, in configuration order
    pub fn root_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.predecessor.is_none())
    }

    /// Total units across all tasks
    pub fn total_units(&self) -> u64 {
        self.tasks.iter().map(|task| u64::from(task.quantity)).sum()
    }
}
