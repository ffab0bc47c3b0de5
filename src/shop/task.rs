//! Tasks: one phase of a product's routing

use crate::types::{MachineId, Minutes, ProductId, TaskId};
use serde::{Deserialize, Serialize};

/// Static description of a task as provided by configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task identifier
    pub id: TaskId,
    /// Owning product
    pub product: ProductId,
    /// Phase (sequence index) within the product routing
    #[serde(default)]
    pub phase: u32,
    /// Task that must complete before this one may start
    #[serde(default)]
    pub predecessor: Option<TaskId>,
    /// Nominal duration of one unit, in minutes
    #[serde(alias = "standard_duration")]
    pub standard_minutes: Minutes,
    /// Machine the task runs on
    pub machine: MachineId,
    /// Required capability; defaults to the task identifier
    #[serde(default)]
    pub capability: Option<String>,
    /// Units to produce; defaults to the product quantity
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl TaskSpec {
    /// Create a task with no predecessor
    pub fn new(
        id: impl Into<TaskId>,
        product: impl Into<ProductId>,
        phase: u32,
        machine: impl Into<MachineId>,
        standard_minutes: Minutes,
    ) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            phase,
            predecessor: None,
            standard_minutes,
            machine: machine.into(),
            capability: None,
            quantity: None,
        }
    }

    /// Set the predecessor task
    pub fn with_predecessor(mut self, predecessor: impl Into<TaskId>) -> Self {
        self.predecessor = Some(predecessor.into());
        self
    }

    /// Set the required capability
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    /// Set the quantity to produce
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Capability an operator and the machine must support
    pub fn required_capability(&self) -> &str {
        self.capability.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Task state tracked during a run
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Owning product
    pub product: ProductId,
    /// Phase within the product routing
    pub phase: u32,
    /// Task that must complete first
    pub predecessor: Option<TaskId>,
    /// Nominal duration of one unit
    pub standard_minutes: Minutes,
    /// Machine the task runs on
    pub machine: MachineId,
    /// Required capability
    pub capability: String,
    /// Total units
    pub quantity: u32,
    /// Units not yet handed to an operator
    pub remaining: u32,
    /// Cost rate inherited from the product
    pub cost_rate: f64,
}

impl Task {
    /// Build the runtime task from its spec and the owning product's figures
    pub(crate) fn from_spec(spec: TaskSpec, product_quantity: u32, cost_rate: f64) -> Self {
        let capability = spec.required_capability().to_string();
        let quantity = spec.quantity.unwrap_or(product_quantity);
        Self {
            id: spec.id,
            product: spec.product,
            phase: spec.phase,
            predecessor: spec.predecessor,
            standard_minutes: spec.standard_minutes,
            machine: spec.machine,
            capability,
            quantity,
            remaining: quantity,
            cost_rate,
        }
    }

    /// Whether units remain to be handed out
    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }

    /// Hand out one unit; returns `false` when nothing remains
    pub fn take_unit(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }
}
