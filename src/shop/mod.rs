//! Shop floor entities and registry
//!
//! This module describes the static side of a simulation: operators, machines,
//! products and the tasks of each product routing, together with the validated
//! registry the engine runs against.
//!
//! # Overview
//!
//! - **OperatorSpec / Operator**: learning and forgetting parameters, skills,
//!   cumulative idle and work time
//! - **MachineSpec**: compatible capabilities of each machine
//! - **ProductSpec**: ordered quantity and cost rate
//! - **TaskSpec / Task**: one phase of a routing, with an optional predecessor
//! - **ShopFloor**: validated registry with O(1) lookups
//! - **ScenarioGenerator**: seeded random scenarios
//!
//! # Usage Example
//!
//! ```rust
//! use shop_floor_simulator::shop::*;
//!
//! let config = ShopFloorConfig::new()
//!     .with_operator(OperatorSpec::new("OP1", 0.8, 0.1, 0.6).with_skills(["T1"]))
//!     .with_machine(MachineSpec::new("M1"))
//!     .with_product(ProductSpec::new("P1", 2, 1.0))
//!     .with_task(TaskSpec::new("T1", "P1", 1, "M1", 30.0));
//!
//! let floor = ShopFloor::from_config(config).unwrap();
//! assert_eq!(floor.tasks().len(), 1);
//! ```

pub mod generator;
pub mod machine;
pub mod operator;
pub mod product;
pub mod registry;
pub mod task;
pub mod validation;

// Re-export all public types for convenience
pub use generator::ScenarioGenerator;
pub use machine::MachineSpec;
pub use operator::{Operator, OperatorSpec};
pub use product::ProductSpec;
pub use registry::{ShopFloor, ShopFloorConfig};
pub use task::{Task, TaskSpec};
pub use validation::validate_shop_floor;
