//! Operator performance model
//!
//! Operators improve with repetition and lose skill when a task goes unpracticed.
//! The model keeps every computed value as a [`PerformanceSample`]; the latest
//! sample of an (operator, task) pair is the operator's current skill on it.
//!
//! # Usage Example
//!
//! ```rust
//! use shop_floor_simulator::performance::*;
//! use shop_floor_simulator::types::{OperatorId, TaskId};
//!
//! let mut model = PerformanceModel::default();
//! let op = OperatorId::new("OP1");
//! let task = TaskId::new("T1");
//! model.register_operator(op.clone(), LearningParameters::new(0.8, 0.1, 0.6));
//!
//! // No history yet: scoring falls back to the default
//! assert_eq!(model.most_recent_performance(&op, &task), 0.35);
//!
//! let sample = model.current_performance(&op, &task, 0.0).unwrap();
//! assert!((sample.value - 0.6).abs() < 1e-12);
//! ```

pub mod model;

pub use model::{LearningParameters, PerformanceModel, PerformanceSample};
