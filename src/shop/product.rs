//! Products

use crate::types::ProductId;
use serde::{Deserialize, Serialize};

/// A product order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Product identifier
    pub id: ProductId,
    /// Quantity ordered
    pub quantity: u32,
    /// Cost rate CR, currency per minute of sub-performance
    #[serde(alias = "cr")]
    pub cost_rate: f64,
}

impl ProductSpec {
    /// Create a product order
    pub fn new(id: impl Into<ProductId>, quantity: u32, cost_rate: f64) -> Self {
        Self { id: id.into(), quantity, cost_rate }
    }
}
