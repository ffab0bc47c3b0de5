//! Machines

use crate::types::MachineId;
use serde::{Deserialize, Serialize};

/// A machine and the capabilities it can process
///
/// An empty compatibility list means the machine accepts any capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    /// Machine identifier
    pub id: MachineId,
    /// Capabilities (task types) the machine can process
    #[serde(default)]
    pub compatible: Vec<String>,
}

impl MachineSpec {
    /// Create a machine accepting any capability
    pub fn new(id: impl Into<MachineId>) -> Self {
        Self { id: id.into(), compatible: Vec::new() }
    }

    /// Restrict the machine to the given capabilities
    pub fn with_compatible<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible.extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Whether the machine can process the given capability
    pub fn accepts(&self, capability: &str) -> bool {
        self.compatible.is_empty() || self.compatible.iter().any(|c| c == capability)
    }
}
