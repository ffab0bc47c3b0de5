//! Identifier types for the shop floor simulator
//!
//! Shop floor entities (operators, machines, products, tasks) are identified by
//! short user-supplied codes such as `OP1` or `T-12`. Simulation runs get a
//! UUID-based identifier, while events and assignments are numbered in
//! creation order within a run.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Maximum length of an entity identifier
pub const MAX_ID_LEN: usize = 32;

/// Check whether a raw identifier is well formed
///
/// Identifiers must be non-empty, at most [`MAX_ID_LEN`] characters and made of
/// ASCII alphanumerics, `-`, `_` or `.`.
pub fn is_well_formed_id(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_ID_LEN
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a raw code
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw code
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the raw code passes identifier validation
            pub fn is_well_formed(&self) -> bool {
                is_well_formed_id(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of an operator
    OperatorId
);
entity_id!(
    /// Identifier of a machine
    MachineId
);
entity_id!(
    /// Identifier of a product
    ProductId
);
entity_id!(
    /// Identifier of a task (one phase of a product's routing)
    TaskId
);

/// Unique identifier for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationId(pub Uuid);

impl SimulationId {
    /// Create a new random simulation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SimulationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIM_{}", self.0.simple())
    }
}

impl Serialize for SimulationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimulationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("SIM_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(SimulationId(uuid))
    }
}

/// Sequence number of an event within a run
///
/// Events are numbered in insertion order, which doubles as the FIFO
/// tie-break between events scheduled at the same virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVT-{:06}", self.0)
    }
}

/// Sequence number of an assignment within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub u64);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ASG-{:06}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_ids() {
        assert!(is_well_formed_id("OP1"));
        assert!(is_well_formed_id("T-12.b_3"));
        assert!(!is_well_formed_id(""));
        assert!(!is_well_formed_id("has space"));
        assert!(!is_well_formed_id("é"));
        assert!(!is_well_formed_id(&"x".repeat(MAX_ID_LEN + 1)));
        assert!(is_well_formed_id(&"x".repeat(MAX_ID_LEN)));
    }

    #[test]
    fn test_entity_id_display_and_serde() {
        let id = TaskId::new("T1");
        assert_eq!(id.to_string(), "T1");
        assert_eq!(id.as_str(), "T1");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"T1\"");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_entity_id_ordering() {
        let mut ids = vec![OperatorId::from("OP2"), OperatorId::from("OP1")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "OP1");
    }

    #[test]
    fn test_simulation_id_display() {
        let id = SimulationId::new();
        let display_str = id.to_string();

        assert!(display_str.starts_with("SIM_"));
        // SIM_ + 32 hex chars
        assert_eq!(display_str.len(), 36);
        assert_ne!(id, SimulationId::default());
    }

    #[test]
    fn test_simulation_id_deserialization() {
        let raw_uuid = Uuid::new_v4();

        let prefixed = format!("\"SIM_{}\"", raw_uuid.simple());
        let id: SimulationId = serde_json::from_str(&prefixed).unwrap();
        assert_eq!(id.0, raw_uuid);

        // Raw UUIDs are accepted too
        let raw = format!("\"{}\"", raw_uuid);
        let id: SimulationId = serde_json::from_str(&raw).unwrap();
        assert_eq!(id.0, raw_uuid);
    }

    #[test]
    fn test_sequence_id_display() {
        assert_eq!(EventId(7).to_string(), "EVT-000007");
        assert_eq!(AssignmentId(42).to_string(), "ASG-000042");
        assert!(EventId(1) < EventId(2));
    }
}
