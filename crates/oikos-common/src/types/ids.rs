//! Typed identities for agents and lineages
//!
//! Both wrap a UUIDv4. The short display forms (`agent-3fa9c1d2`,
//! `lin-8b02ee41`) are what shows up in logs and tombstones.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one agent, stable from birth to tombstone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Mint a fresh agent identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short hex form used in log lines and file names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent-{}", self.short())
    }
}

/// Identity of a founder line; offspring inherit fresh lineage ids at
/// crossover, while descendant tracking keys on the founder's root id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageId(Uuid);

impl LineageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for LineageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LineageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lin-{}", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_display() {
        let id = AgentId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("agent-"));
        assert_eq!(shown.len(), "agent-".len() + 8);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
        assert_ne!(LineageId::new(), LineageId::new());
    }

    #[test]
    fn test_serde_transparent() {
        let id = AgentId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: AgentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
