//! Capability registry advertised during the `initialize` handshake

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Capabilities {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, Value>,
}

/// Tool descriptors keyed by name. Entries are only ever inserted or overwritten.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: Capabilities,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins for a repeated name.
    pub fn register(&mut self, name: impl Into<String>, descriptor: Value) {
        self.capabilities.tools.insert(name.into(), descriptor);
    }

    pub fn snapshot(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.capabilities.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.capabilities.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn starts_empty_and_serializes_without_tools() {
        let registry = CapabilityRegistry::new();

        assert!(registry.is_empty());
        assert_eq!(
            serde_json::to_string(registry.snapshot()).expect("serialize"),
            "{}"
        );
    }

    #[test]
    fn register_overwrites_existing_name() {
        let mut registry = CapabilityRegistry::new();
        registry.register("exampleTool", json!({"version": "1.0"}));
        registry.register("exampleTool", json!({"version": "2.0"}));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("exampleTool"), Some(&json!({"version": "2.0"})));
    }

    #[test]
    fn snapshot_serializes_tools_map() {
        let mut registry = CapabilityRegistry::new();
        registry.register("tool1", json!({"version": "1.0"}));
        registry.register("tool2", json!({"version": "2.0"}));

        let wire = serde_json::to_value(registry.snapshot()).expect("serialize");
        assert_eq!(wire["tools"]["tool1"]["version"], "1.0");
        assert_eq!(wire["tools"]["tool2"]["version"], "2.0");
    }
}
