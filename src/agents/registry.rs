//! Name-keyed registry of agents
//!
//! Registration normally happens once at process start; the lock only
//! matters if agents are registered late, which the contract allows.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{json, Value};

use super::Agent;

pub struct AgentRegistry {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Insert an agent by its unique name. Registering a name twice is
    /// an idempotent no-op with a warning; the first registration wins.
    pub fn register(&self, agent: Arc<dyn Agent>) {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        let name = agent.name().to_string();
        if agents.contains_key(&name) {
            tracing::warn!(agent = %name, "agent already registered, ignoring");
            return;
        }
        tracing::info!(agent = %name, "registered agent");
        agents.insert(name, agent);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Agents whose declared capability list contains the given name
    pub fn by_capability(&self, capability: &str) -> Vec<Arc<dyn Agent>> {
        self.agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|a| a.capabilities().iter().any(|c| c.name == capability))
            .cloned()
            .collect()
    }

    /// Agents whose `can_handle` predicate accepts the given action
    pub fn for_action(&self, action: &str) -> Vec<Arc<dyn Agent>> {
        self.agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|a| a.can_handle(action))
            .cloned()
            .collect()
    }

    /// Registered agent names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every agent's name, description, and capability list,
    /// sorted by name. Feeds the `get-agent-status` action.
    pub fn status(&self) -> Value {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<Value> = agents
            .values()
            .map(|a| {
                json!({
                    "name": a.name(),
                    "description": a.description(),
                    "capabilities": a.capabilities()
                        .iter()
                        .map(|c| c.name.clone())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        json!({ "agents": entries, "count": entries.len() })
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, Capability};
    use crate::domain::{AgentResponse, ExecutionContext};
    use async_trait::async_trait;
    use serde_json::Value;

    struct StubAgent {
        name: String,
        capabilities: Vec<Capability>,
    }

    impl StubAgent {
        fn new(name: &str, actions: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                capabilities: actions.iter().map(|a| Capability::new(a, "stub")).collect(),
            })
        }
    }

    #[async_trait]
    impl Agent for StubAgent {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn capabilities(&self) -> &[Capability] {
            &self.capabilities
        }

        async fn execute(&self, _: &ExecutionContext, _: &str, _: &Value) -> AgentResponse {
            AgentResponse::success(Value::Null, "ok")
        }
    }

    #[test]
    fn duplicate_registration_is_a_noop() {
        let registry = AgentRegistry::new();
        registry.register(StubAgent::new("chart-control", &["navigate"]));
        registry.register(StubAgent::new("chart-control", &["something-else"]));

        assert_eq!(registry.len(), 1);
        // the first registration won
        let agent = registry.get("chart-control").unwrap();
        assert!(agent.can_handle("navigate"));
        assert!(!agent.can_handle("something-else"));
    }

    #[test]
    fn missing_agent_is_absent() {
        let registry = AgentRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn lookup_by_capability_and_action() {
        let registry = AgentRegistry::new();
        registry.register(StubAgent::new("a", &["analyze-chart", "detect-signals"]));
        registry.register(StubAgent::new("b", &["analyze-chart"]));
        registry.register(StubAgent::new("c", &["navigate"]));

        assert_eq!(registry.by_capability("analyze-chart").len(), 2);
        assert_eq!(registry.for_action("navigate").len(), 1);
        assert!(registry.for_action("unknown").is_empty());
    }

    #[test]
    fn status_lists_agents_sorted() {
        let registry = AgentRegistry::new();
        registry.register(StubAgent::new("zeta", &["z"]));
        registry.register(StubAgent::new("alpha", &["a"]));

        let status = registry.status();
        assert_eq!(status["count"], 2);
        assert_eq!(status["agents"][0]["name"], "alpha");
        assert_eq!(status["agents"][1]["name"], "zeta");
    }
}
