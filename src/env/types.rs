use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-agent values keyed by agent name.
pub type AgentMap<T> = HashMap<String, T>;

/// `(observations, rewards, done, infos)` for every configured agent.
pub type MultiAgentStep<O, I> = (AgentMap<O>, AgentMap<f32>, bool, AgentMap<I>);

/// Stand-in for a simulator process handle. Nothing is ever launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceHandle {
    Placeholder { role: usize },
}

impl InstanceHandle {
    pub fn role(&self) -> usize {
        match self {
            InstanceHandle::Placeholder { role } => *role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub ip: String,
    pub port: String,
}

impl Endpoint {
    /// The address every fake instance reports. Not a real socket.
    pub fn placeholder() -> Self {
        Self {
            ip: "1".to_string(),
            port: "1".to_string(),
        }
    }
}
