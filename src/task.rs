use std::any::Any;
use std::fmt;

/// Describes the scenario an environment runs and the agents taking part in it.
pub trait TaskSpec: Any + fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Agent names in roster order.
    fn agent_names(&self) -> &[String];

    fn agent_count(&self) -> usize {
        self.agent_names().len()
    }

    /// Used for the scenario identity check on recorded data.
    fn as_any(&self) -> &dyn Any;
}

/// The navigation scenario the packaged recording was captured from.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigate {
    name: String,
    agent_names: Vec<String>,
    pub dense: bool,
    pub extreme: bool,
}

impl Navigate {
    pub fn new(dense: bool, extreme: bool) -> Self {
        let name = format!(
            "MineRLNavigate{}{}-v0",
            if extreme { "Extreme" } else { "" },
            if dense { "Dense" } else { "" }
        );
        Self {
            name,
            agent_names: vec!["agent_0".to_string()],
            dense,
            extreme,
        }
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agent_names = agents.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for Navigate {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl TaskSpec for Navigate {
    fn name(&self) -> &str {
        &self.name
    }

    fn agent_names(&self) -> &[String] {
        &self.agent_names
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Any other named scenario. The recorded fixture refuses to replay for these.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    name: String,
    agent_names: Vec<String>,
}

impl Scenario {
    pub fn new<I, S>(name: impl Into<String>, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            agent_names: agents.into_iter().map(Into::into).collect(),
        }
    }
}

impl TaskSpec for Scenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn agent_names(&self) -> &[String] {
        &self.agent_names
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
