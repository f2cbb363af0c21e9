use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::TaskSpec;

/// Structured description of the scenario to launch.
///
/// The fixture never transmits it; `Display` renders it for the log only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub task_name: String,
    pub agent_names: Vec<String>,
    pub episode: u64,
}

impl Mission {
    pub fn for_task(task: &dyn TaskSpec, episode: u64) -> Self {
        Self {
            task_name: task.name().to_string(),
            agent_names: task.agent_names().to_vec(),
            episode,
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Mission><About><Summary>{}</Summary><Episode>{}</Episode></About>",
            escape(&self.task_name),
            self.episode
        )?;
        for (role, name) in self.agent_names.iter().enumerate() {
            write!(
                f,
                "<AgentSection role=\"{}\"><Name>{}</Name></AgentSection>",
                role,
                escape(name)
            )?;
        }
        write!(f, "</Mission>")
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
