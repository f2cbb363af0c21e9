//! Action and observation handling that sits between an environment and the simulator.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::env::EnvError;
use crate::frame::Pov;

/// Turns an agent's raw action into whatever the simulator consumes.
pub trait ActionProcessor: Send {
    type Action: Send + Clone + 'static;
    type Processed;

    fn process_action(
        &self,
        agent: &str,
        action: &Self::Action,
    ) -> Result<Self::Processed, EnvError>;
}

/// Turns a raw image and the serialized metadata record into an observation and info pair.
pub trait ObservationProcessor: Send {
    type Obs: Send + Clone + 'static;
    type Info: Send + Clone + 'static;

    fn process_observation(
        &self,
        agent: &str,
        pov: Pov,
        info_json: &str,
    ) -> Result<(Self::Obs, Self::Info), EnvError>;
}

/// Renders a JSON object action as simulator command lines (`"key value"`, sorted by key).
#[derive(Debug, Clone, Default)]
pub struct CommandActionProcessor {
    known_keys: Option<BTreeSet<String>>,
}

impl CommandActionProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any action key outside `keys`.
    pub fn with_known_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_keys: Some(keys.into_iter().map(Into::into).collect()),
        }
    }
}

impl ActionProcessor for CommandActionProcessor {
    type Action = Value;
    type Processed = String;

    fn process_action(&self, agent: &str, action: &Value) -> Result<String, EnvError> {
        let invalid = |reason: String| EnvError::InvalidAction {
            agent: agent.to_string(),
            reason,
        };
        let fields = action
            .as_object()
            .ok_or_else(|| invalid(format!("expected an object, got {action}")))?;

        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();

        let mut lines = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(known) = &self.known_keys {
                if !known.contains(key) {
                    return Err(invalid(format!("unknown action `{key}`")));
                }
            }
            let value = match &fields[key] {
                Value::String(s) => s.clone(),
                Value::Bool(b) => u8::from(*b).to_string(),
                Value::Array(items) => items
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
                other => other.to_string(),
            };
            lines.push(format!("{key} {value}"));
        }
        Ok(lines.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: u32,
    pub metadata: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub pov: Pov,
    pub inventory: Vec<ItemStack>,
}

#[derive(Deserialize)]
struct InventoryView {
    inventory: Vec<ItemStack>,
}

/// Parses the metadata record into a typed inventory; the whole record becomes the info.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObservationProcessor;

impl ObservationProcessor for JsonObservationProcessor {
    type Obs = Observation;
    type Info = Value;

    fn process_observation(
        &self,
        agent: &str,
        pov: Pov,
        info_json: &str,
    ) -> Result<(Observation, Value), EnvError> {
        let failed = |e: serde_json::Error| EnvError::Observation {
            agent: agent.to_string(),
            reason: e.to_string(),
        };
        let info: Value = serde_json::from_str(info_json).map_err(failed)?;
        let view = InventoryView::deserialize(&info).map_err(failed)?;
        Ok((
            Observation {
                pov,
                inventory: view.inventory,
            },
            info,
        ))
    }
}
