use crate::env::errors::EnvError;
use crate::env::types::{AgentMap, Endpoint, InstanceHandle, MultiAgentStep};
use crate::mission::Mission;
use crate::task::TaskSpec;

pub trait Env: Send {
    type Obs: Send + Clone + 'static;
    type Act: Send + Clone + 'static;
    type Info: Send + Clone + 'static;

    fn reset(&mut self) -> Result<Self::Obs, EnvError>;
    fn step(&mut self, act: Self::Act) -> Result<(Self::Obs, f32, bool, Self::Info), EnvError>;
    fn close(&mut self) -> Result<(), EnvError>;
}

/// What an environment shell needs from whatever stands behind it: a real
/// simulator connection or a canned replay.
///
/// Shells hold a backend and delegate to it; the backend never knows which
/// shell is driving it.
pub trait EnvBackend: Send {
    type Act: Send + Clone + 'static;
    type Obs: Send + Clone + 'static;
    type Info: Send + Clone + 'static;

    fn task(&self) -> &dyn TaskSpec;

    /// Delivers a mission to one instance, tagged with the episode's correlation token.
    fn send_mission(
        &mut self,
        instance: &InstanceHandle,
        mission: &Mission,
        token: &str,
    ) -> Result<(), EnvError>;

    fn discover_endpoint(
        &mut self,
        instance: &InstanceHandle,
        token: &str,
    ) -> Result<Endpoint, EnvError>;

    /// Brings up one instance per configured agent, replacing any previous roster.
    fn setup_instances(&mut self) -> Result<(), EnvError>;

    fn instances(&self) -> &[InstanceHandle];

    fn teardown_instances(&mut self);

    /// Observations for the current state. Never advances the episode.
    fn peek_observation(&self) -> Result<AgentMap<Self::Obs>, EnvError>;

    fn step(
        &mut self,
        actions: &AgentMap<Self::Act>,
    ) -> Result<MultiAgentStep<Self::Obs, Self::Info>, EnvError>;
}
