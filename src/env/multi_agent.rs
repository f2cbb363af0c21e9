use uuid::Uuid;

use crate::env::errors::EnvError;
use crate::env::traits::EnvBackend;
use crate::env::types::{AgentMap, Endpoint, MultiAgentStep};
use crate::mission::Mission;
use crate::task::TaskSpec;

/// Keyed reset/step contract over any backend.
///
/// Owns the episode bookkeeping: the instance roster, the per-episode
/// correlation token, resolved endpoints and the episode/step counters.
pub struct MultiAgentEnv<B> {
    backend: B,
    token: Option<String>,
    endpoints: Vec<Endpoint>,
    episode: u64,
    steps: u64,
}

impl<B: EnvBackend> MultiAgentEnv<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            token: None,
            endpoints: Vec::new(),
            episode: 0,
            steps: 0,
        }
    }

    pub fn task(&self) -> &dyn TaskSpec {
        self.backend.task()
    }

    pub fn agent_names(&self) -> &[String] {
        self.backend.task().agent_names()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Episodes started so far.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Steps taken in the current episode.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Correlation token of the current episode, if one has started.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Starts a new episode and returns every agent's first observation.
    pub fn reset(&mut self) -> Result<AgentMap<B::Obs>, EnvError> {
        if self.backend.instances().is_empty() {
            self.backend.setup_instances()?;
        }

        let token = Uuid::new_v4().to_string();
        let mission = Mission::for_task(self.backend.task(), self.episode);
        let instances = self.backend.instances().to_vec();

        let mut endpoints = Vec::with_capacity(instances.len());
        for instance in &instances {
            self.backend.send_mission(instance, &mission, &token)?;
            let endpoint = self.backend.discover_endpoint(instance, &token)?;
            tracing::debug!(
                role = instance.role(),
                ip = %endpoint.ip,
                port = %endpoint.port,
                "instance ready"
            );
            endpoints.push(endpoint);
        }

        self.endpoints = endpoints;
        self.token = Some(token);
        self.episode += 1;
        self.steps = 0;

        self.backend.peek_observation()
    }

    pub fn step(
        &mut self,
        actions: &AgentMap<B::Act>,
    ) -> Result<MultiAgentStep<B::Obs, B::Info>, EnvError> {
        let result = self.backend.step(actions)?;
        self.steps += 1;
        Ok(result)
    }

    /// Current observations without taking a step.
    pub fn peek(&self) -> Result<AgentMap<B::Obs>, EnvError> {
        self.backend.peek_observation()
    }

    /// Releases the instance roster. A later `reset` brings it back up.
    pub fn close(&mut self) -> Result<(), EnvError> {
        self.backend.teardown_instances();
        self.endpoints.clear();
        self.token = None;
        Ok(())
    }
}
