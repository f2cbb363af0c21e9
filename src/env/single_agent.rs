use crate::env::errors::EnvError;
use crate::env::multi_agent::MultiAgentEnv;
use crate::env::traits::{Env, EnvBackend};
use crate::env::types::AgentMap;

/// Unkeyed view of a one-agent [`MultiAgentEnv`].
pub struct SingleAgentEnv<B> {
    inner: MultiAgentEnv<B>,
    agent: String,
}

impl<B: EnvBackend> SingleAgentEnv<B> {
    pub fn new(backend: B) -> Result<Self, EnvError> {
        let inner = MultiAgentEnv::new(backend);
        let agent = match inner.agent_names() {
            [agent] => agent.clone(),
            names => {
                return Err(EnvError::Precondition(format!(
                    "single-agent environment needs exactly one agent, task `{}` has {}",
                    inner.task().name(),
                    names.len()
                )));
            }
        };
        Ok(Self { inner, agent })
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn inner(&self) -> &MultiAgentEnv<B> {
        &self.inner
    }

    pub fn peek(&self) -> Result<B::Obs, EnvError> {
        let obs = self.inner.peek()?;
        self.take(obs)
    }

    fn take<T>(&self, mut keyed: AgentMap<T>) -> Result<T, EnvError> {
        keyed.remove(&self.agent).ok_or_else(|| EnvError::Observation {
            agent: self.agent.clone(),
            reason: "backend returned no entry for this agent".to_string(),
        })
    }
}

impl<B: EnvBackend> Env for SingleAgentEnv<B> {
    type Obs = B::Obs;
    type Act = B::Act;
    type Info = B::Info;

    fn reset(&mut self) -> Result<Self::Obs, EnvError> {
        let obs = self.inner.reset()?;
        self.take(obs)
    }

    fn step(&mut self, act: Self::Act) -> Result<(Self::Obs, f32, bool, Self::Info), EnvError> {
        let actions = AgentMap::from([(self.agent.clone(), act)]);
        let (obs, rewards, done, infos) = self.inner.step(&actions)?;
        Ok((self.take(obs)?, self.take(rewards)?, done, self.take(infos)?))
    }

    fn close(&mut self) -> Result<(), EnvError> {
        self.inner.close()
    }
}
