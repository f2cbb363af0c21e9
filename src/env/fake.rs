//! A replaying backend for unit tests.
//!
//! `FakeEnvCore` stands in for the simulator connection: missions go nowhere,
//! every instance reports the same placeholder endpoint, and every observation
//! is built from a single frame recorded from the navigate scenario. Rewards
//! are always zero and episodes never finish.

use crate::config::FixtureConfig;
use crate::env::errors::EnvError;
use crate::env::multi_agent::MultiAgentEnv;
use crate::env::single_agent::SingleAgentEnv;
use crate::env::traits::EnvBackend;
use crate::env::types::{AgentMap, Endpoint, InstanceHandle, MultiAgentStep};
use crate::frame::RecordedFrame;
use crate::mission::Mission;
use crate::processing::{
    ActionProcessor, CommandActionProcessor, JsonObservationProcessor, ObservationProcessor,
};
use crate::task::{Navigate, TaskSpec};

pub type FakeBackend = FakeEnvCore<CommandActionProcessor, JsonObservationProcessor>;
pub type FakeMultiAgentEnv = MultiAgentEnv<FakeBackend>;
pub type FakeSingleAgentEnv = SingleAgentEnv<FakeBackend>;

pub struct FakeEnvCore<A, O> {
    task: Box<dyn TaskSpec>,
    frame: RecordedFrame,
    instances: Vec<InstanceHandle>,
    actions: A,
    observations: O,
}

impl<A, O> FakeEnvCore<A, O>
where
    A: ActionProcessor,
    O: ObservationProcessor,
{
    /// Loads the recording named by `config`.
    pub fn new(
        task: impl TaskSpec,
        config: &FixtureConfig,
        actions: A,
        observations: O,
    ) -> Result<Self, EnvError> {
        let frame = RecordedFrame::load(&config.asset_path)?;
        Ok(Self::with_frame(task, frame, actions, observations))
    }

    pub fn with_frame(
        task: impl TaskSpec,
        frame: RecordedFrame,
        actions: A,
        observations: O,
    ) -> Self {
        Self {
            task: Box::new(task),
            frame,
            instances: Vec::new(),
            actions,
            observations,
        }
    }

    /// A deep copy of the recording. Only the navigate scenario produced it, so
    /// any other task is refused.
    pub fn raw_frame(&self) -> Result<RecordedFrame, EnvError> {
        if !self.task.as_any().is::<Navigate>() {
            return Err(EnvError::Precondition(format!(
                "the recorded frame was captured from the navigate scenario, not `{}`",
                self.task.name()
            )));
        }
        Ok(self.frame.clone())
    }

    /// Builds every agent's observation and info from a fresh copy of the frame.
    pub fn observe(&self) -> Result<(AgentMap<O::Obs>, AgentMap<O::Info>), EnvError> {
        let mut obs = AgentMap::new();
        let mut info = AgentMap::new();
        for agent in self.task.agent_names() {
            let (pov, metadata) = self.raw_frame()?.into_parts();
            // The recording stores rows bottom-up.
            let pov = pov.flip_vertical();
            let info_json = serde_json::to_string(&metadata)
                .map_err(|e| EnvError::EnvError(Box::new(e)))?;

            let (o, i) = self
                .observations
                .process_observation(agent, pov, &info_json)?;
            obs.insert(agent.clone(), o);
            info.insert(agent.clone(), i);
        }
        Ok((obs, info))
    }
}

impl FakeBackend {
    /// The navigate fixture with the default action and observation handling.
    pub fn navigate(config: &FixtureConfig) -> Result<Self, EnvError> {
        let mut task = Navigate::default();
        if let Some(agents) = &config.agent_names {
            task = task.with_agents(agents.iter().cloned());
        }
        Self::new(
            task,
            config,
            CommandActionProcessor::new(),
            JsonObservationProcessor,
        )
    }
}

impl<A, O> EnvBackend for FakeEnvCore<A, O>
where
    A: ActionProcessor,
    O: ObservationProcessor,
{
    type Act = A::Action;
    type Obs = O::Obs;
    type Info = O::Info;

    fn task(&self) -> &dyn TaskSpec {
        self.task.as_ref()
    }

    fn send_mission(
        &mut self,
        instance: &InstanceHandle,
        mission: &Mission,
        token: &str,
    ) -> Result<(), EnvError> {
        tracing::debug!(
            role = instance.role(),
            "Sending fake mission for {}: {}",
            token,
            mission
        );
        Ok(())
    }

    fn discover_endpoint(
        &mut self,
        _instance: &InstanceHandle,
        _token: &str,
    ) -> Result<Endpoint, EnvError> {
        Ok(Endpoint::placeholder())
    }

    fn setup_instances(&mut self) -> Result<(), EnvError> {
        self.instances = (0..self.task.agent_count())
            .map(|role| InstanceHandle::Placeholder { role })
            .collect();
        tracing::debug!(count = self.instances.len(), "set up fake instances");
        Ok(())
    }

    fn instances(&self) -> &[InstanceHandle] {
        &self.instances
    }

    fn teardown_instances(&mut self) {
        self.instances.clear();
    }

    fn peek_observation(&self) -> Result<AgentMap<Self::Obs>, EnvError> {
        let (obs, _) = self.observe()?;
        Ok(obs)
    }

    fn step(
        &mut self,
        actions: &AgentMap<Self::Act>,
    ) -> Result<MultiAgentStep<Self::Obs, Self::Info>, EnvError> {
        let agents = self.task.agent_names();
        for agent in agents {
            let action = actions
                .get(agent)
                .ok_or_else(|| EnvError::MissingAction(agent.clone()))?;
            // Only checks the action; the replay does not depend on it.
            self.actions.process_action(agent, action)?;
        }

        let (obs, info) = self.observe()?;
        let rewards = agents.iter().map(|a| (a.clone(), 0.0)).collect();
        tracing::trace!(agents = agents.len(), "replayed recorded frame");
        Ok((obs, rewards, false, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Pov;
    use crate::task::Scenario;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// Hands back the image and the serialized metadata untouched, remembering what it saw.
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ObservationProcessor for Recorder {
        type Obs = Pov;
        type Info = String;

        fn process_observation(
            &self,
            agent: &str,
            pov: Pov,
            info_json: &str,
        ) -> Result<(Pov, String), EnvError> {
            self.seen
                .lock()
                .unwrap()
                .push((agent.to_string(), info_json.to_string()));
            Ok((pov, info_json.to_string()))
        }
    }

    fn recording_core(
        task: impl TaskSpec,
    ) -> (FakeEnvCore<CommandActionProcessor, Recorder>, Recorder) {
        let recorder = Recorder::default();
        let core = FakeEnvCore::new(
            task,
            &FixtureConfig::default(),
            CommandActionProcessor::new(),
            recorder.clone(),
        )
        .unwrap();
        (core, recorder)
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn actions_for(agents: &[&str]) -> AgentMap<Value> {
        agents
            .iter()
            .map(|a| (a.to_string(), json!({"forward": 1, "camera": [0.0, 0.0]})))
            .collect()
    }

    #[test]
    fn step_rewards_are_zero_and_never_done() {
        let task = Navigate::default().with_agents(["a", "b"]);
        let (mut core, _) = recording_core(task);
        for _ in 0..5 {
            let (obs, rewards, done, info) = core.step(&actions_for(&["a", "b"])).unwrap();
            assert!(!done);
            assert_eq!(rewards.len(), 2);
            assert!(rewards.values().all(|r| *r == 0.0));
            assert_eq!(obs.len(), 2);
            assert_eq!(info.len(), 2);
        }
    }

    #[test]
    fn observation_is_vertical_flip_of_recording() {
        let (mut core, _) = recording_core(Navigate::default());
        let raw = core.raw_frame().unwrap();
        let (obs, ..) = core.step(&actions_for(&["agent_0"])).unwrap();
        let pov = &obs["agent_0"];

        assert_eq!(pov.shape(), raw.pov().shape());
        let h = pov.height();
        for r in 0..h {
            assert_eq!(pov.row(r), raw.pov().row(h - 1 - r));
        }

        let (again, ..) = core.step(&actions_for(&["agent_0"])).unwrap();
        assert_eq!(again["agent_0"].data(), pov.data());
    }

    #[test]
    fn every_stack_reaches_the_processor_with_metadata() {
        let (core, recorder) = recording_core(Navigate::default());
        core.peek_observation().unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let record: Value = serde_json::from_str(&seen[0].1).unwrap();
        assert!(record.get("pov").is_none());
        let inventory = record["inventory"].as_array().unwrap();
        assert!(!inventory.is_empty());
        // The packaged recording carries no metadata on any stack.
        for stack in inventory {
            assert_eq!(stack["metadata"], json!(0));
        }
    }

    #[test]
    fn returned_values_do_not_alias_the_recording() {
        let (mut core, _) = recording_core(Navigate::default());
        let (mut obs, _, _, mut info) = core.step(&actions_for(&["agent_0"])).unwrap();
        let pristine = core.peek_observation().unwrap();

        obs.get_mut("agent_0").unwrap().data_mut().fill(255);
        info.get_mut("agent_0").unwrap().clear();

        let (next, _, _, next_info) = core.step(&actions_for(&["agent_0"])).unwrap();
        assert_eq!(next["agent_0"], pristine["agent_0"]);
        assert!(!next_info["agent_0"].is_empty());
        assert_eq!(core.peek_observation().unwrap(), pristine);
    }

    #[test]
    fn foreign_task_is_refused_every_time() {
        let (mut core, _) = recording_core(Scenario::new("MineRLTreechop-v0", ["agent_0"]));
        for _ in 0..3 {
            assert!(matches!(core.raw_frame(), Err(EnvError::Precondition(_))));
        }
        assert!(matches!(
            core.peek_observation(),
            Err(EnvError::Precondition(_))
        ));
        assert!(matches!(
            core.step(&actions_for(&["agent_0"])),
            Err(EnvError::Precondition(_))
        ));
    }

    #[test]
    fn missing_and_invalid_actions_surface() {
        let task = Navigate::default().with_agents(["a", "b"]);
        let (mut core, recorder) = recording_core(task);

        let err = core.step(&actions_for(&["a"])).unwrap_err();
        assert!(matches!(err, EnvError::MissingAction(ref agent) if agent == "b"));

        let mut actions = actions_for(&["a", "b"]);
        actions.insert("b".to_string(), json!("not an object"));
        assert!(matches!(
            core.step(&actions),
            Err(EnvError::InvalidAction { .. })
        ));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn actions_for_unconfigured_agents_are_ignored() {
        let (mut core, _) = recording_core(Navigate::default());
        let actions = actions_for(&["agent_0", "stranger"]);
        let (obs, rewards, ..) = core.step(&actions).unwrap();
        assert_eq!(obs.len(), 1);
        assert!(!rewards.contains_key("stranger"));
    }

    #[test]
    fn instances_and_endpoints_are_placeholders() {
        let task = Navigate::default().with_agents(["a", "b", "c"]);
        let (mut core, _) = recording_core(task);
        assert!(core.instances().is_empty());

        core.setup_instances().unwrap();
        assert_eq!(core.instances().len(), 3);
        let handles: Vec<_> = core.instances().to_vec();
        for (role, handle) in handles.iter().enumerate() {
            assert_eq!(handle.role(), role);
            let mission = Mission::for_task(core.task(), 0);
            core.send_mission(handle, &mission, "token-1").unwrap();
            assert_eq!(
                core.discover_endpoint(handle, "token-1").unwrap(),
                Endpoint::placeholder()
            );
        }

        core.teardown_instances();
        assert!(core.instances().is_empty());
    }

    #[test]
    fn mission_send_logs_token_and_rendered_mission() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (mut core, _) = recording_core(Navigate::default().with_agents(["a", "b"]));
        core.setup_instances().unwrap();
        let mission = Mission::for_task(core.task(), 7);
        let handle = core.instances()[1];
        tracing::subscriber::with_default(subscriber, || {
            core.send_mission(&handle, &mission, "token-42").unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Sending fake mission for token-42"));
        assert!(output.contains(&mission.to_string()));
        assert!(output.contains("role=1"));
    }

    #[test]
    fn peek_twice_yields_equal_independent_observations() {
        let backend = FakeBackend::navigate(&FixtureConfig::default()).unwrap();
        let mut first = backend.peek_observation().unwrap();
        let second = backend.peek_observation().unwrap();
        assert_eq!(first, second);

        first.get_mut("agent_0").unwrap().inventory.clear();
        assert_eq!(backend.peek_observation().unwrap(), second);
    }

    #[test]
    fn fixtures_load_independently() {
        let config = FixtureConfig::default().with_agents(["x"]);
        let a = FakeBackend::navigate(&config).unwrap();
        let b = FakeBackend::navigate(&FixtureConfig::default()).unwrap();
        assert_eq!(a.task().agent_names(), ["x"]);
        assert_eq!(b.task().agent_names(), ["agent_0"]);
        assert_eq!(a.raw_frame().unwrap(), b.raw_frame().unwrap());
    }

    #[test]
    fn missing_asset_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let config = FixtureConfig::default().with_asset_path(dir.path().join("nope.json"));
        assert!(matches!(
            FakeBackend::navigate(&config),
            Err(EnvError::DataLoad { .. })
        ));
    }
}
