use std::env;
use std::path::PathBuf;

/// Environment variable that points the fixture at a different recording.
pub const ASSET_ENV_VAR: &str = "RECORDED_ENV_ASSET";

#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Recorded frame to replay.
    pub asset_path: PathBuf,
    /// Overrides the navigate task's agent roster when set.
    pub agent_names: Option<Vec<String>>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            asset_path: default_asset_path(),
            agent_names: None,
        }
    }
}

impl FixtureConfig {
    /// Defaults, with the asset path taken from `RECORDED_ENV_ASSET` if it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env::var_os(ASSET_ENV_VAR) {
            config.asset_path = PathBuf::from(path);
        }
        config
    }

    pub fn with_asset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_path = path.into();
        self
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agent_names = Some(agents.into_iter().map(Into::into).collect());
        self
    }
}

/// The recording shipped with the crate, captured from the navigate scenario.
pub fn default_asset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("navigate_frame.json")
}
