pub mod config;
pub mod env;
pub mod frame;
pub mod mission;
pub mod processing;
pub mod task;

pub use config::FixtureConfig;
pub use env::{Env, EnvBackend, EnvError, FakeMultiAgentEnv, FakeSingleAgentEnv};
