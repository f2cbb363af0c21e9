mod errors;
pub mod fake;
pub mod multi_agent;
pub mod single_agent;
mod traits;
mod types;
mod vec_env;

pub use errors::EnvError;
pub use fake::{FakeBackend, FakeEnvCore, FakeMultiAgentEnv, FakeSingleAgentEnv};
pub use multi_agent::MultiAgentEnv;
pub use single_agent::SingleAgentEnv;
pub use traits::{Env, EnvBackend};
pub use types::{AgentMap, Endpoint, InstanceHandle, MultiAgentStep};
pub use vec_env::VecEnv;
