pub mod bridge;
pub mod components;
pub mod config;
pub mod environment;
pub mod physics;
pub mod rendering;
pub mod resources;
pub mod utils;

pub use bridge::{RenderBridge, StubRenderer, TcpBridge};
pub use config::RacingConfig;
pub use environment::{RacingEnv, RacingEnvBuilder, SessionState};
pub use utils::{init_logging, SimError};
