use thiserror::Error;

use crate::{
    bridge::BridgeError, config::ConfigError, physics::PhysicsError, rendering::RenderError,
};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Dynamics failure: {0}")]
    Dynamics(#[from] PhysicsError),
}
