use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::loader::{ConfigError, RawSimulationConfig, RawUnityConfig};
use crate::utils::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_PUB_PORT, DEFAULT_REPLY_TIMEOUT_MS, DEFAULT_SIM_DT,
    DEFAULT_SUB_PORT,
};

/// Scenes the renderer knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneId {
    Industrial,
    Warehouse,
    Garage,
    Tunnels,
    NatureForest,
    #[default]
    Alphapilot,
}

impl SceneId {
    /// Numeric scene index on the wire
    pub fn index(self) -> u8 {
        match self {
            SceneId::Industrial => 0,
            SceneId::Warehouse => 1,
            SceneId::Garage => 2,
            SceneId::Tunnels => 3,
            SceneId::NatureForest => 4,
            SceneId::Alphapilot => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Fixed dynamics step [s]
    pub sim_dt: f64,
    pub scene: SceneId,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sim_dt: DEFAULT_SIM_DT,
            scene: SceneId::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_raw(raw: &RawSimulationConfig) -> Result<Self, ConfigError> {
        let sim_dt = raw.sim_dt.unwrap_or(DEFAULT_SIM_DT);
        if !(sim_dt.is_finite() && sim_dt > 0.0) {
            return Err(ConfigError::invalid("simulation.sim_dt", sim_dt));
        }
        Ok(Self {
            sim_dt,
            scene: raw.scene.unwrap_or_default(),
        })
    }
}

/// Renderer session settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UnityConfig {
    /// Arm the renderer bridge on construction
    pub render: bool,
    pub pub_port: u16,
    pub sub_port: u16,
    pub connect_timeout: Duration,
    pub reply_timeout: Duration,
}

impl Default for UnityConfig {
    fn default() -> Self {
        Self {
            render: true,
            pub_port: DEFAULT_PUB_PORT,
            sub_port: DEFAULT_SUB_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            reply_timeout: Duration::from_millis(DEFAULT_REPLY_TIMEOUT_MS),
        }
    }
}

impl UnityConfig {
    pub fn from_raw(raw: &RawUnityConfig) -> Result<Self, ConfigError> {
        let pub_port = raw.pub_port.unwrap_or(DEFAULT_PUB_PORT);
        let sub_port = raw.sub_port.unwrap_or(DEFAULT_SUB_PORT);
        if pub_port == sub_port {
            return Err(ConfigError::invalid("unity.sub_port", sub_port));
        }
        Ok(Self {
            render: raw.render.unwrap_or(true),
            pub_port,
            sub_port,
            connect_timeout: Duration::from_millis(
                raw.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            reply_timeout: Duration::from_millis(
                raw.reply_timeout_ms.unwrap_or(DEFAULT_REPLY_TIMEOUT_MS),
            ),
        })
    }
}
