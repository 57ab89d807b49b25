use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("No track configuration provided")]
    MissingTrack,
    #[error("Both track.positions and track.orientations have to be provided")]
    IncompleteTrack,
    #[error("Length of track.positions ({positions}) and track.orientations ({orientations}) does not match")]
    TrackLengthMismatch {
        positions: usize,
        orientations: usize,
    },
    #[error("Missing required parameter: {0}")]
    MissingRequired(String),
    #[error("Invalid parameter '{name}' with value '{value}'")]
    InvalidParameter { name: String, value: String },
    #[error("No default config path: set {0} or pass an explicit path")]
    DefaultPathUnavailable(String),
}

impl ConfigError {
    pub(crate) fn invalid(name: impl Into<String>, value: impl std::fmt::Debug) -> Self {
        ConfigError::InvalidParameter {
            name: name.into(),
            value: format!("{:?}", value),
        }
    }
}

/// Configuration document as written on disk, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawRacingConfig {
    pub camera: Option<RawCameraConfig>,
    pub track: Option<RawTrackConfig>,
    pub simulation: Option<RawSimulationConfig>,
    pub unity: Option<RawUnityConfig>,
    /// Forwarded untouched to the dynamics collaborator
    pub quadrotor_dynamics: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCameraConfig {
    pub height: Option<i64>,
    pub width: Option<i64>,
    pub fov: Option<f64>,
    pub mount_offset: Option<Vec<f64>>,
    pub uptilt: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTrackConfig {
    pub positions: Option<Vec<Vec<f64>>>,
    pub orientations: Option<Vec<Vec<f64>>>,
    pub elevated_gates: Option<Vec<usize>>,
    pub wave_track: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSimulationConfig {
    pub sim_dt: Option<f64>,
    pub scene: Option<super::SceneId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUnityConfig {
    pub render: Option<bool>,
    pub pub_port: Option<u16>,
    pub sub_port: Option<u16>,
    pub connect_timeout_ms: Option<u64>,
    pub reply_timeout_ms: Option<u64>,
}

impl RawRacingConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}

/// Resolve the default configuration file.
///
/// `$RACING_ENV_PATH/configs/racing_env.yaml` wins; otherwise the file is
/// looked up in the platform config directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(root) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(root).join("configs").join(DEFAULT_CONFIG_FILE));
    }
    dirs::config_dir()
        .map(|dir| dir.join("racing_env").join(DEFAULT_CONFIG_FILE))
        .ok_or_else(|| ConfigError::DefaultPathUnavailable(CONFIG_PATH_ENV.to_string()))
}
