use std::path::Path;
use tracing::{debug, info};

mod camera;
mod loader;
mod simulation;
mod track;

pub use camera::CameraConfig;
pub use loader::{
    default_config_path, ConfigError, RawCameraConfig, RawRacingConfig, RawSimulationConfig,
    RawTrackConfig, RawUnityConfig,
};
pub use simulation::{SceneId, SimulationConfig, UnityConfig};
pub use track::TrackConfig;

/// Validated configuration of a racing environment.
///
/// Read once at construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RacingConfig {
    pub camera: CameraConfig,
    pub track: TrackConfig,
    pub simulation: SimulationConfig,
    pub unity: UnityConfig,
    /// Opaque parameters for the dynamics collaborator
    pub dynamics: Option<serde_yaml::Value>,
}

impl RacingConfig {
    pub fn from_raw(raw: RawRacingConfig) -> Result<Self, ConfigError> {
        let track = match &raw.track {
            Some(track) => TrackConfig::from_raw(track)?,
            None => return Err(ConfigError::MissingTrack),
        };

        let camera = match &raw.camera {
            Some(camera) => CameraConfig::from_raw(camera)?,
            None => CameraConfig::default(),
        };

        let simulation = match &raw.simulation {
            Some(simulation) => SimulationConfig::from_raw(simulation)?,
            None => SimulationConfig::default(),
        };

        let unity = match &raw.unity {
            Some(unity) => UnityConfig::from_raw(unity)?,
            None => UnityConfig::default(),
        };

        debug!(
            "Loaded track with {} gates, camera {}x{}",
            track.num_gates(),
            camera.width,
            camera.height
        );

        Ok(Self {
            camera,
            track,
            simulation,
            unity,
            dynamics: raw.quadrotor_dynamics,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_raw(RawRacingConfig::from_yaml_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading racing config from {}", path.display());
        Self::from_raw(RawRacingConfig::from_file(path)?)
    }

    /// Load from the location given by [`default_config_path`].
    pub fn from_default_path() -> Result<Self, ConfigError> {
        Self::from_file(default_config_path()?)
    }
}
