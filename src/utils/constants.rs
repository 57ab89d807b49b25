pub const GRAVITY: f64 = 9.81; // m/s^2

pub const DEFAULT_SIM_DT: f64 = 0.02; // s
pub const MAX_SUBSTEP: f64 = 0.0025; // Maximum integration substep (s)

// Camera defaults used when the config has no camera block
pub const DEFAULT_IMAGE_HEIGHT: usize = 600;
pub const DEFAULT_IMAGE_WIDTH: usize = 800;
pub const DEFAULT_FOV: f64 = 90.0; // degrees
pub const DEFAULT_CAMERA_UPTILT: f64 = 30.0; // degrees
pub const DEFAULT_CAMERA_OFFSET: [f64; 3] = [0.2, 0.0, 0.1]; // m, body frame

// World bounds handed to the dynamics, per axis
pub const WORLD_BOUND: f64 = 100.0; // m

// Quadrotor size as seen by the renderer
pub const QUAD_SIZE: f64 = 0.5; // m

// Track
pub const GATE_ID_PREFIX: &str = "racing_gate_";
pub const GATE_PREFAB: &str = "rpg_gate";
pub const WAVE_ELEVATION: f64 = 3.0; // m
pub const DEFAULT_ELEVATED_GATES: [usize; 4] = [2, 3, 6, 7];

// Observation / action layout
pub const OBS_DIM: usize = 12;
pub const ACT_DIM: usize = 4;
pub const RGB_CHANNELS: usize = 3;
pub const FLOW_CHANNELS: usize = 2;

// Renderer bridge
pub const DEFAULT_PUB_PORT: u16 = 10253;
pub const DEFAULT_SUB_PORT: u16 = 10254;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 5000;

// Default config location
pub const CONFIG_PATH_ENV: &str = "RACING_ENV_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "racing_env.yaml";
