use racing_env::config::RacingConfig;
use std::io::Write;
use tempfile::NamedTempFile;

/// Image size used by every rendering fixture
pub const TEST_HEIGHT: usize = 6;
pub const TEST_WIDTH: usize = 8;

/// Two gates, rendering armed on construction.
pub const TWO_GATE_TRACK: &str = r#"
camera:
  height: 6
  width: 8
  fov: 90.0
track:
  positions: [[0.0, 0.0, 1.0], [5.0, 0.0, 1.0]]
  orientations: [[1.0, 0.0, 0.0, 0.0], [0.7071, 0.0, 0.0, 0.7071]]
simulation:
  scene: garage
"#;

/// Nine gates so the default elevated subset [2, 3, 6, 7] applies in full.
pub const NINE_GATE_TRACK: &str = r#"
camera:
  height: 6
  width: 8
track:
  positions:
    - [0.0, 0.0, 1.0]
    - [4.0, 1.0, 1.5]
    - [8.0, 2.0, 2.0]
    - [12.0, 1.0, 2.5]
    - [16.0, 0.0, 1.0]
    - [12.0, -4.0, 1.5]
    - [8.0, -5.0, 2.0]
    - [4.0, -4.0, 2.5]
    - [0.0, -2.0, 1.0]
  orientations:
    - [1.0, 0.0, 0.0, 0.0]
    - [0.9659, 0.0, 0.0, 0.2588]
    - [0.8660, 0.0, 0.0, 0.5]
    - [0.7071, 0.0, 0.0, 0.7071]
    - [0.5, 0.0, 0.0, 0.8660]
    - [0.0, 0.0, 0.0, 1.0]
    - [-0.5, 0.0, 0.0, 0.8660]
    - [-0.7071, 0.0, 0.0, 0.7071]
    - [-0.8660, 0.0, 0.0, 0.5]
unity:
  render: false
"#;

/// Same two gates, but the bridge is never armed.
pub fn no_render_track() -> String {
    format!("{TWO_GATE_TRACK}unity:\n  render: false\n")
}

/// Camera mounted the way the physical racer carries it.
pub fn mounted_camera_track() -> String {
    TWO_GATE_TRACK.replace(
        "  fov: 90.0\n",
        "  fov: 90.0\n  mount_offset: [0.2, 0.0, 0.1]\n  uptilt: 30.0\n",
    )
}

pub fn load(yaml: &str) -> RacingConfig {
    RacingConfig::from_yaml_str(yaml).expect("fixture config must load")
}

/// Persist `yaml` so it can be loaded through a path.
pub fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}
