use tracing::debug;

use crate::components::StaticGate;
use crate::config::TrackConfig;
use crate::resources::gate_world_orientation;
use crate::utils::WAVE_ELEVATION;

/// The gates of a race track, in configuration order.
#[derive(Debug, Clone)]
pub struct Track {
    gates: Vec<StaticGate>,
    /// z of every gate as configured
    configured_z: Vec<f64>,
    elevated: Vec<usize>,
    wave_track: bool,
}

impl Track {
    pub fn from_config(config: &TrackConfig) -> Self {
        let gates: Vec<StaticGate> = config
            .positions
            .iter()
            .zip(&config.orientations)
            .enumerate()
            .map(|(i, (position, orientation))| {
                StaticGate::new(i).with_pose(*position, gate_world_orientation(orientation))
            })
            .collect();
        let configured_z = gates.iter().map(|g| g.position.z).collect();

        let mut track = Self {
            gates,
            configured_z,
            elevated: config.elevated_gates.clone(),
            wave_track: false,
        };
        if config.wave_track {
            track.set_wave_track(true);
        }
        track
    }

    pub fn gates(&self) -> &[StaticGate] {
        &self.gates
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn elevated_gates(&self) -> &[usize] {
        &self.elevated
    }

    pub fn is_wave_track(&self) -> bool {
        self.wave_track
    }

    /// Raise (or lower back) the elevated gates. Only their z changes.
    pub fn set_wave_track(&mut self, on: bool) {
        let offset = if on { WAVE_ELEVATION } else { 0.0 };
        for &i in &self.elevated {
            if let Some(gate) = self.gates.get_mut(i) {
                gate.position.z = self.configured_z[i] + offset;
            }
        }
        debug!("Wave track {}", if on { "on" } else { "off" });
        self.wave_track = on;
    }
}
