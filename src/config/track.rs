use nalgebra::{Quaternion, Vector3};

use super::loader::{ConfigError, RawTrackConfig};
use crate::utils::DEFAULT_ELEVATED_GATES;

/// Gate poses as configured, before any renderer-frame adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackConfig {
    pub positions: Vec<Vector3<f64>>,
    /// Configured orientations, (w, x, y, z) on disk
    pub orientations: Vec<Quaternion<f64>>,
    /// Gates raised by the wave track
    pub elevated_gates: Vec<usize>,
    /// Raise the elevated gates at construction
    pub wave_track: bool,
}

impl TrackConfig {
    pub fn from_raw(raw: &RawTrackConfig) -> Result<Self, ConfigError> {
        let (raw_positions, raw_orientations) = match (&raw.positions, &raw.orientations) {
            (Some(p), Some(o)) => (p, o),
            _ => return Err(ConfigError::IncompleteTrack),
        };

        if raw_positions.len() != raw_orientations.len() {
            return Err(ConfigError::TrackLengthMismatch {
                positions: raw_positions.len(),
                orientations: raw_orientations.len(),
            });
        }

        let positions = raw_positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.len() != 3 || !p.iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::invalid(format!("track.positions[{}]", i), p));
                }
                Ok(Vector3::new(p[0], p[1], p[2]))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let orientations = raw_orientations
            .iter()
            .enumerate()
            .map(|(i, q)| {
                if q.len() != 4 || !q.iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::invalid(format!("track.orientations[{}]", i), q));
                }
                let quat = Quaternion::new(q[0], q[1], q[2], q[3]);
                if quat.norm() == 0.0 {
                    return Err(ConfigError::invalid(format!("track.orientations[{}]", i), q));
                }
                Ok(quat)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let num_gates = positions.len();
        let elevated_gates = match &raw.elevated_gates {
            Some(indices) => {
                if let Some(bad) = indices.iter().find(|&&i| i >= num_gates) {
                    return Err(ConfigError::invalid("track.elevated_gates", bad));
                }
                indices.clone()
            }
            // The default wave subset only applies to gates that exist
            None => DEFAULT_ELEVATED_GATES
                .iter()
                .copied()
                .filter(|&i| i < num_gates)
                .collect(),
        };

        Ok(Self {
            positions,
            orientations,
            elevated_gates,
            wave_track: raw.wave_track.unwrap_or(false),
        })
    }

    pub fn num_gates(&self) -> usize {
        self.positions.len()
    }
}
