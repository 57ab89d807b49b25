use nalgebra::Vector3;

use super::loader::{ConfigError, RawCameraConfig};
use crate::utils::{
    DEFAULT_CAMERA_OFFSET, DEFAULT_CAMERA_UPTILT, DEFAULT_FOV, DEFAULT_IMAGE_HEIGHT,
    DEFAULT_IMAGE_WIDTH, RGB_CHANNELS,
};

/// Intrinsics and mounting of the RGB camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Image height [px]
    pub height: usize,
    /// Image width [px]
    pub width: usize,
    /// Field of view [deg]
    pub fov: f64,
    /// Camera centre in the body frame [m]
    pub mount_offset: Vector3<f64>,
    /// Uptilt of the optical axis [deg]
    pub uptilt: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_IMAGE_HEIGHT,
            width: DEFAULT_IMAGE_WIDTH,
            fov: DEFAULT_FOV,
            mount_offset: Vector3::from(DEFAULT_CAMERA_OFFSET),
            uptilt: DEFAULT_CAMERA_UPTILT,
        }
    }
}

impl CameraConfig {
    /// Height and width are mandatory once a camera block exists.
    pub fn from_raw(raw: &RawCameraConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let height = positive_dimension("camera.height", raw.height)?;
        let width = positive_dimension("camera.width", raw.width)?;
        // A flat RGB observation must stay addressable
        if height.checked_mul(width).and_then(|p| p.checked_mul(RGB_CHANNELS)).is_none() {
            return Err(ConfigError::invalid("camera", (height, width)));
        }

        let fov = raw.fov.unwrap_or(defaults.fov);
        if !(fov.is_finite() && fov > 0.0) {
            return Err(ConfigError::invalid("camera.fov", fov));
        }

        let mount_offset = match &raw.mount_offset {
            Some(offset) if offset.len() == 3 && offset.iter().all(|v| v.is_finite()) => {
                Vector3::new(offset[0], offset[1], offset[2])
            }
            Some(offset) => return Err(ConfigError::invalid("camera.mount_offset", offset)),
            None => defaults.mount_offset,
        };

        let uptilt = raw.uptilt.unwrap_or(defaults.uptilt);
        if !uptilt.is_finite() {
            return Err(ConfigError::invalid("camera.uptilt", uptilt));
        }

        Ok(Self {
            height,
            width,
            fov,
            mount_offset,
            uptilt,
        })
    }
}

fn positive_dimension(name: &str, value: Option<i64>) -> Result<usize, ConfigError> {
    match value {
        // Frames travel as PNG, whose dimensions are 32-bit
        Some(v) if v > 0 && v <= i64::from(u32::MAX) => Ok(v as usize),
        Some(v) => Err(ConfigError::invalid(name, v)),
        None => Err(ConfigError::MissingRequired(name.to_string())),
    }
}
