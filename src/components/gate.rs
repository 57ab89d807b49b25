use nalgebra::{Quaternion, Vector3};

use crate::utils::{GATE_ID_PREFIX, GATE_PREFAB};

/// A static racing gate. Pose only.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticGate {
    pub id: String,
    /// Renderer prefab to instantiate
    pub prefab: String,
    pub position: Vector3<f64>,
    /// World orientation, w, x, y, z, as handed to the renderer
    pub orientation: Quaternion<f64>,
    pub size: Vector3<f64>,
}

impl StaticGate {
    pub fn new(index: usize) -> Self {
        Self {
            id: format!("{}{}", GATE_ID_PREFIX, index),
            prefab: GATE_PREFAB.to_string(),
            position: Vector3::zeros(),
            orientation: Quaternion::identity(),
            size: Vector3::repeat(1.0),
        }
    }

    pub fn with_pose(mut self, position: Vector3<f64>, orientation: Quaternion<f64>) -> Self {
        self.position = position;
        self.orientation = orientation;
        self
    }
}
