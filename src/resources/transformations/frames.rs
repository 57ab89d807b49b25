use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

/// Fixed yaw of -pi/2 that aligns configured frames with the renderer's axes.
///
/// Every frame-convention correction in the crate goes through this value.
pub fn axis_alignment() -> UnitQuaternion<f64> {
    let half = -0.5 * FRAC_PI_2;
    UnitQuaternion::new_unchecked(Quaternion::new(half.cos(), 0.0, 0.0, half.sin()))
}

/// Pitch rotation for a camera tilted up by `uptilt_deg` degrees.
pub fn uptilt_rotation(uptilt_deg: f64) -> UnitQuaternion<f64> {
    let angle = -(uptilt_deg / 90.0) * FRAC_PI_2;
    UnitQuaternion::new_unchecked(Quaternion::new(
        (0.5 * angle).cos(),
        0.0,
        (0.5 * angle).sin(),
        0.0,
    ))
}

/// World orientation of a gate as handed to the renderer: `q_config * Q_axis`.
pub fn gate_world_orientation(q_config: &Quaternion<f64>) -> Quaternion<f64> {
    q_config * axis_alignment().into_inner()
}

/// Rigid transform from the body frame to the camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraExtrinsics {
    /// Camera centre expressed in the body frame [m]
    pub b_r_bc: Vector3<f64>,
    /// Rotation body -> camera
    pub r_bc: Matrix3<f64>,
}

impl CameraExtrinsics {
    /// Camera mounted at `offset` and pitched up by `uptilt_deg`.
    pub fn mounted(offset: Vector3<f64>, uptilt_deg: f64) -> Self {
        let rotation = uptilt_rotation(uptilt_deg) * axis_alignment();
        Self {
            b_r_bc: offset,
            r_bc: rotation.to_rotation_matrix().into_inner(),
        }
    }

    /// Rendering-only environments put the camera at the body origin.
    pub fn rendering_only() -> Self {
        Self::mounted(Vector3::zeros(), 0.0)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_matrix(&self.r_bc)
    }
}

/// Axis conventions shared by the simulation and the renderer.
#[derive(Debug, Clone)]
pub struct FrameConvention {
    /// Axis remap from the world frame to the renderer frame (self-inverse)
    world_to_renderer: Matrix3<f64>,
}

impl Default for FrameConvention {
    fn default() -> Self {
        // World (x-forward, y-left, z-up) to Renderer (x, y-up, z-forward):
        // - World's z axis -> Renderer's y axis (up)
        // - World's y axis -> Renderer's z axis
        let world_to_renderer = Matrix3::new(
            1.0, 0.0, 0.0, // X -> X
            0.0, 0.0, 1.0, // Z -> Y
            0.0, 1.0, 0.0, // Y -> Z
        );
        Self { world_to_renderer }
    }
}

impl FrameConvention {
    /// Position in renderer order, single precision as the wire expects.
    pub fn position_to_renderer(&self, position: &Vector3<f64>) -> [f32; 3] {
        let p = self.world_to_renderer * position;
        [p.x as f32, p.y as f32, p.z as f32]
    }

    /// Sizes swap axes like positions but never change sign.
    pub fn size_to_renderer(&self, size: &Vector3<f64>) -> [f32; 3] {
        self.position_to_renderer(size)
    }

    /// Quaternion in renderer (x, y, z, w) order.
    pub fn quaternion_to_renderer(&self, attitude: &Quaternion<f64>) -> [f32; 4] {
        let q = renderer_quaternion(attitude);
        [q.i as f32, q.j as f32, q.k as f32, q.w as f32]
    }
}

/// Conjugating a rotation by the y/z swap mirrors its axis and flips its sense.
fn renderer_quaternion(q: &Quaternion<f64>) -> Quaternion<f64> {
    Quaternion::new(q.w, -q.i, -q.k, -q.j)
}
