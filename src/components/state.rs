use nalgebra::{Matrix3x2, Quaternion, SVector, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::WORLD_BOUND;

/// Length of the full state vector
pub const STATE_SIZE: usize = 25;

pub type StateVector = SVector<f64, STATE_SIZE>;

/// Full quadrotor state as exchanged with the dynamics collaborator.
///
/// Only the first 13 entries (position, attitude, linear and angular
/// velocity) carry meaning for the coordinator. The remaining entries belong
/// to the dynamics model and are copied around untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadState {
    pub x: StateVector,
    /// Simulation time [s]
    pub t: f64,
}

impl QuadState {
    pub const POS: usize = 0;
    /// Attitude quaternion, stored w, x, y, z
    pub const ATT: usize = 3;
    pub const VEL: usize = 7;
    pub const OME: usize = 10;
    pub const ACC: usize = 13;
    pub const TAU: usize = 16;
    pub const BOME: usize = 19;
    pub const BACC: usize = 22;
    pub const SIZE: usize = STATE_SIZE;

    /// Number of entries a reduced state needs to pin pose and twist
    pub const REDUCED_SIZE: usize = 13;

    pub fn position(&self) -> Vector3<f64> {
        self.vec3(Self::POS)
    }

    pub fn set_position(&mut self, p: &Vector3<f64>) {
        self.set_vec3(Self::POS, p);
    }

    /// Raw attitude quaternion, not renormalised.
    pub fn quaternion(&self) -> Quaternion<f64> {
        let a = Self::ATT;
        Quaternion::new(self.x[a], self.x[a + 1], self.x[a + 2], self.x[a + 3])
    }

    pub fn attitude(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(self.quaternion())
    }

    pub fn set_attitude(&mut self, q: &Quaternion<f64>) {
        let a = Self::ATT;
        self.x[a] = q.w;
        self.x[a + 1] = q.i;
        self.x[a + 2] = q.j;
        self.x[a + 3] = q.k;
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.vec3(Self::VEL)
    }

    pub fn set_velocity(&mut self, v: &Vector3<f64>) {
        self.set_vec3(Self::VEL, v);
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.vec3(Self::OME)
    }

    pub fn set_angular_velocity(&mut self, w: &Vector3<f64>) {
        self.set_vec3(Self::OME, w);
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.vec3(Self::ACC)
    }

    pub fn set_acceleration(&mut self, a: &Vector3<f64>) {
        self.set_vec3(Self::ACC, a);
    }

    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.x.iter().all(|v| v.is_finite())
    }

    fn vec3(&self, start: usize) -> Vector3<f64> {
        Vector3::new(self.x[start], self.x[start + 1], self.x[start + 2])
    }

    fn set_vec3(&mut self, start: usize, v: &Vector3<f64>) {
        self.x[start] = v.x;
        self.x[start + 1] = v.y;
        self.x[start + 2] = v.z;
    }
}

impl Default for QuadState {
    fn default() -> Self {
        let mut x = StateVector::zeros();
        x[Self::ATT] = 1.0;
        Self { x, t: 0.0 }
    }
}

/// Collective thrust and body rate command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Command time [s]
    pub t: f64,
    /// Mass-normalised collective thrust [m/s^2]
    pub collective_thrust: f64,
    /// Body rates [rad/s]
    pub omega: Vector3<f64>,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            t: 0.0,
            collective_thrust: 0.0,
            omega: Vector3::zeros(),
        }
    }
}

impl Command {
    /// Action layout: `[collective_thrust, omega_x, omega_y, omega_z]`
    pub fn set_action(&mut self, action: &[f64; 4]) {
        self.collective_thrust = action[0];
        self.omega = Vector3::new(action[1], action[2], action[3]);
    }

    pub fn is_finite(&self) -> bool {
        self.collective_thrust.is_finite() && self.omega.iter().all(|v| v.is_finite())
    }
}

/// Axis-aligned bounds of the flyable volume, one `[min, max]` row per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldBox {
    pub bounds: Matrix3x2<f64>,
}

impl Default for WorldBox {
    fn default() -> Self {
        Self::symmetric(WORLD_BOUND)
    }
}

impl WorldBox {
    pub fn symmetric(bound: f64) -> Self {
        Self {
            bounds: Matrix3x2::new(-bound, bound, -bound, bound, -bound, bound),
        }
    }

    pub fn min(&self) -> Vector3<f64> {
        self.bounds.column(0).into_owned()
    }

    pub fn max(&self) -> Vector3<f64> {
        self.bounds.column(1).into_owned()
    }
}
