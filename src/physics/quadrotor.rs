use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::debug;

use crate::components::{Command, QuadState, WorldBox};
use crate::physics::{PhysicsError, QuadrotorDynamics};
use crate::utils::{clamp_symmetric, GRAVITY, MAX_SUBSTEP, QUAD_SIZE};

/// Limits of the body-rate model.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrotorParams {
    /// Minimum mass-normalised collective thrust [m/s^2]
    pub thrust_min: f64,
    /// Maximum mass-normalised collective thrust [m/s^2]
    pub thrust_max: f64,
    /// Body rate limits [rad/s]
    pub omega_max: Vector3<f64>,
    pub gravity: f64,
}

impl Default for QuadrotorParams {
    fn default() -> Self {
        Self {
            thrust_min: 0.0,
            thrust_max: 40.0,
            omega_max: Vector3::new(6.0, 6.0, 2.0),
            gravity: GRAVITY,
        }
    }
}

/// Reference body-rate quadrotor.
///
/// Body rates track the command instantly; collective thrust acts along the
/// body z axis. Translation and attitude are integrated with RK4 over
/// substeps no longer than [`MAX_SUBSTEP`].
#[derive(Debug, Clone)]
pub struct Quadrotor {
    params: QuadrotorParams,
    state: QuadState,
    world_box: WorldBox,
    size: Vector3<f64>,
}

impl Default for Quadrotor {
    fn default() -> Self {
        Self::new(QuadrotorParams::default())
    }
}

/// Integrated part of the state
#[derive(Debug, Clone, Copy)]
struct Kinematics {
    position: Vector3<f64>,
    attitude: Quaternion<f64>,
    velocity: Vector3<f64>,
}

struct Derivatives {
    velocity: Vector3<f64>,
    attitude: Quaternion<f64>,
    acceleration: Vector3<f64>,
}

impl Quadrotor {
    pub fn new(params: QuadrotorParams) -> Self {
        Self {
            params,
            state: QuadState::default(),
            world_box: WorldBox::default(),
            size: Vector3::repeat(QUAD_SIZE),
        }
    }

    pub fn params(&self) -> &QuadrotorParams {
        &self.params
    }

    fn derivatives(&self, k: &Kinematics, thrust: f64, omega: &Vector3<f64>) -> Derivatives {
        let rotation = UnitQuaternion::new_normalize(k.attitude);
        let acceleration =
            rotation * Vector3::new(0.0, 0.0, thrust) - Vector3::new(0.0, 0.0, self.params.gravity);
        let omega_quat = Quaternion::new(0.0, omega.x, omega.y, omega.z);
        Derivatives {
            velocity: k.velocity,
            attitude: k.attitude * omega_quat * 0.5,
            acceleration,
        }
    }

    fn rk4_step(&self, k: &Kinematics, thrust: f64, omega: &Vector3<f64>, h: f64) -> Kinematics {
        let advance = |d: &Derivatives, scale: f64| Kinematics {
            position: k.position + d.velocity * scale,
            attitude: k.attitude + d.attitude * scale,
            velocity: k.velocity + d.acceleration * scale,
        };

        let k1 = self.derivatives(k, thrust, omega);
        let k2 = self.derivatives(&advance(&k1, h / 2.0), thrust, omega);
        let k3 = self.derivatives(&advance(&k2, h / 2.0), thrust, omega);
        let k4 = self.derivatives(&advance(&k3, h), thrust, omega);

        let attitude = k.attitude
            + (k1.attitude + k2.attitude * 2.0 + k3.attitude * 2.0 + k4.attitude) * (h / 6.0);

        Kinematics {
            position: k.position
                + (k1.velocity + 2.0 * k2.velocity + 2.0 * k3.velocity + k4.velocity) * (h / 6.0),
            attitude: attitude.normalize(),
            velocity: k.velocity
                + (k1.acceleration + 2.0 * k2.acceleration + 2.0 * k3.acceleration
                    + k4.acceleration)
                    * (h / 6.0),
        }
    }

    /// Keep the body inside the world box, dropping outward velocity.
    fn contain(&self, k: &mut Kinematics) {
        let min = self.world_box.min();
        let max = self.world_box.max();
        for axis in 0..3 {
            if k.position[axis] < min[axis] {
                k.position[axis] = min[axis];
                k.velocity[axis] = k.velocity[axis].max(0.0);
            } else if k.position[axis] > max[axis] {
                k.position[axis] = max[axis];
                k.velocity[axis] = k.velocity[axis].min(0.0);
            }
        }
    }
}

impl QuadrotorDynamics for Quadrotor {
    fn run(&mut self, command: &Command, dt: f64) -> Result<(), PhysicsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!("time step {dt}")));
        }
        if !command.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "non-finite command {:?}",
                command
            )));
        }
        if !self.state.is_finite() {
            return Err(PhysicsError::InvalidState("state contains non-finite values".into()));
        }

        let thrust = command
            .collective_thrust
            .clamp(self.params.thrust_min, self.params.thrust_max);
        let omega = clamp_symmetric(&command.omega, &self.params.omega_max);

        let mut k = Kinematics {
            position: self.state.position(),
            attitude: self.state.quaternion(),
            velocity: self.state.velocity(),
        };
        if k.attitude.norm() == 0.0 {
            return Err(PhysicsError::InvalidState("zero attitude quaternion".into()));
        }

        let substeps = (dt / MAX_SUBSTEP).ceil().max(1.0) as usize;
        let h = dt / substeps as f64;
        for _ in 0..substeps {
            k = self.rk4_step(&k, thrust, &omega, h);
            self.contain(&mut k);
        }

        let acceleration = self.derivatives(&k, thrust, &omega).acceleration;
        let mut next = self.state.clone();
        next.set_position(&k.position);
        next.set_attitude(&k.attitude);
        next.set_velocity(&k.velocity);
        next.set_angular_velocity(&omega);
        next.set_acceleration(&acceleration);
        next.t += dt;

        if !next.is_finite() {
            return Err(PhysicsError::ComputationError(format!(
                "integration diverged at t = {}",
                self.state.t
            )));
        }
        self.state = next;
        Ok(())
    }

    fn state(&self) -> &QuadState {
        &self.state
    }

    fn set_state(&mut self, state: &QuadState) -> Result<(), PhysicsError> {
        if !state.is_finite() {
            return Err(PhysicsError::InvalidState("state contains non-finite values".into()));
        }
        self.state = state.clone();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = QuadState::default();
    }

    fn set_world_box(&mut self, world_box: &WorldBox) {
        self.world_box = world_box.clone();
    }

    fn set_size(&mut self, size: Vector3<f64>) {
        self.size = size;
    }

    fn size(&self) -> Vector3<f64> {
        self.size
    }

    fn update_params(&mut self, params: &serde_yaml::Value) -> Result<(), PhysicsError> {
        let mut next = self.params.clone();
        if let Some(v) = read_f64(params, "thrust_min")? {
            next.thrust_min = v;
        }
        if let Some(v) = read_f64(params, "thrust_max")? {
            next.thrust_max = v;
        }
        if let Some(v) = read_f64(params, "gravity")? {
            next.gravity = v;
        }
        if let Some(value) = params.get("omega_max") {
            let limits: Vec<f64> = serde_yaml::from_value(value.clone())
                .map_err(|e| PhysicsError::ConfigError(format!("omega_max: {e}")))?;
            if limits.len() != 3 || limits.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
                return Err(PhysicsError::InvalidParameter(format!("omega_max {:?}", limits)));
            }
            next.omega_max = Vector3::new(limits[0], limits[1], limits[2]);
        }
        if next.thrust_min > next.thrust_max {
            return Err(PhysicsError::InvalidParameter(format!(
                "thrust_min {} exceeds thrust_max {}",
                next.thrust_min, next.thrust_max
            )));
        }
        debug!("Quadrotor parameters: {:?}", next);
        self.params = next;
        Ok(())
    }
}

fn read_f64(params: &serde_yaml::Value, key: &str) -> Result<Option<f64>, PhysicsError> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => match value.as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(PhysicsError::ConfigError(format!("{key}: expected a number"))),
        },
    }
}
