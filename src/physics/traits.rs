use nalgebra::Vector3;

use crate::components::{Command, QuadState, WorldBox};
use crate::physics::error::PhysicsError;

/// Rigid-body model driven by the environment.
///
/// Implementations must leave `state()` valid even when `run` fails, since
/// the caller reads the state back regardless of the outcome.
pub trait QuadrotorDynamics: Send {
    /// Advance the model by `dt` seconds under `command`.
    fn run(&mut self, command: &Command, dt: f64) -> Result<(), PhysicsError>;

    fn state(&self) -> &QuadState;

    fn set_state(&mut self, state: &QuadState) -> Result<(), PhysicsError>;

    fn reset(&mut self);

    fn set_world_box(&mut self, world_box: &WorldBox);

    /// Render size of the body. A zero size marks a render-only body.
    fn set_size(&mut self, size: Vector3<f64>);

    fn size(&self) -> Vector3<f64>;

    /// Apply parameters from the opaque `quadrotor_dynamics` config subtree.
    fn update_params(&mut self, params: &serde_yaml::Value) -> Result<(), PhysicsError>;
}
