pub mod error;
pub mod quadrotor;
pub mod traits;

pub use error::PhysicsError;
pub use quadrotor::{Quadrotor, QuadrotorParams};
pub use traits::QuadrotorDynamics;
