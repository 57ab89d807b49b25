use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Physics computation error: {0}")]
    ComputationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model configuration error: {0}")]
    ConfigError(String),
}
