mod racing;
mod session;
mod track;

pub use racing::{BridgeFactory, RacingEnv, RacingEnvBuilder, CAMERA_ID, QUAD_ID};
pub use session::{ConnectError, Session, SessionError, SessionState};
pub use track::Track;
