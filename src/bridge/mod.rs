mod errors;
pub mod messages;
mod stub;
mod tcp;
mod traits;

pub use errors::BridgeError;
pub use messages::{
    CameraSettings, ObjectSettings, Pose, Reply, Request, SensorOutput, VehicleSettings,
};
pub use stub::{synthetic_flow, StubRenderer};
pub use tcp::TcpBridge;
pub use traits::{RenderBridge, SceneView};
