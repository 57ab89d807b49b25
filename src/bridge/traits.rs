use crate::bridge::{BridgeError, ObjectSettings, VehicleSettings};
use crate::components::{QuadState, RgbCamera, StaticGate};
use crate::config::SceneId;

/// Borrowed snapshot of everything the renderer needs for one frame.
///
/// The environment owns the quadrotor and the gates; the bridge only reads
/// them for the duration of a request.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub quad_id: &'a str,
    pub quad_state: &'a QuadState,
    pub gates: &'a [StaticGate],
}

/// Session handle to an out-of-process renderer.
///
/// Strict request/reply: every `get_render` must be matched by a
/// `handle_output` before the next request is issued.
pub trait RenderBridge: Send {
    /// Register a dynamic object. Must happen before `connect_unity`.
    fn add_quadrotor(&mut self, vehicle: VehicleSettings) -> Result<(), BridgeError>;

    /// Register a static object. Must happen before `connect_unity`.
    fn add_static_object(&mut self, object: ObjectSettings) -> Result<(), BridgeError>;

    /// Open the session and load `scene`. Succeeds immediately when
    /// already connected.
    fn connect_unity(&mut self, scene: SceneId, pub_port: u16, sub_port: u16)
        -> Result<(), BridgeError>;

    /// Request a frame for environment `env_idx`, returning its frame id.
    fn get_render(&mut self, env_idx: usize, view: &SceneView<'_>) -> Result<u64, BridgeError>;

    /// Block until the outstanding frame arrives and queue its sensor
    /// outputs on `camera`.
    fn handle_output(&mut self, camera: &mut RgbCamera) -> Result<(), BridgeError>;

    fn disconnect_unity(&mut self);

    fn is_connected(&self) -> bool;
}
