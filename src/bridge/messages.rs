use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeError, SceneView};
use crate::components::{QuadState, RgbCamera, StaticGate};
use crate::rendering::{frame_len, FlowFrame, RgbFrame};
use crate::resources::FrameConvention;
use crate::utils::{FLOW_CHANNELS, RGB_CHANNELS};

/// Post-processing layer names understood by the renderer
pub const LAYER_DEPTH: &str = "depth";
pub const LAYER_SEGMENTATION: &str = "object_segmentation";
pub const LAYER_OPTICAL_FLOW: &str = "optical_flow";

/// Messages sent to the renderer on the publish port, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Request {
    /// Load a scene and instantiate every registered object.
    Settings {
        scene_id: u8,
        vehicles: Vec<VehicleSettings>,
        objects: Vec<ObjectSettings>,
    },
    /// Move objects and render one frame.
    Render {
        frame_id: u64,
        env_idx: usize,
        vehicles: Vec<Pose>,
        objects: Vec<Pose>,
    },
    /// End the session.
    Disconnect,
}

/// Messages received from the renderer on the subscribe port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Reply {
    Ready { scene_id: u8 },
    Frame { frame_id: u64, sensors: Vec<SensorOutput> },
    Error { message: String },
}

/// All poses and sizes on the wire are in renderer axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub id: String,
    pub position: [f32; 3],
    /// x, y, z, w
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub id: String,
    pub width: usize,
    pub height: usize,
    pub fov: f32,
    /// Camera centre relative to the vehicle
    pub translation: [f32; 3],
    /// Vehicle to camera rotation, x, y, z, w
    pub rotation: [f32; 4],
    pub post_processing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSettings {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub size: [f32; 3],
    pub cameras: Vec<CameraSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSettings {
    pub id: String,
    pub prefab: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub size: [f32; 3],
}

/// Rendered layers for one camera. Absent layers were not requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorOutput {
    pub camera_id: String,
    pub height: usize,
    pub width: usize,
    /// Base64 PNG
    pub rgb: Option<String>,
    /// Base64 little-endian f32, interleaved H x W x 2
    pub optical_flow: Option<String>,
}

impl CameraSettings {
    pub fn from_camera(camera: &RgbCamera, convention: &FrameConvention) -> Self {
        let mut post_processing = Vec::new();
        if camera.post_processing.depth {
            post_processing.push(LAYER_DEPTH.to_string());
        }
        if camera.post_processing.segmentation {
            post_processing.push(LAYER_SEGMENTATION.to_string());
        }
        if camera.post_processing.optical_flow {
            post_processing.push(LAYER_OPTICAL_FLOW.to_string());
        }
        let rotation = camera.extrinsics.rotation();
        Self {
            id: camera.id.clone(),
            width: camera.width,
            height: camera.height,
            fov: camera.fov as f32,
            translation: convention.position_to_renderer(&camera.extrinsics.b_r_bc),
            rotation: convention.quaternion_to_renderer(rotation.quaternion()),
            post_processing,
        }
    }

    pub fn wants(&self, layer: &str) -> bool {
        self.post_processing.iter().any(|l| l == layer)
    }
}

impl VehicleSettings {
    pub fn from_quadrotor(
        id: &str,
        state: &QuadState,
        size: &nalgebra::Vector3<f64>,
        camera: &RgbCamera,
        convention: &FrameConvention,
    ) -> Self {
        Self {
            id: id.to_string(),
            position: convention.position_to_renderer(&state.position()),
            rotation: convention.quaternion_to_renderer(&state.quaternion()),
            size: convention.size_to_renderer(size),
            cameras: vec![CameraSettings::from_camera(camera, convention)],
        }
    }
}

impl ObjectSettings {
    pub fn from_gate(gate: &StaticGate, convention: &FrameConvention) -> Self {
        Self {
            id: gate.id.clone(),
            prefab: gate.prefab.clone(),
            position: convention.position_to_renderer(&gate.position),
            rotation: convention.quaternion_to_renderer(&gate.orientation),
            size: convention.size_to_renderer(&gate.size),
        }
    }
}

impl Pose {
    pub fn of_quadrotor(id: &str, state: &QuadState, convention: &FrameConvention) -> Self {
        Self {
            id: id.to_string(),
            position: convention.position_to_renderer(&state.position()),
            rotation: convention.quaternion_to_renderer(&state.quaternion()),
        }
    }

    pub fn of_gate(gate: &StaticGate, convention: &FrameConvention) -> Self {
        Self {
            id: gate.id.clone(),
            position: convention.position_to_renderer(&gate.position),
            rotation: convention.quaternion_to_renderer(&gate.orientation),
        }
    }
}

/// Build the render request for one frame of `view`.
pub fn render_request(
    frame_id: u64,
    env_idx: usize,
    view: &SceneView<'_>,
    convention: &FrameConvention,
) -> Request {
    Request::Render {
        frame_id,
        env_idx,
        vehicles: vec![Pose::of_quadrotor(view.quad_id, view.quad_state, convention)],
        objects: view
            .gates
            .iter()
            .map(|gate| Pose::of_gate(gate, convention))
            .collect(),
    }
}

pub fn encode_rgb(frame: &RgbFrame) -> Result<String, BridgeError> {
    if frame.channels() != RGB_CHANNELS {
        return Err(BridgeError::Decode(format!(
            "RGB frame has {} channels",
            frame.channels()
        )));
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            frame.data(),
            frame.width() as u32,
            frame.height() as u32,
            ColorType::Rgb8,
        )
        .map_err(|e| BridgeError::Decode(e.to_string()))?;
    Ok(BASE64_STANDARD.encode(bytes))
}

pub fn decode_rgb(payload: &str) -> Result<RgbFrame, BridgeError> {
    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| BridgeError::Decode(e.to_string()))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| BridgeError::Decode(e.to_string()))?;
    Ok(RgbFrame::from_rgb_image(&image.to_rgb8()))
}

pub fn encode_optical_flow(frame: &FlowFrame) -> String {
    let bytes: Vec<u8> = frame.data().iter().flat_map(|v| v.to_le_bytes()).collect();
    BASE64_STANDARD.encode(bytes)
}

pub fn decode_optical_flow(
    payload: &str,
    height: usize,
    width: usize,
) -> Result<FlowFrame, BridgeError> {
    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| BridgeError::Decode(e.to_string()))?;
    if bytes.len() % 4 != 0 {
        return Err(BridgeError::Decode(format!(
            "flow payload of {} bytes is not a whole number of f32",
            bytes.len()
        )));
    }
    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let plane = frame_len(height, width, 1).map_err(|e| BridgeError::Decode(e.to_string()))?;
    let channels = if plane == 0 {
        FLOW_CHANNELS
    } else {
        values.len() / plane
    };
    FlowFrame::new(height, width, channels, values).map_err(|e| BridgeError::Decode(e.to_string()))
}
