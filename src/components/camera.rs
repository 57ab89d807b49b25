use std::collections::VecDeque;

use crate::config::CameraConfig;
use crate::rendering::{FlowFrame, RgbFrame};
use crate::resources::CameraExtrinsics;

/// Frames kept per sensor before the oldest is dropped
pub const FRAME_QUEUE_CAPACITY: usize = 4;

/// Post-processing layers requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessing {
    pub depth: bool,
    pub segmentation: bool,
    pub optical_flow: bool,
}

impl Default for PostProcessing {
    fn default() -> Self {
        Self {
            depth: false,
            segmentation: false,
            optical_flow: true,
        }
    }
}

/// RGB camera rigidly mounted on the quadrotor.
///
/// Rendered frames are queued by the bridge and consumed by the
/// environment; a read pops the oldest frame.
#[derive(Debug, Clone)]
pub struct RgbCamera {
    pub id: String,
    pub height: usize,
    pub width: usize,
    /// Field of view [deg]
    pub fov: f64,
    pub extrinsics: CameraExtrinsics,
    pub post_processing: PostProcessing,
    rgb_queue: VecDeque<RgbFrame>,
    flow_queue: VecDeque<FlowFrame>,
}

impl RgbCamera {
    pub fn new(id: impl Into<String>, config: &CameraConfig, extrinsics: CameraExtrinsics) -> Self {
        Self {
            id: id.into(),
            height: config.height,
            width: config.width,
            fov: config.fov,
            extrinsics,
            post_processing: PostProcessing::default(),
            rgb_queue: VecDeque::with_capacity(FRAME_QUEUE_CAPACITY),
            flow_queue: VecDeque::with_capacity(FRAME_QUEUE_CAPACITY),
        }
    }

    pub fn feed_rgb(&mut self, frame: RgbFrame) {
        push_bounded(&mut self.rgb_queue, frame);
    }

    pub fn feed_optical_flow(&mut self, frame: FlowFrame) {
        push_bounded(&mut self.flow_queue, frame);
    }

    pub fn take_rgb(&mut self) -> Option<RgbFrame> {
        self.rgb_queue.pop_front()
    }

    pub fn take_optical_flow(&mut self) -> Option<FlowFrame> {
        self.flow_queue.pop_front()
    }

    pub fn pending_rgb(&self) -> usize {
        self.rgb_queue.len()
    }

    pub fn pending_optical_flow(&self) -> usize {
        self.flow_queue.len()
    }

    pub fn clear(&mut self) {
        self.rgb_queue.clear();
        self.flow_queue.clear();
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T) {
    if queue.len() == FRAME_QUEUE_CAPACITY {
        queue.pop_front();
    }
    queue.push_back(item);
}
