mod frames;

pub use frames::{
    axis_alignment, gate_world_orientation, uptilt_rotation, CameraExtrinsics, FrameConvention,
};
