pub mod transformations;

pub use transformations::{
    axis_alignment, gate_world_orientation, uptilt_rotation, CameraExtrinsics, FrameConvention,
};
