use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No {0} frame available from the camera")]
    NoFrame(&'static str),

    #[error("Frame has {actual} channels, expected {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Frame is {actual_height}x{actual_width}, expected {height}x{width}")]
    ShapeMismatch {
        height: usize,
        width: usize,
        actual_height: usize,
        actual_width: usize,
    },

    #[error("Output buffer has length {actual}, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("Frame data has length {actual}, expected {expected}")]
    DataLength { expected: usize, actual: usize },

    #[error("Frame of {height}x{width}x{channels} does not fit in memory")]
    Oversized {
        height: usize,
        width: usize,
        channels: usize,
    },
}
