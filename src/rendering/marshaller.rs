use crate::rendering::{frame_len, FlowFrame, ImageFrame, RenderError, RgbFrame};
use crate::utils::{FLOW_CHANNELS, RGB_CHANNELS};

/// Reshapes camera frames into flat, channel-major observation vectors.
///
/// Channel `c` of an H x W frame lands in `out[c*H*W .. (c+1)*H*W]`, row-major
/// inside the channel. Per-channel scratch buffers are sized once and reused.
#[derive(Debug, Clone)]
pub struct ImageMarshaller {
    height: usize,
    width: usize,
    rgb_scratch: Vec<Vec<u8>>,
    flow_scratch: Vec<Vec<f32>>,
}

impl ImageMarshaller {
    pub fn new(height: usize, width: usize) -> Result<Self, RenderError> {
        // Both flat outputs must be addressable
        frame_len(height, width, RGB_CHANNELS.max(FLOW_CHANNELS))?;
        let plane = height * width;
        Ok(Self {
            height,
            width,
            rgb_scratch: vec![vec![0; plane]; RGB_CHANNELS],
            flow_scratch: vec![vec![0.0; plane]; FLOW_CHANNELS],
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Length of a flat RGB observation
    pub fn rgb_len(&self) -> usize {
        RGB_CHANNELS * self.height * self.width
    }

    /// Length of a flat optical flow observation
    pub fn flow_len(&self) -> usize {
        FLOW_CHANNELS * self.height * self.width
    }

    /// Factors turning normalised flow into pixel displacements.
    ///
    /// The vertical sign flip moves from a top-left to a bottom-left origin.
    pub fn flow_scales(&self) -> [f32; FLOW_CHANNELS] {
        [self.width as f32, -(self.height as f32)]
    }

    pub fn marshal_rgb(&mut self, frame: &RgbFrame, out: &mut [u8]) -> Result<(), RenderError> {
        check_shape(frame, self.height, self.width, RGB_CHANNELS, out.len())?;
        split_channels(frame, &mut self.rgb_scratch);
        write_channel_major(&self.rgb_scratch, out, |_, value| value);
        Ok(())
    }

    pub fn marshal_optical_flow(
        &mut self,
        frame: &FlowFrame,
        out: &mut [f32],
    ) -> Result<(), RenderError> {
        check_shape(frame, self.height, self.width, FLOW_CHANNELS, out.len())?;
        let scales = self.flow_scales();
        split_channels(frame, &mut self.flow_scratch);
        write_channel_major(&self.flow_scratch, out, |channel, value| {
            value * scales[channel]
        });
        Ok(())
    }
}

/// Everything is validated before a single element of `out` is touched.
fn check_shape<T: Copy>(
    frame: &ImageFrame<T>,
    height: usize,
    width: usize,
    channels: usize,
    out_len: usize,
) -> Result<(), RenderError> {
    if frame.channels() != channels {
        return Err(RenderError::ChannelMismatch {
            expected: channels,
            actual: frame.channels(),
        });
    }
    if frame.height() != height || frame.width() != width {
        return Err(RenderError::ShapeMismatch {
            height,
            width,
            actual_height: frame.height(),
            actual_width: frame.width(),
        });
    }
    let expected = channels * height * width;
    if out_len != expected {
        return Err(RenderError::OutputLength {
            expected,
            actual: out_len,
        });
    }
    Ok(())
}

fn split_channels<T: Copy>(frame: &ImageFrame<T>, scratch: &mut [Vec<T>]) {
    let channels = frame.channels();
    for (pixel, values) in frame.data().chunks_exact(channels).enumerate() {
        for (channel, &value) in values.iter().enumerate() {
            scratch[channel][pixel] = value;
        }
    }
}

fn write_channel_major<T, F>(scratch: &[Vec<T>], out: &mut [T], scale: F)
where
    T: Copy,
    F: Fn(usize, T) -> T,
{
    for (channel, (plane, target)) in scratch
        .iter()
        .zip(out.chunks_exact_mut(scratch[0].len().max(1)))
        .enumerate()
    {
        for (dst, &src) in target.iter_mut().zip(plane.iter()) {
            *dst = scale(channel, src);
        }
    }
}
