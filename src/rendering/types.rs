use image::{Rgb, RgbImage};

use crate::rendering::RenderError;

/// A multi-channel 2-D frame stored interleaved, row-major (H x W x C).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame<T> {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<T>,
}

/// 8-bit colour frame as delivered by the camera
pub type RgbFrame = ImageFrame<u8>;
/// Optical flow in normalised image coordinates
pub type FlowFrame = ImageFrame<f32>;

impl<T: Copy> ImageFrame<T> {
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<T>) -> Result<Self, RenderError> {
        let expected = frame_len(height, width, channels)?;
        if data.len() != expected {
            return Err(RenderError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Build a frame from a per-element generator `f(row, col, channel)`.
    pub fn from_fn<F>(height: usize, width: usize, channels: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(frame_len(height, width, channels).unwrap_or(0));
        for row in 0..height {
            for col in 0..width {
                for channel in 0..channels {
                    data.push(f(row, col, channel));
                }
            }
        }
        Self {
            height,
            width,
            channels,
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> T {
        self.data[(row * self.width + col) * self.channels + channel]
    }
}

/// Number of elements in an H x W x C frame, if it fits in memory at all.
pub fn frame_len(height: usize, width: usize, channels: usize) -> Result<usize, RenderError> {
    height
        .checked_mul(width)
        .and_then(|plane| plane.checked_mul(channels))
        .ok_or(RenderError::Oversized {
            height,
            width,
            channels,
        })
}

impl ImageFrame<u8> {
    pub fn from_rgb_image(image: &RgbImage) -> Self {
        Self {
            height: image.height() as usize,
            width: image.width() as usize,
            channels: 3,
            data: image.as_raw().clone(),
        }
    }

    /// Only three-channel frames convert back into an image.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels != 3 {
            return None;
        }
        RgbImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
    }

    pub fn pixel(&self, row: usize, col: usize) -> Rgb<u8> {
        Rgb([self.get(row, col, 0), self.get(row, col, 1), self.get(row, col, 2)])
    }
}
