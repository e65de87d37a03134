use anyhow::Context as _;

use crate::foundation::core::{ChannelLayout, FrameShape};
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::FrameView;

/// Alpha assigned to frames that carry no alpha channel.
pub const OPAQUE: f64 = 255.0;

/// Floating-point RGBA raster in the 0-255 domain (not 0-1).
///
/// This is the accumulator representation: it only ever leaves the float domain through
/// [`NormalizedFrame::quantize`].
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedFrame {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl NormalizedFrame {
    /// Wrap raw RGBA samples; `data.len()` must be `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<f64>) -> LightrailResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(LightrailError::format(format!(
                "normalized frame {width}x{height} needs {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f64; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn same_dimensions(&self, other: &NormalizedFrame) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Convert back to 8-bit: clamp to `[0, 255]`, then truncate toward zero.
    pub fn quantize(&self) -> CompositedImage {
        CompositedImage {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(quantize_sample).collect(),
        }
    }
}

/// Promote a 3- or 4-channel 8-bit frame to a float RGBA raster.
pub fn normalize(frame: FrameView<'_>) -> LightrailResult<NormalizedFrame> {
    let shape: FrameShape = frame.shape();
    let layout = shape.layout()?;

    let mut data = Vec::with_capacity(shape.pixel_count() * 4);
    match layout {
        ChannelLayout::Rgba => data.extend(frame.data().iter().map(|&s| f64::from(s))),
        ChannelLayout::Rgb => {
            for px in frame.data().chunks_exact(3) {
                data.extend([
                    f64::from(px[0]),
                    f64::from(px[1]),
                    f64::from(px[2]),
                    OPAQUE,
                ]);
            }
        }
    }

    NormalizedFrame::from_raw(shape.width, shape.height, data)
}

pub(crate) fn quantize_sample(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).trunc() as u8
}

/// Final RGBA8 output of a composite run (straight, not premultiplied, alpha).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl CompositedImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn to_rgba_image(&self) -> LightrailResult<image::RgbaImage> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("composited buffer does not match its dimensions")?;
        Ok(img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/normalize.rs"]
mod tests;
