use crate::foundation::core::FrameShape;
use crate::foundation::error::{LightrailError, LightrailResult};

/// Upper bound on the bytes reserved before any frame beyond the first has arrived.
const MAX_UPFRONT_RESERVE: usize = 256 << 20;

/// One 8-bit raster frame, row-major, tightly packed, `channels` samples per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    shape: FrameShape,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(shape: FrameShape, data: Vec<u8>) -> LightrailResult<Self> {
        if data.len() != shape.byte_len() {
            return Err(LightrailError::format(format!(
                "frame data is {} bytes, expected {} for shape {shape}",
                data.len(),
                shape.byte_len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build a frame of `width x height` pixels all set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> LightrailResult<Self> {
        let channels = u8::try_from(pixel.len())
            .map_err(|_| LightrailError::format("pixel has too many channels"))?;
        let shape = FrameShape::new(width, height, channels)?;
        Self::new(shape, pixel.repeat(shape.pixel_count()))
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            shape: self.shape,
            data: &self.data,
        }
    }

    /// `true` when every sample is zero (what an uninitialized sensor delivers).
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

/// Borrowed view of one frame inside a [`FrameSequence`].
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    shape: FrameShape,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn to_frame(&self) -> Frame {
        Frame {
            shape: self.shape,
            data: self.data.to_vec(),
        }
    }
}

/// Ordered, non-empty run of equally shaped frames stored in one contiguous buffer.
///
/// Index 0 is the earliest frame. The shape is fixed by the first frame and every later
/// frame must match it exactly.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    shape: FrameShape,
    data: Vec<u8>,
    len: usize,
}

impl FrameSequence {
    pub fn new(first: Frame) -> Self {
        Self {
            shape: first.shape,
            data: first.data,
            len: 1,
        }
    }

    /// Start a sequence from `first`, expecting up to `capacity` frames in total.
    ///
    /// At most `MAX_UPFRONT_RESERVE` bytes are reserved here; the buffer grows as frames are
    /// pushed. A failed reservation is an [`LightrailError::Acquisition`] error.
    pub fn with_capacity(first: Frame, capacity: usize) -> LightrailResult<Self> {
        let mut seq = Self::new(first);
        let stride = seq.shape.byte_len();
        let upfront = (MAX_UPFRONT_RESERVE / stride.max(1)).min(capacity.saturating_sub(1));
        seq.reserve_bytes(upfront * stride)?;
        Ok(seq)
    }

    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> LightrailResult<Self> {
        let mut frames = frames.into_iter();
        let first = frames
            .next()
            .ok_or_else(|| LightrailError::format("frame sequence must hold at least one frame"))?;
        let (lower, _) = frames.size_hint();
        let mut seq = Self::with_capacity(first, lower.saturating_add(1))?;
        for frame in frames {
            seq.push(frame)?;
        }
        Ok(seq)
    }

    /// Append the next frame in time. A shape mismatch is rejected and leaves the sequence
    /// unchanged.
    pub fn push(&mut self, frame: Frame) -> LightrailResult<()> {
        if frame.shape != self.shape {
            return Err(LightrailError::format(format!(
                "frame {} has shape {}, sequence shape is {}",
                self.len, frame.shape, self.shape
            )));
        }
        self.reserve_bytes(frame.data.len())?;
        self.data.extend_from_slice(&frame.data);
        self.len += 1;
        Ok(())
    }

    fn reserve_bytes(&mut self, additional: usize) -> LightrailResult<()> {
        self.data.try_reserve(additional).map_err(|e| {
            LightrailError::acquisition(format!(
                "cannot hold {} more bytes of frames after {} frame(s): {e}",
                additional, self.len
            ))
        })
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a sequence holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<FrameView<'_>> {
        if index >= self.len {
            return None;
        }
        let stride = self.shape.byte_len();
        let start = index * stride;
        Some(FrameView {
            shape: self.shape,
            data: &self.data[start..start + stride],
        })
    }

    pub fn first(&self) -> FrameView<'_> {
        let stride = self.shape.byte_len();
        FrameView {
            shape: self.shape,
            data: &self.data[..stride],
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = FrameView<'_>> + ExactSizeIterator {
        let shape = self.shape;
        self.data
            .chunks_exact(shape.byte_len())
            .map(move |data| FrameView { shape, data })
    }

    /// The whole `(len, height, width, channels)` buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/buffer.rs"]
mod tests;
