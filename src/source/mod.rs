//! Frame sources: where the frames of a composite run come from.
//!
//! A source hands out frames in strictly chronological order. [`collect_sequence`] turns a
//! source into a bounded [`FrameSequence`], enforcing the shape of the first frame on every
//! later one and polling a [`CancelToken`] before each fetch.

pub(crate) mod camera;
pub(crate) mod directory;

use std::collections::VecDeque;

use tracing::debug;

use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::{Frame, FrameSequence};

/// Producer of chronologically ordered frames.
pub trait FrameSource {
    /// Short human-readable description used in logs.
    fn describe(&self) -> String;

    /// Rate the source reports, if it has one (live sensors do, directories don't).
    fn fps(&self) -> Option<Fps>;

    /// Fetch the next frame, or `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> LightrailResult<Option<Frame>>;
}

/// Pull at most `max_frames` frames from `source` into one contiguous sequence.
///
/// A source that yields nothing at all is an [`LightrailError::Acquisition`] failure; a frame
/// whose shape differs from the first is a [`LightrailError::Format`] failure.
#[tracing::instrument(skip(source, cancel), fields(origin = %source.describe()))]
pub fn collect_sequence(
    source: &mut dyn FrameSource,
    max_frames: usize,
    cancel: &CancelToken,
) -> LightrailResult<FrameSequence> {
    if max_frames == 0 {
        return Err(LightrailError::invalid_parameter(
            "frame budget must be at least 1",
        ));
    }

    cancel.check()?;
    let first = source.next_frame()?.ok_or_else(|| {
        LightrailError::acquisition(format!("{} delivered no frames", source.describe()))
    })?;
    let mut seq = FrameSequence::with_capacity(first, max_frames)?;
    debug!(frame = 1, max_frames, "captured frame");

    while seq.len() < max_frames {
        cancel.check()?;
        let Some(frame) = source.next_frame()? else {
            break;
        };
        seq.push(frame)?;
        debug!(frame = seq.len(), max_frames, "captured frame");
    }

    Ok(seq)
}

/// In-memory source for tests and for callers that already hold decoded frames.
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<Frame>,
    fps: Option<Fps>,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            fps: None,
        }
    }

    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemorySource {
    fn describe(&self) -> String {
        "memory source".to_string()
    }

    fn fps(&self) -> Option<Fps> {
        self.fps
    }

    fn next_frame(&mut self) -> LightrailResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/mod.rs"]
mod tests;
