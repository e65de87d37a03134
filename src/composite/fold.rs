use tracing::debug;

use crate::composite::blend::lighten_over_in_place;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Opacity;
use crate::foundation::error::LightrailResult;
use crate::frame::buffer::{FrameSequence, FrameView};
use crate::frame::normalize::{CompositedImage, NormalizedFrame, normalize};

/// Frame indices folded into the accumulator after the seed frame, in the order they are
/// applied: latest first, down to index 1. Index 0 is the seed and never appears here.
pub fn fold_order(len: usize) -> impl Iterator<Item = usize> {
    (1..len).rev()
}

/// Floating-point working buffer of one composite run.
#[derive(Clone, Debug)]
pub struct Accumulator {
    state: NormalizedFrame,
}

impl Accumulator {
    pub fn seed(frame: FrameView<'_>) -> LightrailResult<Self> {
        Ok(Self {
            state: normalize(frame)?,
        })
    }

    /// Fold one more frame in. A malformed or mismatched frame fails without touching the
    /// accumulated state.
    pub fn fold(&mut self, frame: FrameView<'_>, opacity: Opacity) -> LightrailResult<()> {
        let layer = normalize(frame)?;
        lighten_over_in_place(&mut self.state, &layer, opacity)
    }

    pub fn state(&self) -> &NormalizedFrame {
        &self.state
    }

    pub fn finish(self) -> CompositedImage {
        self.state.quantize()
    }
}

/// Progress notification handed to a [`Compositor::composite_with`] observer after each fold.
#[derive(Debug)]
pub struct FoldStep<'a> {
    /// 1-based step number.
    pub step: usize,
    /// Total number of fold steps (`len - 1`).
    pub total: usize,
    /// Sequence index of the frame that was just folded in.
    pub frame_index: usize,
    pub accumulator: &'a NormalizedFrame,
}

/// Reduces a [`FrameSequence`] to one image by repeated lighten-over blending.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    opacity: Opacity,
    cancel: Option<CancelToken>,
}

impl Compositor {
    pub fn new(opacity: Opacity) -> Self {
        Self {
            opacity,
            cancel: None,
        }
    }

    /// Check `token` before every fold step.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn composite(&self, frames: &FrameSequence) -> LightrailResult<CompositedImage> {
        self.composite_with(frames, |_| {})
    }

    /// Seed from frame 0, fold frames `len-1 ..= 1` in that order, quantize.
    #[tracing::instrument(skip(self, frames, on_step), fields(frames = frames.len(), opacity = self.opacity.get()))]
    pub fn composite_with(
        &self,
        frames: &FrameSequence,
        mut on_step: impl FnMut(FoldStep<'_>),
    ) -> LightrailResult<CompositedImage> {
        let mut acc = Accumulator::seed(frames.first())?;
        let total = frames.len().saturating_sub(1);

        for (step, idx) in fold_order(frames.len()).enumerate() {
            if let Some(cancel) = &self.cancel {
                cancel.check()?;
            }
            let Some(frame) = frames.get(idx) else {
                continue;
            };
            acc.fold(frame, self.opacity)?;
            debug!(step = step + 1, total, frame = idx, "folded frame");
            on_step(FoldStep {
                step: step + 1,
                total,
                frame_index: idx,
                accumulator: acc.state(),
            });
        }

        Ok(acc.finish())
    }
}

/// Composite `frames` with a raw opacity value, validating it first.
pub fn composite(frames: &FrameSequence, opacity: f64) -> LightrailResult<CompositedImage> {
    Compositor::new(Opacity::new(opacity)?).composite(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/fold.rs"]
mod tests;
