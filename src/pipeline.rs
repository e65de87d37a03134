use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::info;

use crate::composite::fold::Compositor;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Fps, FrameShape, Opacity, format_duration, frame_budget};
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::FrameSequence;
use crate::output::write::{output_format, read_manifest, save_raw_frames, write_composited};
use crate::source::camera::{CameraOpts, CameraSource};
use crate::source::directory::DirectorySource;
use crate::source::{FrameSource, collect_sequence};

/// Where the frames of a run come from.
#[derive(Clone, Debug)]
pub enum InputSpec {
    /// Live capture for `RunConfig::seconds`.
    Camera(CameraOpts),
    /// Every image file of one directory, in file-name order.
    Directory(PathBuf),
}

/// Everything one capture-and-composite run needs.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: InputSpec,
    pub opacity: Opacity,
    /// Capture duration; only used for camera input.
    pub seconds: f64,
    pub output: PathBuf,
    /// Images root to store the raw captured frames under (camera input only).
    pub save_raw_to: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(input: InputSpec, output: impl Into<PathBuf>) -> Self {
        Self {
            input,
            opacity: Opacity::DEFAULT,
            seconds: 10.0,
            output: output.into(),
            save_raw_to: None,
        }
    }

    pub fn validate(&self) -> LightrailResult<()> {
        output_format(&self.output)?;
        if let InputSpec::Camera(opts) = &self.input {
            opts.validate()?;
            if !self.seconds.is_finite() || self.seconds <= 0.0 {
                return Err(LightrailError::invalid_parameter(format!(
                    "capture duration must be positive, got {}s",
                    self.seconds
                )));
            }
        }
        Ok(())
    }
}

/// Frames produced by the acquisition phase.
#[derive(Debug)]
pub struct Acquired {
    pub frames: FrameSequence,
    pub fps: Option<Fps>,
    pub camera_id: Option<u32>,
}

/// Summary of a finished run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub frames: usize,
    pub shape: FrameShape,
    pub capture_time: Duration,
    pub composite_time: Duration,
    pub output: PathBuf,
    pub raw_dir: Option<PathBuf>,
}

/// Acquisition phase. A camera is opened, warmed up, drained and released within this call.
#[tracing::instrument(skip_all)]
pub fn acquire(input: &InputSpec, seconds: f64, cancel: &CancelToken) -> LightrailResult<Acquired> {
    match input {
        InputSpec::Camera(opts) => {
            let mut camera = CameraSource::open(opts.clone())?;
            camera.warm_up(cancel)?;

            let fps = opts.fps;
            let max_frames = frame_budget(seconds, fps, camera.shape())?;
            let layout = camera.shape().layout()?;
            info!(
                camera = opts.camera_id,
                fps = %fps,
                duration = %format_duration(seconds.round() as u64),
                max_frames,
                size = %format!("{}x{}", opts.width, opts.height),
                channels = %format!("{}({})", layout.name(), layout.channels()),
                "capturing"
            );

            let frames = collect_sequence(&mut camera, max_frames, cancel)?;
            camera.release();
            Ok(Acquired {
                frames,
                fps: Some(fps),
                camera_id: Some(opts.camera_id),
            })
        }
        InputSpec::Directory(dir) => {
            let manifest = read_manifest(dir)?;
            let mut source = DirectorySource::open(dir)?;
            let max_frames = source.frame_count();
            let fps = manifest.as_ref().and_then(|m| m.fps).or(source.fps());
            if let Some(m) = &manifest {
                info!(captured_at = %m.captured_at, frames = m.frames, "found capture manifest");
            }

            let frames = collect_sequence(&mut source, max_frames, cancel)?;
            Ok(Acquired {
                frames,
                fps,
                camera_id: manifest.and_then(|m| m.camera_id),
            })
        }
    }
}

/// Capture, composite, write. Nothing is written when the run fails or is cancelled before
/// the composite is complete.
#[tracing::instrument(skip_all, fields(output = %cfg.output.display()))]
pub fn run(cfg: &RunConfig, cancel: &CancelToken) -> LightrailResult<RunReport> {
    cfg.validate()?;

    let start = Instant::now();
    let acquired = acquire(&cfg.input, cfg.seconds, cancel)?;
    let capture_time = start.elapsed();
    let frames = acquired.frames;
    info!(
        frames = frames.len(),
        shape = %frames.shape(),
        secs = %format!("{:.2}", capture_time.as_secs_f64()),
        "acquired frames"
    );

    let start = Instant::now();
    let image = Compositor::new(cfg.opacity)
        .with_cancel(cancel.clone())
        .composite(&frames)?;
    let composite_time = start.elapsed();
    info!(
        secs = %format!("{:.2}", composite_time.as_secs_f64()),
        "render finished"
    );

    cancel.check()?;
    write_composited(&image, &cfg.output)?;

    let raw_dir = match (&cfg.input, &cfg.save_raw_to) {
        (InputSpec::Camera(opts), Some(root)) => Some(save_raw_frames(
            &frames,
            root,
            opts.camera_id,
            acquired.fps,
            chrono::Local::now(),
            cancel,
        )?),
        _ => None,
    };

    Ok(RunReport {
        frames: frames.len(),
        shape: frames.shape(),
        capture_time,
        composite_time,
        output: cfg.output.clone(),
        raw_dir,
    })
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
