use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Fps, FrameShape};
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::Frame;
use crate::source::FrameSource;

/// Frames buffered between the reader thread and the capture loop.
const PUMP_CAPACITY: usize = 8;

/// Capture settings for [`CameraSource`].
#[derive(Clone, Debug)]
pub struct CameraOpts {
    /// Numeric camera id; mapped to a device name when `device` is unset.
    pub camera_id: u32,
    /// Explicit ffmpeg input device (`/dev/video2`, `video=USB Camera`, ...).
    pub device: Option<String>,
    /// ffmpeg input format (`v4l2`, `avfoundation`, `dshow`).
    pub input_format: String,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Frames discarded while the sensor settles exposure.
    pub warmup_frames: usize,
    /// Longest wait for a single frame before the device counts as stalled.
    pub read_timeout: Duration,
}

impl CameraOpts {
    pub fn new(camera_id: u32) -> Self {
        Self {
            camera_id,
            device: None,
            input_format: default_input_format().to_string(),
            width: 640,
            height: 480,
            fps: Fps { num: 30, den: 1 },
            warmup_frames: 50,
            read_timeout: Duration::from_secs(5),
        }
    }

    pub fn validate(&self) -> LightrailResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LightrailError::invalid_parameter(
                "camera width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(LightrailError::invalid_parameter("camera fps must be non-zero"));
        }
        if self.read_timeout.is_zero() {
            return Err(LightrailError::invalid_parameter(
                "camera read timeout must be non-zero",
            ));
        }
        if self.input_format.trim().is_empty() {
            return Err(LightrailError::invalid_parameter(
                "camera input format must not be empty",
            ));
        }
        Ok(())
    }

    pub fn device_name(&self) -> String {
        match &self.device {
            Some(device) => device.clone(),
            None => default_device(&self.input_format, self.camera_id),
        }
    }

    pub fn frame_shape(&self) -> LightrailResult<FrameShape> {
        FrameShape::new(self.width, self.height, 3)
    }

    /// Arguments for an ffmpeg process that streams packed `rgb24` frames to stdout.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            self.input_format.clone(),
            "-framerate".into(),
            self.fps.to_string(),
            "-video_size".into(),
            format!("{}x{}", self.width, self.height),
            "-i".into(),
            self.device_name(),
            "-an".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgb24".into(),
            // Scale in case the driver negotiated a different mode.
            "-vf".into(),
            format!("scale={}:{}", self.width, self.height),
            "pipe:1".into(),
        ]
    }
}

pub fn default_input_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

fn default_device(input_format: &str, camera_id: u32) -> String {
    match input_format {
        "v4l2" => format!("/dev/video{camera_id}"),
        "avfoundation" => format!("{camera_id}:none"),
        "dshow" => format!("video={camera_id}"),
        _ => camera_id.to_string(),
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Background thread slicing a raw byte stream into fixed-size frames.
pub(crate) struct FramePump {
    rx: Receiver<std::io::Result<Vec<u8>>>,
    handle: JoinHandle<()>,
}

pub(crate) enum PumpEvent {
    Frame(Vec<u8>),
    Ended,
    TimedOut,
    Failed(std::io::Error),
}

impl FramePump {
    pub(crate) fn spawn<R>(reader: R, frame_len: usize) -> LightrailResult<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = sync_channel(PUMP_CAPACITY);
        let handle = std::thread::Builder::new()
            .name("camera-reader".to_string())
            .spawn(move || pump_frames(reader, frame_len, tx))
            .map_err(|e| {
                LightrailError::acquisition(format!("failed to spawn camera reader thread: {e}"))
            })?;
        Ok(Self { rx, handle })
    }

    pub(crate) fn recv(&self, timeout: Duration) -> PumpEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(frame)) => PumpEvent::Frame(frame),
            Ok(Err(e)) => PumpEvent::Failed(e),
            Err(RecvTimeoutError::Timeout) => PumpEvent::TimedOut,
            Err(RecvTimeoutError::Disconnected) => PumpEvent::Ended,
        }
    }

    /// Stop receiving and wait for the reader thread. The stream must already be closed
    /// (or about to close) or this blocks until it is.
    pub(crate) fn shutdown(self) {
        let Self { rx, handle } = self;
        drop(rx);
        if handle.join().is_err() {
            warn!("camera reader thread panicked");
        }
    }
}

fn pump_frames<R: Read>(mut reader: R, frame_len: usize, tx: SyncSender<std::io::Result<Vec<u8>>>) {
    loop {
        let mut buf = vec![0u8; frame_len];
        match read_full(&mut reader, &mut buf) {
            Ok(true) => {
                if tx.send(Ok(buf)).is_err() {
                    return;
                }
            }
            Ok(false) => return,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

/// Fill `buf` completely. `Ok(false)` on end of stream; a trailing partial frame is dropped.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Live capture device driven through the system `ffmpeg` binary.
///
/// The device is held only while this value is alive; dropping it (normally, on error or on
/// cancellation) kills and reaps the capture process.
pub struct CameraSource {
    opts: CameraOpts,
    shape: FrameShape,
    child: Option<Child>,
    pump: Option<FramePump>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl CameraSource {
    pub fn open(opts: CameraOpts) -> LightrailResult<Self> {
        opts.validate()?;
        let shape = opts.frame_shape()?;

        if !is_ffmpeg_on_path() {
            return Err(LightrailError::acquisition(
                "ffmpeg is required for camera capture, but was not found on PATH",
            ));
        }

        let args = opts.ffmpeg_args();
        debug!(?args, "spawning ffmpeg capture");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                LightrailError::acquisition(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdout), Some(mut stderr)) = (stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(LightrailError::acquisition(
                "failed to open ffmpeg pipes (unexpected)",
            ));
        };

        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let mut source = Self {
            opts,
            shape,
            child: Some(child),
            pump: None,
            stderr_drain: Some(stderr_drain),
        };
        source.pump = Some(FramePump::spawn(stdout, shape.byte_len())?);

        info!(
            camera = source.opts.camera_id,
            device = %source.opts.device_name(),
            size = %format!("{}x{}", source.opts.width, source.opts.height),
            fps = %source.opts.fps,
            "camera opened"
        );
        Ok(source)
    }

    pub fn opts(&self) -> &CameraOpts {
        &self.opts
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    /// Discard the configured number of settling frames. If the last one is still entirely
    /// black the sensor never came up and the capture is aborted.
    pub fn warm_up(&mut self, cancel: &CancelToken) -> LightrailResult<()> {
        let count = self.opts.warmup_frames.max(1);
        info!(frames = count, "initializing camera");

        let mut last = None;
        for _ in 0..count {
            cancel.check()?;
            last = Some(Frame::new(self.shape, self.read_raw()?)?);
        }

        if last.is_some_and(|frame| frame.is_blank()) {
            return Err(LightrailError::acquisition(format!(
                "unable to initialize camera {}: sensor delivers blank frames",
                self.opts.camera_id
            )));
        }
        Ok(())
    }

    fn read_raw(&mut self) -> LightrailResult<Vec<u8>> {
        let pump = self
            .pump
            .as_ref()
            .ok_or_else(|| LightrailError::acquisition("camera is already released"))?;

        match pump.recv(self.opts.read_timeout) {
            PumpEvent::Frame(buf) => Ok(buf),
            PumpEvent::TimedOut => Err(LightrailError::acquisition(format!(
                "camera stalled: no frame within {:.1}s",
                self.opts.read_timeout.as_secs_f64()
            ))),
            PumpEvent::Failed(e) => Err(LightrailError::acquisition(format!(
                "failed to read frame from ffmpeg: {e}"
            ))),
            PumpEvent::Ended => {
                let detail = self.release();
                Err(LightrailError::acquisition(format!(
                    "camera stream ended unexpectedly: {}",
                    if detail.is_empty() {
                        "ffmpeg exited"
                    } else {
                        detail.as_str()
                    }
                )))
            }
        }
    }

    /// Stop the capture process and its threads. Returns whatever ffmpeg wrote to stderr.
    /// Safe to call more than once.
    pub fn release(&mut self) -> String {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            debug!(camera = self.opts.camera_id, "camera released");
        }
        if let Some(pump) = self.pump.take() {
            pump.shutdown();
        }
        match self.stderr_drain.take().map(|h| h.join()) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_string(),
            _ => String::new(),
        }
    }
}

impl FrameSource for CameraSource {
    fn describe(&self) -> String {
        format!("camera {} ({})", self.opts.camera_id, self.opts.device_name())
    }

    fn fps(&self) -> Option<Fps> {
        Some(self.opts.fps)
    }

    fn next_frame(&mut self) -> LightrailResult<Option<Frame>> {
        let buf = self.read_raw()?;
        Frame::new(self.shape, buf).map(Some)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/camera.rs"]
mod tests;
