use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{ChannelLayout, Fps};
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::FrameSequence;
use crate::frame::normalize::CompositedImage;

/// File name of the manifest written next to saved raw frames.
pub const MANIFEST_FILE: &str = "capture.json";

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LightrailResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Container for `path`, chosen by extension. Only formats that can hold 8-bit RGBA are
/// accepted.
pub fn output_format(path: &Path) -> LightrailResult<image::ImageFormat> {
    let format = image::ImageFormat::from_path(path).map_err(|_| {
        LightrailError::invalid_parameter(format!(
            "cannot infer an image format from '{}'",
            path.display()
        ))
    })?;
    match format {
        image::ImageFormat::Png
        | image::ImageFormat::Tiff
        | image::ImageFormat::WebP
        | image::ImageFormat::Tga
        | image::ImageFormat::Qoi => Ok(format),
        other => Err(LightrailError::invalid_parameter(format!(
            "{other:?} cannot store 8-bit RGBA; use png, tiff, webp, tga or qoi"
        ))),
    }
}

/// Encode `img` to `path`.
///
/// The image is written to a temporary file next to `path` and renamed into place, so a
/// failed or interrupted write never leaves a truncated output behind.
pub fn write_composited(img: &CompositedImage, path: &Path) -> LightrailResult<()> {
    let format = output_format(path)?;
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".lightrail-")
        .tempfile_in(&dir)
        .with_context(|| format!("create temporary file in '{}'", dir.display()))?;

    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        image::write_buffer_with_format(
            &mut w,
            &img.data,
            img.width,
            img.height,
            image::ExtendedColorType::Rgba8,
            format,
        )
        .with_context(|| format!("encode {format:?} for '{}'", path.display()))?;
        w.flush()
            .with_context(|| format!("flush '{}'", path.display()))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("move output into place at '{}'", path.display()))?;

    info!(path = %path.display(), width = img.width, height = img.height, "wrote composite");
    Ok(())
}

/// Metadata stored alongside saved raw frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptureManifest {
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    #[serde(default)]
    pub fps: Option<Fps>,
    #[serde(default)]
    pub camera_id: Option<u32>,
    /// RFC 3339 capture timestamp.
    pub captured_at: String,
}

/// Folder name for a raw capture: `YYYY-mm-dd-HH-MM-SS-cam<id>-images`.
pub fn capture_dir_name(captured_at: &DateTime<Local>, camera_id: u32) -> String {
    format!(
        "{}-cam{camera_id}-images",
        captured_at.format("%Y-%m-%d-%H-%M-%S")
    )
}

/// Zero-padded frame file name so that name order equals capture order.
pub fn frame_file_name(index: usize, total: usize) -> String {
    let width = total.saturating_sub(1).to_string().len().max(4);
    format!("{index:0width$}.png")
}

/// Write every frame of `frames` as PNG into a new timestamped folder under `root`, together
/// with a [`CaptureManifest`]. Returns the folder.
///
/// `cancel` is checked before each frame; an interrupted save leaves the frames written so
/// far and no manifest.
pub fn save_raw_frames(
    frames: &FrameSequence,
    root: &Path,
    camera_id: u32,
    fps: Option<Fps>,
    captured_at: DateTime<Local>,
    cancel: &CancelToken,
) -> LightrailResult<PathBuf> {
    let shape = frames.shape();
    let color = match shape.layout()? {
        ChannelLayout::Rgb => image::ExtendedColorType::Rgb8,
        ChannelLayout::Rgba => image::ExtendedColorType::Rgba8,
    };

    let dir = root.join(capture_dir_name(&captured_at, camera_id));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create capture folder '{}'", dir.display()))?;
    info!(dir = %dir.display(), frames = frames.len(), "saving raw frames");

    for (i, frame) in frames.iter().enumerate() {
        cancel.check()?;
        let path = dir.join(frame_file_name(i, frames.len()));
        image::save_buffer_with_format(
            &path,
            frame.data(),
            shape.width,
            shape.height,
            color,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write frame '{}'", path.display()))?;
        debug!(path = %path.display(), "saved frame");
    }

    let manifest = CaptureManifest {
        frames: frames.len(),
        width: shape.width,
        height: shape.height,
        channels: shape.channels,
        fps,
        camera_id: Some(camera_id),
        captured_at: captured_at.to_rfc3339(),
    };
    let manifest_path = dir.join(MANIFEST_FILE);
    let file = std::fs::File::create(&manifest_path)
        .with_context(|| format!("create '{}'", manifest_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &manifest)
        .with_context(|| format!("write '{}'", manifest_path.display()))?;

    Ok(dir)
}

/// Read the manifest of a capture folder, if it has one.
pub fn read_manifest(dir: &Path) -> LightrailResult<Option<CaptureManifest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path).with_context(|| format!("read '{}'", path.display()))?;
    let manifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse capture manifest '{}'", path.display()))?;
    Ok(Some(manifest))
}

#[cfg(test)]
#[path = "../../tests/unit/output/write.rs"]
mod tests;
