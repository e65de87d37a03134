use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{debug, info};

use crate::foundation::core::{Fps, FrameShape};
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::buffer::Frame;
use crate::source::FrameSource;

/// Sorted sub-directories of `root`; each one holds a previously captured frame set.
pub fn list_capture_sets(root: &Path) -> LightrailResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("read images root '{}'", root.display()))?;

    let mut sets = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list '{}'", root.display()))?;
        if entry
            .file_type()
            .with_context(|| format!("stat '{}'", entry.path().display()))?
            .is_dir()
        {
            sets.push(entry.path());
        }
    }
    sets.sort();

    if sets.is_empty() {
        return Err(LightrailError::acquisition(format!(
            "no capture sets found in '{}'",
            root.display()
        )));
    }
    Ok(sets)
}

/// Pick a capture set by 1-based index (as listed by [`list_capture_sets`]) or by directory
/// name.
pub fn resolve_capture_set(sets: &[PathBuf], choice: &str) -> LightrailResult<PathBuf> {
    let choice = choice.trim();
    if let Ok(n) = choice.parse::<usize>() {
        if n == 0 || n > sets.len() {
            return Err(LightrailError::invalid_parameter(format!(
                "capture set {n} out of range 1..={}",
                sets.len()
            )));
        }
        return Ok(sets[n - 1].clone());
    }

    sets.iter()
        .find(|p| p.file_name().is_some_and(|name| name == choice))
        .cloned()
        .ok_or_else(|| LightrailError::invalid_parameter(format!("no capture set named '{choice}'")))
}

/// Image files of `dir` in file-name order. Anything `image` cannot identify by extension is
/// skipped.
pub fn list_frame_files(dir: &Path) -> LightrailResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read frame dir '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if image::ImageFormat::from_path(&path).is_err() {
            debug!(path = %path.display(), "skipping non-image file");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Decode one image file into an RGB8 frame, or RGBA8 when the file carries alpha.
pub fn load_frame(path: &Path) -> LightrailResult<Frame> {
    let img = image::open(path).with_context(|| format!("decode frame '{}'", path.display()))?;
    let (width, height) = (img.width(), img.height());

    let (channels, data) = if img.color().has_alpha() {
        (4, img.into_rgba8().into_raw())
    } else {
        (3, img.into_rgb8().into_raw())
    };
    Frame::new(FrameShape::new(width, height, channels)?, data)
}

/// Frames previously stored on disk, one image file per frame.
#[derive(Debug)]
pub struct DirectorySource {
    dir: PathBuf,
    files: VecDeque<PathBuf>,
    total: usize,
}

impl DirectorySource {
    pub fn open(dir: impl Into<PathBuf>) -> LightrailResult<Self> {
        let dir = dir.into();
        let files = list_frame_files(&dir)?;
        if files.is_empty() {
            return Err(LightrailError::acquisition(format!(
                "no image files in '{}'",
                dir.display()
            )));
        }
        info!(dir = %dir.display(), frames = files.len(), "opened frame directory");
        Ok(Self {
            dir,
            total: files.len(),
            files: files.into(),
        })
    }

    /// Number of image files found when the source was opened.
    pub fn frame_count(&self) -> usize {
        self.total
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory '{}'", self.dir.display())
    }

    fn fps(&self) -> Option<Fps> {
        None
    }

    fn next_frame(&mut self) -> LightrailResult<Option<Frame>> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        debug!(path = %path.display(), "importing frame");
        load_frame(&path).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/directory.rs"]
mod tests;
