//! Lightrail builds light-trail ("long exposure") stills out of frame sequences.
//!
//! Each pixel of the result keeps the brightest value it saw over the sequence, with every
//! folded frame weighted by a constant opacity:
//!
//! - Acquire a [`FrameSequence`] from a camera ([`CameraSource`]) or a folder of images
//!   ([`DirectorySource`])
//! - Fold it newest-to-oldest with [`Compositor`] (lighten-only blend, see [`lighten_over`])
//! - Quantize and write the [`CompositedImage`] with [`write_composited`]
//!
//! [`run`] drives all three phases from a [`RunConfig`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod composite;
pub(crate) mod frame;
pub(crate) mod output;
pub(crate) mod pipeline;
pub(crate) mod source;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{
    ChannelLayout, Fps, FrameShape, Opacity, format_duration, frame_budget, parse_size,
};
pub use crate::foundation::error::{LightrailError, LightrailResult};

pub use crate::composite::blend::{RgbaF, lighten_over, lighten_over_frame, lighten_over_in_place};
pub use crate::composite::fold::{Accumulator, Compositor, FoldStep, composite, fold_order};
pub use crate::frame::buffer::{Frame, FrameSequence, FrameView};
pub use crate::frame::normalize::{CompositedImage, NormalizedFrame, OPAQUE, normalize};
pub use crate::output::write::{
    CaptureManifest, MANIFEST_FILE, capture_dir_name, ensure_parent_dir, frame_file_name,
    output_format, read_manifest, save_raw_frames, write_composited,
};
pub use crate::pipeline::{Acquired, InputSpec, RunConfig, RunReport, acquire, run};
pub use crate::source::camera::{
    CameraOpts, CameraSource, default_input_format, is_ffmpeg_on_path,
};
pub use crate::source::directory::{
    DirectorySource, list_capture_sets, list_frame_files, load_frame, resolve_capture_set,
};
pub use crate::source::{FrameSource, MemorySource, collect_sequence};
