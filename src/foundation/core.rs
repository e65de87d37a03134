use crate::foundation::error::{LightrailError, LightrailResult};

/// Blend opacity applied to every accumulation step, always in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Opacity(f64);

impl Opacity {
    pub const DEFAULT: Opacity = Opacity(0.3125);
    pub const FULL: Opacity = Opacity(1.0);

    pub fn new(value: f64) -> LightrailResult<Self> {
        if !value.is_finite() || value <= 0.0 || value > 1.0 {
            return Err(LightrailError::invalid_parameter(format!(
                "opacity must be in (0, 1], got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> LightrailResult<Self> {
        if den == 0 {
            return Err(LightrailError::invalid_parameter("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(LightrailError::invalid_parameter("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Sample layout of an 8-bit frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn from_channels(channels: u8) -> LightrailResult<Self> {
        match channels {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(LightrailError::format(format!(
                "unsupported channel count {n} (expected 3 or 4)"
            ))),
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }
}

/// Height/width/channel triple shared by every frame of a sequence.
///
/// The channel count is kept raw so malformed frames can still be described in errors;
/// [`FrameShape::layout`] is where unsupported counts are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameShape {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl FrameShape {
    pub fn new(width: u32, height: u32, channels: u8) -> LightrailResult<Self> {
        if width == 0 || height == 0 {
            return Err(LightrailError::format(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if channels == 0 {
            return Err(LightrailError::format("frame channel count must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_len(self) -> usize {
        self.pixel_count() * usize::from(self.channels)
    }

    pub fn layout(self) -> LightrailResult<ChannelLayout> {
        ChannelLayout::from_channels(self.channels)
    }
}

impl std::fmt::Display for FrameShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Parse a `WIDTHxHEIGHT` size string such as `640x480`.
pub fn parse_size(s: &str) -> LightrailResult<(u32, u32)> {
    let invalid = || LightrailError::invalid_parameter(format!("invalid size '{s}', expected WxH"));
    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

/// Number of frames a capture of `seconds` at `fps` may hold: `round(seconds * fps)`, at least 1.
///
/// Budgets whose total size in `shape` frames is not addressable are rejected.
pub fn frame_budget(seconds: f64, fps: Fps, shape: FrameShape) -> LightrailResult<usize> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(LightrailError::invalid_parameter(format!(
            "capture duration must be positive, got {seconds}s"
        )));
    }
    let frames = (seconds * fps.as_f64()).round();
    let too_long = || {
        LightrailError::invalid_parameter(format!(
            "a {seconds}s capture at {fps} fps of {shape} frames does not fit in memory"
        ))
    };
    if !frames.is_finite() || frames >= usize::MAX as f64 {
        return Err(too_long());
    }
    let frames = (frames as usize).max(1);
    shape.byte_len().checked_mul(frames).ok_or_else(too_long)?;
    Ok(frames)
}

/// Render whole seconds as `1h 2m 5s`, `2m 5s` or `5s`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
