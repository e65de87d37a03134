/// Convenience result type used across lightrail.
pub type LightrailResult<T> = Result<T, LightrailError>;

/// Top-level error taxonomy used by capture and compositing APIs.
#[derive(thiserror::Error, Debug)]
pub enum LightrailError {
    /// Frame shape or channel layout does not match what the operation expects.
    #[error("format error: {0}")]
    Format(String),

    /// A frame source could not deliver usable frames.
    #[error("acquisition error: {0}")]
    Acquisition(String),

    /// A caller-supplied parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The run was interrupted before it produced an output.
    #[error("cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LightrailError {
    /// Build a [`LightrailError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`LightrailError::Acquisition`] value.
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Build a [`LightrailError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// `true` when this error is [`LightrailError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
