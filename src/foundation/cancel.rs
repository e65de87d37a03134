use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{LightrailError, LightrailResult};

/// Shared cancellation flag checked at every frame fetch and between fold steps.
///
/// Clones observe the same flag, so one clone can be handed to a signal handler while the
/// capture and composite phases poll another.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return [`LightrailError::Cancelled`] once cancellation has been requested.
    pub fn check(&self) -> LightrailResult<()> {
        if self.is_cancelled() {
            return Err(LightrailError::Cancelled);
        }
        Ok(())
    }
}
