// Cooperative cancellation for long-running scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DiffError, Result};

/// A cloneable cancellation flag.
///
/// Clones share the same flag, so a UI or signal handler can keep one clone
/// and call [`CancelToken::cancel`] while a diff polls another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(DiffError::Cancelled)` once cancellation has been requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DiffError::Cancelled)
        } else {
            Ok(())
        }
    }
}
