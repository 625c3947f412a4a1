//! Per-vault busy flag.
//!
//! The flag is entered before the first pool call of an operation and
//! released when the returned [`GuardToken`] drops, on success and on error.
//! Copies of a vault share one flag, so a pool callback that tries to run
//! another operation against the same vault is refused.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, VaultError};

/// Shared reentrancy flag.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    busy: Arc<AtomicBool>,
}

/// Holds the guard until dropped.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    busy: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    /// Create a released guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guard, failing if an operation already holds it.
    pub fn enter(&self) -> Result<GuardToken> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| VaultError::ReentrancyDetected)?;
        Ok(GuardToken {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Whether an operation currently holds the guard.
    pub fn is_entered(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
