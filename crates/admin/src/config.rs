//! Governance configuration.

use serde::{Deserialize, Serialize};

/// Minimum delay between preparing and fulfilling an ownership transfer (24 hours).
pub const MIN_DELAY: u64 = 24 * 60 * 60;

/// What `prepare` does when a transfer is already pending for the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTransferPolicy {
    /// The new request replaces the pending one and restarts the delay.
    #[default]
    Overwrite,
    /// The pending request must be fulfilled or cancelled first.
    RejectWhilePending,
}

/// Configuration for an [`Admin`](crate::Admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Seconds a prepared transfer must wait before it can be fulfilled.
    /// Values below [`MIN_DELAY`] are raised to it.
    pub min_delay: u64,
    /// Handling of a second `prepare` for the same vault.
    pub pending_policy: PendingTransferPolicy,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            min_delay: MIN_DELAY,
            pending_policy: PendingTransferPolicy::default(),
        }
    }
}

impl AdminConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a longer timelock delay.
    pub fn with_min_delay(mut self, min_delay: u64) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// The delay actually applied to a prepared transfer.
    pub fn effective_delay(&self) -> u64 {
        self.min_delay.max(MIN_DELAY)
    }

    /// Set the pending-transfer policy.
    pub fn with_pending_policy(mut self, pending_policy: PendingTransferPolicy) -> Self {
        self.pending_policy = pending_policy;
        self
    }
}
