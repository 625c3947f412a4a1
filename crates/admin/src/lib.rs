//! Governance for hypervisor vaults.
//!
//! [`Admin`] sits in front of vaults it owns and decides who may call what:
//!
//! | Operation | Role |
//! |---|---|
//! | rebalance, pull / add liquidity | advisor |
//! | deposit caps, supply cap, advisor rotation | owner |
//! | emergency withdraw / burn, rescue | owner |
//! | prepare / cancel ownership transfer | owner |
//! | fulfill ownership transfer | anyone, once the timelock allows |
//!
//! Ownership of a vault only leaves an admin through the timelock: a
//! transfer is prepared, waits at least [`MIN_DELAY`] seconds, and is then
//! fulfilled against the caller-supplied clock.

pub mod admin;
pub mod config;
pub mod error;
pub mod events;
pub mod roles;
pub mod timelock;

pub use admin::Admin;
pub use config::{AdminConfig, PendingTransferPolicy, MIN_DELAY};
pub use error::{AdminError, Result};
pub use events::AdminEvent;
pub use roles::Roles;
pub use timelock::{OwnershipTransferRequest, Timelock};
