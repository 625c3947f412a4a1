use hypervisor_vault::MathError;
use thiserror::Error;

/// Errors from range planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("Tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),

    /// Widths must be positive multiples of the tick spacing
    #[error("Width {width} is not a positive multiple of tick spacing {tick_spacing}")]
    InvalidWidth { width: i32, tick_spacing: i32 },

    /// The planned range collapsed against the usable tick bounds
    #[error("No room for range [{tick_lower}, {tick_upper}) at the tick bounds")]
    NoRoom { tick_lower: i32, tick_upper: i32 },

    #[error("Tolerance {0} bps exceeds 10000")]
    InvalidTolerance(u32),

    #[error(transparent)]
    Math(#[from] MathError),
}

pub type Result<T> = std::result::Result<T, StrategyError>;
