//! Fixed-point helpers shared by the ledger, the liquidity math and the
//! simulated pool.
//!
//! All products are taken in 512 bits so `a * b / c` never loses the high
//! half; only the final quotient has to fit in a `U256`.

use alloy_primitives::{U256, U512};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `2^96`, the scale of a Q64.96 square-root price.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Scale used when pricing token0 in units of token1 (1e36).
pub const PRECISION: U256 = U256::from_limbs([0xB34B_9F10_0000_0000, 0xC097_CE7B_C907_15, 0, 0]);

/// Arithmetic failures. These never escape as panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Result does not fit the target width
    #[error("Arithmetic overflow")]
    Overflow,

    /// Tick outside `[MIN_TICK, MAX_TICK]`
    #[error("Tick {0} out of bounds")]
    TickOutOfBounds(i32),

    /// Square-root price outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`
    #[error("Sqrt price {0} out of bounds")]
    SqrtPriceOutOfBounds(U256),
}

/// Rounding direction for divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundingDirection {
    Up,
    #[default]
    Down,
}

fn widen(x: U256) -> U512 {
    let l = x.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

fn narrow(x: U512) -> Result<U256, MathError> {
    let l = x.as_limbs();
    if l[4..].iter().any(|limb| *limb != 0) {
        return Err(MathError::Overflow);
    }
    Ok(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// Computes `x * y / d` with the requested rounding.
pub fn mul_div(
    x: U256,
    y: U256,
    d: U256,
    rounding: RoundingDirection,
) -> Result<U256, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = widen(x) * widen(y);
    let divisor = widen(d);
    let quotient = product / divisor;
    let quotient = match rounding {
        RoundingDirection::Down => quotient,
        RoundingDirection::Up if !(product % divisor).is_zero() => quotient + U512::from(1u64),
        RoundingDirection::Up => quotient,
    };
    narrow(quotient)
}

/// `x * y / d` rounded down.
pub fn mul_div_down(x: U256, y: U256, d: U256) -> Result<U256, MathError> {
    mul_div(x, y, d, RoundingDirection::Down)
}

/// `x * y / d` rounded up.
pub fn mul_div_up(x: U256, y: U256, d: U256) -> Result<U256, MathError> {
    mul_div(x, y, d, RoundingDirection::Up)
}

/// `x / d` rounded up.
pub fn div_rounding_up(x: U256, d: U256) -> Result<U256, MathError> {
    if d.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = x / d;
    if (x % d).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1u64))
    }
}

/// Returns `x - y`, or zero when `y > x`.
pub fn zero_floor_sub(x: U256, y: U256) -> U256 {
    x.saturating_sub(y)
}

/// Returns the smaller of two values.
pub fn min(x: U256, y: U256) -> U256 {
    if x < y {
        x
    } else {
        y
    }
}

/// Price of token0 in token1, scaled by [`PRECISION`]: `sqrtP^2 * 1e36 / 2^192`.
pub fn price_from_sqrt(sqrt_price_x96: U256) -> Result<U256, MathError> {
    let price_x96 = mul_div_down(sqrt_price_x96, sqrt_price_x96, Q96)?;
    mul_div_down(price_x96, PRECISION, Q96)
}

/// Values `amount0` in units of token1 at the given Q64.96 square-root price.
pub fn token0_in_token1(amount0: U256, sqrt_price_x96: U256) -> Result<U256, MathError> {
    let price = price_from_sqrt(sqrt_price_x96)?;
    mul_div_down(amount0, price, PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Q96, U256::from(1u128 << 96));
        assert_eq!(PRECISION, U256::from(10u64).pow(U256::from(36u64)));
    }

    #[test]
    fn test_mul_div_rounding() {
        let down = mul_div(U256::from(10), U256::from(10), U256::from(3), RoundingDirection::Down);
        let up = mul_div(U256::from(10), U256::from(10), U256::from(3), RoundingDirection::Up);
        assert_eq!(down.unwrap(), U256::from(33));
        assert_eq!(up.unwrap(), U256::from(34));

        let exact = mul_div_up(U256::from(9), U256::from(2), U256::from(3)).unwrap();
        assert_eq!(exact, U256::from(6));
    }

    #[test]
    fn test_mul_div_keeps_high_bits() {
        // MAX * MAX / MAX overflows 256 bits in the middle but not in the result.
        let result = mul_div_down(U256::MAX, U256::MAX, U256::MAX).unwrap();
        assert_eq!(result, U256::MAX);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(
            mul_div_down(U256::from(1), U256::from(1), U256::ZERO),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(
            mul_div_down(U256::MAX, U256::from(2), U256::from(1)),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn test_div_rounding_up() {
        assert_eq!(div_rounding_up(U256::from(7), U256::from(2)).unwrap(), U256::from(4));
        assert_eq!(div_rounding_up(U256::from(8), U256::from(2)).unwrap(), U256::from(4));
    }

    #[test]
    fn test_price_at_parity() {
        assert_eq!(price_from_sqrt(Q96).unwrap(), PRECISION);
        let wad = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(token0_in_token1(wad, Q96).unwrap(), wad);
    }

    #[test]
    fn test_price_doubles_at_sqrt_two_x() {
        // sqrtP = 2 * 2^96 prices token0 at 4 token1.
        let sqrt_price = Q96 * U256::from(2);
        assert_eq!(
            token0_in_token1(U256::from(1000), sqrt_price).unwrap(),
            U256::from(4000)
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(zero_floor_sub(U256::from(1), U256::from(5)), U256::ZERO);
        assert_eq!(min(U256::from(1), U256::from(5)), U256::from(1));
    }
}
