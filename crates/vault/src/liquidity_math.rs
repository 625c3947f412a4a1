//! Concentrated-liquidity sizing.
//!
//! Converts between token amounts and liquidity for a range `[sqrtA, sqrtB]`
//! at the current square-root price, and computes swap price movement for a
//! constant-liquidity step. All prices are Q64.96.

use alloy_primitives::U256;

use crate::math::{div_rounding_up, mul_div, mul_div_down, MathError, RoundingDirection, Q96};

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn rounding(round_up: bool) -> RoundingDirection {
    if round_up {
        RoundingDirection::Up
    } else {
        RoundingDirection::Down
    }
}

fn to_liquidity(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.to::<u128>())
}

/// Token0 needed to move between two prices with `liquidity` in range:
/// `L * 2^96 * (sqrtB - sqrtA) / sqrtB / sqrtA`.
pub fn amount0_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    if sqrt_a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = sqrt_b - sqrt_a;

    if round_up {
        let scaled = mul_div(numerator1, numerator2, sqrt_b, RoundingDirection::Up)?;
        div_rounding_up(scaled, sqrt_a)
    } else {
        Ok(mul_div_down(numerator1, numerator2, sqrt_b)? / sqrt_a)
    }
}

/// Token1 needed to move between two prices with `liquidity` in range:
/// `L * (sqrtB - sqrtA) / 2^96`.
pub fn amount1_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    mul_div(U256::from(liquidity), sqrt_b - sqrt_a, Q96, rounding(round_up))
}

/// Liquidity supported by `amount0` over `[sqrtA, sqrtB]`.
pub fn liquidity_for_amount0(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount0: U256,
) -> Result<u128, MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    let intermediate = mul_div_down(sqrt_a, sqrt_b, Q96)?;
    to_liquidity(mul_div_down(amount0, intermediate, sqrt_b - sqrt_a)?)
}

/// Liquidity supported by `amount1` over `[sqrtA, sqrtB]`.
pub fn liquidity_for_amount1(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);
    to_liquidity(mul_div_down(amount1, Q96, sqrt_b - sqrt_a)?)
}

/// Maximum liquidity deployable over `[sqrtA, sqrtB]` at `sqrt_price` without
/// exceeding either amount. Below the range only token0 counts, above it only
/// token1; inside it the binding side wins.
pub fn liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price <= sqrt_a {
        liquidity_for_amount0(sqrt_a, sqrt_b, amount0)
    } else if sqrt_price < sqrt_b {
        let liquidity0 = liquidity_for_amount0(sqrt_price, sqrt_b, amount0)?;
        let liquidity1 = liquidity_for_amount1(sqrt_a, sqrt_price, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        liquidity_for_amount1(sqrt_a, sqrt_b, amount1)
    }
}

/// Token amounts represented by `liquidity` over `[sqrtA, sqrtB]` at `sqrt_price`.
///
/// Rounds down for valuation and burns, up for the amounts a mint must pay.
pub fn amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<(U256, U256), MathError> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price <= sqrt_a {
        Ok((amount0_delta(sqrt_a, sqrt_b, liquidity, round_up)?, U256::ZERO))
    } else if sqrt_price < sqrt_b {
        Ok((
            amount0_delta(sqrt_price, sqrt_b, liquidity, round_up)?,
            amount1_delta(sqrt_a, sqrt_price, liquidity, round_up)?,
        ))
    } else {
        Ok((U256::ZERO, amount1_delta(sqrt_a, sqrt_b, liquidity, round_up)?))
    }
}

/// Price after adding `amount_in` of the input token to a constant-liquidity range.
///
/// Token0 in pushes the price down (rounded up), token1 in pushes it up
/// (rounded down), so the pool never gives away more than it received.
pub fn next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, MathError> {
    if sqrt_price.is_zero() || liquidity == 0 {
        return Err(MathError::DivisionByZero);
    }
    if amount_in.is_zero() {
        return Ok(sqrt_price);
    }

    let numerator1: U256 = U256::from(liquidity) << 96;
    if zero_for_one {
        let denominator = amount_in
            .checked_mul(sqrt_price)
            .and_then(|product| numerator1.checked_add(product));
        match denominator {
            Some(denominator) => mul_div(numerator1, sqrt_price, denominator, RoundingDirection::Up),
            None => {
                let fallback = (numerator1 / sqrt_price)
                    .checked_add(amount_in)
                    .ok_or(MathError::Overflow)?;
                div_rounding_up(numerator1, fallback)
            }
        }
    } else {
        let quotient = mul_div_down(amount_in, Q96, U256::from(liquidity))?;
        sqrt_price.checked_add(quotient).ok_or(MathError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick_math::sqrt_ratio_at_tick;

    fn wad(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_symmetric_range_consumes_both_sides() {
        let sqrt_a = sqrt_ratio_at_tick(-120).unwrap();
        let sqrt_b = sqrt_ratio_at_tick(120).unwrap();

        let liquidity = liquidity_for_amounts(Q96, sqrt_a, sqrt_b, wad(1000), wad(1000)).unwrap();
        assert_eq!(liquidity, 167_175_499_835_819_766_909_277);

        let (amount0, amount1) =
            amounts_for_liquidity(Q96, sqrt_a, sqrt_b, liquidity, true).unwrap();
        assert_eq!(amount0, wad(1000));
        assert_eq!(amount1, wad(1000));
    }

    #[test]
    fn test_range_below_price_needs_only_token1() {
        let sqrt_a = sqrt_ratio_at_tick(-60).unwrap();
        let sqrt_b = sqrt_ratio_at_tick(0).unwrap();

        assert_eq!(
            liquidity_for_amounts(Q96, sqrt_a, sqrt_b, wad(1000), U256::ZERO).unwrap(),
            0
        );
        let liquidity = liquidity_for_amounts(Q96, sqrt_a, sqrt_b, U256::ZERO, wad(1)).unwrap();
        assert!(liquidity > 0);

        let (amount0, amount1) =
            amounts_for_liquidity(Q96, sqrt_a, sqrt_b, liquidity, true).unwrap();
        assert_eq!(amount0, U256::ZERO);
        assert!(amount1 <= wad(1));
    }

    #[test]
    fn test_range_above_price_needs_only_token0() {
        let sqrt_a = sqrt_ratio_at_tick(60).unwrap();
        let sqrt_b = sqrt_ratio_at_tick(120).unwrap();

        let liquidity = liquidity_for_amounts(Q96, sqrt_a, sqrt_b, wad(5), wad(5)).unwrap();
        let (amount0, amount1) =
            amounts_for_liquidity(Q96, sqrt_a, sqrt_b, liquidity, false).unwrap();
        assert!(amount0 <= wad(5));
        assert_eq!(amount1, U256::ZERO);
    }

    #[test]
    fn test_rounding_up_never_below_rounding_down() {
        let sqrt_a = sqrt_ratio_at_tick(-600).unwrap();
        let sqrt_b = sqrt_ratio_at_tick(600).unwrap();
        let sqrt_price = sqrt_ratio_at_tick(37).unwrap();

        let (down0, down1) =
            amounts_for_liquidity(sqrt_price, sqrt_a, sqrt_b, 123_456_789, false).unwrap();
        let (up0, up1) =
            amounts_for_liquidity(sqrt_price, sqrt_a, sqrt_b, 123_456_789, true).unwrap();
        assert!(up0 >= down0 && up0 - down0 <= U256::from(1));
        assert!(up1 >= down1 && up1 - down1 <= U256::from(1));
    }

    #[test]
    fn test_liquidity_overflow_is_an_error() {
        let sqrt_a = sqrt_ratio_at_tick(0).unwrap();
        let sqrt_b = sqrt_ratio_at_tick(1).unwrap();
        assert_eq!(
            liquidity_for_amount1(sqrt_a, sqrt_b, U256::MAX >> 1),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn test_next_price_direction() {
        let liquidity = 1_000_000_000_000_000_000u128;
        let down = next_sqrt_price_from_input(Q96, liquidity, wad(1) / U256::from(10), true).unwrap();
        let up = next_sqrt_price_from_input(Q96, liquidity, wad(1) / U256::from(10), false).unwrap();
        assert!(down < Q96);
        assert!(up > Q96);
        assert_eq!(next_sqrt_price_from_input(Q96, liquidity, U256::ZERO, true).unwrap(), Q96);
    }
}
