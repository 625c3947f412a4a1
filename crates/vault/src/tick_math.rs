//! Tick to square-root price conversion.
//!
//! `sqrtPriceX96(tick) = sqrt(1.0001^tick) * 2^96`, computed with the
//! standard bit-decomposition table so results match on-chain pools exactly.

use alloy_primitives::U256;

use crate::math::MathError;

/// Lowest tick a pool can represent.
pub const MIN_TICK: i32 = -887_272;

/// Highest tick a pool can represent.
pub const MAX_TICK: i32 = 887_272;

/// `sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4_295_128_739, 0, 0, 0]);

/// `sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([0x5d95_1d52_6398_8d26, 0xefd1_fc6a_5064_8849, 0xfffd_8963, 0]);

/// `2^128 / sqrt(1.0001)^(2^i)` for i in 1..20, Q128.128.
const RATIO_STEPS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

const RATIO_TICK_ONE: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Square-root price at `tick` as a Q64.96 value.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(RATIO_TICK_ONE)
    } else {
        U256::from(1u64) << 128
    };
    for (bit, step) in RATIO_STEPS.iter().enumerate() {
        if abs_tick & (1 << (bit + 1)) != 0 {
            ratio = (ratio * U256::from(*step)) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up so the result is never below the true price.
    let low_bits = ratio & U256::from(u32::MAX);
    let sqrt_price = ratio >> 32;
    if low_bits.is_zero() {
        Ok(sqrt_price)
    } else {
        Ok(sqrt_price + U256::from(1u64))
    }
}

/// Greatest tick whose square-root price is `<= sqrt_price_x96`.
pub fn tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::SqrtPriceOutOfBounds(sqrt_price_x96));
    }

    let (mut low, mut high) = (MIN_TICK, MAX_TICK);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Whether `tick` sits on the pool's tick grid.
pub fn is_aligned(tick: i32, tick_spacing: i32) -> bool {
    tick_spacing > 0 && tick % tick_spacing == 0
}

/// Rounds `tick` down to the nearest multiple of `tick_spacing`.
pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing) * tick_spacing
}

/// Rounds `tick` up to the nearest multiple of `tick_spacing`.
pub fn ceil_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    let floor = floor_to_spacing(tick, tick_spacing);
    if floor == tick {
        tick
    } else {
        floor + tick_spacing
    }
}

/// Lowest tick usable with `tick_spacing`.
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    ceil_to_spacing(MIN_TICK, tick_spacing)
}

/// Highest tick usable with `tick_spacing`.
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    floor_to_spacing(MAX_TICK, tick_spacing)
}
