//! Tick/price conversions for concentrated-liquidity pools.
//!
//! Price at a tick follows the standard 1.0001^tick discretization. The
//! planner only needs relative magnitudes, so f64 precision is acceptable
//! here; exact fixed-point math stays on-chain.

use crate::errors::MathError;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

const TICK_BASE: f64 = 1.0001;

/// Price corresponding to a tick: `P = 1.0001^tick`.
pub fn tick_to_price(tick: i32) -> Result<Decimal, MathError> {
    Decimal::from_f64(TICK_BASE.powi(tick)).ok_or(MathError::Overflow)
}

/// Nearest tick for a price: `tick = round(log_1.0001 P)`.
pub fn price_to_tick(price: Decimal) -> Result<i32, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::NonPositivePrice);
    }
    let price_f64 = price.to_f64().ok_or(MathError::Overflow)?;
    Ok(price_f64.log(TICK_BASE).round() as i32)
}

/// Square root of the price at a tick, i.e. `1.0001^(tick/2)`.
///
/// Concentrated-liquidity token ratios are linear in sqrt-price, which is
/// what the rebalance planner interpolates over.
pub fn tick_to_sqrt_price(tick: i32) -> f64 {
    TICK_BASE.powf(f64::from(tick) / 2.0)
}
