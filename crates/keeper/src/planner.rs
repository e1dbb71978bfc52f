//! Rebalance planner: pure computation of a new range and capital split.

use rebalancer_domain::math::tick_to_sqrt_price;
use rebalancer_domain::plan::BPS_DENOMINATOR;
use rebalancer_domain::{RebalancePlan, TickRange};
use tracing::debug;

/// Planner tunables. The offsets are policy parameters, not protocol
/// constants: narrower ranges earn more fees in range but exit sooner.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Distance in ticks from the current price down to the new lower bound.
    pub lower_offset_ticks: i32,
    /// Distance in ticks from the current price up to the new upper bound.
    pub upper_offset_ticks: i32,
    /// Pool tick spacing; bounds are aligned outward to it.
    pub tick_spacing: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lower_offset_ticks: 600,
            upper_offset_ticks: 600,
            tick_spacing: 60,
        }
    }
}

/// Computes a rebalance plan for a position whose range the price has
/// exited.
///
/// Pure function of its inputs: the same `(position, tick)` pair under the
/// same config always yields the same plan. The new range is placed around
/// the current tick at the configured offsets, bounds aligned outward to
/// the tick spacing. Capital is split by value across the two sides of the
/// new range using sqrt-price interpolation: a centered range lands near
/// 50/50, an off-center one gives the side the price sits closer to (or
/// beyond) the larger share.
pub fn plan_rebalance(position: &TickRange, tick: i32, config: &PlannerConfig) -> RebalancePlan {
    let spacing = config.tick_spacing.max(1);

    let mut lower = align_floor(tick - config.lower_offset_ticks.abs(), spacing);
    let mut upper = align_ceil(tick + config.upper_offset_ticks.abs(), spacing);
    if lower >= upper {
        // Degenerate offsets; force a minimal one-spacing range.
        lower = align_floor(tick, spacing) - spacing;
        upper = align_ceil(tick, spacing) + spacing;
    }

    let (token_0_share_bps, token_1_share_bps) = value_split_bps(lower, upper, tick);

    debug!(
        old_lower = position.tick_lower,
        old_upper = position.tick_upper,
        tick = tick,
        new_lower = lower,
        new_upper = upper,
        token_0_bps = token_0_share_bps,
        "Planned rebalance"
    );

    RebalancePlan {
        tick_lower_offset: lower - tick,
        tick_upper_offset: upper - tick,
        token_0_share_bps,
        token_1_share_bps,
    }
}

/// Splits capital by value across a range at the given tick.
///
/// Value held as token 1 grows linearly in sqrt-price as the price moves up
/// through the range; clamping covers ticks outside the bounds, where the
/// position is entirely one-sided.
fn value_split_bps(lower: i32, upper: i32, tick: i32) -> (u16, u16) {
    let sqrt_lower = tick_to_sqrt_price(lower);
    let sqrt_upper = tick_to_sqrt_price(upper);
    let sqrt_tick = tick_to_sqrt_price(tick).clamp(sqrt_lower, sqrt_upper);

    let token_1_fraction = (sqrt_tick - sqrt_lower) / (sqrt_upper - sqrt_lower);
    let token_1_bps = ((f64::from(BPS_DENOMINATOR) * token_1_fraction).round() as i64)
        .clamp(0, i64::from(BPS_DENOMINATOR)) as u16;

    (BPS_DENOMINATOR - token_1_bps, token_1_bps)
}

fn align_floor(tick: i32, spacing: i32) -> i32 {
    tick.div_euclid(spacing) * spacing
}

fn align_ceil(tick: i32, spacing: i32) -> i32 {
    (tick + spacing - 1).div_euclid(spacing) * spacing
}
