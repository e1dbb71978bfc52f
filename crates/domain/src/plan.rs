use serde::{Deserialize, Serialize};

/// Basis points in a whole.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// A locally computed rebalance proposal.
///
/// Valid only for the position/tick snapshot it was derived from: the keeper
/// recomputes one every cycle it is needed and discards it after a single
/// submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePlan {
    /// Signed distance from the current pool tick to the new lower bound.
    pub tick_lower_offset: i32,
    /// Signed distance from the current pool tick to the new upper bound.
    pub tick_upper_offset: i32,
    /// Share of capital assigned to token 0, in basis points.
    pub token_0_share_bps: u16,
    /// Share of capital assigned to token 1, in basis points.
    pub token_1_share_bps: u16,
}

impl RebalancePlan {
    /// The two shares always partition the whole.
    pub fn is_balanced(&self) -> bool {
        u32::from(self.token_0_share_bps) + u32::from(self.token_1_share_bps)
            == u32::from(BPS_DENOMINATOR)
    }
}
