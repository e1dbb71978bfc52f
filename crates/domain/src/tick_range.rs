use serde::{Deserialize, Serialize};

/// The vault's currently open price range, in pool ticks.
///
/// Owned by the vault contract; the keeper only ever reads it and requests a
/// new one via a rebalance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl TickRange {
    pub fn new(tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            tick_lower,
            tick_upper,
        }
    }

    /// True when `tick` lies inside the range. Both bounds are inclusive:
    /// a position exactly on a bound still earns fees.
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick <= self.tick_upper
    }

    /// Range width in ticks.
    pub fn width(&self) -> i64 {
        i64::from(self.tick_upper) - i64::from(self.tick_lower)
    }
}
