use serde::{Deserialize, Serialize};

/// Capital currently staked in the vault, awaiting or inside the open
/// position, denominated in the two pool tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeTotals {
    pub amount_0: u64,
    pub amount_1: u64,
}

impl StakeTotals {
    pub fn is_empty(&self) -> bool {
        self.amount_0 == 0 && self.amount_1 == 0
    }
}

/// Per-participant accounting snapshot, keyed by owner address.
///
/// Read-only from the keeper's perspective; the vault mutates it during
/// summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub owner: String,
    pub share: u64,
    pub deposited_amount_0: u64,
    pub deposited_amount_1: u64,
    pub fee_amount_0: u64,
    pub fee_amount_1: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stake_totals_empty() {
        assert!(StakeTotals::default().is_empty());
        assert!(
            !StakeTotals {
                amount_0: 1,
                amount_1: 0
            }
            .is_empty()
        );
    }
}
