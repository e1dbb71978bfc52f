//! Vault program account layouts.

use crate::client::LedgerError;
use borsh::{BorshDeserialize, BorshSerialize};
use rebalancer_domain::{ParticipantState, StakeTotals, SummarizationState, TickRange};
use solana_sdk::pubkey::Pubkey;

/// On-chain vault account.
///
/// The program appends reserved bytes after these fields, so parsing goes
/// through [`VaultAccount::parse`] which tolerates trailing data instead of
/// `try_from_slice` which requires an exact match.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct VaultAccount {
    pub discriminator: [u8; 8],
    /// The pool this vault provides liquidity to.
    pub pool: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    /// Pool fee tier, in hundredths of a basis point.
    pub fee_rate: u32,
    /// Summarization stage; 0 means idle.
    pub stage: u32,
    pub last_summarized_height: u64,
    pub share_denominator: u64,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub staked_amount_0: u64,
    pub staked_amount_1: u64,
    /// Heights between epoch summarizations.
    pub summarization_frequency: u64,
}

impl VaultAccount {
    pub fn parse(address: &Pubkey, data: &[u8]) -> Result<Self, LedgerError> {
        Self::deserialize(&mut &data[..]).map_err(|e| LedgerError::Deserialize {
            address: *address,
            reason: e.to_string(),
        })
    }

    pub fn summarization_state(&self) -> SummarizationState {
        SummarizationState {
            stage: self.stage,
            last_summarized_height: self.last_summarized_height,
            share_denominator: self.share_denominator,
        }
    }

    pub fn open_position(&self) -> TickRange {
        TickRange::new(self.tick_lower, self.tick_upper)
    }

    pub fn stake_totals(&self) -> StakeTotals {
        StakeTotals {
            amount_0: self.staked_amount_0,
            amount_1: self.staked_amount_1,
        }
    }
}

/// The slice of the pool account the keeper reads.
///
/// Like the vault layout, real pool accounts carry more fields (fee growth,
/// rewards); only the prefix up to the current tick matters here.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct PoolAccount {
    pub discriminator: [u8; 8],
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub tick_spacing: u16,
    pub fee_rate: u32,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
}

impl PoolAccount {
    pub fn parse(address: &Pubkey, data: &[u8]) -> Result<Self, LedgerError> {
        Self::deserialize(&mut &data[..]).map_err(|e| LedgerError::Deserialize {
            address: *address,
            reason: e.to_string(),
        })
    }
}

/// Per-participant accounting account, one PDA per (vault, owner).
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct ParticipantAccount {
    pub discriminator: [u8; 8],
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub share: u64,
    pub deposited_amount_0: u64,
    pub deposited_amount_1: u64,
    pub fee_amount_0: u64,
    pub fee_amount_1: u64,
}

impl ParticipantAccount {
    pub fn parse(address: &Pubkey, data: &[u8]) -> Result<Self, LedgerError> {
        Self::deserialize(&mut &data[..]).map_err(|e| LedgerError::Deserialize {
            address: *address,
            reason: e.to_string(),
        })
    }

    pub fn to_state(&self) -> ParticipantState {
        ParticipantState {
            owner: self.owner.to_string(),
            share: self.share,
            deposited_amount_0: self.deposited_amount_0,
            deposited_amount_1: self.deposited_amount_1,
            fee_amount_0: self.fee_amount_0,
            fee_amount_1: self.fee_amount_1,
        }
    }
}

/// Derives the vault PDA for a token pair and fee tier. Used in sandbox
/// environments where the vault is located by descriptor rather than
/// configured explicitly.
pub fn derive_vault_address(
    program_id: &Pubkey,
    token_mint_0: &Pubkey,
    token_mint_1: &Pubkey,
    fee_rate: u32,
) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[
            b"vault",
            token_mint_0.as_ref(),
            token_mint_1.as_ref(),
            &fee_rate.to_le_bytes(),
        ],
        program_id,
    );
    address
}

/// Derives a participant PDA under a vault.
pub fn derive_participant_address(program_id: &Pubkey, vault: &Pubkey, owner: &Pubkey) -> Pubkey {
    let (address, _bump) =
        Pubkey::find_program_address(&[b"participant", vault.as_ref(), owner.as_ref()], program_id);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vault() -> VaultAccount {
        VaultAccount {
            discriminator: [7; 8],
            pool: Pubkey::new_unique(),
            token_mint_0: Pubkey::new_unique(),
            token_mint_1: Pubkey::new_unique(),
            fee_rate: 3000,
            stage: 2,
            last_summarized_height: 100,
            share_denominator: 1_000_000,
            tick_lower: -60,
            tick_upper: 60,
            staked_amount_0: 1_000,
            staked_amount_1: 2_000,
            summarization_frequency: 5760,
        }
    }

    #[test]
    fn test_vault_parse_tolerates_trailing_bytes() {
        let vault = sample_vault();
        let mut data = borsh::to_vec(&vault).unwrap();
        data.extend_from_slice(&[0u8; 64]); // reserved tail

        let parsed = VaultAccount::parse(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(parsed.stage, 2);
        assert_eq!(parsed.open_position(), TickRange::new(-60, 60));
        assert_eq!(parsed.stake_totals().amount_1, 2_000);
    }

    #[test]
    fn test_vault_parse_rejects_truncated_data() {
        let data = borsh::to_vec(&sample_vault()).unwrap();
        let err = VaultAccount::parse(&Pubkey::new_unique(), &data[..20]);
        assert!(matches!(err, Err(LedgerError::Deserialize { .. })));
    }

    #[test]
    fn test_vault_summarization_state_projection() {
        let state = sample_vault().summarization_state();
        assert_eq!(state.stage, 2);
        assert_eq!(state.last_summarized_height, 100);
        assert!(!state.is_idle());
    }

    #[test]
    fn test_participant_to_state() {
        let owner = Pubkey::new_unique();
        let account = ParticipantAccount {
            discriminator: [1; 8],
            vault: Pubkey::new_unique(),
            owner,
            share: 42,
            deposited_amount_0: 10,
            deposited_amount_1: 20,
            fee_amount_0: 1,
            fee_amount_1: 2,
        };
        let state = account.to_state();
        assert_eq!(state.owner, owner.to_string());
        assert_eq!(state.share, 42);
    }

    #[test]
    fn test_vault_pda_is_deterministic() {
        let program = Pubkey::new_unique();
        let mint_0 = Pubkey::new_unique();
        let mint_1 = Pubkey::new_unique();

        let a = derive_vault_address(&program, &mint_0, &mint_1, 3000);
        let b = derive_vault_address(&program, &mint_0, &mint_1, 3000);
        assert_eq!(a, b);

        // Different fee tier, different vault.
        let c = derive_vault_address(&program, &mint_0, &mint_1, 500);
        assert_ne!(a, c);
    }
}
