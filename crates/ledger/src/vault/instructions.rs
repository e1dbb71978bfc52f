//! Instruction builders for the vault program's write surface.

use rebalancer_domain::RebalancePlan;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

/// Vault program custom error raised by `rebalance` when no capital is
/// staked. The keeper treats this specific code as a clean stop signal.
pub const NO_STAKE_ERROR_CODE: u32 = 6201;

// Anchor-style instruction discriminators.
pub const START_SUMMARIZATION_DISCRIMINATOR: [u8; 8] = [0x5b, 0x1e, 0x8a, 0x42, 0xc7, 0x03, 0xd9, 0x6f];
pub const SUMMARIZE_BATCH_DISCRIMINATOR: [u8; 8] = [0xa4, 0x77, 0x09, 0xe1, 0x3d, 0xb2, 0x58, 0x1c];
pub const REBALANCE_DISCRIMINATOR: [u8; 8] = [0x12, 0xcf, 0x64, 0x8b, 0xf0, 0x29, 0x7e, 0xd5];

/// Builds the `start_summarization` instruction, opening the epoch close-out
/// protocol.
pub fn start_summarization(program_id: &Pubkey, vault: &Pubkey, authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: START_SUMMARIZATION_DISCRIMINATOR.to_vec(),
    }
}

/// Builds the `summarize_batch` instruction. Each call processes one batch
/// of participants and decrements the vault's stage counter.
pub fn summarize_batch(program_id: &Pubkey, vault: &Pubkey, authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: SUMMARIZE_BATCH_DISCRIMINATOR.to_vec(),
    }
}

/// Builds the `rebalance` instruction carrying a freshly computed plan.
pub fn rebalance(
    program_id: &Pubkey,
    vault: &Pubkey,
    pool: &Pubkey,
    authority: &Pubkey,
    plan: &RebalancePlan,
) -> Instruction {
    let mut data = Vec::with_capacity(20);
    data.extend_from_slice(&REBALANCE_DISCRIMINATOR);
    data.extend_from_slice(&plan.tick_lower_offset.to_le_bytes());
    data.extend_from_slice(&plan.tick_upper_offset.to_le_bytes());
    data.extend_from_slice(&plan.token_0_share_bps.to_le_bytes());
    data.extend_from_slice(&plan.token_1_share_bps.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new(*pool, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}
