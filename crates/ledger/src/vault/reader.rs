//! Position state reader over the vault account.

use crate::client::{LedgerClient, LedgerError};
use crate::vault::state::{
    ParticipantAccount, PoolAccount, VaultAccount, derive_participant_address,
};
use rebalancer_domain::{ParticipantState, StakeTotals, SummarizationState, TickRange};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

/// Reads the vault's current lifecycle state as domain types.
///
/// Every method performs a fresh account read: ledger state can change
/// between two reads in the same cycle because other actors share the
/// vault, so nothing is cached here and callers must not assume two reads
/// describe one consistent snapshot.
pub struct VaultReader {
    client: Arc<dyn LedgerClient>,
    program_id: Pubkey,
    vault: Pubkey,
}

impl VaultReader {
    pub fn new(client: Arc<dyn LedgerClient>, program_id: Pubkey, vault: Pubkey) -> Self {
        Self {
            client,
            program_id,
            vault,
        }
    }

    /// The vault account address this reader is bound to.
    pub fn vault(&self) -> Pubkey {
        self.vault
    }

    async fn vault_account(&self) -> Result<VaultAccount, LedgerError> {
        let data = self.client.read_account(&self.vault).await?;
        VaultAccount::parse(&self.vault, &data)
    }

    /// Current epoch summarization state.
    pub async fn summarization_state(&self) -> Result<SummarizationState, LedgerError> {
        Ok(self.vault_account().await?.summarization_state())
    }

    /// The currently open price range.
    pub async fn open_position(&self) -> Result<TickRange, LedgerError> {
        Ok(self.vault_account().await?.open_position())
    }

    /// Capital staked awaiting or within the position.
    pub async fn stake_totals(&self) -> Result<StakeTotals, LedgerError> {
        Ok(self.vault_account().await?.stake_totals())
    }

    /// The vault's configured heights-per-epoch.
    pub async fn summarization_frequency(&self) -> Result<u64, LedgerError> {
        Ok(self.vault_account().await?.summarization_frequency)
    }

    /// The pool account the vault provides liquidity to.
    pub async fn pool(&self) -> Result<Pubkey, LedgerError> {
        Ok(self.vault_account().await?.pool)
    }

    /// Current tick of the underlying pool. Reads the vault to resolve the
    /// pool address, then the pool itself; two independent reads.
    pub async fn pool_tick(&self) -> Result<i32, LedgerError> {
        let pool = self.pool().await?;
        let data = self.client.read_account(&pool).await?;
        Ok(PoolAccount::parse(&pool, &data)?.tick_current_index)
    }

    /// Accounting snapshot for one participant.
    pub async fn participant(&self, owner: &Pubkey) -> Result<ParticipantState, LedgerError> {
        let address = derive_participant_address(&self.program_id, &self.vault, owner);
        let data = self.client.read_account(&address).await?;
        Ok(ParticipantAccount::parse(&address, &data)?.to_state())
    }
}
