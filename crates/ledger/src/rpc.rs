//! RPC-backed ledger client.

use crate::client::{LedgerClient, LedgerError, Rejection, WriteOutcome};
use async_trait::async_trait;
use rebalancer_domain::Height;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Production [`LedgerClient`] over a Solana RPC node.
///
/// Owns the signing keypair; every submission is a single-instruction
/// transaction paid for and signed by it.
pub struct RpcLedgerClient {
    rpc: RpcClient,
    payer: Keypair,
    confirm_timeout: Duration,
}

impl RpcLedgerClient {
    pub fn new(endpoint: impl Into<String>, payer: Keypair, confirm_timeout: Duration) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(endpoint.into(), CommitmentConfig::confirmed()),
            payer,
            confirm_timeout,
        }
    }

    async fn signed_transaction(&self, instruction: Instruction) -> Result<Transaction, LedgerError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        Ok(Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        ))
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn current_height(&self) -> Result<Height, LedgerError> {
        Ok(self.rpc.get_slot().await?)
    }

    async fn read_account(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError> {
        Ok(self.rpc.get_account_data(address).await?)
    }

    async fn submit(&self, instruction: Instruction) -> Result<WriteOutcome, LedgerError> {
        let transaction = self.signed_transaction(instruction).await?;

        let sent = tokio::time::timeout(
            self.confirm_timeout,
            self.rpc.send_and_confirm_transaction(&transaction),
        )
        .await
        .map_err(|_| LedgerError::Timeout(self.confirm_timeout.as_secs()))?;

        match sent {
            Ok(signature) => {
                debug!(signature = %signature, "Transaction confirmed");
                Ok(WriteOutcome::confirmed(signature))
            }
            Err(err) => match err.get_transaction_error() {
                // The transaction landed and the program rejected it.
                Some(tx_err) => {
                    let rejection = Rejection::from_transaction_error(&tx_err);
                    warn!(rejection = %rejection, "Transaction rejected on-chain");
                    Ok(WriteOutcome::rejected(rejection))
                }
                // Transport never got an answer from the chain.
                None => Err(LedgerError::Rpc(err)),
            },
        }
    }

    async fn simulate(&self, instruction: Instruction) -> Result<bool, LedgerError> {
        let transaction = self.signed_transaction(instruction).await?;
        let response = self.rpc.simulate_transaction(&transaction).await?;

        if let Some(err) = response.value.err {
            debug!(error = ?err, "Simulation failed");
            return Ok(false);
        }
        Ok(true)
    }

    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }
}
