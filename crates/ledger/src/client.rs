//! The ledger client capability the keeper core is written against.

use crate::vault::instructions::NO_STAKE_ERROR_CODE;
use async_trait::async_trait;
use rebalancer_domain::Height;
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::Signature,
    transaction::TransactionError,
};
use thiserror::Error;

/// Transport-level ledger failures.
///
/// Program-level rejections are not errors at this layer; they travel inside
/// [`WriteOutcome`] so callers can classify them.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The RPC transport failed (connectivity, node error).
    #[error("rpc transport error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),
    /// Account data could not be decoded into the expected layout.
    #[error("failed to decode account {address}: {reason}")]
    Deserialize { address: Pubkey, reason: String },
    /// The bounded wait for transaction confirmation elapsed.
    #[error("confirmation wait timed out after {0}s")]
    Timeout(u64),
}

/// Why a submitted operation was rejected by the vault program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No capital is currently staked to rebalance. The keeper treats this
    /// as a clean stop signal, not a failure.
    NoStake,
    /// Any other program-level rejection.
    Other(String),
}

impl Rejection {
    /// Classifies a transaction error reported by the node.
    pub fn from_transaction_error(err: &TransactionError) -> Self {
        match err {
            TransactionError::InstructionError(_, InstructionError::Custom(code))
                if *code == NO_STAKE_ERROR_CODE =>
            {
                Rejection::NoStake
            }
            other => Rejection::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoStake => write!(f, "no capital staked"),
            Rejection::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Result of a state-changing submission after the bounded confirmation
/// wait.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Signature of the submitted transaction, when one was broadcast.
    pub signature: Option<Signature>,
    /// Program-level rejection, if the transaction failed on-chain.
    pub rejection: Option<Rejection>,
}

impl WriteOutcome {
    /// A confirmed, successful write.
    #[must_use]
    pub fn confirmed(signature: Signature) -> Self {
        Self {
            signature: Some(signature),
            rejection: None,
        }
    }

    /// A write rejected by the program.
    #[must_use]
    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            signature: None,
            rejection: Some(rejection),
        }
    }

    pub fn is_success(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Thin capability over a remote node.
///
/// Everything the keeper does on-chain goes through this trait, which keeps
/// the core testable against a scripted in-memory implementation.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current ledger height (slot).
    async fn current_height(&self) -> Result<Height, LedgerError>;

    /// Raw data of an account, fresh from the node.
    async fn read_account(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError>;

    /// Signs, submits and awaits inclusion of a state-changing instruction.
    /// Program-level rejection is carried in `Ok(WriteOutcome)`; `Err` means
    /// the transport itself failed.
    async fn submit(&self, instruction: Instruction) -> Result<WriteOutcome, LedgerError>;

    /// Dry-runs an instruction without broadcasting. Returns whether the
    /// simulation succeeded.
    async fn simulate(&self, instruction: Instruction) -> Result<bool, LedgerError>;

    /// The signing identity used for submissions.
    fn payer(&self) -> Pubkey;
}
