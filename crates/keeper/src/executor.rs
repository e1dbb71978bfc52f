//! Operation executor: the single boundary where write failures become
//! boolean outcomes instead of propagating errors.

use rebalancer_ledger::{LedgerClient, Rejection};
use solana_sdk::instruction::Instruction;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of one submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Whether the operation was confirmed on-chain.
    pub success: bool,
    /// Program-level rejection, when the chain reported one. `None` with
    /// `success == false` means the transport failed or timed out.
    pub rejection: Option<Rejection>,
}

impl ExecOutcome {
    fn confirmed() -> Self {
        Self {
            success: true,
            rejection: None,
        }
    }

    fn failed(rejection: Option<Rejection>) -> Self {
        Self {
            success: false,
            rejection,
        }
    }
}

/// Submits state-changing operations and classifies the result.
///
/// Nothing escapes this boundary: transport errors, timeouts and program
/// rejections are all logged under the operation label and folded into an
/// [`ExecOutcome`]. The keeper loop must never crash on a single rejected
/// operation.
#[derive(Clone)]
pub struct OperationExecutor {
    client: Arc<dyn LedgerClient>,
}

impl OperationExecutor {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self { client }
    }

    /// Submits `instruction`, awaits settlement, and reports the outcome.
    pub async fn execute(&self, instruction: Instruction, label: &str) -> ExecOutcome {
        match self.client.submit(instruction).await {
            Ok(outcome) if outcome.is_success() => {
                info!(
                    operation = label,
                    signature = ?outcome.signature,
                    "Operation confirmed"
                );
                ExecOutcome::confirmed()
            }
            Ok(outcome) => {
                let rejection = outcome.rejection;
                warn!(
                    operation = label,
                    rejection = ?rejection,
                    "Operation rejected by program"
                );
                ExecOutcome::failed(rejection)
            }
            Err(err) => {
                error!(operation = label, error = %err, "Operation submission failed");
                ExecOutcome::failed(None)
            }
        }
    }
}
