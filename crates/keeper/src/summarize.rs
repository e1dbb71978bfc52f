//! Epoch summarization driver.
//!
//! Closing a trading epoch is a multi-call protocol on the vault: one
//! `start_summarization`, then `summarize_batch` until the vault's stage
//! counter returns to zero. The stage lives on-chain and other keepers may
//! advance it concurrently, so the driver re-reads it before every step and
//! tolerates being invoked with an epoch already mid-flight.

use crate::executor::OperationExecutor;
use rebalancer_domain::Height;
use rebalancer_ledger::vault::instructions;
use rebalancer_ledger::{LedgerClient, LedgerError, VaultReader};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one drive attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStatus {
    /// Vault idle and the height threshold is not reached; nothing to do.
    NotDue,
    /// Stage observed at zero after driving; epoch closed.
    Completed {
        /// Batch submissions this attempt made.
        batches: u32,
    },
    /// The `start_summarization` submission failed. The vault is still
    /// idle; the caller must skip the rest of its cycle.
    StartFailed,
    /// A `summarize_batch` submission failed mid-flight. `stage > 0`
    /// remains on-chain and the next cycle resumes from there.
    BatchFailed,
}

/// Drives the summarization state machine to idle.
pub struct SummarizationDriver {
    client: Arc<dyn LedgerClient>,
    reader: Arc<VaultReader>,
    executor: OperationExecutor,
    program_id: Pubkey,
    vault: Pubkey,
    /// Sandbox diagnostic: dry-run the start op and log the verdict before
    /// submitting for real. Never a substitute for the threshold rule.
    dry_run_probe: bool,
}

impl SummarizationDriver {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        reader: Arc<VaultReader>,
        executor: OperationExecutor,
        program_id: Pubkey,
        dry_run_probe: bool,
    ) -> Self {
        let vault = reader.vault();
        Self {
            client,
            reader,
            executor,
            program_id,
            vault,
            dry_run_probe,
        }
    }

    /// Runs one drive attempt at the given height.
    ///
    /// Entry condition: the epoch is due by height threshold, or the stage
    /// is already positive (started by someone else, or left over from a
    /// previous run). Read failures propagate; submission failures are
    /// reported in the returned status.
    pub async fn drive(&self, height: Height) -> Result<DriveStatus, LedgerError> {
        let state = self.reader.summarization_state().await?;
        let frequency = self.reader.summarization_frequency().await?;

        if state.is_idle() && !state.is_due(height, frequency) {
            return Ok(DriveStatus::NotDue);
        }

        if state.is_idle() {
            info!(
                height = height,
                last_summarized = state.last_summarized_height,
                frequency = frequency,
                "Epoch due, starting summarization"
            );

            if self.dry_run_probe {
                self.probe_start().await;
            }

            let outcome = self
                .executor
                .execute(self.start_instruction(), "start_summarization")
                .await;
            if !outcome.success {
                return Ok(DriveStatus::StartFailed);
            }
        } else {
            info!(
                height = height,
                stage = state.stage,
                "Summarization already in flight, resuming"
            );
        }

        let mut batches = 0u32;
        loop {
            // Fresh read every step: another keeper may have advanced the stage.
            let stage = self.reader.summarization_state().await?.stage;
            if stage == 0 {
                info!(batches = batches, "Epoch summarization complete");
                return Ok(DriveStatus::Completed { batches });
            }

            debug!(stage = stage, "Submitting summarize batch");
            let outcome = self
                .executor
                .execute(
                    instructions::summarize_batch(
                        &self.program_id,
                        &self.vault,
                        &self.client.payer(),
                    ),
                    "summarize_batch",
                )
                .await;
            if !outcome.success {
                warn!(stage = stage, "Batch submission failed, abandoning drive");
                return Ok(DriveStatus::BatchFailed);
            }
            batches += 1;
        }
    }

    fn start_instruction(&self) -> solana_sdk::instruction::Instruction {
        instructions::start_summarization(&self.program_id, &self.vault, &self.client.payer())
    }

    async fn probe_start(&self) {
        match self.client.simulate(self.start_instruction()).await {
            Ok(would_succeed) => {
                debug!(would_succeed = would_succeed, "Start summarization dry-run probe")
            }
            Err(err) => debug!(error = %err, "Dry-run probe failed"),
        }
    }
}
