//! The per-block keeper loop.
//!
//! One cycle per emitted height, strictly sequential: close the epoch if
//! due, check the range, rebalance if the price has left it. Every decision
//! is re-derived from fresh reads; nothing on-chain is trusted to stay put
//! between cycles, because other actors share the vault.

use crate::config::{ConfigError, KeeperConfig, Mode};
use crate::executor::OperationExecutor;
use crate::planner::{PlannerConfig, plan_rebalance};
use crate::retry::RetryPolicy;
use crate::summarize::{DriveStatus, SummarizationDriver};
use rebalancer_domain::Height;
use rebalancer_ledger::vault::instructions;
use rebalancer_ledger::{LedgerClient, Rejection, VaultReader};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Failures that halt the keeper loop.
#[derive(Debug, Error)]
pub enum KeeperError {
    /// The vault rejected a rebalance for a reason other than "no capital
    /// staked". Semantically unexpected; the loop halts rather than
    /// continue as if the submission had succeeded.
    #[error("rebalance rejected unexpectedly: {0}")]
    RebalanceRejected(String),
}

/// What a cycle decided about the loop's future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Continue,
    /// The vault reported no capital staked: the keeper's work is done.
    Stopped,
}

/// The keeper control loop.
pub struct KeeperLoop {
    client: Arc<dyn LedgerClient>,
    reader: Arc<VaultReader>,
    executor: OperationExecutor,
    driver: SummarizationDriver,
    planner: PlannerConfig,
    retry: RetryPolicy,
    program_id: Pubkey,
    vault: Pubkey,
    running: AtomicBool,
}

impl KeeperLoop {
    /// Validates the configuration and wires up the loop. The only fatal
    /// error path in the system: a broken config never starts a loop.
    pub fn new(client: Arc<dyn LedgerClient>, config: &KeeperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let vault = config.resolve_vault()?;

        let reader = Arc::new(VaultReader::new(client.clone(), config.program_id, vault));
        let executor = OperationExecutor::new(client.clone());
        let driver = SummarizationDriver::new(
            client.clone(),
            reader.clone(),
            executor.clone(),
            config.program_id,
            config.mode == Mode::Sandbox,
        );

        Ok(Self {
            client,
            reader,
            executor,
            driver,
            planner: config.planner,
            retry: config.retry,
            program_id: config.program_id,
            vault,
            running: AtomicBool::new(true),
        })
    }

    /// Requests a cooperative stop. Checked between cycles; an in-progress
    /// cycle (including a summarization drive) always completes first.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Runs one cycle per height until the watcher stream ends, stop is
    /// requested, the vault signals no stake, or a rebalance is rejected
    /// unexpectedly.
    pub async fn run(&self, mut heights: mpsc::Receiver<Height>) -> Result<(), KeeperError> {
        info!(vault = %self.vault, "Starting keeper loop");

        while self.running.load(Ordering::SeqCst) {
            let Some(height) = heights.recv().await else {
                info!("Height stream ended, keeper loop exiting");
                return Ok(());
            };

            match self.cycle(height).await? {
                CycleOutcome::Continue => {}
                CycleOutcome::Stopped => {
                    info!("No capital staked, keeper loop stopping cleanly");
                    return Ok(());
                }
            }
        }

        info!("Keeper loop stopped");
        Ok(())
    }

    async fn cycle(&self, height: Height) -> Result<CycleOutcome, KeeperError> {
        debug!(height = height, "Cycle start");

        // 1. Epoch summarization comes first: no other action is valid
        //    while an epoch is open for close-out.
        match self.driver.drive(height).await {
            Ok(DriveStatus::NotDue) => {}
            Ok(DriveStatus::Completed { batches }) => {
                info!(height = height, batches = batches, "Epoch summarized");
            }
            Ok(DriveStatus::StartFailed) => {
                warn!(height = height, "Start summarization failed, skipping cycle");
                return Ok(CycleOutcome::Continue);
            }
            Ok(DriveStatus::BatchFailed) => {
                warn!(height = height, "Summarization stalled, skipping cycle");
                return Ok(CycleOutcome::Continue);
            }
            Err(err) => {
                warn!(height = height, error = %err, "Summarization read failed, skipping cycle");
                return Ok(CycleOutcome::Continue);
            }
        }

        // 2. Fresh range check. Two independent reads; the tick may move
        //    between them, which the next cycle will see.
        let Ok(position) = self
            .retry
            .run("open_position", || self.reader.open_position())
            .await
        else {
            warn!(height = height, "Position read failed, skipping cycle");
            return Ok(CycleOutcome::Continue);
        };
        let Ok(tick) = self.retry.run("pool_tick", || self.reader.pool_tick()).await else {
            warn!(height = height, "Pool tick read failed, skipping cycle");
            return Ok(CycleOutcome::Continue);
        };

        if position.contains(tick) {
            debug!(
                height = height,
                tick = tick,
                tick_lower = position.tick_lower,
                tick_upper = position.tick_upper,
                "Position in range"
            );
            return Ok(CycleOutcome::Continue);
        }

        // 3. Price left the range: plan and submit a rebalance. The plan is
        //    valid only for this snapshot and is consumed by this single
        //    submission attempt.
        info!(
            height = height,
            tick = tick,
            tick_lower = position.tick_lower,
            tick_upper = position.tick_upper,
            "Position out of range, rebalancing"
        );

        let plan = plan_rebalance(&position, tick, &self.planner);

        let Ok(pool) = self.retry.run("pool", || self.reader.pool()).await else {
            warn!(height = height, "Pool address read failed, skipping cycle");
            return Ok(CycleOutcome::Continue);
        };
        let instruction = instructions::rebalance(
            &self.program_id,
            &self.vault,
            &pool,
            &self.client.payer(),
            &plan,
        );

        let outcome = self.executor.execute(instruction, "rebalance").await;
        if outcome.success {
            info!(
                new_lower = tick + plan.tick_lower_offset,
                new_upper = tick + plan.tick_upper_offset,
                token_0_bps = plan.token_0_share_bps,
                token_1_bps = plan.token_1_share_bps,
                "Rebalance confirmed"
            );
            return Ok(CycleOutcome::Continue);
        }

        match outcome.rejection {
            Some(Rejection::NoStake) => Ok(CycleOutcome::Stopped),
            Some(Rejection::Other(reason)) => {
                error!(reason = %reason, "Unexpected rebalance rejection");
                Err(KeeperError::RebalanceRejected(reason))
            }
            // Transport failure or timeout: transient, retry next height.
            None => {
                warn!(height = height, "Rebalance submission failed, retrying next cycle");
                Ok(CycleOutcome::Continue)
            }
        }
    }
}
