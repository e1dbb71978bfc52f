//! Scripted in-memory ledger for exercising the keeper against a vault
//! whose state machine behaves like the real program.

use crate::config::{KeeperConfig, Mode};
use crate::executor::OperationExecutor;
use crate::planner::PlannerConfig;
use crate::retry::RetryPolicy;
use crate::runner::KeeperLoop;
use crate::summarize::SummarizationDriver;
use async_trait::async_trait;
use rebalancer_domain::Height;
use rebalancer_ledger::vault::instructions::{
    REBALANCE_DISCRIMINATOR, START_SUMMARIZATION_DISCRIMINATOR, SUMMARIZE_BATCH_DISCRIMINATOR,
};
use rebalancer_ledger::vault::state::{PoolAccount, VaultAccount};
use rebalancer_ledger::{LedgerClient, LedgerError, Rejection, VaultReader, WriteOutcome};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Inner {
    vault: VaultAccount,
    pool: PoolAccount,
    heights: VecDeque<Height>,
    last_height: Height,
    submissions: Vec<&'static str>,
    simulate_calls: usize,
    /// Stage value `start_summarization` installs.
    stages_per_epoch: u32,
    submission_count: u32,
    fail_next: bool,
    fail_at: Vec<u32>,
    rejections: VecDeque<Rejection>,
    fail_reads: bool,
}

/// In-memory ledger with a live vault emulation: submitted instructions
/// mutate the vault the way the program would, so multi-cycle keeper tests
/// observe realistic state transitions.
pub struct ScriptedLedger {
    inner: Mutex<Inner>,
    vault_address: Pubkey,
    pool_address: Pubkey,
    program_id: Pubkey,
    payer: Pubkey,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        let vault_address = Pubkey::new_unique();
        let pool_address = Pubkey::new_unique();
        let mint_0 = Pubkey::new_unique();
        let mint_1 = Pubkey::new_unique();

        let vault = VaultAccount {
            discriminator: [0xaa; 8],
            pool: pool_address,
            token_mint_0: mint_0,
            token_mint_1: mint_1,
            fee_rate: 3000,
            stage: 0,
            last_summarized_height: 0,
            share_denominator: 1_000_000,
            tick_lower: -100,
            tick_upper: 100,
            staked_amount_0: 1_000,
            staked_amount_1: 1_000,
            summarization_frequency: u64::MAX, // not due unless a test opts in
        };
        let pool = PoolAccount {
            discriminator: [0; 8],
            token_mint_0: mint_0,
            token_mint_1: mint_1,
            tick_spacing: 60,
            fee_rate: 3000,
            liquidity: 1 << 40,
            sqrt_price: 1 << 64,
            tick_current_index: 0,
        };

        Self {
            inner: Mutex::new(Inner {
                vault,
                pool,
                heights: VecDeque::new(),
                last_height: 0,
                submissions: Vec::new(),
                simulate_calls: 0,
                stages_per_epoch: 1,
                submission_count: 0,
                fail_next: false,
                fail_at: Vec::new(),
                rejections: VecDeque::new(),
                fail_reads: false,
            }),
            vault_address,
            pool_address,
            program_id: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn vault_address(&self) -> Pubkey {
        self.vault_address
    }

    pub fn set_heights(&self, heights: impl IntoIterator<Item = Height>) {
        self.inner.lock().unwrap().heights = heights.into_iter().collect();
    }

    pub fn set_summarization(&self, stage: u32, last_summarized: Height, frequency: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.vault.stage = stage;
        inner.vault.last_summarized_height = last_summarized;
        inner.vault.summarization_frequency = frequency;
    }

    pub fn set_stages_per_epoch(&self, stages: u32) {
        self.inner.lock().unwrap().stages_per_epoch = stages;
    }

    pub fn set_position(&self, tick_lower: i32, tick_upper: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.vault.tick_lower = tick_lower;
        inner.vault.tick_upper = tick_upper;
    }

    pub fn set_pool_tick(&self, tick: i32) {
        self.inner.lock().unwrap().pool.tick_current_index = tick;
    }

    /// Fails the next submission at the transport level.
    pub fn fail_next_submission(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    /// Fails the nth submission (1-based) at the transport level.
    pub fn fail_submission_number(&self, n: u32) {
        self.inner.lock().unwrap().fail_at.push(n);
    }

    /// Rejects the next submission at the program level.
    pub fn reject_next_submission(&self, rejection: Rejection) {
        self.inner.lock().unwrap().rejections.push_back(rejection);
    }

    /// Makes every account read fail, emulating a node outage.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub fn submissions(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().submissions.clone()
    }

    pub fn simulations(&self) -> usize {
        self.inner.lock().unwrap().simulate_calls
    }

    pub fn vault_stage(&self) -> u32 {
        self.inner.lock().unwrap().vault.stage
    }

    pub fn position(&self) -> (i32, i32) {
        let inner = self.inner.lock().unwrap();
        (inner.vault.tick_lower, inner.vault.tick_upper)
    }

    fn classify(data: &[u8]) -> &'static str {
        if data.len() < 8 {
            return "unknown";
        }
        if data[..8] == START_SUMMARIZATION_DISCRIMINATOR {
            "start_summarization"
        } else if data[..8] == SUMMARIZE_BATCH_DISCRIMINATOR {
            "summarize_batch"
        } else if data[..8] == REBALANCE_DISCRIMINATOR {
            "rebalance"
        } else {
            "unknown"
        }
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn current_height(&self) -> Result<Height, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(height) = inner.heights.pop_front() {
            inner.last_height = height;
        }
        Ok(inner.last_height)
    }

    async fn read_account(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(LedgerError::Timeout(0));
        }
        if *address == self.vault_address {
            Ok(borsh::to_vec(&inner.vault).unwrap())
        } else if *address == self.pool_address {
            Ok(borsh::to_vec(&inner.pool).unwrap())
        } else {
            Err(LedgerError::Deserialize {
                address: *address,
                reason: "account not found".into(),
            })
        }
    }

    async fn submit(&self, instruction: Instruction) -> Result<WriteOutcome, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.submission_count += 1;
        let n = inner.submission_count;
        let label = Self::classify(&instruction.data);
        inner.submissions.push(label);

        if std::mem::take(&mut inner.fail_next) || inner.fail_at.contains(&n) {
            return Err(LedgerError::Timeout(0));
        }
        if let Some(rejection) = inner.rejections.pop_front() {
            return Ok(WriteOutcome::rejected(rejection));
        }

        match label {
            "start_summarization" => {
                inner.vault.stage = inner.stages_per_epoch;
            }
            "summarize_batch" => {
                inner.vault.stage = inner.vault.stage.saturating_sub(1);
                if inner.vault.stage == 0 {
                    inner.vault.last_summarized_height = inner.last_height;
                }
            }
            "rebalance" => {
                let data = &instruction.data;
                let lower_offset = i32::from_le_bytes(data[8..12].try_into().unwrap());
                let upper_offset = i32::from_le_bytes(data[12..16].try_into().unwrap());
                let tick = inner.pool.tick_current_index;
                inner.vault.tick_lower = tick + lower_offset;
                inner.vault.tick_upper = tick + upper_offset;
            }
            _ => {}
        }
        Ok(WriteOutcome::confirmed(Signature::default()))
    }

    async fn simulate(&self, _instruction: Instruction) -> Result<bool, LedgerError> {
        self.inner.lock().unwrap().simulate_calls += 1;
        Ok(true)
    }

    fn payer(&self) -> Pubkey {
        self.payer
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

/// Builds a driver wired to the scripted ledger.
pub fn driver_for(ledger: &Arc<ScriptedLedger>, dry_run_probe: bool) -> SummarizationDriver {
    let client: Arc<dyn LedgerClient> = ledger.clone();
    let reader = Arc::new(VaultReader::new(
        client.clone(),
        ledger.program_id(),
        ledger.vault_address(),
    ));
    let executor = OperationExecutor::new(client.clone());
    SummarizationDriver::new(client, reader, executor, ledger.program_id(), dry_run_probe)
}

/// Builds a keeper loop wired to the scripted ledger.
pub fn keeper_for(ledger: &Arc<ScriptedLedger>) -> KeeperLoop {
    let config = KeeperConfig {
        endpoint: "http://127.0.0.1:8899".to_string(),
        keypair_path: Some(PathBuf::from("/tmp/keeper.json")),
        program_id: ledger.program_id(),
        mode: Mode::Production,
        vault: Some(ledger.vault_address()),
        locator: None,
        poll_interval: Duration::from_millis(1),
        confirm_timeout: Duration::from_secs(1),
        retry: fast_retry(),
        planner: PlannerConfig::default(),
    };
    let client: Arc<dyn LedgerClient> = ledger.clone();
    KeeperLoop::new(client, &config).expect("valid test config")
}
