//! Keeper configuration.
//!
//! Configuration is an explicit value threaded into constructors; nothing in
//! the keeper consults the environment directly. Validation failures here
//! are the only fatal errors in the system: the loop must not start on a
//! broken configuration.

use crate::planner::PlannerConfig;
use crate::retry::RetryPolicy;
use rebalancer_ledger::vault::state::derive_vault_address;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Startup configuration errors. All of these abort the process before the
/// loop starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("node endpoint is not configured")]
    MissingEndpoint,
    #[error("production mode requires an explicit vault address")]
    MissingVault,
    #[error("no vault address and no token-pair locator configured")]
    MissingVaultLocator,
    #[error("keypair path is not configured")]
    MissingKeypair,
    #[error("unrecognized mode `{0}` (expected `production` or `sandbox`)")]
    InvalidMode(String),
}

/// Operating mode. Sandbox relaxes vault resolution (PDA locator allowed)
/// and enables the dry-run probe diagnostic before starting summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Production,
    Sandbox,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(Mode::Production),
            "sandbox" => Ok(Mode::Sandbox),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Locates a vault by token pair and fee tier instead of an explicit
/// address. Sandbox-only convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultLocator {
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub fee_rate: u32,
}

/// Full keeper configuration.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    /// RPC endpoint of the node.
    pub endpoint: String,
    /// Path to the keeper's signing keypair.
    pub keypair_path: Option<PathBuf>,
    /// Deployed vault program id.
    pub program_id: Pubkey,
    /// Operating mode.
    pub mode: Mode,
    /// Explicit vault address. Required in production.
    pub vault: Option<Pubkey>,
    /// Token-pair locator used to derive the vault PDA in sandbox mode.
    pub locator: Option<VaultLocator>,
    /// Height poll interval for the block watcher.
    pub poll_interval: Duration,
    /// Bounded wait for transaction confirmation.
    pub confirm_timeout: Duration,
    /// Retry policy for transient read failures.
    pub retry: RetryPolicy,
    /// Rebalance planner tunables.
    pub planner: PlannerConfig,
}

impl KeeperConfig {
    /// Checks the startup-fatal rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.keypair_path.is_none() {
            return Err(ConfigError::MissingKeypair);
        }
        match self.mode {
            Mode::Production => {
                if self.vault.is_none() {
                    return Err(ConfigError::MissingVault);
                }
            }
            Mode::Sandbox => {
                if self.vault.is_none() && self.locator.is_none() {
                    return Err(ConfigError::MissingVaultLocator);
                }
            }
        }
        Ok(())
    }

    /// Resolves the target vault address: explicit address first, PDA
    /// locator otherwise.
    pub fn resolve_vault(&self) -> Result<Pubkey, ConfigError> {
        if let Some(vault) = self.vault {
            return Ok(vault);
        }
        match (self.mode, self.locator) {
            (Mode::Sandbox, Some(locator)) => Ok(derive_vault_address(
                &self.program_id,
                &locator.token_mint_0,
                &locator.token_mint_1,
                locator.fee_rate,
            )),
            (Mode::Production, _) => Err(ConfigError::MissingVault),
            (Mode::Sandbox, None) => Err(ConfigError::MissingVaultLocator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> KeeperConfig {
        KeeperConfig {
            endpoint: "http://127.0.0.1:8899".to_string(),
            keypair_path: Some(PathBuf::from("/tmp/keeper.json")),
            program_id: Pubkey::new_unique(),
            mode: Mode::Production,
            vault: Some(Pubkey::new_unique()),
            locator: None,
            poll_interval: Duration::from_millis(400),
            confirm_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            planner: PlannerConfig::default(),
        }
    }

    #[test]
    fn test_valid_production_config() {
        assert_eq!(base_config().validate(), Ok(()));
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let mut config = base_config();
        config.endpoint.clear();
        assert_eq!(config.validate(), Err(ConfigError::MissingEndpoint));
    }

    #[test]
    fn test_production_requires_vault() {
        let mut config = base_config();
        config.vault = None;
        assert_eq!(config.validate(), Err(ConfigError::MissingVault));
    }

    #[test]
    fn test_sandbox_accepts_locator() {
        let mut config = base_config();
        config.mode = Mode::Sandbox;
        config.vault = None;
        config.locator = Some(VaultLocator {
            token_mint_0: Pubkey::new_unique(),
            token_mint_1: Pubkey::new_unique(),
            fee_rate: 3000,
        });
        assert_eq!(config.validate(), Ok(()));
        assert!(config.resolve_vault().is_ok());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_str("production"), Ok(Mode::Production));
        assert_eq!(Mode::from_str("Sandbox"), Ok(Mode::Sandbox));
        assert!(matches!(
            Mode::from_str("staging"),
            Err(ConfigError::InvalidMode(_))
        ));
    }
}
