//! Keeper control loop for the rebalancer vault.
//!
//! This crate provides the always-on process that watches the chain and
//! drives a liquidity-rebalancing vault through its lifecycle:
//! - Block watcher producing strictly increasing heights
//! - Epoch summarization driver (resumable multi-call state machine)
//! - Range evaluation and rebalance planning
//! - Operation executor that never lets a single rejection crash the loop

/// Prelude module for convenient imports.
pub mod prelude;

/// Keeper configuration and startup validation.
pub mod config;
/// Operation executor.
pub mod executor;
/// Rebalance planner.
pub mod planner;
/// Bounded retry for transient read failures.
pub mod retry;
/// The per-block keeper loop.
pub mod runner;
/// Epoch summarization driver.
pub mod summarize;
/// Block watcher.
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;
