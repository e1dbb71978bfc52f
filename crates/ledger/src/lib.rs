//! Ledger access layer for the rebalancer keeper.
//!
//! This crate owns everything wire-adjacent:
//! - The [`client::LedgerClient`] capability the keeper core is written
//!   against: read current height, read raw accounts, submit and await a
//!   state-changing instruction.
//! - The production RPC implementation over a Solana node.
//! - The vault program adapter: account layouts, PDA derivations and
//!   instruction builders for the rebalancer vault surface.

/// Ledger client capability and write outcomes.
pub mod client;
/// RPC-backed ledger client.
pub mod rpc;
/// Vault program adapter.
pub mod vault;

pub use client::{LedgerClient, LedgerError, Rejection, WriteOutcome};
pub use rpc::RpcLedgerClient;
pub use vault::reader::VaultReader;
