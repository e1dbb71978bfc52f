//! Rebalancer vault program adapter.
//!
//! This module provides everything needed to talk to the vault contract:
//! - Account layouts and PDA derivations
//! - Instruction builders for the keeper's write surface
//! - A reader exposing the vault state as domain types

/// Instruction builders.
pub mod instructions;
/// Position state reader.
pub mod reader;
/// Vault account structures.
pub mod state;
