//! Domain types for the rebalancer vault keeper.
//!
//! Everything in this crate is chain-agnostic: the structs mirror what the
//! vault contract owns on-chain, but carry no RPC or wire concerns.

/// Error types.
pub mod errors;
/// Tick/price conversion math.
pub mod math;
/// Rebalance plan value object.
pub mod plan;
/// Stake and participant accounting snapshots.
pub mod stake;
/// Epoch summarization state.
pub mod summarization;
/// Open position tick range.
pub mod tick_range;

pub use errors::MathError;
pub use plan::RebalancePlan;
pub use stake::{ParticipantState, StakeTotals};
pub use summarization::SummarizationState;
pub use tick_range::TickRange;

/// Ledger progress marker. On Solana this is a slot number; the keeper only
/// relies on it being monotone non-decreasing.
pub type Height = u64;
