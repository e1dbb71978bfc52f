//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use rebalancer_keeper::prelude::*;
//! ```

pub use crate::config::{ConfigError, KeeperConfig, Mode, VaultLocator};
pub use crate::executor::{ExecOutcome, OperationExecutor};
pub use crate::planner::{PlannerConfig, plan_rebalance};
pub use crate::retry::RetryPolicy;
pub use crate::runner::{KeeperError, KeeperLoop};
pub use crate::summarize::{DriveStatus, SummarizationDriver};
pub use crate::watcher::{BlockWatcher, WatcherConfig};
