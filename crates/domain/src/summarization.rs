use crate::Height;
use serde::{Deserialize, Serialize};

/// Progress of the vault's epoch summarization state machine.
///
/// `stage == 0` means idle (the last epoch is fully closed); any positive
/// stage means a summarization pass is mid-flight, possibly started by
/// another keeper or left over from a crashed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationState {
    pub stage: u32,
    pub last_summarized_height: Height,
    pub share_denominator: u64,
}

impl SummarizationState {
    pub fn is_idle(&self) -> bool {
        self.stage == 0
    }

    /// Whether a new epoch is due at `height` given the vault's configured
    /// summarization frequency. Saturating subtraction: a height observed
    /// below the last summarized height never wraps into a spurious true.
    pub fn is_due(&self, height: Height, frequency: u64) -> bool {
        height.saturating_sub(self.last_summarized_height) >= frequency
    }
}
