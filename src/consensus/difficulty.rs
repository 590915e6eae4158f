//! Difficulty schedule
//!
//! Pure function of how many mined blocks the chain holds. Blocks that were
//! only assembled for display do not count.

use serde::{Deserialize, Serialize};
use crate::constants::{BASE_DIFFICULTY, DIFFICULTY_STEP};
use crate::storage::Chain;

/// `base + mined_blocks / step` leading zero hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRule {
    /// Leading zeros required on an empty chain
    pub base: u32,
    /// Mined blocks per extra leading zero
    pub step: usize,
}

impl Default for DifficultyRule {
    fn default() -> Self {
        Self {
            base: BASE_DIFFICULTY,
            step: DIFFICULTY_STEP,
        }
    }
}

impl DifficultyRule {
    /// Required leading zeros after `mined_blocks` mined blocks
    pub fn for_mined_count(&self, mined_blocks: usize) -> u32 {
        let bumps = mined_blocks / self.step.max(1);
        self.base.saturating_add(u32::try_from(bumps).unwrap_or(u32::MAX))
    }

    /// Required leading zeros for the next block on `chain`
    pub fn required_zeros(&self, chain: &Chain) -> u32 {
        self.for_mined_count(chain.mined_count())
    }
}

/// Difficulty for the next block under the default schedule
pub fn difficulty(chain: &Chain) -> u32 {
    DifficultyRule::default().required_zeros(chain)
}
