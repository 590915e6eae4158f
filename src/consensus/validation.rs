//! Block and chain validation
//!
//! Pure audits over committed blocks.

use crate::consensus::{Block, DifficultyRule};
use crate::crypto::{compute_merkle_root, DigestOracle, Hash};
use crate::storage::Chain;
use thiserror::Error;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid proof of work at block {index}")]
    InvalidPoW { index: usize },
    #[error("Invalid merkle root at block {index}")]
    InvalidMerkleRoot { index: usize },
    #[error("Invalid previous hash at block {index}")]
    InvalidPrevHash { index: usize },
    #[error("Invalid difficulty target at block {index}: expected {expected}, found {found}")]
    InvalidDifficulty { index: usize, expected: u32, found: u32 },
}

/// Validate merkle root matches transactions
pub fn validate_merkle_root(block: &Block, oracle: &dyn DigestOracle) -> bool {
    let computed = compute_merkle_root(oracle, block.transactions.iter().map(|tx| &tx.id));
    computed == block.header.merkle_root
}

/// Validate proof of work against the block's own difficulty target
pub fn validate_pow(block: &Block, oracle: &dyn DigestOracle) -> bool {
    block.hash(oracle).meets_difficulty(block.header.difficulty_target)
}

/// Validate linkage, merkle roots and proof of work across a whole chain
pub fn validate_chain(
    chain: &Chain,
    rule: &DifficultyRule,
    oracle: &dyn DigestOracle,
) -> Result<(), ValidationError> {
    let mut prev_hash: Option<Hash> = None;
    let mut mined_so_far = 0;

    for (index, block) in chain.blocks().iter().enumerate() {
        if block.header.prev_hash != prev_hash {
            return Err(ValidationError::InvalidPrevHash { index });
        }

        if !validate_merkle_root(block, oracle) {
            return Err(ValidationError::InvalidMerkleRoot { index });
        }

        if block.mined {
            let expected = rule.for_mined_count(mined_so_far);
            if block.header.difficulty_target != expected {
                return Err(ValidationError::InvalidDifficulty {
                    index,
                    expected,
                    found: block.header.difficulty_target,
                });
            }
            if !validate_pow(block, oracle) {
                return Err(ValidationError::InvalidPoW { index });
            }
            mined_so_far += 1;
        }

        prev_hash = Some(block.hash(oracle));
    }

    Ok(())
}
