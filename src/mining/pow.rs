//! Proof-of-work nonce search
//!
//! The search is bounded by a deadline that is checked once per attempt,
//! before hashing. An attempt in flight always completes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use crate::consensus::BlockHeader;
use crate::crypto::{DigestOracle, Hash};

/// Largest nonce drawn by the randomized policy
pub const MAX_RANDOM_NONCE: u64 = i64::MAX as u64;

/// How the next nonce is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoncePolicy {
    /// 0, 1, 2, ...
    Sequential,
    /// Uniform draws over `0..=i64::MAX`, freshly seeded per search
    Random,
}

/// Search outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// A nonce satisfying the target
    Found { nonce: u64, hash: Hash, attempts: u64 },
    /// The deadline passed first
    DeadlineExceeded { attempts: u64 },
    /// The stop signal was raised
    Interrupted { attempts: u64 },
}

enum NonceSource {
    Sequential(u64),
    Random(StdRng),
}

impl NonceSource {
    fn new(policy: NoncePolicy) -> Self {
        match policy {
            NoncePolicy::Sequential => NonceSource::Sequential(0),
            NoncePolicy::Random => NonceSource::Random(StdRng::from_entropy()),
        }
    }

    fn next_nonce(&mut self) -> u64 {
        match self {
            NonceSource::Sequential(next) => {
                let nonce = *next;
                *next = next.wrapping_add(1);
                nonce
            }
            NonceSource::Random(rng) => rng.gen_range(0..=MAX_RANDOM_NONCE),
        }
    }
}

/// Search for a nonce whose header digest has `difficulty` leading zero
/// hex digits.
///
/// Only the nonce varies; the rest of `header` is fixed for the search.
pub fn search_nonce(
    oracle: &dyn DigestOracle,
    header: &BlockHeader,
    difficulty: u32,
    policy: NoncePolicy,
    deadline: Instant,
    stop_signal: Option<&AtomicBool>,
) -> SearchResult {
    let mut source = NonceSource::new(policy);
    let mut attempts = 0u64;

    loop {
        if Instant::now() >= deadline {
            return SearchResult::DeadlineExceeded { attempts };
        }
        if stop_signal.is_some_and(|s| s.load(Ordering::Relaxed)) {
            return SearchResult::Interrupted { attempts };
        }

        let nonce = source.next_nonce();
        let hash = oracle.digest(header.preimage(nonce).as_bytes());
        attempts += 1;

        if hash.meets_difficulty(difficulty) {
            return SearchResult::Found {
                nonce,
                hash,
                attempts,
            };
        }
    }
}
