//! Pending transaction queue

use serde::{Deserialize, Serialize};
use crate::validation::Transaction;

/// Ordered pool of transactions waiting for a block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    /// Create an empty mempool
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Queue a transaction at the back
    pub fn push(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    /// Pending transactions in queue order
    pub fn transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Drop the transactions whose scanned position is marked used.
    ///
    /// `used` covers a prefix of the queue; positions past its end are kept.
    pub fn remove_used(&mut self, used: &[bool]) {
        let mut position = 0;
        self.pending.retain(|_| {
            let keep = !used.get(position).copied().unwrap_or(false);
            position += 1;
            keep
        });
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FromIterator<Transaction> for Mempool {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            pending: iter.into_iter().collect(),
        }
    }
}
