//! Transaction structure
//!
//! Transactions are plain transfers between two account public keys. They
//! carry no signatures and are never mutated after creation. Whether a
//! transfer is payable is decided against the ledger at assembly time.

use serde::{Deserialize, Serialize};

/// A pending or committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id (hex string)
    pub id: String,
    /// Public key of the paying account
    pub sender: String,
    /// Public key of the receiving account
    pub receiver: String,
    /// Amount in base units, always > 0
    pub amount: u64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    /// One-line summary, `sender -> receiver: amount`
    pub fn summary(&self) -> String {
        format!("{} -> {}: {}", self.sender, self.receiver, self.amount)
    }
}
