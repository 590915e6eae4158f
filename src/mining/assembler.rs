//! Candidate block assembly
//!
//! Picks transactions from the front of the mempool that the ledger can pay
//! for, applying each one to a private snapshot as it goes.

use log::{debug, warn};
use crate::storage::{Ledger, LedgerError, Mempool};
use crate::validation::Transaction;

/// Outcome of one assembly pass
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Transactions accepted, in mempool order
    pub included: Vec<Transaction>,
    /// Ledger after applying `included`
    pub snapshot: Ledger,
    /// One flag per scanned mempool position, `true` when included
    pub used: Vec<bool>,
    /// Transactions skipped because the sender is unknown
    pub unknown_sender: usize,
    /// Transactions skipped because the sender could not pay
    pub insufficient_funds: usize,
}

/// Assemble up to `max_transactions` payable transactions.
///
/// The scan stops only when enough transactions were accepted or the
/// mempool runs out; skipped transactions do not count toward the cap.
/// Returns `None`, and touches nothing, when no transaction is payable.
pub fn assemble(mempool: &Mempool, ledger: &Ledger, max_transactions: usize) -> Option<Assembly> {
    let mut snapshot = ledger.clone();
    let mut included = Vec::new();
    let mut used = Vec::new();
    let mut unknown_sender = 0;
    let mut insufficient_funds = 0;

    for tx in mempool.transactions() {
        if included.len() >= max_transactions {
            break;
        }

        match snapshot.spend(&tx.sender, tx.amount) {
            Ok(()) => {}
            Err(LedgerError::UnknownParticipant(_)) => {
                unknown_sender += 1;
                used.push(false);
                continue;
            }
            Err(err @ LedgerError::InsufficientFunds { .. }) => {
                debug!("Skipping {} ({}): {}", tx.id, tx.summary(), err);
                insufficient_funds += 1;
                used.push(false);
                continue;
            }
        }

        if let Err(err) = snapshot.credit(&tx.receiver, tx.amount) {
            warn!("Transaction {} ({}) burns funds: {}", tx.id, tx.summary(), err);
        }

        included.push(tx.clone());
        used.push(true);
    }

    if unknown_sender > 0 {
        debug!("Skipped {} transactions with unknown senders", unknown_sender);
    }

    if included.is_empty() {
        return None;
    }

    Some(Assembly {
        included,
        snapshot,
        used,
        unknown_sender,
        insufficient_funds,
    })
}
