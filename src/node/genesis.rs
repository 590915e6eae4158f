//! Genesis and display-only blocks
//!
//! Seeds a fresh chain with a genesis block and, optionally, a run of blocks
//! that are assembled but never mined. Those blocks draw from their own
//! transaction backlog, never from the mempool, and carry real ledger effects
//! without counting toward difficulty.

use log::info;
use crate::config::SimConfig;
use crate::consensus::{Block, DifficultyRule};
use crate::crypto::DigestOracle;
use crate::mining::{assemble, unix_timestamp};
use crate::node::Workload;
use crate::storage::{ChainState, Ledger, Mempool};
use crate::validation::Transaction;

/// Create the genesis block: no parent, no transactions, not mined
pub fn create_genesis_block(oracle: &dyn DigestOracle, rule: &DifficultyRule, timestamp: u64) -> Block {
    Block::new(oracle, None, Vec::new(), rule.base, timestamp)
}

/// Append a genesis block (when the chain is empty) followed by up to
/// `count` unmined blocks of at most `max_transactions` each, taken from
/// `backlog` in order.
///
/// The mempool of `state` is left as it is. Stops early when nothing in the
/// backlog is payable. Returns the number of non-genesis blocks appended.
pub fn populate_simulated_chain(
    state: &mut ChainState,
    backlog: &[Transaction],
    count: usize,
    max_transactions: usize,
    rule: &DifficultyRule,
    oracle: &dyn DigestOracle,
) -> usize {
    if state.chain().is_empty() {
        let genesis = create_genesis_block(oracle, rule, unix_timestamp());
        let ledger = state.ledger().clone();
        state.append_unmined(genesis, ledger);
    }

    let mut backlog: Mempool = backlog.iter().cloned().collect();
    let mut created = 0;
    while created < count {
        let Some(assembly) = assemble(&backlog, state.ledger(), max_transactions) else {
            break;
        };

        let block = Block::new(
            oracle,
            state.chain().tip_hash(oracle),
            assembly.included,
            rule.required_zeros(state.chain()),
            unix_timestamp(),
        );
        state.append_unmined(block, assembly.snapshot);
        backlog.remove_used(&assembly.used);
        created += 1;
    }

    info!("Generated genesis block and {} simulated blocks", created);
    created
}

/// Build the starting state for a run: the workload's accounts and pending
/// transfers, with the display-only chain already appended.
pub fn seed_state(workload: Workload, config: &SimConfig, oracle: &dyn DigestOracle) -> ChainState {
    let ledger: Ledger = workload.accounts.into_iter().collect();
    let mempool: Mempool = workload.pending.into_iter().collect();
    let mut state = ChainState::new(ledger, mempool);

    populate_simulated_chain(
        &mut state,
        &workload.backlog,
        config.simulated_blocks,
        config.max_transactions_per_block,
        &config.rule(),
        oracle,
    );
    state
}
