//! Storage module - account ledger, mempool, chain and combined state

mod utxo;
mod mempool;
mod chain;
mod state;

pub use utxo::*;
pub use mempool::*;
pub use chain::*;
pub use state::*;
