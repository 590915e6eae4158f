//! Node module - workload generation and chain seeding

mod genesis;
mod workload;

pub use genesis::*;
pub use workload::*;
