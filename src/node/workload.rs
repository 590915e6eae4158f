//! Synthetic workload
//!
//! Random accounts and transfers for the simulator to chew on. Seed the
//! generator to get the same population on every run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use crate::config::SimConfig;
use crate::storage::Account;
use crate::validation::Transaction;

const NAME_START: [&str; 20] = [
    "the", "mister", "lady", "dr", "professor", "captain", "agent", "shadow", "dark", "light",
    "fire", "ice", "storm", "wolf", "fox", "eagle", "lion", "tiger", "bear", "dragon",
];
const NAME_MIDDLE: [&str; 20] = [
    "quick", "silent", "fierce", "brave", "clever", "sly", "bold", "wise", "strong", "swift",
    "mighty", "noble", "fierce", "gentle", "wild", "free", "loyal", "proud", "fierce", "calm",
];
const NAME_END: [&str; 20] = [
    "hunter", "warrior", "rider", "seeker", "guardian", "fighter", "runner", "walker", "strider",
    "chaser", "stalker", "prowler", "voyager", "explorer", "nomad", "wanderer", "traveler",
    "adventurer", "pilgrim", "roamer",
];

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Length of a generated public key
pub const PUBLIC_KEY_LEN: usize = 64;
/// Length of a generated transaction id
pub const TRANSACTION_ID_LEN: usize = 32;
/// Smallest initial account balance
pub const MIN_INITIAL_BALANCE: u64 = 100;
/// Largest initial account balance
pub const MAX_INITIAL_BALANCE: u64 = 1_000_000;
/// Largest generated transfer amount
pub const MAX_TRANSFER_AMOUNT: u64 = 1_000;

/// Everything one run starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub accounts: Vec<Account>,
    /// Transfers queued for mining
    pub pending: Vec<Transaction>,
    /// Transfers reserved for display-only blocks
    pub backlog: Vec<Transaction>,
}

/// Random account and transaction source
pub struct WorkloadGenerator<R = StdRng> {
    rng: R,
}

impl WorkloadGenerator<StdRng> {
    /// Reproducible generator
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the OS
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> WorkloadGenerator<R> {
    /// Wrap an existing RNG
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// `start_middle_end` style username
    pub fn username(&mut self) -> String {
        let pick = |rng: &mut R, pool: &[&'static str]| pool.choose(rng).copied().unwrap_or_default();
        format!(
            "{}_{}_{}",
            pick(&mut self.rng, &NAME_START),
            pick(&mut self.rng, &NAME_MIDDLE),
            pick(&mut self.rng, &NAME_END)
        )
    }

    fn hex_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| HEX_DIGITS[self.rng.gen_range(0..HEX_DIGITS.len())] as char)
            .collect()
    }

    /// 64-character uppercase hex public key
    pub fn public_key(&mut self) -> String {
        self.hex_string(PUBLIC_KEY_LEN)
    }

    /// 32-character uppercase hex transaction id
    pub fn transaction_id(&mut self) -> String {
        self.hex_string(TRANSACTION_ID_LEN)
    }

    /// Initial balance in `MIN_INITIAL_BALANCE..=MAX_INITIAL_BALANCE`
    pub fn initial_balance(&mut self) -> u64 {
        self.rng.gen_range(MIN_INITIAL_BALANCE..=MAX_INITIAL_BALANCE)
    }

    /// Transfer amount in `1..=max_amount`
    pub fn amount(&mut self, max_amount: u64) -> u64 {
        self.rng.gen_range(1..=max_amount.max(1))
    }

    /// Generate `count` accounts with one funded output each
    pub fn accounts(&mut self, count: usize) -> Vec<Account> {
        let mut keys = HashSet::with_capacity(count);
        let mut accounts = Vec::with_capacity(count);
        while accounts.len() < count {
            let public_key = self.public_key();
            if !keys.insert(public_key.clone()) {
                continue;
            }
            let username = self.username();
            let balance = self.initial_balance();
            accounts.push(Account::with_balance(username, public_key, balance));
        }
        accounts
    }

    /// Generate `count` transfers between distinct random accounts.
    ///
    /// Fewer than two accounts means no transfer is possible and nothing is
    /// generated.
    pub fn transactions(&mut self, accounts: &[Account], count: usize) -> Vec<Transaction> {
        if accounts.len() < 2 {
            return Vec::new();
        }

        let mut ids = HashSet::with_capacity(count);
        let mut transactions = Vec::with_capacity(count);
        while transactions.len() < count {
            let id = self.transaction_id();
            if !ids.insert(id.clone()) {
                continue;
            }

            let sender = self.rng.gen_range(0..accounts.len());
            let mut receiver = self.rng.gen_range(0..accounts.len() - 1);
            if receiver >= sender {
                receiver += 1;
            }

            let amount = self.amount(MAX_TRANSFER_AMOUNT);
            transactions.push(Transaction::new(
                id,
                accounts[sender].public_key.clone(),
                accounts[receiver].public_key.clone(),
                amount,
            ));
        }
        transactions
    }

    /// Generate a full run: `config.users` accounts, `config.transactions`
    /// pending transfers and enough backlog to fill every display-only
    /// block. Ids are unique across both lists.
    pub fn workload(&mut self, config: &SimConfig) -> Workload {
        let accounts = self.accounts(config.users);
        let backlog_len = config
            .simulated_blocks
            .saturating_mul(config.max_transactions_per_block);
        let mut pending = self.transactions(&accounts, config.transactions.saturating_add(backlog_len));
        let backlog = pending.split_off(pending.len().min(config.transactions));

        Workload {
            accounts,
            pending,
            backlog,
        }
    }
}
