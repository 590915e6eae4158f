//! Account ledger
//!
//! Each account owns an ordered list of unspent amounts. The balance is the
//! sum of that list; there is no scalar balance field.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Unknown participant {0}")]
    UnknownParticipant(String),
    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: String,
        balance: u64,
        requested: u64,
    },
}

/// An account and its unspent outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display name
    pub username: String,
    /// Public key, the account identifier
    pub public_key: String,
    /// Unspent amounts in creation order, each > 0
    utxos: Vec<u64>,
}

impl Account {
    /// Create an account with no funds
    pub fn new(username: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            public_key: public_key.into(),
            utxos: Vec::new(),
        }
    }

    /// Create an account holding a single output of `amount`
    pub fn with_balance(
        username: impl Into<String>,
        public_key: impl Into<String>,
        amount: u64,
    ) -> Self {
        let mut account = Self::new(username, public_key);
        account.credit(amount);
        account
    }

    /// Unspent amounts in order
    pub fn utxos(&self) -> &[u64] {
        &self.utxos
    }

    /// Sum of all unspent amounts
    pub fn total_balance(&self) -> u64 {
        self.utxos.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Append one new output. Zero amounts create nothing.
    pub fn credit(&mut self, amount: u64) {
        if amount > 0 {
            self.utxos.push(amount);
        }
    }

    /// Spend `amount`, consuming outputs front to back.
    ///
    /// Outputs not larger than what is still owed are removed whole; the first
    /// larger one is reduced in place. No change output is created. On
    /// failure the account is left untouched.
    pub fn spend(&mut self, amount: u64) -> Result<(), LedgerError> {
        let balance = self.total_balance();
        if amount > balance {
            return Err(LedgerError::InsufficientFunds {
                account: self.public_key.clone(),
                balance,
                requested: amount,
            });
        }

        let mut remaining = amount;
        let mut consumed = 0;
        while remaining > 0 {
            let front = self.utxos[consumed];
            if front <= remaining {
                remaining -= front;
                consumed += 1;
            } else {
                self.utxos[consumed] = front - remaining;
                remaining = 0;
            }
        }
        self.utxos.drain(..consumed);

        Ok(())
    }
}

/// Mapping from public key to account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    accounts: BTreeMap<String, Account>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    /// Insert an account, replacing any account with the same key
    pub fn insert(&mut self, account: Account) {
        self.accounts.insert(account.public_key.clone(), account);
    }

    /// Get an account
    pub fn get(&self, public_key: &str) -> Option<&Account> {
        self.accounts.get(public_key)
    }

    /// Iterate accounts ordered by public key
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Balance of one account
    pub fn total_balance(&self, public_key: &str) -> Result<u64, LedgerError> {
        self.get(public_key)
            .map(Account::total_balance)
            .ok_or_else(|| LedgerError::UnknownParticipant(public_key.to_string()))
    }

    /// Spend from one account
    pub fn spend(&mut self, public_key: &str, amount: u64) -> Result<(), LedgerError> {
        self.accounts
            .get_mut(public_key)
            .ok_or_else(|| LedgerError::UnknownParticipant(public_key.to_string()))?
            .spend(amount)
    }

    /// Credit one account with a new output
    pub fn credit(&mut self, public_key: &str, amount: u64) -> Result<(), LedgerError> {
        self.accounts
            .get_mut(public_key)
            .ok_or_else(|| LedgerError::UnknownParticipant(public_key.to_string()))?
            .credit(amount);
        Ok(())
    }

    /// Sum of every account balance
    pub fn total_supply(&self) -> u64 {
        self.accounts()
            .fold(0u64, |acc, a| acc.saturating_add(a.total_balance()))
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl FromIterator<Account> for Ledger {
    fn from_iter<T: IntoIterator<Item = Account>>(iter: T) -> Self {
        let mut ledger = Ledger::new();
        for account in iter {
            ledger.insert(account);
        }
        ledger
    }
}
