//! Export of simulation data
//!
//! Accounts and transactions are flat tables and go out as CSV. Block
//! records carry their transaction id lists and go out as pretty JSON, as
//! does the race summary.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use crate::consensus::BlockRecord;
use crate::crypto::DigestOracle;
use crate::mining::CompetitionReport;
use crate::storage::{ChainState, Ledger};
use crate::validation::Transaction;

pub const USERS_FILE: &str = "users.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const BLOCKS_FILE: &str = "blocks.json";
pub const MINER_1_BLOCKS_FILE: &str = "miner1_blocks.json";
pub const MINER_2_BLOCKS_FILE: &str = "miner2_blocks.json";
pub const COMPETITION_FILE: &str = "competition.json";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One `users.csv` row
#[derive(Debug, Serialize)]
pub struct UserRow<'a> {
    pub username: &'a str,
    pub public_key: &'a str,
    pub total_balance: u64,
    /// Unspent outputs in order, `;`-separated
    pub utxos: String,
}

/// One `transactions.csv` row
#[derive(Debug, Serialize)]
pub struct TransactionRow<'a> {
    pub transaction_id: &'a str,
    pub sender_key: &'a str,
    pub receiver_key: &'a str,
    pub amount: u64,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            transaction_id: &tx.id,
            sender_key: &tx.sender,
            receiver_key: &tx.receiver,
            amount: tx.amount,
        }
    }
}

/// Race summary as exported
#[derive(Debug, Serialize)]
pub struct CompetitionSummary {
    pub winner: u8,
    pub miner1_blocks: usize,
    pub miner2_blocks: usize,
}

/// Flatten the ledger into `users.csv` rows
pub fn user_rows(ledger: &Ledger) -> Vec<UserRow<'_>> {
    ledger
        .accounts()
        .map(|account| UserRow {
            username: &account.username,
            public_key: &account.public_key,
            total_balance: account.total_balance(),
            utxos: account
                .utxos()
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        })
        .collect()
}

fn create_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `rows` as CSV with a header line into `dir/file_name`
pub fn write_csv<T, I>(dir: &Path, file_name: &str, rows: I) -> Result<PathBuf, ExportError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    create_dir(dir)?;
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Serialize `value` as pretty JSON into `dir/file_name`
pub fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, ExportError> {
    create_dir(dir)?;
    let path = dir.join(file_name);
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_err)?;

    Ok(path)
}

/// Export the accounts
pub fn export_users(dir: &Path, ledger: &Ledger) -> Result<PathBuf, ExportError> {
    write_csv(dir, USERS_FILE, user_rows(ledger))
}

/// Export a transaction list
pub fn export_transactions(dir: &Path, transactions: &[Transaction]) -> Result<PathBuf, ExportError> {
    write_csv(dir, TRANSACTIONS_FILE, transactions.iter().map(TransactionRow::from))
}

/// Export block records under a given file name
pub fn export_blocks(
    dir: &Path,
    file_name: &str,
    records: &[BlockRecord],
) -> Result<PathBuf, ExportError> {
    write_json(dir, file_name, records)
}

/// Export the full state: users, pending transactions and blocks
pub fn export_state(
    dir: &Path,
    state: &ChainState,
    miner: &str,
    oracle: &dyn DigestOracle,
) -> Result<Vec<PathBuf>, ExportError> {
    Ok(vec![
        export_users(dir, state.ledger())?,
        export_transactions(dir, state.mempool().transactions())?,
        export_blocks(dir, BLOCKS_FILE, &state.chain().records(miner, oracle))?,
    ])
}

/// Export both workers' chains and the race summary
pub fn export_competition(
    dir: &Path,
    report: &CompetitionReport,
    oracle: &dyn DigestOracle,
) -> Result<Vec<PathBuf>, ExportError> {
    let summary = CompetitionSummary {
        winner: report.winner.code(),
        miner1_blocks: report.miner1.blocks_mined,
        miner2_blocks: report.miner2.blocks_mined,
    };

    Ok(vec![
        export_blocks(
            dir,
            MINER_1_BLOCKS_FILE,
            &report.miner1.chain().records(report.miner1.label, oracle),
        )?,
        export_blocks(
            dir,
            MINER_2_BLOCKS_FILE,
            &report.miner2.chain().records(report.miner2.label, oracle),
        )?,
        write_json(dir, COMPETITION_FILE, &summary)?,
    ])
}
