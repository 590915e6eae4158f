//! Chain simulator
//!
//! Generates a synthetic population, seeds a chain with display-only blocks
//! and then mines, either solo or as a two-miner race.

use chain_sim::config::{SimConfig, ENV_EXPORT_DIR};
use chain_sim::consensus::validate_chain;
use chain_sim::export::{export_competition, export_state, export_transactions, export_users};
use chain_sim::mining::{Competition, Miner, NoncePolicy, Winner};
use chain_sim::node::{seed_state, WorkloadGenerator};
use chain_sim::storage::{ChainStats, Ledger};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, about = "Proof-of-work chain simulator")]
struct Cli {
    /// Seed for the workload generator (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Number of accounts to generate
    #[arg(long, global = true)]
    users: Option<usize>,
    /// Number of transactions to generate
    #[arg(long, global = true)]
    transactions: Option<usize>,
    /// Display-only blocks to append before mining
    #[arg(long, global = true)]
    simulated_blocks: Option<usize>,
    /// Write CSV and JSON exports to this directory
    #[arg(long, global = true)]
    export: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate accounts and transactions only
    Generate,
    /// Mine alone for a fixed time
    Mine {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Pick nonces at random instead of counting up
        #[arg(long)]
        random: bool,
    },
    /// Race a sequential miner against a random one
    Compete {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Block margin needed to win
        #[arg(long)]
        threshold: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = SimConfig::from_env()?;
    if let Some(users) = cli.users {
        config.users = users;
    }
    if let Some(transactions) = cli.transactions {
        config.transactions = transactions;
    }
    if let Some(blocks) = cli.simulated_blocks {
        config.simulated_blocks = blocks;
    }
    let export = cli.export.is_some() || std::env::var_os(ENV_EXPORT_DIR).is_some();
    if let Some(dir) = cli.export {
        config.export_dir = dir;
    }
    config.validate()?;

    let oracle = config.oracle();
    let rule = config.rule();
    info!("Using {} digest, rule {:?}", oracle.name(), rule);

    let mut generator = match cli.seed {
        Some(seed) => WorkloadGenerator::from_seed(seed),
        None => WorkloadGenerator::from_entropy(),
    };
    let workload = generator.workload(&config);
    info!(
        "Generated {} accounts, {} pending and {} backlog transactions",
        workload.accounts.len(),
        workload.pending.len(),
        workload.backlog.len()
    );

    if let Command::Generate = cli.cmd {
        let ledger: Ledger = workload.accounts.into_iter().collect();
        if export {
            export_users(&config.export_dir, &ledger)?;
            export_transactions(&config.export_dir, &workload.pending)?;
            println!("Exported workload to {}", config.export_dir.display());
        }
        println!("Accounts:     {}", ledger.len());
        println!("Transactions: {}", workload.pending.len());
        println!("Total supply: {}", ledger.total_supply());
        return Ok(());
    }

    let mut state = seed_state(workload, &config, oracle.as_ref());
    print_stats("Starting state", &state.get_stats(&rule, oracle.as_ref()));

    match cli.cmd {
        Command::Generate => {}
        Command::Mine { seconds, random } => {
            let policy = if random {
                NoncePolicy::Random
            } else {
                NoncePolicy::Sequential
            };
            let miner = Miner::new("solo", policy, oracle.clone())
                .with_max_transactions(config.max_transactions_per_block)
                .with_rule(rule);

            let stop = miner.stop_signal();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop.store(true, Ordering::SeqCst);
                }
            });

            let deadline = Instant::now() + Duration::from_secs(seconds);
            let (miner, state, summary) = tokio::task::spawn_blocking(move || {
                let summary = miner.mine_until(&mut state, deadline);
                (miner, state, summary)
            })
            .await?;
            println!(
                "Mined {} blocks in {}s with {:?} nonces (stopped: {:?})",
                summary.blocks_mined,
                seconds,
                miner.policy(),
                summary.ended_by
            );

            validate_chain(state.chain(), &rule, oracle.as_ref())?;
            print_stats("Final state", &state.get_stats(&rule, oracle.as_ref()));

            if export {
                export_state(&config.export_dir, &state, miner.label(), oracle.as_ref())?;
                println!("Exported chain to {}", config.export_dir.display());
            }
        }
        Command::Compete { seconds, threshold } => {
            let competition = Competition::new(Duration::from_secs(seconds), oracle.clone())
                .with_win_threshold(threshold.unwrap_or(config.win_threshold))
                .with_max_transactions(config.max_transactions_per_block)
                .with_rule(rule);
            let report = competition.run(&state).await?;

            for worker in [&report.miner1, &report.miner2] {
                validate_chain(worker.chain(), &rule, oracle.as_ref())?;
                println!(
                    "{} ({:?} nonces): {} blocks",
                    worker.label, worker.policy, worker.blocks_mined
                );
            }
            match report.winner {
                Winner::None => println!("No winner (code 0)"),
                winner => println!("Winner: miner {} (code {})", winner.code(), winner.code()),
            }

            if export {
                export_competition(&config.export_dir, &report, oracle.as_ref())?;
                println!("Exported race to {}", config.export_dir.display());
            }
        }
    }

    Ok(())
}

fn print_stats(title: &str, stats: &ChainStats) {
    println!("{title}:");
    println!("  Height:       {}", stats.height);
    println!("  Mined blocks: {}", stats.mined_blocks);
    match &stats.tip_hash {
        Some(hash) => println!("  Tip hash:     {}", hash),
        None => println!("  Tip hash:     (none)"),
    }
    println!("  Difficulty:   {}", stats.difficulty);
    println!("  Pending txs:  {}", stats.pending);
    println!("  Accounts:     {}", stats.accounts);
    println!("  Total supply: {}", stats.total_supply);
}
