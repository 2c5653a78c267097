use clap::Parser;
use festipay::application::engine::LedgerEngine;
use festipay::domain::account::AccountType;
use festipay::domain::ports::TransactionLogBox;
use festipay::infrastructure::in_memory::InMemoryLog;
#[cfg(feature = "storage-rocksdb")]
use festipay::infrastructure::rocksdb::RocksDbLog;
use festipay::interfaces::csv::balance_writer::BalanceWriter;
use festipay::interfaces::csv::transfer_reader::TransferReader;
use miette::{IntoDiagnostic, Result};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accounts CSV file (`type, name`); ids are assigned in file order
    /// starting at 1
    accounts: PathBuf,

    /// Transfers CSV file (`kind, debit, credit, amount`)
    transfers: PathBuf,

    /// Path to a persistent transaction log. If provided, uses RocksDB
    /// and restores balances from prior runs.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(rename = "type")]
    account_type: String,
    name: String,
}

fn build_log(cli: &Cli) -> Result<TransactionLogBox> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &cli.db_path {
        let log = RocksDbLog::open(db_path).into_diagnostic()?;
        return Ok(Box::new(log));
    }
    let _ = cli;
    Ok(Box::new(InMemoryLog::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let engine = LedgerEngine::new(build_log(&cli)?);

    // Register accounts, then rebuild balances from whatever the log
    // already contains.
    let file = File::open(&cli.accounts).into_diagnostic()?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    for record in reader.deserialize::<AccountRecord>() {
        let record = record.into_diagnostic()?;
        let account_type: AccountType = record.account_type.parse().into_diagnostic()?;
        engine.accounts().register(account_type, record.name).await;
    }
    engine.restore().await.into_diagnostic()?;

    let file = File::open(&cli.transfers).into_diagnostic()?;
    for result in TransferReader::new(file).transfers() {
        match result {
            Ok(tx) => {
                if let Err(e) = engine.submit(tx).await {
                    eprintln!("rejected transfer: {e}");
                }
            }
            Err(e) => {
                eprintln!("skipping malformed transfer: {e}");
            }
        }
    }

    engine.verify_replay().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer
        .write_accounts(engine.accounts().all().await)
        .into_diagnostic()?;

    Ok(())
}
