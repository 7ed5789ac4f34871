//! Facturation - Ledger Status Binary
//!
//! Prints the next invoice number and the recently saved invoices, and can
//! rebuild the ledger from the documents directory.
//!
//! # Usage
//!
//! ```bash
//! # Next number for today and the recent list
//! cargo run --bin facturation-ledger
//!
//! # Next number for a given date
//! cargo run --bin facturation-ledger -- 2024-05-03
//!
//! # Rebuild the ledger after the state file was lost
//! cargo run --bin facturation-ledger -- --reindex
//! ```
//!
//! # Environment Variables
//!
//! * `FACTURATION_DOCUMENTS_DIR` - Documents directory (default: ./documents)
//! * `FACTURATION_LEDGER_PATH` - Ledger file (default: ./documents/ledger.json)
//! * `FACTURATION_RECENT_LIMIT` - Length of the recent list (default: 10)
//! * `FACTURATION_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `FACTURATION_CURRENCY` - Currency of new documents (default: TND)

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::sync::Arc;

use core_kernel::parse_iso_date;
use infra_fs::FsDocumentStore;
use interface_app::telemetry::init_tracing;
use interface_app::{AppConfig, DocumentWorkflow};

/// Shows the next invoice number and the recent invoices
#[derive(Parser)]
#[command(name = "facturation-ledger")]
#[command(version, about, long_about = None)]
struct Args {
    /// Rebuild the ledger from the documents directory first
    #[arg(long)]
    reindex: bool,

    /// Date the next number is computed for, YYYY-MM-DD (default: today)
    #[arg(value_parser = parse_date)]
    date: Option<NaiveDate>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_iso_date(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid FACTURATION_* configuration")?;
    init_tracing(&config.log_level);

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    tracing::info!(
        documents_dir = %config.documents_dir,
        ledger_path = %config.ledger_path,
        "Opening ledger"
    );

    let store = Arc::new(FsDocumentStore::default());
    let workflow = DocumentWorkflow::from_config(&config, store).await;

    if args.reindex {
        let report = workflow.reindex().await;
        println!(
            "Reindexed {}: {} documents, {} unreadable, {} kept from elsewhere",
            config.documents_dir, report.indexed, report.skipped, report.kept
        );
    }

    let next = workflow.next_number(date).await;
    println!("Next invoice number for {}: {}", next.month_key, next.number);

    let recent = workflow.recent(config.recent_limit).await;
    if recent.is_empty() {
        println!("No recent invoices");
    } else {
        println!("Recent invoices:");
        for entry in recent {
            println!("  {}  {}  {}", entry.date, entry.display_name, entry.file_path);
        }
    }

    workflow.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_reindex_and_date() {
        let args = Args::try_parse_from(["facturation-ledger", "--reindex", "2024-05-03"]).unwrap();
        assert!(args.reindex);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 5, 3));
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["facturation-ledger"]).unwrap();
        assert!(!args.reindex);
        assert_eq!(args.date, None);
    }

    #[test]
    fn test_unknown_flag_is_not_taken_for_a_date() {
        assert!(Args::try_parse_from(["facturation-ledger", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["facturation-ledger", "03/05/2024"]).is_err());
    }
}
