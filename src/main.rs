use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gig_import::{load_candidates, load_clients, load_expenses, DuplicateReport, ImportConfig};

/// Match imported invoices and receipts against existing records
#[derive(Parser, Debug)]
#[command(name = "gig-import", version)]
struct Args {
    /// JSON config with thresholds and rate limits
    #[arg(long, env = "GIG_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the known client an invoice's client name refers to
    MatchClient {
        /// CSV with columns id,name
        #[arg(long)]
        clients: PathBuf,

        /// Client name as extracted from the invoice
        name: String,
    },

    /// Flag imported expenses that already exist
    CheckExpenses {
        /// CSV with columns id,date,supplier,amount,category
        #[arg(long)]
        existing: PathBuf,

        /// CSV with columns date,supplier,amount
        #[arg(long)]
        candidates: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs on stderr, results on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gig_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            ImportConfig::from_file(path)?
        }
        None => ImportConfig::default(),
    };

    match args.command {
        Command::MatchClient { clients, name } => run_match_client(&config, &clients, &name),
        Command::CheckExpenses {
            existing,
            candidates,
        } => run_check_expenses(&config, &existing, &candidates),
    }
}

fn run_match_client(config: &ImportConfig, clients_path: &Path, name: &str) -> Result<()> {
    let clients = load_clients(clients_path)?;
    let matcher = config.client_matcher();

    let found = matcher.find_match_scored(name, &clients);
    match &found {
        Some(m) => info!("Matched '{}' to client {} ({})", name, m.client.id, m.client.name),
        None => info!("No client matches '{}'", name),
    }

    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

fn run_check_expenses(
    config: &ImportConfig,
    existing_path: &Path,
    candidates_path: &Path,
) -> Result<()> {
    let existing = load_expenses(existing_path)?;
    let candidates = load_candidates(candidates_path)?;
    let detector = config.duplicate_detector();

    let report = DuplicateReport::from_checks(detector.find_duplicates(&candidates, &existing));
    info!(
        "Checked {} candidates: {} duplicates",
        report.checked, report.duplicates
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
