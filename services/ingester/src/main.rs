//! Glider mission ingester.
//!
//! Walks directories of pyglider gridfiles and loads each mission and its
//! profiles into the mission catalog. Near-real-time missions get their
//! expected profile count from the raw dive files transmitted so far.

mod config;
mod ingest;
mod report;
mod sources;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use storage::{MissionCatalog, MissionStore};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::IngesterConfig;
use ingest::IngestionPipeline;
use report::Report;

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "Load glider mission gridfiles into the mission catalog")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "GLIDER_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file with database credentials (user, password, port, server)
    #[arg(long, env = "GLIDER_SECRETS")]
    secrets: Option<PathBuf>,

    /// Append logs to this file instead of stdout
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest near-real-time missions
    Nrt {
        /// Root directory to search for gridfiles
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Ingest completed missions
    Complete {
        /// Root directory to search for gridfiles
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print a report as JSON
    Report {
        #[command(subcommand)]
        report: Report,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = IngesterConfig::load(args.config.as_deref(), args.secrets.as_deref())?;
    if let Some(log_file) = args.log_file {
        config.log_file = Some(log_file);
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    init_tracing(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(config, args.command))
}

async fn run(config: IngesterConfig, command: Command) -> Result<()> {
    gridfile::silence_hdf5_errors();

    let catalog = MissionCatalog::connect_with(config.database)
        .await
        .context("Failed to connect to the mission catalog")?;
    catalog.migrate().await?;
    let store: Arc<dyn MissionStore> = Arc::new(catalog);

    match command {
        Command::Nrt { root } => {
            let root = root.unwrap_or(config.nrt_root);
            let summary = IngestionPipeline::new(store).ingest_nrt(&root).await?;
            info!(?summary, "NRT ingestion finished");
        }
        Command::Complete { root } => {
            let root = root.unwrap_or(config.complete_root);
            let summary = IngestionPipeline::new(store).ingest_complete(&root).await?;
            info!(?summary, "Complete ingestion finished");
        }
        Command::Report { report } => {
            let value = report::run(store.as_ref(), &report).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_tracing(config: &IngesterConfig) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .with_target(true);

    match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            tracing::subscriber::set_global_default(builder.finish())?;
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_cli_parses_report_subcommands() {
        let args = Args::try_parse_from(["ingester", "report", "stat", "total_dives"]).unwrap();
        match args.command {
            Command::Report { report } => {
                assert_eq!(report, Report::Stat { name: "total_dives".to_string() })
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from(["ingester", "report", "recent"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Report { report: Report::Recent { days: 3 } }
        ));
    }

    #[test]
    fn test_cli_global_flags() {
        let args = Args::try_parse_from([
            "ingester",
            "--log-level",
            "debug",
            "--log-file",
            "/tmp/ingest.log",
            "nrt",
            "--root",
            "/data/nrt",
        ])
        .unwrap();

        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/ingest.log")));
        assert!(matches!(args.command, Command::Nrt { root: Some(_) }));
    }

    #[test]
    fn test_open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.log");
        std::fs::write(&path, "first\n").unwrap();

        use std::io::Write;
        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
