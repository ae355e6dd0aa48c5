//! CLI commands for xc-api.
//!
//! Runs the API server or prepares the database.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::storage::TeamRepository;

#[derive(Parser)]
#[command(name = "xc-api")]
#[command(version, about = "Cross-country team API: athletes, meets and results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database path override
        #[arg(short, long, value_name = "FILE")]
        database: Option<PathBuf>,
    },

    /// Create the database and its tables, then print row counts
    InitDb {
        /// SQLite database path override
        #[arg(short, long, value_name = "FILE")]
        database: Option<PathBuf>,
    },
}

/// Apply a `--database` override to the loaded configuration.
pub fn apply_database_override(config: &mut AppConfig, database: Option<PathBuf>) {
    if let Some(path) = database {
        config.database.path = path.to_string_lossy().to_string();
    }
}

/// Create (or open) the database and report what it holds.
pub fn run_init_db(database: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    apply_database_override(&mut config, database);

    let path = Path::new(&config.database.path);
    eprintln!("Initializing database at: {}", path.display());
    let repo = TeamRepository::new(path)?;

    println!("athletes: {}", repo.athlete_count()?);
    println!("meets:    {}", repo.meet_count()?);
    println!("results:  {}", repo.result_count()?);

    Ok(())
}
