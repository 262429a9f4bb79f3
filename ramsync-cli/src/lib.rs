//! Command-line interface for the ramsync synchroniser.
#![forbid(unsafe_code)]

mod error;
mod sync;

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use ramsync_data::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPageSourceConfig};
use serde::{Deserialize, Serialize};

pub use error::CliError;
pub use sync::{execute_sync, initialise_database};

const ARG_DATABASE: &str = "database";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ENV_SYNC_DATABASE: &str = "RAMSYNC_CMDS_SYNC_DATABASE";
const ENV_INIT_SCHEMA_DATABASE: &str = "RAMSYNC_CMDS_INIT_SCHEMA_DATABASE";
const DEFAULT_TIMEOUT_SECS: u64 = ramsync_data::http::DEFAULT_TIMEOUT_SECS;

/// Run the ramsync CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Sync(args) => {
            let report = run_sync(args)?;
            info!(
                "synchronised {} rows",
                report.locations + report.characters + report.episodes + report.appearances
            );
        }
        Command::InitSchema(args) => run_init_schema(args)?,
    }
    Ok(())
}

fn run_sync(args: SyncArgs) -> Result<ramsync_core::SyncReport, CliError> {
    let config = args.into_config()?;
    sync::sync_from_api(&config)
}

fn run_init_schema(args: InitSchemaArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    initialise_database(&config.database, config.reset)
}

#[derive(Debug, Parser)]
#[command(
    name = "ramsync",
    about = "Copy the Rick and Morty API into a relational database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch every character, location and episode and load them.
    Sync(SyncArgs),
    /// Create the destination tables without fetching anything.
    InitSchema(InitSchemaArgs),
}

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "sync",
    long_about = "Fetch the full upstream dataset and bulk-load it into SQLite. \
                 Settings can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Synchronise the upstream API into a database"
)]
#[ortho_config(prefix = "RAMSYNC")]
struct SyncArgs {
    /// Path to the SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
    /// API root to fetch from.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    base_url: Option<String>,
    /// User agent sent with every request.
    #[arg(long, value_name = "agent")]
    #[serde(default)]
    user_agent: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    timeout_secs: Option<u64>,
    /// Drop and recreate the tables before loading.
    #[arg(long, value_name = "bool", num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    reset: Option<bool>,
}

impl SyncArgs {
    fn into_config(self) -> Result<SyncConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncConfig::try_from(merged)
    }
}

/// CLI arguments for the `init-schema` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "init-schema", about = "Create the destination tables")]
#[ortho_config(prefix = "RAMSYNC")]
struct InitSchemaArgs {
    /// Path to the SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
    /// Drop existing tables first.
    #[arg(long, value_name = "bool", num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    reset: Option<bool>,
}

impl InitSchemaArgs {
    fn into_config(self) -> Result<InitSchemaConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InitSchemaConfig::try_from(merged)
    }
}

/// Resolved settings for one `sync` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Destination SQLite file.
    pub database: Utf8PathBuf,
    /// HTTP source settings.
    pub source: HttpPageSourceConfig,
    /// Whether to drop and recreate the tables first.
    pub reset: bool,
}

impl TryFrom<SyncArgs> for SyncConfig {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SYNC_DATABASE,
        })?;
        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_TIMEOUT_SECS,
                reason: "must be at least one second".to_owned(),
            });
        }
        let source = HttpPageSourceConfig::new(
            args.base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        )
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_user_agent(
            args.user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        );
        Ok(Self {
            database,
            source,
            reset: args.reset.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InitSchemaConfig {
    database: Utf8PathBuf,
    reset: bool,
}

impl TryFrom<InitSchemaArgs> for InitSchemaConfig {
    type Error = CliError;

    fn try_from(args: InitSchemaArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_INIT_SCHEMA_DATABASE,
        })?;
        Ok(Self {
            database,
            reset: args.reset.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests;
