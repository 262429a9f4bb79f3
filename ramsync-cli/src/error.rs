//! Error types emitted by the ramsync CLI.

use std::sync::Arc;

use ramsync_core::PipelineError;
use ramsync_data::{OpenStoreError, SchemaError, SourceBuildError};
use thiserror::Error;

/// Errors emitted by the ramsync CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option was supplied with an unusable value.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Flag name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The SQLite database could not be opened.
    #[error(transparent)]
    OpenStore(#[from] OpenStoreError),
    /// Creating or resetting the tables failed.
    #[error("failed to prepare the database schema: {0}")]
    Schema(#[from] SchemaError),
    /// The HTTP page source could not be built.
    #[error("failed to set up the API client: {0}")]
    BuildSource(#[from] SourceBuildError),
    /// The synchronisation itself failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
