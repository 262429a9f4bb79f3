//! Entry point for the `ramsync` command.
#![forbid(unsafe_code)]

use std::error::Error as _;

use ramsync_cli::CliError;

fn main() {
    init_logging();
    match ramsync_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("ramsync: {}", render_chain(&err));
            std::process::exit(1);
        }
    }
}

/// Install the logger, defaulting to `info` unless `RUST_LOG` is set.
fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(&filters);
    if builder.try_init().is_err() {
        eprintln!("ramsync: logger already initialised");
    }
}

/// Join an error and its sources into one line.
fn render_chain(err: &CliError) -> String {
    let mut line = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !line.contains(&cause_text) {
            line.push_str(": ");
            line.push_str(&cause_text);
        }
        source = cause.source();
    }
    line
}
