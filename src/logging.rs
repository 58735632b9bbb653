//! `tracing` subscriber setup.
//!
//! `RUST_LOG` wins when set and must parse; otherwise the configured level
//! is used as the filter directive. Output goes to stderr.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::env::Env;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?} from {origin}: {source}")]
    Filter {
        origin: &'static str,
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Build the filter, preferring `RUST_LOG` over `level`.
///
/// A `RUST_LOG` that is set but does not parse is an error, not a silent
/// fallback to `level`. An empty value counts as unset.
pub fn filter(env: &Env, level: &str) -> Result<EnvFilter, LoggingError> {
    match env.var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => parse(EnvFilter::DEFAULT_ENV, &directive),
        _ => parse("configured level", level),
    }
}

fn parse(origin: &'static str, directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|source| LoggingError::Filter {
        origin,
        directive: directive.to_string(),
        source,
    })
}

/// Install the global subscriber. Call once, before serving.
pub fn init(env: &Env, level: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(env, level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
