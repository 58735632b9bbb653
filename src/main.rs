//! review-relay: HTTP relay for LLM merge request reviews.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use review_relay::config;
use review_relay::constants;
use review_relay::env;
use review_relay::logging;
use review_relay::providers;
use review_relay::relay;
use review_relay::server;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Command, ServeArgs};
use config::Config;
use env::{ApiKeySource, Env};
use providers::HttpCompletionClient;
use relay::ReviewRelay;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env file is fine; only the process environment is required.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let env = Env::real();
    let mut config =
        Config::load(cli.config.as_deref(), &env).context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            config.apply_cli(args.listen, cli.log_level);
            run_serve(config, env).await
        }
        Command::Config => {
            config.apply_cli(None, cli.log_level);
            run_config(&config)
        }
        Command::Version => run_version(),
    }
}

/// Bind the listener and serve until Ctrl-C.
async fn run_serve(config: Config, env: Env) -> Result<()> {
    logging::init(&env, &config.logging.level).context("failed to initialise logging")?;

    let client = Arc::new(
        HttpCompletionClient::new(config.upstream.endpoint(), config.upstream.timeout())
            .context("failed to create upstream client")?,
    );
    let api_key = ApiKeySource::new(env, config.upstream.api_key_env.clone());
    if api_key.resolve().is_none() {
        tracing::warn!(
            var = api_key.var_name(),
            "upstream credential not set; reviews will fail until it is"
        );
    }
    let relay = Arc::new(ReviewRelay::new(client.clone(), api_key));

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;
    let local_addr = listener.local_addr().context("failed to read listen address")?;

    tracing::info!(
        addr = %local_addr,
        endpoint = client.endpoint(),
        timeout_secs = config.upstream.timeout_secs,
        "{} {} listening",
        constants::APP_NAME,
        constants::VERSION
    );

    server::serve(listener, relay, server::shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Print the effective configuration.
fn run_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

/// Print version information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    Ok(())
}
