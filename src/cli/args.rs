//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

/// HTTP relay that turns a code diff into an LLM-written review.
#[derive(Parser, Debug)]
#[command(name = "review-relay", version = review_relay::constants::VERSION)]
pub struct Cli {
    /// Config file to load instead of ./review-relay.toml.
    #[arg(long, global = true, env = "REVIEW_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. "info", "review_relay=debug"). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands. Defaults to `serve`.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP relay.
    Serve(ServeArgs),

    /// Print the effective configuration as TOML.
    Config,

    /// Print version information.
    Version,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on (default: 0.0.0.0:7076).
    #[arg(long)]
    pub listen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["review-relay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn serve_with_listen() {
        let cli = Cli::try_parse_from(["review-relay", "serve", "--listen", "127.0.0.1:8080"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.listen.as_deref(), Some("127.0.0.1:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "review-relay",
            "config",
            "--config",
            "/etc/relay.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Config)));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/relay.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["review-relay", "review"]).is_err());
    }
}
