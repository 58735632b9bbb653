//! App-wide constants.
//!
//! Centralises the service name, config paths, environment variable names,
//! and upstream defaults so a rename only requires changing this file.

use std::time::Duration;

/// Display name of the service (lowercase).
pub const APP_NAME: &str = "review-relay";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "review-relay.toml";

/// Directory name under `~/.config/` for the global config.
pub const CONFIG_DIR: &str = "review-relay";

/// Inbound route that accepts diffs.
pub const REVIEW_PATH: &str = "/review";

/// Default listen address for the inbound surface.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:7076";

/// Default base URL of the OpenAI-compatible completion API.
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";

/// Path appended to the base URL for chat completions.
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Upstream timeout. Generation of a long review can take many minutes.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(3000);

/// Default log filter when neither `RUST_LOG` nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Environment variable names ──────────────────────────────────────

/// Name of the variable holding the upstream credential, unless overridden.
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

pub const ENV_LISTEN: &str = "REVIEW_RELAY_LISTEN";
pub const ENV_BASE_URL: &str = "REVIEW_RELAY_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "REVIEW_RELAY_TIMEOUT_SECS";
pub const ENV_API_KEY_ENV: &str = "REVIEW_RELAY_API_KEY_ENV";
pub const ENV_LOG: &str = "REVIEW_RELAY_LOG";
