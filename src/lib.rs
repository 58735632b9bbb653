//! review-relay: turns a code diff into an LLM-written merge request
//! review over HTTP (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod env;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod relay;
pub mod server;
