//! Wire types shared across the relay.
//!
//! `review` holds the inbound/outbound payloads of the `/review` endpoint;
//! `chat` holds the OpenAI-compatible upstream request and response.
//! Other modules import from here rather than reaching into each other's
//! internals.

pub mod chat;
pub mod review;

pub use chat::{ChatMessage, Choice, Role, SamplingParams, UpstreamRequest, UpstreamResponse};
pub use review::{ReviewRequest, ReviewResponse};
