//! OpenAI-compatible chat-completion types for the upstream API.

use serde::{Deserialize, Deserializer, Serialize};

/// Author of a chat message. The relay only ever speaks as the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// One turn in the upstream conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling configuration sent with every upstream call.
///
/// Only the messages vary between requests; everything here is fixed by
/// [`SamplingParams::REVIEW`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub model: &'static str,
    pub stream: bool,
    pub max_tokens: u32,
    pub enable_thinking: bool,
    pub thinking_budget: u32,
    pub min_p: f64,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub frequency_penalty: f64,
    pub n: u32,
    pub stop: &'static [&'static str],
}

impl SamplingParams {
    /// Settings used for merge request reviews.
    pub const REVIEW: SamplingParams = SamplingParams {
        model: "Qwen/Qwen2.5-VL-72B-Instruct",
        stream: false,
        max_tokens: 4096,
        enable_thinking: true,
        thinking_budget: 4096,
        min_p: 0.05,
        temperature: 0.7,
        top_p: 0.7,
        top_k: 50,
        frequency_penalty: 0.5,
        n: 1,
        stop: &[],
    };
}

/// Full body of a `POST /chat/completions` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    #[serde(flatten)]
    pub params: SamplingParams,
    pub messages: Vec<ChatMessage>,
}

impl UpstreamRequest {
    pub fn new(params: SamplingParams, messages: Vec<ChatMessage>) -> Self {
        Self { params, messages }
    }
}

/// Parsed completion reply. Fields the relay doesn't need are ignored.
///
/// Decoding is lenient about missing pieces: an absent or `null` choice
/// list reads as empty, and a choice without a message reads as empty text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
}

impl UpstreamResponse {
    /// Text of the first choice, if any. A `null` content reads as empty.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_deref().unwrap_or_default())
    }
}

/// One candidate completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: ResponseMessage,
}

/// Message inside a choice. Only the text is read; providers may return
/// `null` content alongside reasoning output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
