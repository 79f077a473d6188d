//! Chat completion client for the generative fallback and chat surfaces.
//!
//! Groq and OpenAI both speak the OpenAI chat-completions wire format, so a
//! single client covers both; the active backend is chosen by
//! `SCOUT_COMPLETION_PROVIDER` and authenticated from the matching key
//! environment variable at call time.

pub mod client;
pub mod types;

pub use client::{CompletionClient, Provider};
pub use types::{ChatMessage, Completion, TokenUsage};

use thiserror::Error;

pub(crate) const USER_AGENT: &str = "Scout/1.0";

#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider's key variable is unset, so no request was attempted.
    #[error("completion provider {provider:?} is not configured")]
    MissingCredentials {
        provider: Provider,
        hint: &'static str,
    },
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("completion endpoint returned status {status}")]
    Status { status: u16, body: String },
    /// 2xx response that carried no usable message content.
    #[error("completion response contained no content")]
    Malformed,
}

impl CompletionError {
    /// User-facing remediation hint, when one exists.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredentials { hint, .. } => Some(hint),
            _ => None,
        }
    }
}
