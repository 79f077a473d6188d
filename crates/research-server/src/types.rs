use completion_client::{ChatMessage, TokenUsage};
use research_core::SourceReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ResearchParams {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    /// Validated sources in arrival order; empty means the caller should
    /// defer to its own fallback.
    pub sources: Vec<SourceReport>,
    pub intent: String,
    pub confidence: u8,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Prior conversation turns, oldest first.
    #[serde(default)]
    pub context: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    /// RFC3339 completion time.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sources: usize,
}
