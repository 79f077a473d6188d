//! Generative fallback for queries no structured source could answer.

use completion_client::{ChatMessage, CompletionClient};
use tracing::{debug, instrument};

use crate::intent::{Intent, IntentResult};

/// Served whenever the completion attempt fails for any reason.
pub const DEGRADED_RESPONSE: &str = "I could not reach any data source for that query right now. \
     Please try again in a moment or rephrase the question.";

const SYSTEM_PROMPT: &str = "You are Scout, a concise research assistant. Answer directly and \
     factually. If you do not know something, say so; never invent prices, statistics, or \
     citations.";

#[derive(Debug, Clone)]
pub enum FallbackOutcome {
    /// The completion backend produced an answer.
    Completed { text: String, model: String },
    /// The completion failed; a deterministic canned answer is served.
    Degraded,
}

impl FallbackOutcome {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Completed { text, .. } => text,
            Self::Degraded => DEGRADED_RESPONSE,
        }
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Completed { model, .. } => Some(model),
            Self::Degraded => None,
        }
    }
}

fn intent_instruction(intent: Intent) -> &'static str {
    match intent {
        Intent::Definition => "Provide a clear definition with the key characteristics.",
        Intent::Research => "Summarize the current state of research and name reputable venues to check.",
        Intent::News => "Live headlines were unavailable; summarize what is generally known and say the data may be stale.",
        Intent::Price => "Live market data was unavailable; explain that and do not invent numbers.",
        Intent::Weather => "Live weather data was unavailable; say so rather than guessing conditions.",
        Intent::Technical => "Give a practical, step-by-step answer.",
        Intent::Identity | Intent::General => "Answer helpfully and briefly.",
    }
}

/// The enriched prompt: query, detected intent, per-intent instruction, and
/// matched keywords.
#[must_use]
pub fn build_prompt(query: &str, intent: &IntentResult) -> Vec<ChatMessage> {
    let mut user = format!(
        "Query: {query}\nDetected intent: {}\nInstruction: {}",
        intent.primary.name(),
        intent_instruction(intent.primary)
    );
    if !intent.matched_keywords.is_empty() {
        user.push_str("\nMatched keywords: ");
        user.push_str(&intent.matched_keywords.join(", "));
    }
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// One completion attempt; every failure mode degrades to the canned text.
#[instrument(name = "fallback", skip(client, intent))]
pub async fn dispatch(
    client: &CompletionClient,
    query: &str,
    intent: &IntentResult,
) -> FallbackOutcome {
    let messages = build_prompt(query, intent);
    match client.complete(messages, None).await {
        Ok(completion) => FallbackOutcome::Completed {
            text: completion.text,
            model: completion.model,
        },
        Err(error) => {
            debug!(error = %error, "completion failed, serving degraded response");
            FallbackOutcome::Degraded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;

    #[test]
    fn prompt_opens_with_the_system_message() {
        let intent = classify("what is blockchain");
        let messages = build_prompt("what is blockchain", &intent);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Detected intent: definition"));
        assert!(messages[1].content.contains("what is"));
    }

    #[test]
    fn price_instruction_forbids_invented_numbers() {
        let intent = classify("btc price");
        let messages = build_prompt("btc price", &intent);
        assert!(messages[1].content.contains("do not invent numbers"));
    }

    #[test]
    fn degraded_text_is_never_empty() {
        assert!(!FallbackOutcome::Degraded.text().is_empty());
        assert!(FallbackOutcome::Degraded.model().is_none());
    }
}
