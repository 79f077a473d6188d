use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use completion_client::ChatMessage;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::instrument;

use crate::types::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, ResearchParams, ResearchResponse,
};
use crate::AppState;

const CHAT_SYSTEM_PROMPT: &str = "You are Scout, a concise research assistant. Answer directly \
     and factually; say when you do not know something.";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/research", post(research))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

#[instrument(name = "http.research", skip(state))]
pub async fn research(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResearchParams>,
) -> Json<ResearchResponse> {
    let output = state.pipeline.run(&params.q).await;
    Json(ResearchResponse {
        sources: output.sources,
        intent: output.intent.primary.name().to_string(),
        confidence: output.intent.confidence,
        answer: output.answer,
    })
}

#[instrument(name = "http.chat", skip(state, request))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];
    messages.extend(request.context);
    messages.push(ChatMessage::user(request.message));

    match state
        .pipeline
        .completion()
        .complete(messages, request.model)
        .await
    {
        Ok(completion) => {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            Json(ChatResponse {
                response: completion.text,
                model: completion.model,
                timestamp,
                usage: completion.usage,
            })
            .into_response()
        }
        Err(error) => {
            let body = ErrorResponse {
                hint: error.hint().map(str::to_string),
                error: error.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sources: state.pipeline.memory().source_count().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_client::{CompletionClient, Provider};
    use provider_client::{AdapterId, AdapterRegistry};
    use research_core::{Pipeline, Settings};

    fn state_with_knowledge() -> Arc<AppState> {
        let mut registry = AdapterRegistry::new();
        registry.insert(
            AdapterId::Knowledge,
            std::sync::Arc::new(provider_client::knowledge::KnowledgeClient::new()),
        );
        // Unroutable completion endpoint, so tests stay offline even when an
        // API key happens to be set in the environment.
        let completion = CompletionClient::new(Provider::Groq)
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        Arc::new(AppState {
            pipeline: Pipeline::new(registry, completion, Settings::default()),
        })
    }

    #[tokio::test]
    async fn research_returns_sources_for_a_definition() {
        let state = state_with_knowledge();
        let Json(response) = research(
            State(state),
            Query(ResearchParams {
                q: "what is blockchain".to_string(),
            }),
        )
        .await;

        assert_eq!(response.intent, "definition");
        assert!(!response.sources.is_empty());
        assert!(response.sources[0].data.contains("distributed ledger"));
    }

    #[tokio::test]
    async fn research_with_no_sources_is_still_ok() {
        let state = state_with_knowledge();
        let Json(response) = research(
            State(state),
            Query(ResearchParams {
                q: "tell me something nice".to_string(),
            }),
        )
        .await;

        // Empty source list is a valid defer-to-fallback payload.
        assert!(response.sources.is_empty());
        assert!(!response.answer.is_empty());
    }

    #[tokio::test]
    async fn health_reports_source_count() {
        let state = state_with_knowledge();
        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.sources, 1);
    }
}
