//! End-to-end query pipeline: extract, classify, aggregate, validate,
//! synthesize, fall back.

use completion_client::CompletionClient;
use provider_client::AdapterRegistry;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::config::Settings;
use crate::entity::{build_fetch_request, extract};
use crate::fallback::{self, FallbackOutcome};
use crate::intent::{classify, is_repo_purpose, Intent, IntentResult};
use crate::memory::MemoryStore;
use crate::synthesize::{render_text, synthesize, SourceReport};
use crate::{aggregate, validate};

const IDENTITY_RESPONSE: &str = "I am Scout, a research assistant. I aggregate live market \
     prices, currency rates, repository metadata, news, and weather from public sources, and I \
     fall back to a language model when no source can answer.";

const REPO_GUIDANCE_RESPONSE: &str = "Share a GitHub repository URL such as \
     github.com/owner/repo and I will summarize its purpose, activity, and metadata.";

const GUIDANCE_SOURCE: &str = "Scout Assistant";

/// One completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub query: String,
    pub intent: IntentResult,
    pub sources: Vec<SourceReport>,
    pub answer: String,
    /// Set when the generative fallback produced the answer.
    pub fallback_model: Option<String>,
    pub degraded: bool,
}

pub struct Pipeline {
    registry: AdapterRegistry,
    completion: CompletionClient,
    memory: MemoryStore,
    settings: Settings,
}

impl Pipeline {
    #[must_use]
    pub fn new(registry: AdapterRegistry, completion: CompletionClient, settings: Settings) -> Self {
        let memory = MemoryStore::new(&registry.catalog(), settings.memory_retention_days);
        Self {
            registry,
            completion,
            memory,
            settings,
        }
    }

    /// Production pipeline from environment settings and the default
    /// adapter registry.
    #[must_use]
    pub fn bootstrap(settings: Settings) -> Self {
        let completion = CompletionClient::new(settings.completion_provider);
        Self::new(AdapterRegistry::defaults(), completion, settings)
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    #[must_use]
    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the full pipeline for one query. Total: always yields a
    /// non-empty answer, whatever the providers do.
    #[instrument(name = "pipeline.run", skip(self))]
    pub async fn run(&self, query: &str) -> PipelineOutput {
        let normalized = query.to_lowercase();
        let entities = extract(&normalized);
        let intent = classify(&normalized);

        if intent.primary == Intent::Identity {
            return self.guided(query, intent, IDENTITY_RESPONSE).await;
        }

        let request = build_fetch_request(&normalized, &entities);
        if is_repo_purpose(&normalized) && request.repo.is_none() {
            return self.guided(query, intent, REPO_GUIDANCE_RESPONSE).await;
        }

        let plan = aggregate::plan(intent.primary, &request);
        let candidates = aggregate::aggregate(
            &self.registry,
            &plan,
            &request,
            self.settings.adapter_timeout,
        )
        .await;
        let validated = validate::validate(intent.primary, candidates);

        if validated.is_empty() {
            info!(intent = intent.primary.name(), "no validated sources, falling back");
            let outcome = fallback::dispatch(&self.completion, query, &intent).await;
            let answer = outcome.text().to_string();
            self.memory
                .record(query, &answer, &[], OffsetDateTime::now_utc())
                .await;
            return PipelineOutput {
                query: query.to_string(),
                intent,
                sources: Vec::new(),
                answer,
                fallback_model: outcome.model().map(str::to_string),
                degraded: matches!(outcome, FallbackOutcome::Degraded),
            };
        }

        let sources = synthesize(&validated);
        let answer = render_text(&validated);
        self.memory
            .record(query, &answer, &validated, OffsetDateTime::now_utc())
            .await;

        info!(
            intent = intent.primary.name(),
            sources = sources.len(),
            "pipeline completed from structured sources"
        );
        PipelineOutput {
            query: query.to_string(),
            intent,
            sources,
            answer,
            fallback_model: None,
            degraded: false,
        }
    }

    /// Canned guidance answer served as a full-confidence source.
    async fn guided(&self, query: &str, intent: IntentResult, text: &str) -> PipelineOutput {
        self.memory
            .record(query, text, &[], OffsetDateTime::now_utc())
            .await;
        PipelineOutput {
            query: query.to_string(),
            intent,
            sources: vec![SourceReport {
                source: GUIDANCE_SOURCE.to_string(),
                data: text.to_string(),
                confidence: 100,
            }],
            answer: text.to_string(),
            fallback_model: None,
            degraded: false,
        }
    }
}
