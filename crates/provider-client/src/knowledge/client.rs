use async_trait::async_trait;
use tracing::{debug, instrument};

use super::types::{KnowledgeEntry, KnowledgeKind, DEFINITION_ENTRIES, RESEARCH_ENTRIES};
use crate::adapter::SourceAdapter;
use crate::types::{FetchOutcome, FetchRequest, ProviderResult, SourceCategory};

pub const NAME: &str = "Knowledge Base";
const WEIGHT: u8 = 98;

/// Curated offline catalog of definitions and research pointers.
///
/// Unlike the HTTP adapters this one never leaves the process. It only answers
/// for topics the catalog actually covers; everything else is an empty outcome
/// so the pipeline falls through to generative completion instead of serving
/// invented facts.
#[derive(Debug, Default)]
pub struct KnowledgeClient;

impl KnowledgeClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decide whether the query is asking for a definition or for literature.
    fn infer_kind(query: &str) -> KnowledgeKind {
        let lower = query.to_lowercase();
        if lower.contains("research")
            || lower.contains("paper")
            || lower.contains("study")
            || lower.contains("studies")
        {
            KnowledgeKind::Research
        } else {
            KnowledgeKind::Definition
        }
    }

    fn lookup(query: &str, kind: KnowledgeKind) -> Option<&'static KnowledgeEntry> {
        // Punctuation-folded and space-padded so short aliases like "ai"
        // match whole words only ("defi" must not match "definition").
        let folded: String = query
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let padded = format!(" {} ", folded.split_whitespace().collect::<Vec<_>>().join(" "));
        let entries = match kind {
            KnowledgeKind::Definition => DEFINITION_ENTRIES,
            KnowledgeKind::Research => RESEARCH_ENTRIES,
        };

        let matched = entries.iter().find(|entry| {
            entry
                .aliases
                .iter()
                .any(|alias| padded.contains(&format!(" {alias} ")))
        });

        if matched.is_none() && kind == KnowledgeKind::Research {
            // Research queries always get at least the index pointers.
            return RESEARCH_ENTRIES.iter().find(|e| e.aliases.is_empty());
        }
        matched
    }

    fn decode(query: &str) -> FetchOutcome {
        let kind = Self::infer_kind(query);
        match Self::lookup(query, kind) {
            Some(entry) => FetchOutcome::Hit(ProviderResult::new(
                NAME,
                format!("{}. {}", entry.summary, entry.details),
                entry.confidence,
            )),
            None => FetchOutcome::Empty,
        }
    }
}

#[async_trait]
impl SourceAdapter for KnowledgeClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Knowledge
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "knowledge.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let outcome = Self::decode(&request.query);
        if matches!(outcome, FetchOutcome::Empty) {
            debug!(query = %request.query, "no curated knowledge entry");
        }
        outcome.hit()
    }
}
