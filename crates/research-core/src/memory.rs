//! Session memory and source index.
//!
//! The store is injected into the pipeline at bootstrap; nothing here is a
//! module-level singleton. Entries live in a bounded FIFO window and are
//! additionally pruned by age.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use provider_client::{ProviderResult, SourceCategory, SourceDescriptor};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// FIFO context window capacity.
pub const MAX_CONTEXT_SIZE: usize = 50;

pub const DEFAULT_RETENTION_DAYS: i64 = 14;
const MIN_RETENTION_DAYS: i64 = 7;
const MAX_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct MemoryEntry {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub query: String,
    pub response: String,
    pub sources: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceIndexEntry {
    pub name: String,
    pub category: SourceCategory,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_accessed: Option<OffsetDateTime>,
    pub access_count: u64,
    pub running_avg_confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub entry_count: usize,
    /// Distinct words longer than 4 characters from recent queries.
    pub recent_topics: Vec<String>,
    pub sources_used: Vec<String>,
    pub average_confidence: f64,
}

pub struct MemoryStore {
    entries: Mutex<VecDeque<MemoryEntry>>,
    index: RwLock<HashMap<String, SourceIndexEntry>>,
    next_id: AtomicU64,
    retention: Duration,
}

impl MemoryStore {
    /// Builds a store seeded with the static source catalog.
    #[must_use]
    pub fn new(catalog: &[SourceDescriptor], retention_days: i64) -> Self {
        let days = retention_days.clamp(MIN_RETENTION_DAYS, MAX_RETENTION_DAYS);
        let index = catalog
            .iter()
            .map(|descriptor| {
                (
                    descriptor.name.to_string(),
                    SourceIndexEntry {
                        name: descriptor.name.to_string(),
                        category: descriptor.category,
                        last_accessed: None,
                        access_count: 0,
                        running_avg_confidence: f64::from(descriptor.weight),
                    },
                )
            })
            .collect();

        Self {
            entries: Mutex::new(VecDeque::with_capacity(MAX_CONTEXT_SIZE)),
            index: RwLock::new(index),
            next_id: AtomicU64::new(1),
            retention: Duration::days(days),
        }
    }

    /// Records one completed pipeline run and refreshes the source index.
    pub async fn record(
        &self,
        query: &str,
        response: &str,
        results: &[ProviderResult],
        now: OffsetDateTime,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let confidence = results.iter().map(|r| u64::from(r.confidence)).max();

        #[allow(clippy::cast_possible_truncation)]
        let entry = MemoryEntry {
            id,
            recorded_at: now,
            query: query.to_string(),
            response: response.to_string(),
            sources: results.iter().map(|r| r.provider.clone()).collect(),
            confidence: confidence.unwrap_or(0) as u8,
        };

        {
            let mut entries = self.entries.lock().await;
            if entries.len() >= MAX_CONTEXT_SIZE {
                entries.pop_front();
            }
            entries.push_back(entry);
        }

        let mut index = self.index.write().await;
        for result in results {
            if let Some(source) = index.get_mut(&result.provider) {
                source.access_count += 1;
                source.last_accessed = Some(now);
                // Running average over all observed confidences.
                #[allow(clippy::cast_precision_loss)]
                let n = source.access_count as f64;
                source.running_avg_confidence = source
                    .running_avg_confidence
                    .mul_add(n - 1.0, f64::from(result.confidence))
                    / n;
            }
        }
        id
    }

    /// Drops entries older than the retention window.
    pub async fn prune(&self, now: OffsetDateTime) -> usize {
        let cutoff = now - self.retention;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| entry.recorded_at > cutoff);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "pruned aged memory entries");
        }
        removed
    }

    pub async fn context_summary(&self) -> ContextSummary {
        let entries = self.entries.lock().await;

        let mut recent_topics = Vec::new();
        let mut sources_used = Vec::new();
        let mut confidence_total = 0u64;

        for entry in entries.iter() {
            for word in entry.query.split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                if word.len() > 4 && !recent_topics.iter().any(|t| t == word) {
                    recent_topics.push(word.to_string());
                }
            }
            for source in &entry.sources {
                if !sources_used.contains(source) {
                    sources_used.push(source.clone());
                }
            }
            confidence_total += u64::from(entry.confidence);
        }

        #[allow(clippy::cast_precision_loss)]
        let average_confidence = if entries.is_empty() {
            0.0
        } else {
            confidence_total as f64 / entries.len() as f64
        };

        ContextSummary {
            entry_count: entries.len(),
            recent_topics,
            sources_used,
            average_confidence,
        }
    }

    /// Sources ranked by access count, most used first.
    pub async fn top_sources(&self, limit: usize) -> Vec<SourceIndexEntry> {
        let index = self.index.read().await;
        let mut sources: Vec<SourceIndexEntry> = index.values().cloned().collect();
        sources.sort_by(|a, b| b.access_count.cmp(&a.access_count).then(a.name.cmp(&b.name)));
        sources.truncate(limit);
        sources
    }

    pub async fn source_count(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn catalog() -> Vec<SourceDescriptor> {
        provider_client::AdapterRegistry::defaults().catalog()
    }

    fn result(provider: &str, confidence: u8) -> ProviderResult {
        ProviderResult::new(provider, "payload long enough", confidence)
    }

    #[tokio::test]
    async fn records_and_windows_entries() {
        let store = MemoryStore::new(&catalog(), DEFAULT_RETENTION_DAYS);
        let now = datetime!(2026-08-25 12:00:00 UTC);

        for i in 0..(MAX_CONTEXT_SIZE + 5) {
            store
                .record(&format!("query number {i}"), "answer", &[], now)
                .await;
        }

        let entries = store.entries().await;
        assert_eq!(entries.len(), MAX_CONTEXT_SIZE);
        // Oldest entries were evicted first.
        assert_eq!(entries[0].query, "query number 5");
    }

    #[tokio::test]
    async fn prune_drops_only_aged_entries() {
        let store = MemoryStore::new(&catalog(), 7);
        let old = datetime!(2026-08-01 12:00:00 UTC);
        let recent = datetime!(2026-08-24 12:00:00 UTC);
        let now = datetime!(2026-08-25 12:00:00 UTC);

        store.record("old query", "answer", &[], old).await;
        store.record("recent query", "answer", &[], recent).await;

        assert_eq!(store.prune(now).await, 1);
        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "recent query");
    }

    #[tokio::test]
    async fn retention_is_clamped_to_the_allowed_range() {
        let store = MemoryStore::new(&catalog(), 365);
        let now = datetime!(2026-08-25 12:00:00 UTC);
        // 31 days old exceeds even the maximum 30-day retention.
        store
            .record("stale", "answer", &[], datetime!(2026-07-25 12:00:00 UTC))
            .await;
        assert_eq!(store.prune(now).await, 1);
    }

    #[tokio::test]
    async fn source_index_tracks_access_and_average() {
        let store = MemoryStore::new(&catalog(), DEFAULT_RETENTION_DAYS);
        let now = datetime!(2026-08-25 12:00:00 UTC);
        let name = provider_client::coingecko::client::NAME;

        store.record("q1", "a", &[result(name, 80)], now).await;
        store.record("q2", "a", &[result(name, 100)], now).await;

        let top = store.top_sources(1).await;
        assert_eq!(top[0].name, name);
        assert_eq!(top[0].access_count, 2);
        let diff = (top[0].running_avg_confidence - 90.0).abs();
        assert!(diff < 1.0, "avg was {}", top[0].running_avg_confidence);
    }

    #[tokio::test]
    async fn context_summary_extracts_long_words() {
        let store = MemoryStore::new(&catalog(), DEFAULT_RETENTION_DAYS);
        let now = datetime!(2026-08-25 12:00:00 UTC);
        store
            .record("what is blockchain technology", "a", &[result("Knowledge Base", 98)], now)
            .await;

        let summary = store.context_summary().await;
        assert_eq!(summary.entry_count, 1);
        assert!(summary.recent_topics.contains(&"blockchain".to_string()));
        assert!(summary.recent_topics.contains(&"technology".to_string()));
        assert!(!summary.recent_topics.contains(&"what".to_string()));
        assert_eq!(summary.sources_used, vec!["Knowledge Base".to_string()]);
    }
}
