use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{FetchRequest, ProviderResult, SourceCategory};

/// Stable identifier for each registered adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterId {
    CoinGecko,
    Binance,
    DexScreener,
    Frankfurter,
    ExchangeRateHost,
    GitHub,
    Knowledge,
    HackerNews,
    OpenMeteo,
}

impl AdapterId {
    pub const ALL: [Self; 9] = [
        Self::CoinGecko,
        Self::Binance,
        Self::DexScreener,
        Self::Frankfurter,
        Self::ExchangeRateHost,
        Self::GitHub,
        Self::Knowledge,
        Self::HackerNews,
        Self::OpenMeteo,
    ];
}

/// Isolation boundary around one external data source.
///
/// `fetch` never raises: network failures, non-2xx statuses, and malformed
/// bodies are all converted to `None` inside the adapter.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> SourceCategory;
    /// Static trust weight for this source, used unmodified as the
    /// `ProviderResult` confidence unless the adapter self-penalizes.
    fn weight(&self) -> u8;
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult>;
}

/// Static description of one adapter, used to seed the source index.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDescriptor {
    pub id: AdapterId,
    pub name: &'static str,
    pub category: SourceCategory,
    pub weight: u8,
}

/// All adapters available to the aggregator, keyed by id.
///
/// Tests supply registries of mock adapters; production code uses
/// [`AdapterRegistry::defaults`].
#[derive(Default)]
pub struct AdapterRegistry {
    entries: HashMap<AdapterId, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry backed by the real provider clients.
    #[must_use]
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(AdapterId::CoinGecko, Arc::new(crate::coingecko::CoinGeckoClient::new()));
        registry.insert(AdapterId::Binance, Arc::new(crate::binance::BinanceClient::new()));
        registry.insert(
            AdapterId::DexScreener,
            Arc::new(crate::dexscreener::DexScreenerClient::new()),
        );
        registry.insert(
            AdapterId::Frankfurter,
            Arc::new(crate::frankfurter::FrankfurterClient::new()),
        );
        registry.insert(
            AdapterId::ExchangeRateHost,
            Arc::new(crate::exchange_rate_host::ExchangeRateHostClient::new()),
        );
        registry.insert(AdapterId::GitHub, Arc::new(crate::github::GitHubClient::new()));
        registry.insert(AdapterId::Knowledge, Arc::new(crate::knowledge::KnowledgeClient::new()));
        registry.insert(
            AdapterId::HackerNews,
            Arc::new(crate::hackernews::HackerNewsClient::new()),
        );
        registry.insert(
            AdapterId::OpenMeteo,
            Arc::new(crate::open_meteo::OpenMeteoClient::new()),
        );
        registry
    }

    pub fn insert(&mut self, id: AdapterId, adapter: Arc<dyn SourceAdapter>) {
        self.entries.insert(id, adapter);
    }

    #[must_use]
    pub fn get(&self, id: AdapterId) -> Option<Arc<dyn SourceAdapter>> {
        self.entries.get(&id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Static catalog of registered sources for index seeding and reporting.
    #[must_use]
    pub fn catalog(&self) -> Vec<SourceDescriptor> {
        let mut descriptors: Vec<SourceDescriptor> = AdapterId::ALL
            .iter()
            .filter_map(|id| {
                self.entries.get(id).map(|adapter| SourceDescriptor {
                    id: *id,
                    name: adapter.name(),
                    category: adapter.category(),
                    weight: adapter.weight(),
                })
            })
            .collect();
        descriptors.sort_by_key(|d| d.name);
        descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake;

    #[async_trait]
    impl SourceAdapter for Fake {
        fn name(&self) -> &'static str {
            "Fake Source"
        }
        fn category(&self) -> SourceCategory {
            SourceCategory::Knowledge
        }
        fn weight(&self) -> u8 {
            90
        }
        async fn fetch(&self, _request: &FetchRequest) -> Option<ProviderResult> {
            Some(ProviderResult::new(self.name(), "fake payload text", self.weight()))
        }
    }

    #[test]
    fn catalog_reflects_registered_adapters() {
        let mut registry = AdapterRegistry::new();
        registry.insert(AdapterId::Knowledge, Arc::new(Fake));

        let catalog = registry.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "Fake Source");
        assert_eq!(catalog[0].weight, 90);
    }

    #[test]
    fn default_registry_covers_all_adapter_ids() {
        let registry = AdapterRegistry::defaults();
        for id in AdapterId::ALL {
            assert!(registry.get(id).is_some(), "missing adapter {id:?}");
        }
    }
}
