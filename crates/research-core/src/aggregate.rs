//! Adapter selection and concurrent fan-out.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use provider_client::{AdapterId, AdapterRegistry, FetchRequest, ProviderResult};
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::intent::Intent;

pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(4);

/// Which adapters to consult for this intent and entity set.
///
/// The mapping is static; entity prerequisites gate each row. Repository and
/// location references are cross-cutting: they pull in GitHub and OpenMeteo
/// regardless of intent, since extraction already required the right
/// vocabulary to produce them.
#[must_use]
pub fn plan(intent: Intent, request: &FetchRequest) -> Vec<AdapterId> {
    let mut ids = Vec::new();

    if intent == Intent::Price && !request.coins.is_empty() {
        ids.push(AdapterId::CoinGecko);
        if request.coins.iter().any(|coin| coin.symbol.is_some()) {
            ids.push(AdapterId::Binance);
        }
        if request.coins.iter().any(|coin| coin.symbol.is_none()) {
            ids.push(AdapterId::DexScreener);
        }
        ids.push(AdapterId::HackerNews);
    }

    if request.currency_pair.is_some() {
        ids.push(AdapterId::Frankfurter);
        ids.push(AdapterId::ExchangeRateHost);
    }

    match intent {
        Intent::Definition | Intent::Research => ids.push(AdapterId::Knowledge),
        Intent::News => ids.push(AdapterId::HackerNews),
        _ => {}
    }

    if request.location.is_some() {
        ids.push(AdapterId::OpenMeteo);
    }

    if request.repo.is_some() {
        ids.push(AdapterId::GitHub);
    }

    ids.dedup();
    ids
}

/// Runs the planned adapters concurrently and collects results in completion
/// order. A slow or failing adapter never blocks the others; anything that
/// exceeds the per-adapter deadline is dropped.
#[instrument(name = "aggregate", skip(registry, request), fields(adapters = ids.len()))]
pub async fn aggregate(
    registry: &AdapterRegistry,
    ids: &[AdapterId],
    request: &FetchRequest,
    per_adapter: Duration,
) -> Vec<ProviderResult> {
    let mut futures = FuturesUnordered::new();
    for id in ids {
        let Some(adapter) = registry.get(*id) else {
            debug!(?id, "adapter not registered");
            continue;
        };
        let id = *id;
        futures.push(async move {
            match timeout(per_adapter, adapter.fetch(request)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(?id, "adapter timed out");
                    None
                }
            }
        });
    }

    let mut results = Vec::new();
    while let Some(result) = futures.next().await {
        if let Some(result) = result {
            results.push(result);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use provider_client::{CoinRef, RepoRef, SourceAdapter, SourceCategory};
    use std::sync::Arc;

    fn price_request(symbol: Option<&str>) -> FetchRequest {
        FetchRequest {
            query: "btc price".to_string(),
            coins: vec![CoinRef {
                id: "bitcoin".to_string(),
                symbol: symbol.map(str::to_string),
                label: "Bitcoin".to_string(),
            }],
            ..FetchRequest::default()
        }
    }

    #[test]
    fn price_plan_targets_market_adapters() {
        let ids = plan(Intent::Price, &price_request(Some("BTCUSDT")));
        assert_eq!(
            ids,
            vec![AdapterId::CoinGecko, AdapterId::Binance, AdapterId::HackerNews]
        );
    }

    #[test]
    fn symbolless_coin_adds_dexscreener() {
        let ids = plan(Intent::Price, &price_request(None));
        assert!(ids.contains(&AdapterId::DexScreener));
        assert!(!ids.contains(&AdapterId::Binance));
    }

    #[test]
    fn repo_reference_is_cross_cutting() {
        let request = FetchRequest {
            query: "what is github.com/acme/widget".to_string(),
            repo: Some(RepoRef {
                owner: "acme".to_string(),
                repo: "widget".to_string(),
            }),
            ..FetchRequest::default()
        };
        let ids = plan(Intent::Definition, &request);
        assert!(ids.contains(&AdapterId::Knowledge));
        assert!(ids.contains(&AdapterId::GitHub));
    }

    #[test]
    fn weather_without_location_plans_nothing() {
        let request = FetchRequest {
            query: "weather".to_string(),
            ..FetchRequest::default()
        };
        assert!(plan(Intent::Weather, &request).is_empty());
    }

    #[test]
    fn location_is_cross_cutting() {
        // "what is the weather in tokyo" classifies as Definition under the
        // priority policy; the location still has to reach OpenMeteo.
        let request = FetchRequest {
            query: "what is the weather in tokyo".to_string(),
            location: Some("tokyo".to_string()),
            ..FetchRequest::default()
        };
        let ids = plan(Intent::Definition, &request);
        assert!(ids.contains(&AdapterId::OpenMeteo));
        assert!(ids.contains(&AdapterId::Knowledge));
    }

    struct Canned(&'static str, u8);

    #[async_trait]
    impl SourceAdapter for Canned {
        fn name(&self) -> &'static str {
            self.0
        }
        fn category(&self) -> SourceCategory {
            SourceCategory::Knowledge
        }
        fn weight(&self) -> u8 {
            self.1
        }
        async fn fetch(&self, _request: &FetchRequest) -> Option<ProviderResult> {
            Some(ProviderResult::new(self.0, "canned payload text", self.1))
        }
    }

    struct Stalled;

    #[async_trait]
    impl SourceAdapter for Stalled {
        fn name(&self) -> &'static str {
            "Stalled"
        }
        fn category(&self) -> SourceCategory {
            SourceCategory::News
        }
        fn weight(&self) -> u8 {
            50
        }
        async fn fetch(&self, _request: &FetchRequest) -> Option<ProviderResult> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            None
        }
    }

    #[tokio::test]
    async fn slow_adapter_is_dropped_without_blocking_others() {
        let mut registry = AdapterRegistry::new();
        registry.insert(AdapterId::Knowledge, Arc::new(Canned("Fast", 90)));
        registry.insert(AdapterId::HackerNews, Arc::new(Stalled));

        let request = FetchRequest::default();
        let results = aggregate(
            &registry,
            &[AdapterId::Knowledge, AdapterId::HackerNews],
            &request,
            Duration::from_millis(50),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider, "Fast");
    }

    #[tokio::test]
    async fn repeated_runs_yield_the_same_result_set() {
        let mut registry = AdapterRegistry::new();
        registry.insert(AdapterId::Knowledge, Arc::new(Canned("Knowledge", 90)));
        registry.insert(AdapterId::HackerNews, Arc::new(Canned("Hacker News", 88)));
        registry.insert(AdapterId::GitHub, Arc::new(Canned("GitHub", 100)));

        let ids = [AdapterId::Knowledge, AdapterId::HackerNews, AdapterId::GitHub];
        let request = FetchRequest {
            query: "what is github.com/acme/widget".to_string(),
            ..FetchRequest::default()
        };

        // Completion order may differ between runs; the result set must not.
        let mut first = aggregate(&registry, &ids, &request, DEFAULT_ADAPTER_TIMEOUT).await;
        let mut second = aggregate(&registry, &ids, &request, DEFAULT_ADAPTER_TIMEOUT).await;
        first.sort_by(|a, b| a.provider.cmp(&b.provider));
        second.sort_by(|a, b| a.provider.cmp(&b.provider));

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unregistered_adapters_are_skipped() {
        let registry = AdapterRegistry::new();
        let results = aggregate(
            &registry,
            &[AdapterId::Knowledge],
            &FetchRequest::default(),
            Duration::from_millis(50),
        )
        .await;
        assert!(results.is_empty());
    }
}
