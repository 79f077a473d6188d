//! Provider adapters for the research pipeline.
//!
//! Each module wraps one external data source behind the [`SourceAdapter`]
//! contract: given a normalized [`FetchRequest`], return at most one
//! [`ProviderResult`]. All network and parsing failures are absorbed at the
//! adapter boundary and surface as `None`, never as errors.

pub mod adapter;
pub mod binance;
pub mod coingecko;
pub mod dexscreener;
pub mod exchange_rate_host;
pub mod frankfurter;
pub mod github;
pub mod hackernews;
pub mod knowledge;
pub mod open_meteo;
pub mod types;

pub use adapter::{AdapterId, AdapterRegistry, SourceAdapter, SourceDescriptor};
pub use types::{
    CoinRef, CurrencyPair, FetchOutcome, FetchRequest, ProviderResult, RepoRef, SourceCategory,
};

use std::time::Duration as StdDuration;

use reqwest::Client;

pub(crate) const USER_AGENT: &str = "Scout/1.0";

/// Shared reqwest client construction for all providers.
pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(StdDuration::from_secs(30))
        .gzip(true)
        .build()
        .expect("failed to build reqwest client")
}
