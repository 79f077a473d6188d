use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::LatestRates;
use crate::adapter::SourceAdapter;
use crate::types::{
    decimals_for, format_amount, CurrencyPair, FetchOutcome, FetchRequest, ProviderResult,
    SourceCategory,
};

const LATEST_URL: &str = "https://api.frankfurter.app/latest";

pub const NAME: &str = "Frankfurter API";
const WEIGHT: u8 = 98;

#[derive(Debug)]
pub struct FrankfurterClient {
    http: Client,
}

impl Default for FrankfurterClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FrankfurterClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Convert `amount` from one currency to another at the latest ECB rate.
    #[instrument(name = "frankfurter.convert", skip(self))]
    pub async fn convert(&self, pair: &CurrencyPair) -> Result<LatestRates> {
        let url = format!(
            "{LATEST_URL}?from={}&to={}&amount={}",
            urlencoding::encode(&pair.from.to_ascii_uppercase()),
            urlencoding::encode(&pair.to.to_ascii_uppercase()),
            pair.amount
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch Frankfurter rates")?;

        if !response.status().is_success() {
            anyhow::bail!("Frankfurter rate fetch failed: {}", response.status());
        }

        response
            .json::<LatestRates>()
            .await
            .context("Failed to decode Frankfurter response")
    }

    fn decode(pair: &CurrencyPair, rates: &LatestRates) -> FetchOutcome {
        let to = pair.to.to_ascii_uppercase();
        let Some(converted) = rates.rates.get(&to).copied() else {
            return FetchOutcome::Empty;
        };
        FetchOutcome::Hit(ProviderResult::new(
            NAME,
            render_conversion(pair, converted),
            WEIGHT,
        ))
    }
}

/// Human-readable conversion line with target-currency decimal conventions.
fn render_conversion(pair: &CurrencyPair, converted: f64) -> String {
    let from = pair.from.to_ascii_uppercase();
    let to = pair.to.to_ascii_uppercase();
    let decimals = decimals_for(&to);
    let rate = if pair.amount > 0.0 {
        converted / pair.amount
    } else {
        converted
    };

    format!(
        "{} {from} = {} {to} (rate {})",
        format_amount(pair.amount, 2),
        format_amount(converted, decimals),
        format_amount(rate, 4)
    )
}

#[async_trait]
impl SourceAdapter for FrankfurterClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::CurrencyExchange
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "frankfurter.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let pair = request.currency_pair.as_ref()?;

        match self.convert(pair).await {
            Ok(rates) => Self::decode(pair, &rates).hit(),
            Err(error) => {
                debug!(from = %pair.from, to = %pair.to, error = %error, "Frankfurter fetch failed");
                None
            }
        }
    }
}
