use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::SpotRates;
use crate::adapter::SourceAdapter;
use crate::types::{
    decimals_for, format_amount, CurrencyPair, FetchOutcome, FetchRequest, ProviderResult,
    SourceCategory,
};

const LATEST_URL: &str = "https://api.exchangerate.host/latest";

pub const NAME: &str = "ExchangeRate.host";
const WEIGHT: u8 = 96;

/// Secondary FX source, cross-checking the Frankfurter conversion.
#[derive(Debug)]
pub struct ExchangeRateHostClient {
    http: Client,
}

impl Default for ExchangeRateHostClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRateHostClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Latest spot rate for a single base/symbol pair.
    #[instrument(name = "exchange_rate_host.spot", skip(self))]
    pub async fn spot(&self, base: &str, symbol: &str) -> Result<SpotRates> {
        let url = format!(
            "{LATEST_URL}?base={}&symbols={}",
            urlencoding::encode(&base.to_ascii_uppercase()),
            urlencoding::encode(&symbol.to_ascii_uppercase())
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch ExchangeRate.host rates")?;

        if !response.status().is_success() {
            anyhow::bail!("ExchangeRate.host fetch failed: {}", response.status());
        }

        response
            .json::<SpotRates>()
            .await
            .context("Failed to decode ExchangeRate.host response")
    }

    fn decode(pair: &CurrencyPair, rates: &SpotRates) -> FetchOutcome {
        let to = pair.to.to_ascii_uppercase();
        let Some(rate) = rates.rates.get(&to).copied() else {
            return FetchOutcome::Empty;
        };
        FetchOutcome::Hit(ProviderResult::new(NAME, render_spot(pair, rate), WEIGHT))
    }
}

fn render_spot(pair: &CurrencyPair, rate: f64) -> String {
    let from = pair.from.to_ascii_uppercase();
    let to = pair.to.to_ascii_uppercase();
    let decimals = decimals_for(&to);

    format!(
        "Spot {from}/{to}: {}; {} {from} = {} {to}",
        format_amount(rate, 4),
        format_amount(pair.amount, 2),
        format_amount(pair.amount * rate, decimals)
    )
}

#[async_trait]
impl SourceAdapter for ExchangeRateHostClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::CurrencyExchange
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "exchange_rate_host.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let pair = request.currency_pair.as_ref()?;

        match self.spot(&pair.from, &pair.to).await {
            Ok(rates) => Self::decode(pair, &rates).hit(),
            Err(error) => {
                debug!(from = %pair.from, to = %pair.to, error = %error, "ExchangeRate.host fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn spot_line_includes_converted_amount() {
        let pair = CurrencyPair {
            amount: 100.0,
            from: "usd".to_string(),
            to: "idr".to_string(),
        };
        let line = render_spot(&pair, 15_320.0);
        assert_eq!(line, "Spot USD/IDR: 15,320; 100 USD = 1,532,000 IDR");
    }

    #[test]
    fn missing_symbol_is_empty() {
        let pair = CurrencyPair {
            amount: 1.0,
            from: "USD".to_string(),
            to: "IDR".to_string(),
        };
        let rates = SpotRates {
            base: Some("USD".to_string()),
            rates: HashMap::new(),
        };
        assert!(ExchangeRateHostClient::decode(&pair, &rates).hit().is_none());
    }
}
