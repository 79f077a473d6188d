//! Shapes validated provider results into response payloads.

use provider_client::ProviderResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub data: String,
    pub confidence: u8,
}

impl From<&ProviderResult> for SourceReport {
    fn from(result: &ProviderResult) -> Self {
        Self {
            source: result.provider.clone(),
            data: result.payload.clone(),
            confidence: result.confidence,
        }
    }
}

/// Source list in arrival order; an empty list is a valid "defer to
/// fallback" signal for the caller.
#[must_use]
pub fn synthesize(validated: &[ProviderResult]) -> Vec<SourceReport> {
    validated.iter().map(SourceReport::from).collect()
}

/// One human-readable answer line per source, highest confidence first.
#[must_use]
pub fn render_text(validated: &[ProviderResult]) -> String {
    let mut ranked: Vec<&ProviderResult> = validated.iter().collect();
    ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    ranked
        .iter()
        .map(|result| format!("{} ({}% confidence): {}", result.provider, result.confidence, result.payload))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_preserve_arrival_order() {
        let results = vec![
            ProviderResult::new("Binance", "ETH $3,520", 98),
            ProviderResult::new("CoinGecko", "ETH $3,521", 99),
        ];
        let reports = synthesize(&results);
        assert_eq!(reports[0].source, "Binance");
        assert_eq!(reports[1].source, "CoinGecko");
    }

    #[test]
    fn rendered_text_ranks_by_confidence() {
        let results = vec![
            ProviderResult::new("Binance", "ETH $3,520", 98),
            ProviderResult::new("CoinGecko", "ETH $3,521", 99),
        ];
        let text = render_text(&results);
        let first = text.lines().next().expect("line");
        assert!(first.starts_with("CoinGecko (99% confidence)"));
    }

    #[test]
    fn empty_set_renders_empty() {
        assert!(synthesize(&[]).is_empty());
        assert!(render_text(&[]).is_empty());
    }

    #[test]
    fn rendered_line_format_is_stable() {
        let results = vec![ProviderResult::new("CoinGecko", "ETH $3,521", 99)];
        insta::assert_snapshot!(render_text(&results), @"CoinGecko (99% confidence): ETH $3,521");
    }
}
