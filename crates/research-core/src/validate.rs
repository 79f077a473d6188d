//! Candidate validation between aggregation and synthesis.

use provider_client::ProviderResult;
use tracing::debug;

use crate::intent::Intent;

const MIN_PAYLOAD_LEN: usize = 10;
const MIN_NEWS_LEN: usize = 20;
const CURRENCY_SYMBOLS: &[char] = &['$', '\u{20ac}', '\u{a3}', '\u{a5}'];

/// Filters the candidate set in arrival order. Rejections are silent drops;
/// survivors keep their original confidence.
#[must_use]
pub fn validate(intent: Intent, candidates: Vec<ProviderResult>) -> Vec<ProviderResult> {
    candidates
        .into_iter()
        .filter(|candidate| match check(intent, candidate) {
            Ok(()) => true,
            Err(reason) => {
                debug!(provider = %candidate.provider, reason, "candidate rejected");
                false
            }
        })
        .collect()
}

fn check(intent: Intent, candidate: &ProviderResult) -> Result<(), &'static str> {
    let payload = candidate.payload.trim();

    if payload.len() < MIN_PAYLOAD_LEN {
        return Err("payload too short");
    }
    if payload.contains("undefined") || payload.contains("null") {
        return Err("payload carries serialization artifacts");
    }
    if intent == Intent::Price
        && !payload.chars().any(|c| c.is_ascii_digit() || CURRENCY_SYMBOLS.contains(&c))
        && !payload.contains("Rp")
    {
        return Err("price payload carries no numeric data");
    }
    if intent == Intent::News && payload.len() < MIN_NEWS_LEN {
        return Err("news payload too thin");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(payload: &str) -> ProviderResult {
        ProviderResult::new("Test Source", payload, 90)
    }

    #[test]
    fn short_payloads_are_rejected() {
        let survivors = validate(Intent::General, vec![candidate("tiny"), candidate("long enough payload")]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].payload, "long enough payload");
    }

    #[test]
    fn serialization_artifacts_are_rejected() {
        let survivors = validate(
            Intent::General,
            vec![
                candidate("price is undefined today"),
                candidate("value was null earlier"),
            ],
        );
        assert!(survivors.is_empty());
    }

    #[test]
    fn price_payload_needs_a_number_or_symbol() {
        let survivors = validate(
            Intent::Price,
            vec![
                candidate("the market is very active"),
                candidate("Bitcoin: $67,250 right now"),
            ],
        );
        assert_eq!(survivors.len(), 1);
        assert!(survivors[0].payload.contains('$'));
    }

    #[test]
    fn news_payload_needs_twenty_chars() {
        let survivors = validate(
            Intent::News,
            vec![candidate("short update"), candidate("Top story: Rust 2.0 ships (900 points)")],
        );
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn survivors_keep_arrival_order_and_confidence() {
        let survivors = validate(
            Intent::General,
            vec![
                ProviderResult::new("B Source", "second payload here", 70),
                ProviderResult::new("A Source", "first payload here!", 95),
            ],
        );
        assert_eq!(survivors[0].provider, "B Source");
        assert_eq!(survivors[0].confidence, 70);
        assert_eq!(survivors[1].provider, "A Source");
    }
}
