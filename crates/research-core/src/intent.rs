//! Intent classification over the normalized query.
//!
//! Hard override patterns run first and short-circuit at full confidence.
//! Everything else is keyword-scored, but the winner is chosen by a fixed
//! pattern priority; the score table only feeds the confidence number and
//! matched-keyword telemetry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    Definition,
    Research,
    News,
    Price,
    Weather,
    Technical,
    Identity,
    General,
}

impl Intent {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Research => "research",
            Self::News => "news",
            Self::Price => "price",
            Self::Weather => "weather",
            Self::Technical => "technical",
            Self::Identity => "identity",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntentResult {
    pub primary: Intent,
    /// 0 to 100.
    pub confidence: u8,
    pub matched_keywords: Vec<String>,
    pub rationale: String,
}

const IDENTITY_PATTERNS: &[&str] = &[
    "who are you",
    "what are you",
    "siapa kamu",
    "introduce yourself",
    "tell me about yourself",
];

const REPO_PURPOSE_PATTERNS: &[&str] = &[
    "what does this repo",
    "what does the repo",
    "what is this repo",
    "purpose of this repo",
    "purpose of the repo",
    "apa fungsi repo",
];

struct Category {
    intent: Intent,
    keywords: &'static [&'static str],
}

// Listed in pattern priority order; the first non-zero score wins.
const CATEGORIES: &[Category] = &[
    Category {
        intent: Intent::Definition,
        keywords: &["what is", "apa itu", "define", "definition", "explain", "meaning", "jelaskan"],
    },
    Category {
        intent: Intent::Research,
        keywords: &["research", "paper", "papers", "study", "studies", "analysis", "riset"],
    },
    Category {
        intent: Intent::News,
        keywords: &["news", "latest", "update", "updates", "trending", "berita", "headline"],
    },
    Category {
        intent: Intent::Price,
        keywords: &["price", "cost", "worth", "value", "harga", "convert", "exchange", "rate", "kurs"],
    },
    Category {
        intent: Intent::Weather,
        keywords: &["weather", "temperature", "forecast", "cuaca", "suhu"],
    },
    Category {
        intent: Intent::Technical,
        keywords: &["how to", "implement", "code", "api", "error", "bug", "install", "deploy"],
    },
];

/// True when the query asks what a repository is for.
#[must_use]
pub fn is_repo_purpose(normalized: &str) -> bool {
    REPO_PURPOSE_PATTERNS
        .iter()
        .any(|pattern| normalized.contains(pattern))
}

#[must_use]
pub fn classify(normalized: &str) -> IntentResult {
    for pattern in IDENTITY_PATTERNS {
        if normalized.contains(pattern) {
            return IntentResult {
                primary: Intent::Identity,
                confidence: 100,
                matched_keywords: vec![(*pattern).to_string()],
                rationale: "identity pattern override".to_string(),
            };
        }
    }

    if is_repo_purpose(normalized) && normalized.contains("github.com/") {
        return IntentResult {
            primary: Intent::Technical,
            confidence: 100,
            matched_keywords: vec!["repository purpose".to_string()],
            rationale: "repository purpose with explicit URL".to_string(),
        };
    }

    let scores: Vec<(Intent, u32, Vec<String>)> = CATEGORIES
        .iter()
        .map(|category| {
            let mut score = 0;
            let mut matched = Vec::new();
            for keyword in category.keywords {
                if normalized.contains(keyword) {
                    score += if keyword.len() > 5 { 2 } else { 1 };
                    matched.push((*keyword).to_string());
                }
            }
            (category.intent, score, matched)
        })
        .collect();

    let total: u32 = scores.iter().map(|(_, score, _)| score).sum();
    if total == 0 {
        return IntentResult {
            primary: Intent::General,
            confidence: 0,
            matched_keywords: Vec::new(),
            rationale: "no intent keywords matched".to_string(),
        };
    }

    // Priority decides the winner; its share of the total is the confidence.
    let (intent, score, matched) = scores
        .into_iter()
        .find(|(_, score, _)| *score > 0)
        .unwrap_or((Intent::General, 0, Vec::new()));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = ((f64::from(score) / f64::from(total)) * 100.0).round() as u8;

    IntentResult {
        primary: intent,
        confidence: confidence.min(100),
        matched_keywords: matched.clone(),
        rationale: format!("matched {} {} keyword(s)", matched.len(), intent.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pattern_overrides_everything() {
        let result = classify("who are you and what is the price of btc");
        assert_eq!(result.primary, Intent::Identity);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn repo_purpose_with_url_is_technical() {
        let result = classify("what does this repo github.com/acme/widget do");
        assert_eq!(result.primary, Intent::Technical);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn repo_purpose_without_url_is_flagged_but_not_overridden() {
        let normalized = "what is this repo for";
        assert!(is_repo_purpose(normalized));
        // Without a URL the override does not fire; normal scoring applies.
        assert_ne!(classify(normalized).primary, Intent::Technical);
    }

    #[test]
    fn definition_beats_price_on_priority() {
        // Both categories score, but definition has higher priority.
        let result = classify("what is the price of bitcoin");
        assert_eq!(result.primary, Intent::Definition);
        assert!(result.matched_keywords.contains(&"what is".to_string()));
        assert!(result.confidence < 100);
    }

    #[test]
    fn price_keywords_classify_price() {
        let result = classify("btc price today");
        assert_eq!(result.primary, Intent::Price);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn weather_query_classifies_weather() {
        let result = classify("weather in tokyo");
        assert_eq!(result.primary, Intent::Weather);
    }

    #[test]
    fn long_keywords_score_double() {
        // "definition" (2) vs "news" (1): confidence is 2/3.
        let result = classify("definition news");
        assert_eq!(result.primary, Intent::Definition);
        assert_eq!(result.confidence, 67);
    }

    #[test]
    fn no_keywords_means_general_at_zero() {
        let result = classify("hello there friend");
        assert_eq!(result.primary, Intent::General);
        assert_eq!(result.confidence, 0);
        assert!(result.matched_keywords.is_empty());
    }
}
