use serde::{Deserialize, Serialize};

/// Category a data source belongs to, used for the process-wide source index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    /// Cryptocurrency market data (spot prices, volume, liquidity)
    Market,
    /// Fiat currency exchange rates
    CurrencyExchange,
    /// Source-code repository metadata
    Repository,
    /// Curated definitions and research material
    Knowledge,
    /// News and trending discussion
    News,
    /// Current weather conditions
    Weather,
}

impl SourceCategory {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Market => "Market Data",
            Self::CurrencyExchange => "Currency Exchange",
            Self::Repository => "Repository",
            Self::Knowledge => "Knowledge Base",
            Self::News => "News & Discussion",
            Self::Weather => "Weather",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A coin reference normalized from free text.
///
/// `id` is the canonical provider identifier (CoinGecko style), `symbol` the
/// exchange ticker where one exists (Nosana, for example, has none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRef {
    pub id: String,
    pub symbol: Option<String>,
    pub label: String,
}

/// An explicit currency conversion request: `<amount> <from> to <to>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// A repository reference captured literally from a `host/owner/repo` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Normalized inputs handed to every adapter for one query.
///
/// Each adapter reads only the fields it declares prerequisites on; the
/// aggregator never invokes an adapter whose prerequisites are unmet.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Lowercase-normalized query text.
    pub query: String,
    pub coins: Vec<CoinRef>,
    pub currency_pair: Option<CurrencyPair>,
    pub repo: Option<RepoRef>,
    pub location: Option<String>,
}

/// One provider's answer prior to validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    pub payload: String,
    /// 0-100 trust score, statically assigned per adapter unless the
    /// adapter self-penalizes for a lower-quality response.
    pub confidence: u8,
}

impl ProviderResult {
    #[must_use]
    pub fn new(provider: impl Into<String>, payload: impl Into<String>, confidence: u8) -> Self {
        Self {
            provider: provider.into(),
            payload: payload.into(),
            confidence: confidence.min(100),
        }
    }
}

/// Typed decode result per provider call.
///
/// Providers decode responses explicitly into one of these variants instead
/// of truthiness checks, so the validator's rejection rules stay exhaustive.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Hit(ProviderResult),
    /// The provider answered but has no entry for this input.
    Empty,
    /// The provider answered with a body we could not interpret.
    Malformed,
}

impl FetchOutcome {
    #[must_use]
    pub fn hit(self) -> Option<ProviderResult> {
        match self {
            Self::Hit(result) => Some(result),
            Self::Empty | Self::Malformed => None,
        }
    }
}

/// Format a float with thousands separators, keeping at most `max_decimals`
/// fractional digits and trimming trailing zeros.
#[must_use]
pub fn format_amount(value: f64, max_decimals: usize) -> String {
    let formatted = format!("{value:.max_decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (formatted, String::new()),
    };

    let negative = int_part.starts_with('-');
    let digits: Vec<char> = int_part.trim_start_matches('-').chars().collect();
    let mut grouped = String::new();
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}

/// Number of decimal places conventionally shown for a fiat currency.
#[must_use]
pub fn decimals_for(code: &str) -> usize {
    match code.to_ascii_uppercase().as_str() {
        "IDR" | "JPY" | "KRW" | "VND" => 0,
        _ => 2,
    }
}
