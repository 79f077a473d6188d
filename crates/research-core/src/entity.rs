//! Entity extraction from normalized query text.
//!
//! Extraction is a total function over the normalized query: it can return an
//! empty set, but it never fails and never consults the network.

use once_cell::sync::Lazy;
use regex::Regex;

use provider_client::{CoinRef, CurrencyPair, FetchRequest, RepoRef};

/// A typed fragment recognized inside the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Coin(CoinRef),
    Currency(CurrencyPair),
    Repo(RepoRef),
    Location(String),
    Amount(f64),
}

struct CoinSpec {
    id: &'static str,
    aliases: &'static [&'static str],
    symbol: Option<&'static str>,
    label: &'static str,
}

const COIN_DICTIONARY: &[CoinSpec] = &[
    CoinSpec { id: "bitcoin", aliases: &["bitcoin", "btc"], symbol: Some("BTCUSDT"), label: "Bitcoin" },
    CoinSpec { id: "ethereum", aliases: &["ethereum", "eth"], symbol: Some("ETHUSDT"), label: "Ethereum" },
    CoinSpec { id: "solana", aliases: &["solana", "sol"], symbol: Some("SOLUSDT"), label: "Solana" },
    CoinSpec { id: "nosana", aliases: &["nosana", "nos"], symbol: None, label: "Nosana" },
    CoinSpec { id: "dogecoin", aliases: &["dogecoin", "doge"], symbol: Some("DOGEUSDT"), label: "Dogecoin" },
    CoinSpec { id: "ripple", aliases: &["ripple", "xrp"], symbol: Some("XRPUSDT"), label: "XRP" },
    CoinSpec { id: "binancecoin", aliases: &["binancecoin", "binance coin", "bnb"], symbol: Some("BNBUSDT"), label: "BNB" },
    CoinSpec { id: "cardano", aliases: &["cardano", "ada"], symbol: Some("ADAUSDT"), label: "Cardano" },
];

const CURRENCY_CODES: &[&str] = &[
    "usd", "eur", "gbp", "jpy", "idr", "sgd", "myr", "aud", "cad", "chf", "cny", "krw", "inr",
    "thb", "vnd",
];

const WEATHER_VOCAB: &[&str] = &["weather", "temperature", "forecast", "cuaca", "suhu"];

static CURRENCY_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([a-z]{3})\s+(?:to|ke|in)\s+([a-z]{3})\b")
        .expect("currency grammar regex")
});

static REPO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)").expect("repo regex")
});

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number regex"));

/// All entities recognized in the normalized (lowercased) query.
#[must_use]
pub fn extract(normalized: &str) -> Vec<Entity> {
    let mut entities = Vec::new();

    extract_coins(normalized, &mut entities);

    let pair = extract_currency_pair(normalized);
    let pair_found = pair.is_some();
    if let Some(pair) = pair {
        entities.push(Entity::Currency(pair));
    }

    if let Some(repo) = extract_repo(normalized) {
        entities.push(Entity::Repo(repo));
    }

    if let Some(location) = extract_location(normalized) {
        entities.push(Entity::Location(location));
    }

    // Standalone amounts only matter when not already consumed by the pair.
    if !pair_found {
        if let Some(m) = NUMBER_PATTERN.find(normalized) {
            if let Ok(value) = m.as_str().parse::<f64>() {
                entities.push(Entity::Amount(value));
            }
        }
    }

    entities
}

fn extract_coins(normalized: &str, entities: &mut Vec<Entity>) {
    let padded = pad(normalized);
    for spec in COIN_DICTIONARY {
        let mentioned = spec
            .aliases
            .iter()
            .any(|alias| padded.contains(&format!(" {alias} ")));
        if !mentioned {
            continue;
        }
        // Dedup by canonical id, first mention wins.
        let already = entities.iter().any(|e| match e {
            Entity::Coin(coin) => coin.id == spec.id,
            _ => false,
        });
        if already {
            continue;
        }
        entities.push(Entity::Coin(CoinRef {
            id: spec.id.to_string(),
            symbol: spec.symbol.map(str::to_string),
            label: spec.label.to_string(),
        }));
    }
}

fn extract_currency_pair(normalized: &str) -> Option<CurrencyPair> {
    // The explicit grammar wins over the loose heuristic.
    if let Some(captures) = CURRENCY_GRAMMAR.captures(normalized) {
        let from = captures[2].to_uppercase();
        let to = captures[3].to_uppercase();
        if is_currency(&captures[2]) && is_currency(&captures[3]) {
            let amount = captures[1].parse::<f64>().ok()?;
            return Some(CurrencyPair { amount, from, to });
        }
    }

    if !normalized.contains(" to ") && !normalized.contains(" ke ") {
        return None;
    }
    let padded = pad(normalized);
    // Codes in order of appearance, so "eur to usd" keeps its direction.
    let mut found: Vec<(usize, &str)> = CURRENCY_CODES
        .iter()
        .filter_map(|code| {
            padded
                .find(&format!(" {code} "))
                .map(|position| (position, *code))
        })
        .collect();
    found.sort_unstable_by_key(|(position, _)| *position);
    let mut codes = found.into_iter().map(|(_, code)| code.to_uppercase());
    let from = codes.next()?;
    let to = codes.next()?;
    let amount = NUMBER_PATTERN
        .find(normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(1.0);
    Some(CurrencyPair { amount, from, to })
}

fn extract_repo(normalized: &str) -> Option<RepoRef> {
    let captures = REPO_PATTERN.captures(normalized)?;
    Some(RepoRef {
        owner: captures[1].to_string(),
        repo: captures[2].trim_end_matches(".git").to_string(),
    })
}

fn extract_location(normalized: &str) -> Option<String> {
    let weather_query = WEATHER_VOCAB.iter().any(|word| normalized.contains(word));
    if !weather_query {
        return None;
    }
    let tail = normalized
        .split_once(" in ")
        .or_else(|| normalized.split_once(" di "))
        .map(|(_, tail)| tail)?;
    let name = tail
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .trim()
        .to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn is_currency(code: &str) -> bool {
    CURRENCY_CODES.contains(&code)
}

fn pad(text: &str) -> String {
    // Whitespace-folded and padded so " btc " style lookups hit word
    // boundaries without a per-alias regex.
    let folded: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", folded.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Normalized inputs for the provider adapters, built from the extracted set.
#[must_use]
pub fn build_fetch_request(query: &str, entities: &[Entity]) -> FetchRequest {
    let mut request = FetchRequest {
        query: query.to_string(),
        ..FetchRequest::default()
    };
    for entity in entities {
        match entity {
            Entity::Coin(coin) => request.coins.push(coin.clone()),
            Entity::Currency(pair) => request.currency_pair = Some(pair.clone()),
            Entity::Repo(repo) => request.repo = Some(repo.clone()),
            Entity::Location(name) => request.location = Some(name.clone()),
            Entity::Amount(_) => {}
        }
    }
    request
}
