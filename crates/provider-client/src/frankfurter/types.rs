use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of `latest?from=..&to=..&amount=..`.
///
/// When `amount` is supplied, `rates` already contains converted amounts
/// rather than unit rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestRates {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}
