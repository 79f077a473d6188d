use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of `latest?base=..&symbols=..` — unit rates only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotRates {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}
