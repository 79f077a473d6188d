use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<StoryHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
}
