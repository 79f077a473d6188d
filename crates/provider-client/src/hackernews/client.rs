use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::{SearchResponse, StoryHit};
use crate::adapter::SourceAdapter;
use crate::types::{FetchOutcome, FetchRequest, ProviderResult, SourceCategory};

const API_BASE: &str = "https://hn.algolia.com/api/v1";

pub const NAME: &str = "Hacker News";
const WEIGHT: u8 = 88;

/// Number of front-page stories the sentiment gauge averages over.
const SENTIMENT_WINDOW: usize = 10;

#[derive(Debug)]
pub struct HackerNewsClient {
    http: Client,
}

impl Default for HackerNewsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HackerNewsClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Current front-page stories ranked by the Algolia index, optionally
    /// filtered to a topic.
    #[instrument(name = "hackernews.front_page", skip(self))]
    pub async fn front_page(&self, query: Option<&str>) -> Result<SearchResponse> {
        let url = search_url(query);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch Hacker News front page")?;

        if !response.status().is_success() {
            anyhow::bail!("Hacker News search failed: {}", response.status());
        }

        response
            .json::<SearchResponse>()
            .await
            .context("Failed to decode Hacker News response")
    }

    fn decode(response: &SearchResponse) -> FetchOutcome {
        let stories: Vec<&StoryHit> = response.hits.iter().take(SENTIMENT_WINDOW).collect();
        let lines: Vec<String> = stories.iter().take(3).filter_map(|s| render_story(s)).collect();

        if lines.is_empty() {
            return FetchOutcome::Empty;
        }

        let total: u64 = stories.iter().map(|s| s.points.unwrap_or(0)).sum();
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let average = (total as f64 / stories.len() as f64).round() as u64;

        let payload = format!(
            "{} | Community sentiment: {} (avg {average} points)",
            lines.join(" | "),
            sentiment_label(average)
        );
        FetchOutcome::Hit(ProviderResult::new(NAME, payload, WEIGHT))
    }
}

fn search_url(query: Option<&str>) -> String {
    let mut url = format!("{API_BASE}/search?tags=front_page");
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        url.push_str("&query=");
        url.push_str(&urlencoding::encode(query));
    }
    url
}

/// Interest gauge over the average front-page score.
fn sentiment_label(average_points: u64) -> &'static str {
    if average_points > 200 {
        "Very Positive"
    } else if average_points > 100 {
        "Positive"
    } else if average_points > 50 {
        "Neutral"
    } else {
        "Low Interest"
    }
}

fn render_story(hit: &StoryHit) -> Option<String> {
    let title = hit.title.as_deref()?;
    let points = hit.points.unwrap_or(0);
    Some(format!("Top story: {title} ({points} points)"))
}

#[async_trait]
impl SourceAdapter for HackerNewsClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::News
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "hackernews.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let response = match self.front_page(Some(&request.query)).await {
            Ok(response) => response,
            Err(error) => {
                debug!(error = %error, "Hacker News fetch failed");
                return None;
            }
        };
        Self::decode(&response).hit()
    }
}
