use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::types::{CommitEntry, RepoInfo};
use crate::adapter::SourceAdapter;
use crate::types::{FetchOutcome, FetchRequest, ProviderResult, RepoRef, SourceCategory};

const API_BASE: &str = "https://api.github.com/repos";

pub const NAME: &str = "GitHub Repository";
const WEIGHT: u8 = 100;

#[derive(Debug)]
pub struct GitHubClient {
    http: Client,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Repository metadata, or `None` when the repo is missing or private.
    #[instrument(name = "github.repo", skip(self))]
    pub async fn repo(&self, reference: &RepoRef) -> Result<Option<RepoInfo>> {
        let url = format!("{API_BASE}/{}/{}", reference.owner, reference.repo);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .context("Failed to fetch GitHub repository")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("GitHub repository fetch failed: {}", response.status());
        }

        let info = response
            .json::<RepoInfo>()
            .await
            .context("Failed to decode GitHub repository response")?;
        Ok(Some(info))
    }

    /// Most recent commit, tolerating an empty history.
    #[instrument(name = "github.latest_commit", skip(self))]
    pub async fn latest_commit(&self, reference: &RepoRef) -> Result<Option<CommitEntry>> {
        let url = format!(
            "{API_BASE}/{}/{}/commits?per_page=1",
            reference.owner, reference.repo
        );
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .context("Failed to fetch GitHub commits")?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let mut commits = response
            .json::<Vec<CommitEntry>>()
            .await
            .context("Failed to decode GitHub commits response")?;
        Ok(if commits.is_empty() {
            None
        } else {
            Some(commits.remove(0))
        })
    }

    fn decode(
        reference: &RepoRef,
        info: Option<&RepoInfo>,
        commit: Option<&CommitEntry>,
        now: OffsetDateTime,
    ) -> FetchOutcome {
        let Some(info) = info else {
            // A definite "not found" is still a usable answer for the caller.
            return FetchOutcome::Hit(ProviderResult::new(
                NAME,
                format!("Repository {reference} not found or is private"),
                WEIGHT,
            ));
        };

        let Some(full_name) = info.full_name.as_deref() else {
            return FetchOutcome::Malformed;
        };

        let mut parts = vec![format!(
            "{full_name}: {} | {} stars, {} forks, {} open issues",
            info.description.as_deref().unwrap_or("No description"),
            info.stargazers_count,
            info.forks_count,
            info.open_issues_count
        )];

        if let Some(language) = info.language.as_deref() {
            let license = info
                .license
                .as_ref()
                .and_then(|l| l.name.as_deref())
                .unwrap_or("No license");
            parts.push(format!(
                "Primary language: {language} | Size: {:.1}MB | License: {license}",
                info.size as f64 / 1024.0
            ));
        }

        if let Some(line) = commit.and_then(|c| render_commit(c, now)) {
            parts.push(line);
        }

        FetchOutcome::Hit(ProviderResult::new(NAME, parts.join(" | "), WEIGHT))
    }
}

/// "Last commit: N days ago" line from the newest commit entry.
fn render_commit(entry: &CommitEntry, now: OffsetDateTime) -> Option<String> {
    let detail = entry.commit.as_ref()?;
    let author = detail.author.as_ref()?;
    let date = OffsetDateTime::parse(author.date.as_deref()?, &Rfc3339).ok()?;

    let days = (now - date).whole_days().max(0);
    let subject = detail
        .message
        .as_deref()
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    let name = author.name.as_deref().unwrap_or("unknown");

    Some(format!("Last commit: {days} days ago - \"{subject}\" by {name}"))
}

#[async_trait]
impl SourceAdapter for GitHubClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Repository
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "github.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let reference = request.repo.as_ref()?;

        let info = match self.repo(reference).await {
            Ok(info) => info,
            Err(error) => {
                debug!(repo = %reference, error = %error, "GitHub repo fetch failed");
                return None;
            }
        };

        // Commit lookup is best-effort; its failure must not drop the result.
        let commit = match self.latest_commit(reference).await {
            Ok(commit) => commit,
            Err(error) => {
                debug!(repo = %reference, error = %error, "GitHub commit fetch failed");
                None
            }
        };

        Self::decode(
            reference,
            info.as_ref(),
            commit.as_ref(),
            OffsetDateTime::now_utc(),
        )
        .hit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{CommitAuthor, CommitDetail, RepoLicense};
    use time::macros::datetime;

    fn widget_ref() -> RepoRef {
        RepoRef {
            owner: "acme".to_string(),
            repo: "widget".to_string(),
        }
    }

    fn widget_info() -> RepoInfo {
        RepoInfo {
            full_name: Some("acme/widget".to_string()),
            description: Some("A widget factory".to_string()),
            stargazers_count: 420,
            forks_count: 17,
            open_issues_count: 3,
            language: Some("Rust".to_string()),
            size: 2048,
            license: Some(RepoLicense {
                name: Some("MIT License".to_string()),
            }),
            topics: vec![],
            html_url: None,
        }
    }

    #[test]
    fn decodes_repo_with_commit_age() {
        let commit = CommitEntry {
            sha: Some("abc1234".to_string()),
            commit: Some(CommitDetail {
                message: Some("Fix parser\n\nlonger body".to_string()),
                author: Some(CommitAuthor {
                    name: Some("Dev".to_string()),
                    date: Some("2026-08-20T10:00:00Z".to_string()),
                }),
            }),
        };
        let now = datetime!(2026-08-25 10:00:00 UTC);
        let outcome =
            GitHubClient::decode(&widget_ref(), Some(&widget_info()), Some(&commit), now);
        let result = outcome.hit().expect("hit");
        assert!(result.payload.contains("acme/widget: A widget factory"));
        assert!(result.payload.contains("420 stars"));
        assert!(result.payload.contains("Primary language: Rust"));
        assert!(result.payload.contains("Last commit: 5 days ago - \"Fix parser\" by Dev"));
    }

    #[test]
    fn missing_repo_yields_explicit_not_found() {
        let now = datetime!(2026-08-25 10:00:00 UTC);
        let outcome = GitHubClient::decode(&widget_ref(), None, None, now);
        let result = outcome.hit().expect("hit");
        assert_eq!(result.payload, "Repository acme/widget not found or is private");
    }

    #[test]
    fn repo_without_full_name_is_malformed() {
        let info = RepoInfo {
            full_name: None,
            ..widget_info()
        };
        let now = datetime!(2026-08-25 10:00:00 UTC);
        assert!(matches!(
            GitHubClient::decode(&widget_ref(), Some(&info), None, now),
            FetchOutcome::Malformed
        ));
    }
}
