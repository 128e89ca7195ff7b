//! GitHub Issues API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;

use crate::config::credentials::IssueCredentials;
use crate::config::IssueConfig;
use crate::notify::{AdapterError, IssueRef, IssueTracker};

const PROVIDER: &str = "github";
const PAGE_SIZE: usize = 100;
/// Open issues scanned when looking for a title match.
const MAX_PAGES: u32 = 10;

#[derive(Debug, Deserialize)]
struct Issue {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Comment {
    body: String,
}

/// Files and closes downtime issues in one repository.
pub struct GitHubIssues {
    client: reqwest::Client,
    api_base: String,
    repository: String,
}

impl GitHubIssues {
    pub fn new(config: &IssueConfig, credentials: IssueCredentials) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
        if let Ok(mut auth) = HeaderValue::from_str(&format!("Bearer {}", credentials.token)) {
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        } else {
            tracing::warn!("GitHub token contains invalid header characters; requests will be unauthenticated");
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(concat!("uptime-monitor/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            repository: credentials.repository,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.api_base, self.repository, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AdapterError::Api {
            provider: PROVIDER,
            status: status.as_u16(),
            body,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, AdapterError> {
        response.json().await.map_err(|e| AdapterError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })
    }

    /// Whether the newest page of comments on `issue` already holds `body`.
    ///
    /// A resolve that commented but failed to close is retried; the comment
    /// must not be posted twice.
    async fn has_comment(&self, issue: &Issue, body: &str) -> Result<bool, AdapterError> {
        if issue.comments == 0 {
            return Ok(false);
        }
        let last_page = issue.comments.div_ceil(PAGE_SIZE as u64);
        let response = self
            .client
            .get(self.repo_url(&format!("/issues/{}/comments", issue.number)))
            .query(&[("per_page", PAGE_SIZE.to_string()), ("page", last_page.to_string())])
            .send()
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;
        let comments: Vec<Comment> = Self::parse(Self::check(response).await?).await?;
        Ok(comments.iter().any(|c| c.body == body))
    }

    /// First open issue (not pull request) whose title matches exactly.
    async fn find_open(&self, title: &str) -> Result<Option<Issue>, AdapterError> {
        for page in 1..=MAX_PAGES {
            let response = self
                .client
                .get(self.repo_url("/issues"))
                .query(&[
                    ("state", "open".to_string()),
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await
                .map_err(|e| AdapterError::transport(PROVIDER, e))?;
            let issues: Vec<Issue> = Self::parse(Self::check(response).await?).await?;
            let exhausted = issues.len() < PAGE_SIZE;

            if let Some(found) = issues
                .into_iter()
                .find(|i| i.pull_request.is_none() && i.title == title)
            {
                return Ok(Some(found));
            }
            if exhausted {
                break;
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl IssueTracker for GitHubIssues {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn open(&self, title: &str, body: &str, labels: &[String]) -> Result<IssueRef, AdapterError> {
        if let Some(existing) = self.find_open(title).await? {
            tracing::info!(number = existing.number, "Downtime issue already open");
            return Ok(IssueRef {
                number: existing.number,
                url: existing.html_url,
                created: false,
            });
        }

        let response = self
            .client
            .post(self.repo_url("/issues"))
            .json(&json!({ "title": title, "body": body, "labels": labels }))
            .send()
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;
        let issue: Issue = Self::parse(Self::check(response).await?).await?;

        tracing::info!(number = issue.number, url = %issue.html_url, "Opened downtime issue");
        Ok(IssueRef {
            number: issue.number,
            url: issue.html_url,
            created: true,
        })
    }

    async fn resolve(&self, title: &str, comment: &str) -> Result<Option<IssueRef>, AdapterError> {
        let Some(issue) = self.find_open(title).await? else {
            tracing::info!(title = %title, "No open downtime issue to close");
            return Ok(None);
        };

        if self.has_comment(&issue, comment).await? {
            tracing::debug!(number = issue.number, "Resolution comment already posted");
        } else {
            let response = self
                .client
                .post(self.repo_url(&format!("/issues/{}/comments", issue.number)))
                .json(&json!({ "body": comment }))
                .send()
                .await
                .map_err(|e| AdapterError::transport(PROVIDER, e))?;
            Self::check(response).await?;
        }

        let response = self
            .client
            .patch(self.repo_url(&format!("/issues/{}", issue.number)))
            .json(&json!({ "state": "closed" }))
            .send()
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;
        Self::check(response).await?;

        tracing::info!(number = issue.number, "Closed downtime issue");
        Ok(Some(IssueRef {
            number: issue.number,
            url: issue.html_url,
            created: false,
        }))
    }
}
