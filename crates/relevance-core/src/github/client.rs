//! Minimal GitHub REST client for issue comments.

use serde::{Deserialize, Serialize};

use crate::error::GitHubError;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// The fields of an issue comment that annotation needs.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    /// API URL of the issue the comment belongs to
    pub issue_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl IssueComment {
    /// Whether the comment was posted on issue (or pull request) `number`.
    pub fn belongs_to_issue(&self, number: u64) -> bool {
        self.issue_url
            .trim_end_matches('/')
            .ends_with(&format!("/issues/{number}"))
    }
}

#[derive(Serialize)]
struct UpdateCommentRequest<'a> {
    body: &'a str,
}

/// Authenticated client bound to one API base URL.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relevance/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Request {
                message: format!("Failed to build HTTP client: {e}"),
                status_code: None,
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn comment_url(&self, repository: &str, comment_id: u64) -> String {
        format!(
            "{}/repos/{repository}/issues/comments/{comment_id}",
            self.api_url
        )
    }

    /// `GET /repos/{owner}/{repo}/issues/comments/{id}`
    pub async fn get_comment(
        &self,
        repository: &str,
        comment_id: u64,
    ) -> Result<IssueComment, GitHubError> {
        let resp = self
            .client
            .get(self.comment_url(repository, comment_id))
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| GitHubError::Request {
                message: format!("Fetching comment {comment_id} failed: {e}"),
                status_code: None,
            })?;

        let resp = check_status(resp).await?;
        resp.json().await.map_err(|e| GitHubError::Request {
            message: format!("Failed to parse comment {comment_id}: {e}"),
            status_code: None,
        })
    }

    /// `PATCH /repos/{owner}/{repo}/issues/comments/{id}` with a new body.
    pub async fn update_comment(
        &self,
        repository: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        let resp = self
            .client
            .patch(self.comment_url(repository, comment_id))
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&UpdateCommentRequest { body })
            .send()
            .await
            .map_err(|e| GitHubError::Request {
                message: format!("Updating comment {comment_id} failed: {e}"),
                status_code: None,
            })?;

        let resp = check_status(resp).await?;
        resp.json().await.map_err(|e| GitHubError::Request {
            message: format!("Failed to parse updated comment {comment_id}: {e}"),
            status_code: None,
        })
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(GitHubError::Request {
        message: format!("GitHub HTTP {status}: {text}"),
        status_code: Some(status.as_u16()),
    })
}
