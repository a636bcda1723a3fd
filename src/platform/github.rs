//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{Credentials, PlatformConfig, PullRequestRef, ReleaseInfo, ReleaseRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "make-version";
const DEFAULT_API_BASE: &str = "https://api.github.com";
const ISSUES_PER_PAGE: usize = 100;

// REST payloads, trimmed to the fields we read

#[derive(Deserialize)]
struct IssueStub {
    number: u64,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct PullRequestStub {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    head: HeadStub,
}

#[derive(Deserialize)]
struct HeadStub {
    #[serde(rename = "ref")]
    ref_field: String,
}

#[derive(Serialize)]
struct IssueQuery<'a> {
    state: &'a str,
    labels: &'a str,
    per_page: usize,
    page: u32,
}

#[derive(Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    prerelease: bool,
}

#[derive(Deserialize)]
struct ReleaseStub {
    id: u64,
    #[serde(default)]
    html_url: String,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    credentials: Credentials,
    /// HTTP client for raw requests (branch lookups)
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
    timeout: Duration,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance; its API lives under
    /// `https://<host>/api/v3`.
    pub fn new(
        credentials: &Credentials,
        owner: String,
        repo: String,
        host: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = host
            .as_deref()
            .map_or_else(|| DEFAULT_API_BASE.to_string(), api_base_for_host);

        Self::with_api_base(
            credentials,
            PlatformConfig { owner, repo, host },
            api_base,
            timeout,
        )
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(
        credentials: &Credentials,
        config: PlatformConfig,
        api_base: String,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .basic_auth(credentials.username.clone(), credentials.password.clone())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            credentials: credentials.clone(),
            http_client,
            api_base,
            timeout,
        })
    }

    fn repo_route(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/{suffix}",
            urlencoding::encode(&self.config.owner),
            urlencoding::encode(&self.config.repo)
        )
    }

    /// Bound an API call by the configured timeout
    async fn bounded<T>(&self, what: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                Error::GitHubApi(format!(
                    "{what} timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}

/// API base URL for a GitHub Enterprise host.
///
/// A value that already carries a scheme is used as-is.
pub fn api_base_for_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}/api/v3")
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_issues_by_label(&self, label: &str) -> Result<Vec<u64>> {
        debug!(label, "listing labeled issues");
        let route = self.repo_route("issues");
        let mut numbers = Vec::new();
        let mut page = 1;

        loop {
            let query = IssueQuery {
                state: "open",
                labels: label,
                per_page: ISSUES_PER_PAGE,
                page,
            };
            let issues: Vec<IssueStub> = self
                .bounded("listing issues", async {
                    Ok(self.client.get(&route, Some(&query)).await?)
                })
                .await?;

            let fetched = issues.len();
            for issue in issues {
                if issue.pull_request.is_some() {
                    numbers.push(issue.number);
                } else {
                    debug!(
                        issue = issue.number,
                        "labeled issue has no pull request, ignoring"
                    );
                }
            }

            if fetched < ISSUES_PER_PAGE {
                break;
            }
            page += 1;
        }

        debug!(label, count = numbers.len(), "listed labeled pull requests");
        Ok(numbers)
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequestRef> {
        debug!(number, "getting pull request");
        let route = self.repo_route(&format!("pulls/{number}"));

        let pr: PullRequestStub = self
            .bounded("getting pull request", async {
                Ok(self.client.get(&route, None::<&()>).await?)
            })
            .await?;

        debug!(number, head = %pr.head.ref_field, "got pull request");
        Ok(PullRequestRef {
            number: pr.number,
            head_ref: pr.head.ref_field,
            title: pr.title.unwrap_or_default(),
        })
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        let url = format!(
            "{}{}",
            self.api_base,
            self.repo_route(&format!("branches/{}", urlencoding::encode(branch)))
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await;

        let exists = match response {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => false,
            Ok(resp) => {
                debug!(branch, status = %resp.status(), "branch lookup failed, treating as absent");
                false
            }
            Err(e) => {
                debug!(branch, error = %e, "branch lookup failed, treating as absent");
                false
            }
        };

        debug!(branch, exists, "checked branch");
        Ok(exists)
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseInfo> {
        debug!(tag = %request.tag_name, "creating release");
        let route = self.repo_route("releases");
        let body = CreateReleaseBody {
            tag_name: &request.tag_name,
            target_commitish: &request.target_branch,
            name: &request.name,
            body: &request.body,
            prerelease: request.prerelease,
        };

        let release: ReleaseStub = self
            .bounded("creating release", async {
                Ok(self.client.post(&route, Some(&body)).await?)
            })
            .await?;

        debug!(id = release.id, "created release");
        Ok(ReleaseInfo {
            id: release.id,
            html_url: release.html_url,
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
