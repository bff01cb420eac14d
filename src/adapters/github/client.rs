//! GitHub HTTP client with rate limiting.
//!
//! Wraps the read-only parts of the GitHub REST API v3 the gate needs:
//! combined commit status and check-runs for a ref. One client (and its
//! connection pool) is shared by every source for the whole run. A
//! [`RequestBudget`] tracks the authenticated API quota and is kept in sync
//! with the `x-ratelimit-*` headers GitHub returns, so a long poll waits for
//! the quota to reset instead of running into 403s.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;
use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{CommitRef, SourceKind};

use super::models::{GitHubCheckRun, GitHubCheckRunList, GitHubCombinedStatus, GitHubStatus, Paginated};

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Largest page size GitHub accepts.
const PER_PAGE: u32 = 100;

/// Refuse to follow more pages than this; the fetch fails instead.
const MAX_PAGES: u32 = 50;

/// Upper bound for a single HTTP request, connect through body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hourly request allowance for an authenticated token.
const HOURLY_QUOTA: u32 = 5_000;

const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Client-side view of the API request quota.
///
/// Starts from the documented hourly allowance and is corrected from the
/// response headers via [`observe`](RequestBudget::observe). Once nothing is
/// left, [`acquire`](RequestBudget::acquire) sleeps until the reset.
#[derive(Debug)]
pub struct RequestBudget {
    limit: u32,
    remaining: u32,
    period: Duration,
    resets_at: Instant,
}

impl RequestBudget {
    /// A full budget of `limit` requests per `period`.
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            period,
            resets_at: Instant::now() + period,
        }
    }

    /// Spend one request, waiting for the reset if the quota is used up.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        if now >= self.resets_at {
            self.remaining = self.limit;
            self.resets_at = now + self.period;
        }

        if self.remaining == 0 {
            let wait = self.resets_at.saturating_duration_since(now);
            tracing::warn!(
                wait_ms = wait.as_millis() as u64,
                "GitHub request quota exhausted, waiting for reset"
            );
            tokio::time::sleep(wait).await;
            self.remaining = self.limit;
            self.resets_at = Instant::now() + self.period;
        }

        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Adopt the quota GitHub reported on the latest response.
    pub fn observe(&mut self, remaining: u32, reset_in: Duration) {
        self.remaining = remaining;
        self.resets_at = Instant::now() + reset_in;
    }

    /// Requests left before the next reset.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Read `(remaining, time until reset)` from GitHub's rate-limit headers.
fn quota_from_headers(headers: &HeaderMap) -> Option<(u32, Duration)> {
    let header = |name: &str| headers.get(name)?.to_str().ok()?.trim().parse::<u64>().ok();
    let remaining = u32::try_from(header(RATELIMIT_REMAINING)?).ok()?;
    let reset_epoch = header(RATELIMIT_RESET)?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some((remaining, Duration::from_secs(reset_epoch.saturating_sub(now))))
}

/// HTTP client for the GitHub REST API v3.
///
/// All methods return [`GateResult`] and map HTTP, network and decode
/// errors to [`GateError::Fetch`] for the source being fetched.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    /// `GITHUB_TOKEN`, personal or fine-grained.
    token: String,
    /// API root, without trailing slash.
    base_url: String,
    budget: Arc<Mutex<RequestBudget>>,
}

impl GitHubClient {
    /// Create a client against `api.github.com`.
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Create a client against another API root (GitHub Enterprise, tests).
    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            budget: Arc::new(Mutex::new(RequestBudget::new(
                HOURLY_QUOTA,
                Duration::from_secs(3_600),
            ))),
        }
    }

    /// API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Spend one request from the budget and build an authorized GET.
    async fn budgeted_get(&self, url: &str) -> reqwest::RequestBuilder {
        self.budget.lock().await.acquire().await;
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "commit-gate")
    }

    /// GET one page and decode it.
    async fn get_page<P: Paginated>(&self, url: &str, kind: SourceKind) -> GateResult<P> {
        let response = self
            .budgeted_get(url)
            .await
            .send()
            .await
            .map_err(|e| GateError::fetch(kind, format!("request failed: {e}")))?;

        if let Some((remaining, reset_in)) = quota_from_headers(response.headers()) {
            self.budget.lock().await.observe(remaining, reset_in);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GateError::fetch(kind, format!("GitHub returned {status}: {body}")));
        }

        response
            .json::<P>()
            .await
            .map_err(|e| GateError::fetch(kind, format!("response parse failed: {e}")))
    }

    /// Follow `page=N` until `total_count` items are collected or a page is empty.
    ///
    /// Running out of pages first is a fetch error: an unseen entry could
    /// still be pending.
    async fn get_all_pages<P: Paginated>(
        &self,
        path: &str,
        kind: SourceKind,
    ) -> GateResult<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut total = 0;
        for page in 1..=MAX_PAGES {
            let url = format!("{}{path}?per_page={PER_PAGE}&page={page}", self.base_url);
            let body: P = self.get_page(&url, kind).await?;
            total = body.total_count();
            let batch = body.into_items();
            let exhausted = batch.is_empty();
            items.extend(batch);
            if exhausted || items.len() as u64 >= total {
                return Ok(items);
            }
            tracing::debug!(source = %kind, page, collected = items.len(), total, "Fetching next page");
        }
        Err(GateError::fetch(
            kind,
            format!(
                "gave up after {MAX_PAGES} pages with {} of {total} entries read",
                items.len()
            ),
        ))
    }

    /// Latest status for each context on the commit.
    pub async fn get_combined_status(&self, commit: &CommitRef) -> GateResult<Vec<GitHubStatus>> {
        let path = format!(
            "/repos/{}/{}/commits/{}/status",
            commit.owner, commit.repo, commit.sha
        );
        self.get_all_pages::<GitHubCombinedStatus>(&path, SourceKind::Status)
            .await
    }

    /// All check-runs reported for the commit.
    pub async fn list_check_runs(&self, commit: &CommitRef) -> GateResult<Vec<GitHubCheckRun>> {
        let path = format!(
            "/repos/{}/{}/commits/{}/check-runs",
            commit.owner, commit.repo, commit.sha
        );
        self.get_all_pages::<GitHubCheckRunList>(&path, SourceKind::CheckRun)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn epoch_secs_from_now(secs: u64) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + secs
    }

    #[tokio::test]
    async fn test_budget_spends_one_request_per_acquire() {
        let mut budget = RequestBudget::new(3, Duration::from_secs(60));
        budget.acquire().await;
        budget.acquire().await;
        assert_eq!(budget.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_waits_for_reset() {
        let mut budget = RequestBudget::new(10, Duration::from_secs(3_600));
        budget.observe(0, Duration::from_secs(30));

        let started = Instant::now();
        budget.acquire().await;

        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(budget.remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_refills_after_period() {
        let mut budget = RequestBudget::new(2, Duration::from_secs(60));
        budget.acquire().await;
        budget.acquire().await;
        tokio::time::advance(Duration::from_secs(61)).await;

        let started = Instant::now();
        budget.acquire().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(budget.remaining(), 1);
    }

    #[test]
    fn test_quota_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(quota_from_headers(&headers).is_none());

        headers.insert(RATELIMIT_REMAINING, HeaderValue::from_static("42"));
        headers.insert(
            RATELIMIT_RESET,
            HeaderValue::from_str(&epoch_secs_from_now(120).to_string()).unwrap(),
        );
        let (remaining, reset_in) = quota_from_headers(&headers).unwrap();
        assert_eq!(remaining, 42);
        assert!(reset_in <= Duration::from_secs(120));
        assert!(reset_in >= Duration::from_secs(110));
    }

    #[test]
    fn test_quota_reset_in_the_past_is_immediate() {
        let mut headers = HeaderMap::new();
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from_static("0"));
        headers.insert(RATELIMIT_RESET, HeaderValue::from_static("1"));
        assert_eq!(quota_from_headers(&headers), Some((0, Duration::ZERO)));
    }

    #[tokio::test]
    async fn test_response_headers_update_budget() {
        let mut server = mockito::Server::new_async().await;
        let reset = epoch_secs_from_now(600).to_string();
        let _mock = server
            .mock("GET", "/repos/octo-org/widgets/commits/abc123/status")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header(RATELIMIT_REMAINING, "7")
            .with_header(RATELIMIT_RESET, reset.as_str())
            .with_body(r#"{"state":"success","total_count":0,"statuses":[]}"#)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("ghp_test_token".to_string(), server.url());
        let commit = CommitRef::parse("octo-org/widgets", "abc123").unwrap();
        let statuses = client.get_combined_status(&commit).await.unwrap();

        assert!(statuses.is_empty());
        assert_eq!(client.budget.lock().await.remaining(), 7);
    }

    #[tokio::test]
    async fn test_pagination_past_page_limit_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let pages = server
            .mock("GET", "/repos/octo-org/widgets/commits/abc123/check-runs")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"total_count":10000,"check_runs":[{"id":1,"name":"build","status":"queued","conclusion":null}]}"#,
            )
            .expect(MAX_PAGES as usize)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("ghp_test_token".to_string(), server.url());
        let commit = CommitRef::parse("octo-org/widgets", "abc123").unwrap();
        let err = client.list_check_runs(&commit).await.unwrap_err();

        assert!(matches!(
            err,
            GateError::Fetch {
                kind: SourceKind::CheckRun,
                ..
            }
        ));
        assert!(err.to_string().contains("50 of 10000"));
        pages.assert_async().await;
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GitHubClient::with_base_url("t".to_string(), "http://127.0.0.1:1234/");
        assert_eq!(client.base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_client_defaults_to_public_api() {
        let client = GitHubClient::new("ghp_test_token".to_string());
        assert_eq!(client.base_url(), GITHUB_API_BASE);
    }
}
