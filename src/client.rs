use std::collections::BTreeMap;

use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{Result, SonarError};
use crate::normalize::normalize;
use crate::responses::{BranchesResponse, IssueSearchResponse, RawComponent};
use crate::types::{PagingInfo, SyncResult};

const ISSUES_SEARCH_PATH: &str = "api/issues/search";
const BRANCHES_LIST_PATH: &str = "api/project_branches/list";

pub struct SonarClient {
    http: Client,
    base: Url,
    token: String,
    cookie: Option<String>,
    project_key: String,
    query_params: BTreeMap<String, String>,
}

impl SonarClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_http(Client::new(), config)
    }

    /// Build a client for `config` that shares an existing connection pool.
    pub fn with_http(http: Client, config: &Config) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(SonarError::MissingSetting("host"));
        }
        if config.project_key.is_empty() {
            return Err(SonarError::MissingSetting("projectKey"));
        }

        Ok(Self {
            http,
            base: parse_base_url(&config.host)?,
            token: config.token.clone(),
            cookie: config.cookie().map(String::from),
            project_key: config.project_key.clone(),
            query_params: config.query_params.clone(),
        })
    }

    /// Fetch one page of issues for the configured project.
    ///
    /// A response without an `issues` array (or not JSON at all) is an empty
    /// page, not an error. Transport and HTTP status failures are returned.
    pub async fn fetch_issues(&self, page: u32, page_size: u32) -> Result<SyncResult> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let query = build_query(&self.project_key, page, page_size, &self.query_params);

        let Some(response) = self
            .get::<IssueSearchResponse>(ISSUES_SEARCH_PATH, &query)
            .await?
        else {
            return Ok(SyncResult::empty(page, page_size));
        };

        let Some(raw_issues) = response.issues else {
            tracing::warn!("Sonar API returned empty or invalid data");
            return Ok(SyncResult::empty(page, page_size));
        };

        // Gaps in the server's paging fall back to what was requested.
        let paging = response.paging.unwrap_or_default();
        let paging = PagingInfo {
            page_index: paging.page_index.unwrap_or(page).max(1),
            page_size: paging.page_size.unwrap_or(page_size).max(1),
            total: paging.total.unwrap_or(raw_issues.len() as u64),
        };

        let issues: Vec<_> = raw_issues.into_iter().map(normalize).collect();
        tracing::info!(
            fetched = issues.len(),
            total = paging.total,
            page = paging.page_index,
            "Fetched issues"
        );

        Ok(SyncResult {
            issues,
            paging,
            branch: resolve_branch(&response.components, &self.query_params),
        })
    }

    /// List the project's branch names in server order.
    pub async fn fetch_branches(&self) -> Result<Vec<String>> {
        let query = vec![("project".to_string(), self.project_key.clone())];
        let response = self
            .get::<BranchesResponse>(BRANCHES_LIST_PATH, &query)
            .await?
            .unwrap_or_default();

        Ok(response.branches.into_iter().map(|b| b.name).collect())
    }

    /// Issue an authenticated GET. `Ok(None)` means the body was not the
    /// expected JSON shape.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Option<T>> {
        let url = self
            .base
            .join(path)
            .map_err(|e| SonarError::InvalidUrl(format!("{}{path}: {e}", self.base)))?;
        tracing::info!(%url, "Fetching from Sonar API");

        let mut request = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        tracing::debug!(status = response.status().as_u16(), "Sonar API response");

        if !response.status().is_success() {
            return Err(SonarError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                tracing::warn!(error = %e, "Sonar API returned a body that is not valid JSON");
                Ok(None)
            }
        }
    }
}

/// Parse the configured host so that relative API paths join below it.
fn parse_base_url(host: &str) -> Result<Url> {
    let mut host = host.trim().to_string();
    if !host.ends_with('/') {
        host.push('/');
    }
    Url::parse(&host).map_err(|e| SonarError::InvalidUrl(format!("{host}: {e}")))
}

/// Mandatory search params first, then configured params. A configured key
/// that collides with a mandatory one replaces its value in place.
pub fn build_query(
    project_key: &str,
    page: u32,
    page_size: u32,
    extra: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("componentKeys".to_string(), project_key.to_string()),
        ("p".to_string(), page.to_string()),
        ("ps".to_string(), page_size.to_string()),
    ];

    for (key, value) in extra {
        match query.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.clone(),
            None => query.push((key.clone(), value.clone())),
        }
    }

    query
}

/// Branch label priority: server branch, server pull request, configured
/// `branch` param, configured `pullRequest` param.
pub fn resolve_branch(
    components: &[RawComponent],
    query_params: &BTreeMap<String, String>,
) -> Option<String> {
    let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());

    components
        .iter()
        .find_map(|c| non_empty(&c.branch))
        .or_else(|| components.iter().find_map(|c| non_empty(&c.pull_request)))
        .or_else(|| non_empty(&query_params.get("branch").cloned()))
        .or_else(|| non_empty(&query_params.get("pullRequest").cloned()))
}

/// Where the orchestrator gets issues from. The config is re-read by the
/// caller for every sync and passed in.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    async fn fetch_issues(&self, config: &Config, page: u32, page_size: u32)
        -> Result<SyncResult>;
}

/// The real server, reached over a shared `reqwest` client.
#[derive(Default)]
pub struct HttpIssueSource {
    http: Client,
}

impl IssueSource for HttpIssueSource {
    async fn fetch_issues(
        &self,
        config: &Config,
        page: u32,
        page_size: u32,
    ) -> Result<SyncResult> {
        SonarClient::with_http(self.http.clone(), config)?
            .fetch_issues(page, page_size)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        Config {
            host: server.uri(),
            token: "squ_token".to_string(),
            project_key: "proj".to_string(),
            ..Config::default()
        }
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_query_mandatory_keys_first() {
        let query = build_query("proj", 2, 100, &BTreeMap::new());
        assert_eq!(
            query,
            vec![
                ("componentKeys".to_string(), "proj".to_string()),
                ("p".to_string(), "2".to_string()),
                ("ps".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_query_configured_params_win() {
        let query = build_query("proj", 1, 100, &params(&[("ps", "50"), ("resolved", "false")]));
        assert_eq!(query.len(), 4);
        assert_eq!(query[2], ("ps".to_string(), "50".to_string()));
        assert_eq!(query[3], ("resolved".to_string(), "false".to_string()));
    }

    #[test]
    fn test_resolve_branch_priority() {
        let server_branch = RawComponent {
            branch: Some("feature/x".to_string()),
            pull_request: None,
        };
        let server_pr = RawComponent {
            branch: None,
            pull_request: Some("42".to_string()),
        };
        let configured = params(&[("branch", "dev"), ("pullRequest", "7")]);

        assert_eq!(
            resolve_branch(&[server_pr.clone(), server_branch], &configured).as_deref(),
            Some("feature/x")
        );
        assert_eq!(
            resolve_branch(&[server_pr], &configured).as_deref(),
            Some("42")
        );
        assert_eq!(resolve_branch(&[], &configured).as_deref(), Some("dev"));
        assert_eq!(
            resolve_branch(&[], &params(&[("pullRequest", "7")])).as_deref(),
            Some("7")
        );
        assert_eq!(resolve_branch(&[], &BTreeMap::new()), None);
    }

    #[test]
    fn test_missing_host_is_rejected_before_request() {
        let err = SonarClient::new(&Config::default()).err().unwrap();
        assert!(matches!(err, SonarError::MissingSetting("host")));
    }

    #[test]
    fn test_base_url_accepts_host_without_trailing_slash() {
        let base = parse_base_url("https://sonar.example.com/sonar").unwrap();
        assert_eq!(
            base.join(ISSUES_SEARCH_PATH).unwrap().as_str(),
            "https://sonar.example.com/sonar/api/issues/search"
        );
    }

    #[tokio::test]
    async fn test_fetch_issues_sends_auth_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .and(query_param("componentKeys", "proj"))
            .and(query_param("p", "1"))
            .and(query_param("ps", "100"))
            .and(header("Authorization", "Bearer squ_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [{
                    "key": "K1",
                    "severity": "MAJOR",
                    "type": "CODE_SMELL",
                    "message": "M",
                    "component": "proj:src/a.ts",
                    "line": 5,
                    "status": "OPEN",
                    "author": "x"
                }],
                "paging": {"pageIndex": 1, "pageSize": 100, "total": 1},
                "components": [{"key": "proj", "branch": "main"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SonarClient::new(&config_for(&server)).unwrap();
        let result = client.fetch_issues(1, 100).await.unwrap();

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].file, "src/a.ts");
        assert_eq!(result.issues[0].severity, Severity::Major);
        assert_eq!(result.paging.total, 1);
        assert_eq!(result.branch.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_fetch_issues_sends_cookie_and_extra_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .and(query_param("resolved", "false"))
            .and(query_param("pullRequest", "12"))
            .and(header("Cookie", "JWT-SESSION=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [],
                "paging": {"pageIndex": 1, "pageSize": 100, "total": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.cookie = Some("JWT-SESSION=abc".to_string());
        config.query_params = params(&[("resolved", "false"), ("pullRequest", "12")]);

        let result = SonarClient::new(&config)
            .unwrap()
            .fetch_issues(1, 100)
            .await
            .unwrap();
        assert!(result.issues.is_empty());
        assert_eq!(result.branch.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_missing_issues_array_is_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errors": []})))
            .mount(&server)
            .await;

        let result = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_issues(3, 50)
            .await
            .unwrap();

        assert!(result.issues.is_empty());
        assert_eq!(result.paging, PagingInfo::empty(3, 50));
        assert_eq!(result.branch, None);
    }

    #[tokio::test]
    async fn test_partial_paging_keeps_issues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [{
                    "key": "K1",
                    "severity": "MINOR",
                    "message": "M",
                    "component": "proj:src/a.ts",
                    "line": 3
                }],
                "paging": {"pageIndex": 1, "total": 1}
            })))
            .mount(&server)
            .await;

        let result = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_issues(1, 25)
            .await
            .unwrap();

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].key, "K1");
        assert_eq!(
            result.paging,
            PagingInfo {
                page_index: 1,
                page_size: 25,
                total: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_paging_is_derived_from_issues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [
                    {"key": "K1", "component": "proj:a.ts"},
                    {"key": "K2", "component": "proj:b.ts"}
                ]
            })))
            .mount(&server)
            .await;

        let result = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_issues(2, 50)
            .await
            .unwrap();

        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.paging.page_index, 2);
        assert_eq!(result.paging.page_size, 50);
        assert_eq!(result.paging.total, 2);
    }

    #[tokio::test]
    async fn test_non_json_body_is_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let result = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_issues(1, 100)
            .await
            .unwrap();
        assert_eq!(result, SyncResult::empty(1, 100));
    }

    #[tokio::test]
    async fn test_http_failure_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/issues/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let err = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_issues(1, 100)
            .await
            .unwrap_err();

        match err {
            SonarError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_branches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/project_branches/list"))
            .and(query_param("project", "proj"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "branches": [
                    {"name": "main", "isMain": true, "type": "BRANCH"},
                    {"name": "feature/login", "isMain": false, "type": "BRANCH"}
                ]
            })))
            .mount(&server)
            .await;

        let branches = SonarClient::new(&config_for(&server))
            .unwrap()
            .fetch_branches()
            .await
            .unwrap();
        assert_eq!(branches, vec!["main", "feature/login"]);
    }
}
