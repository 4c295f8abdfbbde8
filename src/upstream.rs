use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::config::Config;

/// Read access to the upstream sports API. One operation: fetch a task
/// endpoint and hand back the raw JSON body.
#[async_trait]
pub trait FootballApi: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<Value>;
}

#[derive(Clone)]
pub struct FootballClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for FootballClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FootballClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FootballClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let base_url =
            Url::parse(&cfg.upstream.base_url).context("invalid upstream base URL")?;
        Ok(Self::with_base_url(cfg.upstream.auth_token.clone(), base_url))
    }

    pub fn with_base_url(token: String, base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("footsync/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn build_request(&self, endpoint: &str) -> Result<reqwest::Request> {
        // Relative join keeps a versioned base path like `/v4/` intact.
        let url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .context("invalid endpoint path")?;
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .build()
            .context("failed to build upstream request")
    }
}

#[async_trait]
impl FootballApi for FootballClient {
    async fn fetch(&self, endpoint: &str) -> Result<Value> {
        let request = self.build_request(endpoint)?;
        debug!(url = %request.url(), "fetching upstream endpoint");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach upstream")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("upstream error {}: {}", status, body));
        }

        res.json::<Value>()
            .await
            .context("invalid upstream response JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FootballClient {
        let base = Url::parse("https://api.football-data.org/v4/").unwrap();
        FootballClient::with_base_url("token".into(), base)
    }

    #[test]
    fn build_request_sets_auth_header() {
        let request = client().build_request("/competitions/PL").unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/v4/competitions/PL");
        assert_eq!(
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "Bearer token"
        );
    }

    #[test]
    fn build_request_preserves_query() {
        let request = client()
            .build_request("/competitions/PL/matches?status=FINISHED")
            .unwrap();
        assert_eq!(request.url().path(), "/v4/competitions/PL/matches");
        assert_eq!(request.url().query(), Some("status=FINISHED"));
    }

    #[test]
    fn debug_omits_token() {
        let base = Url::parse("https://api.football-data.org/v4/").unwrap();
        let client = FootballClient::with_base_url("s3cret".into(), base);
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("s3cret"));
    }
}
