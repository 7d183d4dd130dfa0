//! HTTP transport for the community API.
//!
//! One pooled reqwest client per session. Each fetch is a single GET; there
//! are no retries. Non-success statuses carry the API's `reason` when the
//! error body has one:
//!
//! ```json
//! {"status": "nok", "reason": "Character not found."}
//! ```

use armory_core::{FetchError, FetchFailure, Fetcher, RequestTarget};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;

static CRYPTO_PROVIDER: OnceLock<()> = OnceLock::new();

/// Install the ring rustls provider for the process if none is installed.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.get_or_init(|| {
        // Fails only when another provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: Option<String>,
}

/// [`Fetcher`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        ensure_crypto_provider();
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with a proxy configured.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &RequestTarget) -> Result<Value, FetchError> {
        debug!("API request URL: {}", target);
        let failed = |failure| FetchError::new(target.as_str(), failure);

        let response = self
            .client
            .get(target.url().clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| failed(FetchFailure::Unreachable(e.to_string())))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| failed(FetchFailure::Unreachable(e.to_string())))?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ApiErrorBody>(&body)
                .ok()
                .and_then(|body| body.reason);
            debug!("API returned {} for {}", status, target);
            return Err(failed(FetchFailure::Status {
                code: status.as_u16(),
                reason,
            }));
        }

        serde_json::from_slice(&body).map_err(|e| failed(FetchFailure::MalformedBody(e.to_string())))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use armory_core::{EntityKey, FieldSet, Region};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header as header_matcher, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target(server: &MockServer, fields: &[&'static str]) -> RequestTarget {
        let mut set = FieldSet::new();
        for field in fields {
            set.insert(*field);
        }
        let base = Url::parse(&format!("{}/api/wow/", server.uri())).unwrap();
        RequestTarget::build(&base, &EntityKey::character(Region::EU, "Draenor", "Jon"), None, &set)
            .unwrap()
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&ClientConfig::default()).expect("Client should build")
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wow/character/draenor/jon"))
            .and(query_param("fields", "guild,pvp"))
            .and(header_matcher("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Jon"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&target(&server, &["guild", "pvp"]))
            .await
            .expect("Fetch should succeed");
        assert_eq!(body, json!({"name": "Jon"}));
    }

    #[tokio::test]
    async fn test_fetch_status_with_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wow/character/draenor/jon"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"status": "nok", "reason": "Character not found."})),
            )
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&target(&server, &[]))
            .await
            .expect_err("Test operation should fail");
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.failure,
            FetchFailure::Status {
                code: 404,
                reason: Some("Character not found.".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_status_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&target(&server, &[]))
            .await
            .expect_err("Test operation should fail");
        assert_eq!(
            err.failure,
            FetchFailure::Status {
                code: 503,
                reason: None
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&target(&server, &[]))
            .await
            .expect_err("Test operation should fail");
        assert!(matches!(err.failure, FetchFailure::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let base = Url::parse("http://127.0.0.1:1/api/wow/").unwrap();
        let target = RequestTarget::build(&base, &EntityKey::quest(Region::US, 1), None, &FieldSet::new())
            .unwrap();

        let err = fetcher().fetch(&target).await.expect_err("Test operation should fail");
        assert!(matches!(err.failure, FetchFailure::Unreachable(_)));
        assert_eq!(err.target, "http://127.0.0.1:1/api/wow/quest/1");
    }
}
