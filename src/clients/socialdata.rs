use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::core::error::ApiFailure;
use crate::domain::{Query, Transport};
use crate::infra::config::{Config, DEFAULT_TIMEOUT};
use crate::infra::http::headers::{add_bearer, add_standard_headers};
use crate::infra::runtime::limits::make_http_client;

/// Authenticated client for the SocialData REST API. One attempt per call,
/// no retries.
#[derive(Clone)]
pub struct SocialDataRemote {
    base: String,
    http: Client,
    api_key: Option<String>,
}

impl SocialDataRemote {
    pub fn new(base: impl Into<String>, api_key: Option<String>) -> reqwest::Result<Self> {
        Self::with_timeout(base, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = make_http_client(timeout)?;
        Ok(Self {
            base: base.into(),
            http,
            api_key,
        })
    }

    pub fn from_config(cfg: &Config) -> reqwest::Result<Self> {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn get(&self, path: &str, query: &Query) -> Result<Value, ApiFailure> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!(path = %path, "socialdata request refused: no credential configured");
            return Err(ApiFailure::unauthenticated());
        };

        let url = format!("{}{}", self.base.trim_end_matches('/'), path);
        let (builder, rid) = add_standard_headers(self.http.get(&url), None);
        tracing::debug!(endpoint = %url, request_id = %rid, params = query.len(), "socialdata request");

        let start = Instant::now();
        let res = self.send(add_bearer(builder, key).query(query)).await;
        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric("socialdata.fetch", "remote_latency_ms", elapsed_ms);
            }
            Err(failure) => {
                tracing::warn!(endpoint = %url, request_id = %rid, kind = %failure.kind, error = %failure, "socialdata request failed");
                crate::infra::logging::log_metric("socialdata.fetch", "remote_error_total", 1.0);
            }
        }
        res
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Value, ApiFailure> {
        let resp = builder.send().await.map_err(from_reqwest)?;
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(failure_for_status(status, body));
        }
        resp.json::<Value>().await.map_err(from_reqwest)
    }
}

#[async_trait::async_trait]
impl Transport for SocialDataRemote {
    async fn fetch(&self, path: &str, query: &Query) -> Result<Value, ApiFailure> {
        self.get(path, query).await
    }
}

fn failure_for_status(status: StatusCode, body: String) -> ApiFailure {
    match status {
        StatusCode::PAYMENT_REQUIRED => ApiFailure::insufficient_balance(body),
        StatusCode::UNPROCESSABLE_ENTITY => ApiFailure::invalid_parameters(body),
        other => ApiFailure::api_error(other.as_u16(), body),
    }
}

fn from_reqwest(e: reqwest::Error) -> ApiFailure {
    if e.is_timeout() {
        ApiFailure::timeout()
    } else {
        ApiFailure::transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FailureKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> SocialDataRemote {
        SocialDataRemote::new(server.base_url(), Some("sk-test".into())).unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn it_sends_bearer_and_query_and_parses_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/twitter/search")
                .query_param("query", "rust lang:en")
                .query_param("type", "Latest")
                .header("authorization", "Bearer sk-test")
                .header("accept", "application/json")
                .header_exists("x-request-id")
                .header_exists("user-agent");
            then.status(200)
                .json_body(json!({"tweets": [{"id_str": "1"}], "next_cursor": "c1"}));
        });

        let body = client(&server)
            .get("/twitter/search", &query(&[("query", "rust lang:en"), ("type", "Latest")]))
            .await
            .unwrap();
        m.assert();
        assert_eq!(body["tweets"][0]["id_str"], "1");
        assert_eq!(body["next_cursor"], "c1");
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_without_network() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({}));
        });
        let cli = SocialDataRemote::new(server.base_url(), None).unwrap();
        assert!(!cli.has_credential());
        let err = cli.get("/twitter/user/jack", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Unauthenticated);
        m.assert_hits(0);
    }

    #[tokio::test]
    async fn maps_402_to_insufficient_balance() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/twitter/search");
            then.status(402).body("balance");
        });
        let err = client(&server).get("/twitter/search", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InsufficientBalance);
        assert_eq!(err.status, Some(402));
    }

    #[tokio::test]
    async fn maps_422_to_invalid_parameters_with_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/twitter/search");
            then.status(422).body(r#"{"message":"query is required"}"#);
        });
        let err = client(&server).get("/twitter/search", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidParameters);
        assert!(err.to_string().contains("query is required"));
    }

    #[tokio::test]
    async fn maps_other_errors_with_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/twitter/user/nobody");
            then.status(404).body("User not found");
        });
        let err = client(&server)
            .get("/twitter/user/nobody", &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::ApiError);
        assert_eq!(err.status, Some(404));
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("User not found"));
    }

    #[tokio::test]
    async fn does_not_retry_server_errors() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/twitter/search");
            then.status(500).body("err");
        });
        let err = client(&server).get("/twitter/search", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::ApiError);
        m.assert_hits(1);
    }

    #[tokio::test]
    async fn slow_upstream_is_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/twitter/search");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({"tweets": []}));
        });
        let cli = SocialDataRemote::with_timeout(
            server.base_url(),
            Some("sk-test".into()),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = cli.get("/twitter/search", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Timeout);
    }

    #[tokio::test]
    async fn unparseable_body_is_transport_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/twitter/tweets/1");
            then.status(200).body("<html>not json</html>");
        });
        let err = client(&server).get("/twitter/tweets/1", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Transport);
        assert!(err.to_string().starts_with("request failed:"));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_failure() {
        let cli = SocialDataRemote::new("http://127.0.0.1:1", Some("sk".into())).unwrap();
        let err = cli.get("/twitter/search", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Transport);
    }

    #[tokio::test]
    async fn transport_trait_shapes_pages() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/twitter/community/7/tweets")
                .query_param("cursor", "c9");
            then.status(200).json_body(json!({"tweets": [{}, {}], "next_cursor": null}));
        });
        let cli = client(&server);
        let page = cli
            .fetch_page("/twitter/community/7/tweets", &query(&[("cursor", "c9")]), "tweets")
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }
}
