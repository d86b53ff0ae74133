//! HTTP transport to the remote REST endpoint

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{header::CONTENT_RANGE, Client, Method};
use serde_json::Value;

use crate::{
    config::RemoteConfig,
    error::{StoreError, StoreResult},
};

/// HTTP verb of a store request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl StoreMethod {
    fn as_reqwest(self) -> Method {
        match self {
            StoreMethod::Get => Method::GET,
            StoreMethod::Post => Method::POST,
            StoreMethod::Patch => Method::PATCH,
            StoreMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for StoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            StoreMethod::Get => "GET",
            StoreMethod::Post => "POST",
            StoreMethod::Patch => "PATCH",
            StoreMethod::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// Row count the remote should report alongside the rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    Exact,
    Planned,
    Estimated,
}

impl CountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountMode::Exact => "exact",
            CountMode::Planned => "planned",
            CountMode::Estimated => "estimated",
        }
    }
}

/// One request against a remote table
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    pub method: StoreMethod,
    pub table: String,
    /// Query-string pairs, already in the remote's grammar (`col=eq.v`)
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub count: Option<CountMode>,
}

impl StoreRequest {
    /// Human readable form for diagnostics, e.g. `GET books?select=*&limit=10`
    pub fn describe(&self) -> String {
        if self.query.is_empty() {
            return format!("{} {}", self.method, self.table);
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {}?{}", self.method, self.table, query)
    }
}

/// Raw response as seen by the table proxy
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse {
    pub status: u16,
    pub body: String,
    pub content_range: Option<String>,
}

impl StoreResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the table proxy and the network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: StoreRequest) -> StoreResult<StoreResponse>;
}

/// reqwest-backed transport speaking the PostgREST dialect
pub struct HttpTransport {
    client: Client,
    rest_url: String,
    api_key: String,
    access_token: String,
}

impl HttpTransport {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            access_token: config
                .access_token
                .clone()
                .unwrap_or_else(|| config.api_key.clone()),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: StoreRequest) -> StoreResult<StoreResponse> {
        let url = format!("{}/{}", self.rest_url, request.table);

        let prefer = match request.count {
            Some(mode) => format!("return=representation,count={}", mode.as_str()),
            None => "return=representation".to_string(),
        };

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
            .header("Prefer", prefer);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(map_reqwest_error)?;

        tracing::debug!(request = %request.describe(), status, "remote call completed");

        Ok(StoreResponse {
            status,
            body,
            content_range,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_request() {
        let request = StoreRequest {
            method: StoreMethod::Get,
            table: "books".to_string(),
            query: vec![
                ("select".to_string(), "id,title".to_string()),
                ("id".to_string(), "eq.7".to_string()),
            ],
            body: None,
            count: None,
        };
        assert_eq!(request.describe(), "GET books?select=id,title&id=eq.7");
    }

    #[test]
    fn test_success_range() {
        let ok = StoreResponse { status: 204, body: String::new(), content_range: None };
        let bad = StoreResponse { status: 409, body: "{}".into(), content_range: None };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }

    #[test]
    fn test_http_transport_defaults_token_to_api_key() {
        let config = RemoteConfig {
            url: "https://example.test/".to_string(),
            api_key: "anon".to_string(),
            access_token: None,
            timeout_seconds: 5,
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.rest_url, "https://example.test/rest/v1");
        assert_eq!(transport.access_token, "anon");
    }
}
