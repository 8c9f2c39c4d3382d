//! The backend seam: a trait the facade talks to, and its reqwest
//! implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{DynamicLinkShortenResult, ResolveRequest, ResolveResponse};
use crate::params::FieldMap;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Operations the link backend exposes.
#[async_trait]
pub trait LinkTransport: Send + Sync {
    /// Create a short link from the flat long-link parameters.
    async fn create_short_link(
        &self,
        project_id: &str,
        fields: &FieldMap,
    ) -> Result<DynamicLinkShortenResult, ClientError>;

    /// Exchange a short (or long) link for its long form.
    async fn resolve_short_link(&self, link: &Url) -> Result<ResolveResponse, ClientError>;
}

/// JSON-over-HTTPS transport authenticated with a static API key.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("base url {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "base url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// The base URL extended with `segments`, each percent-encoded as a
    /// single path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Value, ClientError> {
        tracing::debug!("POST {}", url);

        let resp = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            tracing::debug!("{} returned {}", url, status);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::ResponseParse(e.to_string()))
    }
}

#[async_trait]
impl LinkTransport for HttpTransport {
    async fn create_short_link(
        &self,
        project_id: &str,
        fields: &FieldMap,
    ) -> Result<DynamicLinkShortenResult, ClientError> {
        let body: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
            .collect();

        let value = self
            .post_json(self.endpoint(&["v1", "projects", project_id, "links"]), &body)
            .await?;

        serde_json::from_value(value).map_err(|e| ClientError::ResponseParse(e.to_string()))
    }

    async fn resolve_short_link(&self, link: &Url) -> Result<ResolveResponse, ClientError> {
        let value = self
            .post_json(
                self.endpoint(&["v1", "links", "resolve"]),
                &ResolveRequest {
                    link: link.as_str(),
                },
            )
            .await?;

        ResolveResponse::from_json(value).map_err(ClientError::ResponseParse)
    }
}

/// Pull a human-readable message out of an error body: `error.message`,
/// then `message`, then the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| body.trim().to_owned())
}
