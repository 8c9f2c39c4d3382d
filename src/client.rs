//! Client facade: owns configuration and a transport, and routes calls
//! through the pure link codec.

use std::sync::Arc;

use url::Url;

use crate::components::{build_long_link, flatten_long_link, LinkComponents};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::long_link::{
    flat_params_from_json, parse_long_link, query_params, recognize_parameters, FlatParams,
    LongLinkResult,
};
use crate::models::{DynamicLinkShortenResult, ResolveResponse};
use crate::transport::{HttpTransport, LinkTransport};
use crate::validate::is_recognized_url;

/// A configured dynamic-links session.
#[derive(Clone)]
pub struct DynamicLinks {
    config: ClientConfig,
    transport: Arc<dyn LinkTransport>,
}

impl std::fmt::Debug for DynamicLinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicLinks")
            .field("base_url", &self.config.base_url)
            .field("project_id", &self.config.project_id)
            .field("allowed_hosts", &self.config.allowed_hosts)
            .finish_non_exhaustive()
    }
}

impl DynamicLinks {
    /// Create a session backed by the HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn LinkTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Encode components as a long link. Pure; no backend call.
    pub fn build_long_link(&self, components: &LinkComponents) -> Result<Url, ClientError> {
        Ok(build_long_link(components)?)
    }

    /// Whether `url` points at one of the configured hosts with a non-empty path.
    pub fn is_recognized(&self, url: &str) -> bool {
        is_recognized_url(url, &self.config.allowed_hosts)
    }

    /// Ask the backend to create a short link for `components`.
    pub async fn shorten(
        &self,
        components: &LinkComponents,
    ) -> Result<DynamicLinkShortenResult, ClientError> {
        let project_id = self
            .config
            .project_id
            .as_deref()
            .ok_or(ClientError::ProjectIdMissing)?;

        let fields = flatten_long_link(components)?;
        let result = self
            .transport
            .create_short_link(project_id, &fields)
            .await?;

        for warning in &result.warnings {
            tracing::warn!(
                "shorten {} warning {}: {}",
                result.short_link,
                warning.code,
                warning.message
            );
        }
        tracing::debug!("Created short link {} ({})", result.short_link, result.id);

        Ok(result)
    }

    /// Resolve a recognized link into its structured long-link form.
    pub async fn resolve(&self, url: &str) -> Result<LongLinkResult, ClientError> {
        match self.handle_incoming(url).await? {
            Some(result) => Ok(result),
            None => Err(ClientError::NotRecognized(url.to_owned())),
        }
    }

    /// Handle a URL delivered by the host. Links this client does not
    /// recognize yield `Ok(None)` without any backend call.
    pub async fn handle_incoming(&self, url: &str) -> Result<Option<LongLinkResult>, ClientError> {
        if !self.is_recognized(url) {
            tracing::debug!("Ignoring unrecognized link {}", url);
            return Ok(None);
        }
        let link = Url::parse(url).map_err(|_| ClientError::NotRecognized(url.to_owned()))?;

        let params: FlatParams = match self.transport.resolve_short_link(&link).await? {
            ResolveResponse::LongLink(long_link) => query_params(&long_link),
            ResolveResponse::Params(object) => flat_params_from_json(&object),
        };

        let recognized = recognize_parameters(&params);
        tracing::debug!(
            "Resolved {} with groups {:?}, unknown keys {:?}",
            link,
            recognized.group_names(),
            recognized.unknown
        );

        Ok(Some(parse_long_link(&params)?))
    }
}
