use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.dynlinks.dev";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. "https://api.dynlinks.dev".
    /// Never has a trailing slash.
    pub base_url: String,

    /// Static API key sent with every backend request
    pub api_key: String,

    /// Project the shorten endpoint creates links under. Only required for
    /// shortening.
    pub project_id: Option<String>,

    /// Hosts whose links this client handles (exact match)
    pub allowed_hosts: BTreeSet<String>,

    /// Default domain prefix used by the CLI when building links
    pub domain_prefix: Option<String>,

    /// Per-request timeout for the HTTP transport
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            project_id: None,
            allowed_hosts: BTreeSet::new(),
            domain_prefix: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into());
        self
    }

    pub fn domain_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.domain_prefix = Some(prefix.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables (populated by dotenvy
    /// before this is called).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("DYNLINKS_API_KEY")
            .context("DYNLINKS_API_KEY must be set in the environment or .env file")?;

        if api_key.trim().is_empty() {
            anyhow::bail!("DYNLINKS_API_KEY must not be empty");
        }

        let base_url =
            std::env::var("DYNLINKS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let timeout_secs = std::env::var("DYNLINKS_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let allowed_hosts = std::env::var("DYNLINKS_ALLOWED_HOSTS")
            .map(|hosts| parse_host_list(&hosts))
            .unwrap_or_default();

        let mut config = Self::new(base_url, api_key).timeout(Duration::from_secs(timeout_secs));
        config.allowed_hosts = allowed_hosts;
        config.project_id = non_empty_var("DYNLINKS_PROJECT_ID");
        config.domain_prefix = non_empty_var("DYNLINKS_DOMAIN_PREFIX");
        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated host list, trimming entries and dropping empties.
pub fn parse_host_list(hosts: &str) -> BTreeSet<String> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_list_is_trimmed_and_deduplicated() {
        let hosts = parse_host_list(" a.example, ,b.example,a.example,");
        assert_eq!(
            hosts.into_iter().collect::<Vec<_>>(),
            ["a.example", "b.example"]
        );
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let config = ClientConfig::new("https://api.example/", "key")
            .project_id("p1")
            .allow_host("acme.example")
            .timeout(Duration::from_secs(3));
        assert_eq!(config.base_url, "https://api.example");
        assert_eq!(config.project_id.as_deref(), Some("p1"));
        assert!(config.allowed_hosts.contains("acme.example"));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
