//! Client configuration.
//!
//! A configuration is resolved in a fixed order: defaults, then environment
//! variables (unless disabled), then explicit builder options, then
//! validation. Explicit options always win over the environment.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryConfig;
use crate::token;
use crate::{CLOUD_URL, USER_AGENT};

/// Environment variable overriding the base URL.
pub const ENV_URL: &str = "AXIOM_URL";
/// Environment variable providing the access token.
pub const ENV_TOKEN: &str = "AXIOM_TOKEN";
/// Environment variable providing the organization id.
pub const ENV_ORG_ID: &str = "AXIOM_ORG_ID";

/// Validated configuration for a [`Client`](crate::Client).
///
/// Immutable once built; [`Client::options`](crate::Client::options) swaps in
/// a freshly validated replacement instead of mutating in place.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) access_token: String,
    pub(crate) org_id: Option<String>,
    pub(crate) http_client: reqwest::Client,
    pub(crate) user_agent: String,
    pub(crate) strict_decoding: bool,
    pub(crate) no_env: bool,
    pub(crate) no_limiting: bool,
    pub(crate) retry: Option<RetryConfig>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[REDACTED]")
            .field("org_id", &self.org_id)
            .field("user_agent", &self.user_agent)
            .field("strict_decoding", &self.strict_decoding)
            .field("no_limiting", &self.no_limiting)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The configured organization id, if any.
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    /// The User-Agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether unknown fields in response bodies fail decoding.
    pub fn strict_decoding(&self) -> bool {
        self.strict_decoding
    }

    /// Whether the client-side rate limit short-circuit is disabled.
    pub fn no_limiting(&self) -> bool {
        self.no_limiting
    }
}

/// Builder for [`ClientConfig`].
///
/// Unset fields fall back to the environment (unless [`with_no_env`] is
/// active) and then to defaults.
///
/// [`with_no_env`]: ClientConfigBuilder::with_no_env
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    url: Option<String>,
    access_token: Option<String>,
    org_id: Option<String>,
    http_client: Option<reqwest::Client>,
    user_agent: Option<String>,
    strict_decoding: Option<bool>,
    no_env: bool,
    no_limiting: Option<bool>,
    retry: Option<Option<RetryConfig>>,
}

impl ClientConfigBuilder {
    /// Set the base URL. A trailing slash is normalized away.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the organization id sent as the `X-Axiom-Org-Id` header.
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Replace the HTTP transport handle.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Override the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Fail decoding of response bodies that carry unknown fields.
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = Some(strict);
        self
    }

    /// Ignore the `AXIOM_*` environment variables entirely.
    pub fn with_no_env(mut self) -> Self {
        self.no_env = true;
        self
    }

    /// Disable the client-side rate limit short-circuit. Limit headers are
    /// still parsed and stored.
    pub fn with_no_limiting(mut self) -> Self {
        self.no_limiting = Some(true);
        self
    }

    /// Configure for the hosted deployment with the given token and
    /// organization id.
    pub fn with_cloud_config(
        self,
        access_token: impl Into<String>,
        org_id: impl Into<String>,
    ) -> Self {
        self.with_url(CLOUD_URL)
            .with_access_token(access_token)
            .with_org_id(org_id)
    }

    /// Configure for a self-hosted deployment at the given URL.
    pub fn with_selfhost_config(
        self,
        url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        self.with_url(url).with_access_token(access_token)
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(Some(retry));
        self
    }

    /// Disable retries.
    pub fn without_retry(mut self) -> Self {
        self.retry = Some(None);
        self
    }

    /// Recreate a builder from an existing config so further options can be
    /// layered on top. The environment is never consulted again.
    pub(crate) fn from_config(config: &ClientConfig) -> Self {
        Self {
            url: Some(config.base_url.as_str().to_string()),
            access_token: Some(config.access_token.clone()),
            org_id: config.org_id.clone(),
            http_client: Some(config.http_client.clone()),
            user_agent: Some(config.user_agent.clone()),
            strict_decoding: Some(config.strict_decoding),
            no_env: true,
            no_limiting: Some(config.no_limiting),
            retry: Some(config.retry.clone()),
        }
    }

    /// Resolve and validate the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        let mut url = CLOUD_URL.to_string();
        let mut access_token = String::new();
        let mut org_id: Option<String> = None;

        if !self.no_env {
            if let Some(v) = env_var(ENV_URL) {
                url = v;
            }
            if let Some(v) = env_var(ENV_TOKEN) {
                access_token = v;
            }
            if let Some(v) = env_var(ENV_ORG_ID) {
                org_id = Some(v);
            }
        }

        // Explicit options override the environment.
        if let Some(v) = self.url {
            url = v;
        }
        if let Some(v) = self.access_token {
            access_token = v;
        }
        if let Some(v) = self.org_id {
            org_id = Some(v);
        }

        if access_token.is_empty() {
            return Err(Error::new(ErrorKind::MissingAccessToken));
        }

        let url = url.trim_end_matches('/');
        let base_url = Url::parse(url)
            .map_err(|e| Error::with_source(ErrorKind::InvalidUrl(url.to_string()), e))?;

        let org_id = org_id.filter(|id| !id.is_empty());

        // Personal and unclassified tokens need a tenant when talking to the
        // hosted deployment.
        if url == CLOUD_URL && !token::is_api_token(&access_token) && org_id.is_none() {
            return Err(Error::new(ErrorKind::MissingOrganizationId));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| {
                    Error::with_source(
                        ErrorKind::Config(format!("failed to build HTTP client: {e}")),
                        e,
                    )
                })?,
        };

        Ok(ClientConfig {
            base_url,
            access_token,
            org_id,
            http_client,
            user_agent: self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
            strict_decoding: self.strict_decoding.unwrap_or(false),
            no_env: self.no_env,
            no_limiting: self.no_limiting.unwrap_or(false),
            retry: self
                .retry
                .unwrap_or_else(|| Some(RetryConfig::default())),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const ENDPOINT: &str = "http://axiom.local";
    const API_TOKEN: &str = "xaat-XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX";
    const PERSONAL_TOKEN: &str = "xapt-XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX";
    const ORG_ID: &str = "awkward-identifier-c3po";

    // Environment mutation is process wide; serialize the tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in [ENV_URL, ENV_TOKEN, ENV_ORG_ID] {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let result = f();
        for name in [ENV_URL, ENV_TOKEN, ENV_ORG_ID] {
            std::env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_no_environment_no_options() {
        let err = with_env(&[], || ClientConfig::builder().build()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingAccessToken);
    }

    #[test]
    fn test_personal_token_needs_org_on_cloud() {
        let err = with_env(&[], || {
            ClientConfig::builder()
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingOrganizationId);
    }

    #[test]
    fn test_api_token_needs_no_org_on_cloud() {
        let config = with_env(&[], || {
            ClientConfig::builder().with_access_token(API_TOKEN).build()
        })
        .unwrap();
        assert_eq!(config.access_token(), API_TOKEN);
        assert_eq!(config.base_url().as_str().trim_end_matches('/'), CLOUD_URL);
        assert!(config.org_id().is_none());
    }

    #[test]
    fn test_personal_token_with_org_on_cloud() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_access_token(PERSONAL_TOKEN)
                .with_org_id(ORG_ID)
                .build()
        })
        .unwrap();
        assert_eq!(config.org_id(), Some(ORG_ID));
    }

    #[test]
    fn test_personal_token_on_selfhost_needs_no_org() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_url(ENDPOINT)
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://axiom.local/");
    }

    #[test]
    fn test_environment_provides_credentials() {
        let err = with_env(&[(ENV_TOKEN, PERSONAL_TOKEN)], || {
            ClientConfig::builder().build()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingOrganizationId);

        let config = with_env(
            &[(ENV_TOKEN, PERSONAL_TOKEN), (ENV_ORG_ID, ORG_ID)],
            || ClientConfig::builder().build(),
        )
        .unwrap();
        assert_eq!(config.access_token(), PERSONAL_TOKEN);
        assert_eq!(config.org_id(), Some(ORG_ID));
    }

    #[test]
    fn test_environment_url() {
        let config = with_env(
            &[(ENV_URL, ENDPOINT), (ENV_TOKEN, PERSONAL_TOKEN)],
            || ClientConfig::builder().build(),
        )
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://axiom.local/");
    }

    #[test]
    fn test_options_override_environment() {
        let config = with_env(
            &[
                (ENV_URL, "http://wrong.example.com"),
                (ENV_TOKEN, "xapt-from-env"),
            ],
            || {
                ClientConfig::builder()
                    .with_url(ENDPOINT)
                    .with_access_token(PERSONAL_TOKEN)
                    .build()
            },
        )
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://axiom.local/");
        assert_eq!(config.access_token(), PERSONAL_TOKEN);
    }

    #[test]
    fn test_environment_org_option_token() {
        let config = with_env(&[(ENV_ORG_ID, ORG_ID)], || {
            ClientConfig::builder()
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        assert_eq!(config.org_id(), Some(ORG_ID));
    }

    #[test]
    fn test_no_env_suppresses_environment() {
        let err = with_env(
            &[(ENV_TOKEN, PERSONAL_TOKEN), (ENV_ORG_ID, ORG_ID)],
            || ClientConfig::builder().with_no_env().build(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingAccessToken);
    }

    #[test]
    fn test_cloud_url_trailing_slash_normalized() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_url(format!("{CLOUD_URL}/"))
                .with_access_token(PERSONAL_TOKEN)
                .with_org_id(ORG_ID)
                .build()
        })
        .unwrap();
        assert_eq!(config.base_url().as_str().trim_end_matches('/'), CLOUD_URL);

        // Trailing slash on the cloud URL without an org id still validates
        // as a cloud deployment.
        let err = with_env(&[], || {
            ClientConfig::builder()
                .with_url(format!("{CLOUD_URL}/"))
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingOrganizationId);
    }

    #[test]
    fn test_dev_url_needs_no_org() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_url("https://dev.axiom.co")
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        assert_eq!(config.base_url().as_str(), "https://dev.axiom.co/");
    }

    #[test]
    fn test_invalid_url() {
        let err = with_env(&[], || {
            ClientConfig::builder()
                .with_url("not a url")
                .with_access_token(PERSONAL_TOKEN)
                .build()
        })
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_convenience_composites() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_cloud_config(PERSONAL_TOKEN, ORG_ID)
                .build()
        })
        .unwrap();
        assert_eq!(config.base_url().as_str().trim_end_matches('/'), CLOUD_URL);
        assert_eq!(config.org_id(), Some(ORG_ID));

        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_selfhost_config(ENDPOINT, PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://axiom.local/");
        assert_eq!(config.access_token(), PERSONAL_TOKEN);
    }

    #[test]
    fn test_defaults() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_selfhost_config(ENDPOINT, PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        assert_eq!(config.user_agent(), crate::USER_AGENT);
        assert!(!config.strict_decoding());
        assert!(!config.no_limiting());
        assert!(config.retry.is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = with_env(&[], || {
            ClientConfig::builder()
                .with_selfhost_config(ENDPOINT, PERSONAL_TOKEN)
                .build()
        })
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(PERSONAL_TOKEN));
    }
}
