//! HTTP request construction.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::token;

/// Header carrying the organization id on every request.
pub(crate) const HEADER_ORG_ID: &str = "X-Axiom-Org-Id";

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// The method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outgoing request. Lives no longer than the call that created it.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub(crate) method: RequestMethod,
    pub(crate) url: Url,
    pub(crate) body: Option<Value>,
}

impl Request {
    /// Resolve the path against the base URL and authorize the configured
    /// token for it. A `None` body means the request carries no body at all,
    /// not an empty one.
    pub(crate) fn new(
        config: &ClientConfig,
        method: RequestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Self> {
        let url = config
            .base_url
            .join(path)
            .map_err(|e| Error::with_source(ErrorKind::InvalidUrl(path.to_string()), e))?;

        token::authorize(&config.access_token, path)?;

        Ok(Self { method, url, body })
    }
}
