//! Access token classification and route authorization.
//!
//! Tokens are recognized by prefix: `xapt-` marks a personal token, `xaat-`
//! an API token. API tokens can only reach the ingest and query routes;
//! everything else must be rejected before a request is built.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Error, ErrorKind, Result};

/// Routes an API token is allowed to access. The dataset name segment must be
/// non-empty; an optional query string is tolerated.
static API_TOKEN_ROUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/api/v1/datasets/([^/?]+/(ingest|query)|_apl)(\?.*)?$")
        .expect("API token route pattern is valid")
});

/// Returns true if the given access token is a personal token.
pub fn is_personal_token(token: &str) -> bool {
    token.starts_with("xapt-")
}

/// Returns true if the given access token is an API token.
pub fn is_api_token(token: &str) -> bool {
    token.starts_with("xaat-")
}

pub(crate) fn is_api_token_route(path: &str) -> bool {
    API_TOKEN_ROUTES.is_match(path)
}

/// Check that the token may access the given route. Personal and
/// unclassified tokens pass every route; API tokens only the allowlisted
/// ingest/query routes.
pub(crate) fn authorize(token: &str, path: &str) -> Result<()> {
    if is_api_token(token) && !is_api_token_route(path) {
        return Err(Error::new(ErrorKind::UnprivilegedToken));
    }
    Ok(())
}
