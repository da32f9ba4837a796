//! HTTP response handling: status classification, error decoding and body
//! decoding.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Error, ErrorKind, LimitError, Result};
use crate::limit::Limit;

pub(crate) const MEDIA_TYPE_JSON: &str = "application/json";

/// Response metadata returned alongside the decoded payload.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded payload.
    pub data: T,
    /// HTTP status code.
    pub status: u16,
    /// Limit reported by the response; the zero limit if the server reported
    /// none.
    pub limit: Limit,
}

/// Classify a non-2xx response into the error taxonomy.
///
/// 401 and 403 map to their sentinels, 429 becomes a [`LimitError`] carrying
/// the parsed limit, and everything else becomes an [`ApiError`] decoded from
/// a JSON body when the content type allows, falling back to the canonical
/// status text.
pub(crate) fn parse_error(
    status: u16,
    limit: Limit,
    content_type: Option<&str>,
    body: &str,
) -> Error {
    match status {
        401 => return Error::new(ErrorKind::Unauthenticated),
        403 => return Error::new(ErrorKind::Unauthorized),
        _ => {}
    }

    let decoded: Option<ApiError> = content_type
        .filter(|ct| ct.starts_with(MEDIA_TYPE_JSON))
        .and_then(|_| serde_json::from_str(body).ok());

    if status == 429 {
        let message = decoded
            .map(|err| err.message)
            .unwrap_or_else(|| status_text(status));
        return Error::new(ErrorKind::Limit(LimitError {
            limit,
            message: sanitize_error_message(&message),
        }));
    }

    let api_error = match decoded {
        Some(mut err) => {
            err.status = status;
            err.message = sanitize_error_message(&err.message);
            err
        }
        None => ApiError {
            status,
            message: status_text(status),
            trace_id: None,
        },
    };

    Error::new(ErrorKind::Api(api_error))
}

/// Decode a JSON response body. With strict decoding, fields not present in
/// the destination type fail the decode.
pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8], strict: bool) -> Result<T> {
    if !strict {
        return serde_json::from_slice(bytes).map_err(Error::from);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut unknown: Option<String> = None;
    let data = serde_ignored::deserialize(&mut deserializer, |path| {
        if unknown.is_none() {
            unknown = Some(path.to_string());
        }
    })
    .map_err(Error::from)?;

    if let Some(field) = unknown {
        return Err(Error::new(ErrorKind::Json(format!(
            "unknown field `{field}` in response body"
        ))));
    }

    Ok(data)
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"xa[ap]?t-[a-zA-Z0-9-]{8,}").expect("token pattern is valid")
});

/// Sanitize an error message before surfacing it to callers.
///
/// Removes anything that looks like an access token and truncates excessively
/// long messages.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = TOKEN_PATTERN
        .replace_all(message, "[REDACTED_TOKEN]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        sanitized.truncate(MAX_LENGTH);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
