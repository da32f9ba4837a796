//! Rate limit types and the client-side limit state store.
//!
//! The server reports quota state through response headers. Three header sets
//! exist, one per limit kind; the scope header carries the actor dimension the
//! quota applies to. The most recent snapshot per (scope, kind) pair is kept
//! in a [`LimitStore`] shared by all in-flight calls, which lets the client
//! refuse requests locally when a quota is known to be exhausted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;

pub(crate) const HEADER_RATE_SCOPE: &str = "X-RateLimit-Scope";
pub(crate) const HEADER_RATE_LIMIT: &str = "X-RateLimit-Limit";
pub(crate) const HEADER_RATE_REMAINING: &str = "X-RateLimit-Remaining";
pub(crate) const HEADER_RATE_RESET: &str = "X-RateLimit-Reset";

pub(crate) const HEADER_QUERY_SCOPE: &str = "X-QueryLimit-Scope";
pub(crate) const HEADER_QUERY_LIMIT: &str = "X-QueryLimit-Limit";
pub(crate) const HEADER_QUERY_REMAINING: &str = "X-QueryLimit-Remaining";
pub(crate) const HEADER_QUERY_RESET: &str = "X-QueryLimit-Reset";

pub(crate) const HEADER_INGEST_SCOPE: &str = "X-IngestLimit-Scope";
pub(crate) const HEADER_INGEST_LIMIT: &str = "X-IngestLimit-Limit";
pub(crate) const HEADER_INGEST_REMAINING: &str = "X-IngestLimit-Remaining";
pub(crate) const HEADER_INGEST_RESET: &str = "X-IngestLimit-Reset";

/// The actor dimension a [`Limit`] applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LimitScope {
    /// The scope is unknown or was not reported.
    #[default]
    Unknown,
    /// The limit applies to the authenticated user.
    User,
    /// The limit applies to the whole organization.
    Organization,
    /// The limit applies to unauthenticated callers.
    Anonymous,
}

impl LimitScope {
    fn from_header(value: &str) -> Self {
        match value {
            "user" => LimitScope::User,
            "organization" => LimitScope::Organization,
            "anonymous" => LimitScope::Anonymous,
            _ => LimitScope::Unknown,
        }
    }
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LimitScope::Unknown => "unknown",
            LimitScope::User => "user",
            LimitScope::Organization => "organization",
            LimitScope::Anonymous => "anonymous",
        };
        f.write_str(s)
    }
}

/// The kind of quota a [`Limit`] describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// General request rate.
    #[default]
    Rate,
    /// Query quota.
    Query,
    /// Ingest quota.
    Ingest,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LimitKind::Rate => "rate",
            LimitKind::Query => "query",
            LimitKind::Ingest => "ingest",
        };
        f.write_str(s)
    }
}

/// Quota snapshot extracted from response headers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    /// The actor dimension the limit applies to.
    pub scope: LimitScope,
    /// The kind of quota.
    pub kind: LimitKind,
    /// Maximum number of requests in the current window.
    pub limit: u64,
    /// Requests remaining in the current window.
    pub remaining: u64,
    /// Time at which the window resets.
    pub reset: SystemTime,
}

impl Default for Limit {
    fn default() -> Self {
        Self {
            scope: LimitScope::Unknown,
            kind: LimitKind::Rate,
            limit: 0,
            remaining: 0,
            reset: UNIX_EPOCH,
        }
    }
}

impl Limit {
    /// Returns true if the limit carries no server-reported state.
    pub fn is_zero(&self) -> bool {
        *self == Limit::default()
    }

    /// Time until the window resets; zero if the reset is in the past.
    pub fn reset_in(&self) -> Duration {
        self.reset
            .duration_since(SystemTime::now())
            .unwrap_or_default()
    }

    /// Extract the limit reported by a response, if any.
    ///
    /// The kind is selected by header presence: query headers win over ingest
    /// headers, which win over the general rate headers.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Limit {
        let sets = [
            (
                LimitKind::Query,
                HEADER_QUERY_SCOPE,
                HEADER_QUERY_LIMIT,
                HEADER_QUERY_REMAINING,
                HEADER_QUERY_RESET,
            ),
            (
                LimitKind::Ingest,
                HEADER_INGEST_SCOPE,
                HEADER_INGEST_LIMIT,
                HEADER_INGEST_REMAINING,
                HEADER_INGEST_RESET,
            ),
            (
                LimitKind::Rate,
                HEADER_RATE_SCOPE,
                HEADER_RATE_LIMIT,
                HEADER_RATE_REMAINING,
                HEADER_RATE_RESET,
            ),
        ];

        for (kind, scope, limit, remaining, reset) in sets {
            if headers.contains_key(limit) {
                return Limit {
                    scope: LimitScope::from_header(header_str(headers, scope).unwrap_or_default()),
                    kind,
                    limit: header_u64(headers, limit),
                    remaining: header_u64(headers, remaining),
                    reset: UNIX_EPOCH + Duration::from_secs(header_u64(headers, reset)),
                };
            }
        }

        Limit::default()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn header_u64(headers: &HeaderMap, name: &str) -> u64 {
    header_str(headers, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Format a duration the way the API's error messages expect, e.g. `59m59s`
/// or `1h0m0s`. Sub-second precision is truncated.
pub(crate) fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

/// Shared store of the most recent [`Limit`] per (scope, kind) pair.
///
/// Writes happen only after a response is fully parsed; readers copy the
/// snapshot. A plain mutex is enough here, the write rate is bounded by the
/// response arrival rate.
#[derive(Debug, Default)]
pub struct LimitStore {
    entries: Mutex<HashMap<(LimitScope, LimitKind), Limit>>,
}

impl LimitStore {
    /// The most recent limit observed for the given pair, or the zero limit
    /// if none was seen.
    pub fn get(&self, scope: LimitScope, kind: LimitKind) -> Limit {
        self.entries
            .lock()
            .expect("limit store lock poisoned")
            .get(&(scope, kind))
            .copied()
            .unwrap_or_default()
    }

    /// Upsert the entry for the limit's (scope, kind) pair.
    pub fn set(&self, limit: Limit) {
        self.entries
            .lock()
            .expect("limit store lock poisoned")
            .insert((limit.scope, limit.kind), limit);
    }

    /// Returns a stored limit of the given kind that is exhausted and whose
    /// reset time is still in the future, if any.
    pub(crate) fn exhausted(&self, kind: LimitKind) -> Option<Limit> {
        let now = SystemTime::now();
        self.entries
            .lock()
            .expect("limit store lock poisoned")
            .values()
            .find(|limit| limit.kind == kind && limit.remaining == 0 && limit.reset > now)
            .copied()
    }
}
