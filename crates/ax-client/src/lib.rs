//! # axiom-client
//!
//! Core HTTP transport engine for the Axiom API.
//!
//! This crate provides the foundational client shared by every resource
//! service:
//! - Access token classification and route authorization
//! - Client-side rate limit awareness with pre-flight short-circuiting
//! - Automatic retry with capped exponential backoff on transient failures
//! - A typed error taxonomy that preserves structured metadata
//! - JSON response decoding (optionally strict) or verbatim byte streaming
//! - Deterministic configuration from defaults, environment and options
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Resource services                        │
//! │  (axiom-rest: Users, Datasets, ...)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │  - Authorizes the token for the requested route             │
//! │  - Short-circuits on exhausted rate limits                  │
//! │  - Retries transient failures with backoff                  │
//! │  - Classifies errors and decodes responses                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  reqwest connection pool                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use axiom_client::{Client, ClientConfig, RequestMethod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), axiom_client::Error> {
//!     // Reads AXIOM_URL, AXIOM_TOKEN and AXIOM_ORG_ID from the environment.
//!     let client = Client::from_env()?;
//!
//!     let user: axiom_client::Response<serde_json::Value> = client
//!         .call::<_, ()>(RequestMethod::Get, "/v1/user", None)
//!         .await?;
//!
//!     println!("{}", user.data);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod limit;
mod request;
mod response;
mod retry;
mod token;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ApiError, Error, ErrorKind, LimitError, Result};
pub use limit::{Limit, LimitKind, LimitScope, LimitStore};
pub use request::RequestMethod;
pub use response::Response;
pub use retry::{Backoff, RetryConfig};
pub use token::{is_api_token, is_personal_token};

/// URL of the hosted Axiom deployment.
pub const CLOUD_URL: &str = "https://cloud.axiom.co";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("axiom-rs/", env!("CARGO_PKG_VERSION"));
