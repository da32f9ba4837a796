//! # axiom-api
//!
//! A client library for the Axiom observability API.
//!
//! This library provides type-safe access to the API with built-in token
//! authorization, client-side rate limit awareness, retry logic and a typed
//! error taxonomy.
//!
//! ## Crates
//!
//! - **axiom-client** - Core HTTP transport engine: configuration, token
//!   authorization, rate limits, retries, error shaping, response decoding
//! - **axiom-rest** - Resource services: Users, Datasets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axiom_api::{AxiomRestClient, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), axiom_api::Error> {
//!     // Reads AXIOM_URL, AXIOM_TOKEN and AXIOM_ORG_ID from the environment.
//!     let client = AxiomRestClient::new(Client::from_env()?);
//!
//!     let me = client.users().current().await?;
//!     println!("signed in as {}", me.name);
//!
//!     client
//!         .datasets()
//!         .ingest("logs", &[serde_json::json!({"level": "info"})])
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

// Re-export the member crates for convenient access.
pub use axiom_client as client;
pub use axiom_rest as rest;

// Re-export commonly used types at the top level.
pub use axiom_client::{
    ApiError, Client, ClientConfig, Error, ErrorKind, Limit, LimitError, LimitKind, LimitScope,
    RequestMethod, Response, RetryConfig,
};
pub use axiom_rest::{AxiomRestClient, DatasetsService, UsersService};
