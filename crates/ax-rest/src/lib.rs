//! # axiom-rest
//!
//! Resource services for the Axiom API.
//!
//! Every service is a thin holder of a handle to the core
//! [`Client`](axiom_client::Client); each operation reduces to a single call
//! with a method, a path and an optional body. The heavy lifting (auth,
//! rate limiting, retries, error shaping, decoding) lives in `axiom-client`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use axiom_client::Client;
//! use axiom_rest::AxiomRestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), axiom_client::Error> {
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

mod client;
mod datasets;
mod users;

pub use client::AxiomRestClient;
pub use datasets::{DatasetsService, IngestStatus};
pub use users::{User, UserRole, UsersService};

// Resource services surface the core error taxonomy unchanged so callers can
// keep matching on sentinels and structured kinds.
pub use axiom_client::{Error, Result};
