//! User related operations.

use axiom_client::{Client, RequestMethod, Result};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The role of a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    None,
    ReadOnly,
    User,
    Admin,
    Owner,
    /// Catch-all for roles the client does not know about.
    #[serde(other)]
    Custom,
}

/// A user of the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Unique id of the user.
    pub id: String,
    /// Name of the user.
    pub name: String,
    /// Email addresses of the user.
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Handles communication with the user related operations of the API.
#[derive(Debug, Clone)]
pub struct UsersService {
    client: Client,
}

impl UsersService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Retrieve the authenticated user.
    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<User> {
        let resp = self
            .client
            .call::<User, ()>(RequestMethod::Get, "/v1/user", None)
            .await?;
        Ok(resp.data)
    }
}
