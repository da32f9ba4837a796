//! Registry of resource services sharing one core client.

use axiom_client::Client;

use crate::datasets::DatasetsService;
use crate::users::UsersService;

/// Typed access to the Axiom API resources.
///
/// The registry is built once and never mutated; every service holds its own
/// clone of the core [`Client`], which all share the same transport pool,
/// configuration and rate limit state.
#[derive(Debug, Clone)]
pub struct AxiomRestClient {
    client: Client,
    users: UsersService,
    datasets: DatasetsService,
}

impl AxiomRestClient {
    /// Create the service registry from a core client.
    pub fn new(client: Client) -> Self {
        Self {
            users: UsersService::new(client.clone()),
            datasets: DatasetsService::new(client.clone()),
            client,
        }
    }

    /// User related operations.
    pub fn users(&self) -> &UsersService {
        &self.users
    }

    /// Dataset related operations.
    pub fn datasets(&self) -> &DatasetsService {
        &self.datasets
    }

    /// The underlying core client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use axiom_client::ClientConfig;

    use super::*;

    #[test]
    fn test_registry_shares_the_core_client() {
        let client = Client::new(
            ClientConfig::builder()
                .with_no_env()
                .with_url("http://axiom.local")
                .with_access_token("xapt-XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX")
                .build()
                .unwrap(),
        );

        let rest = AxiomRestClient::new(client);

        // Reconfiguration through any handle is visible to all services.
        rest.inner()
            .options(|builder| builder.with_user_agent("custom-agent/1.0"))
            .unwrap();
        assert_eq!(rest.inner().config().user_agent(), "custom-agent/1.0");
    }
}
