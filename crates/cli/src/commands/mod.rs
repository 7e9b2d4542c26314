//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod stats;

use order_desk_client::{ApiClient, ApiError, ClientConfig, ConfigError, FileStore};
use order_desk_core::cart::CartStore;
use thiserror::Error;

/// Errors that can occur while setting up a command.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create API client: {0}")]
    Client(#[from] ApiError),
}

/// Shared state for every command: the API client and the cart location.
pub struct Context {
    pub client: ApiClient,
    pub config: ClientConfig,
}

impl Context {
    /// Build the context from `ORDER_DESK_*` environment variables.
    pub fn from_env() -> Result<Self, ContextError> {
        let config = ClientConfig::from_env()?;
        let client = ApiClient::new(&config)?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(Self { client, config })
    }

    /// Load the persisted cart.
    pub fn cart(&self) -> CartStore<FileStore> {
        CartStore::load(FileStore::new(&self.config.data_dir))
    }
}
