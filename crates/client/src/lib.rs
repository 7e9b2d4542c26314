//! Order Desk client library.
//!
//! Everything that touches the outside world lives here:
//!
//! - [`config`] - Configuration loaded from environment variables
//! - [`api`] - Client for the store's REST API, with offline fallbacks
//! - [`store`] - File-backed key-value storage for the cart
//! - [`checkout`] - Order submission from a cart or a dashboard entry
//! - [`export`] - CSV export of order listings and the statistics report

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod export;
pub mod store;

pub use api::{ApiClient, ApiError, DataSource, Fetched};
pub use config::{ClientConfig, ConfigError};
pub use store::{FileStore, StoreError};
