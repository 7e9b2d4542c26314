//! Order Desk Core - Cart, checkout and order types.
//!
//! This crate provides the domain model shared by all Order Desk components:
//! - `client` - REST API client, file-backed storage, checkout submission
//! - `cli` - The `order-desk` command-line tool
//!
//! # Architecture
//!
//! The core crate contains types, validation and the cart store - no network
//! access and no filesystem access. Persistence goes through the
//! [`cart::KeyValueStore`] trait so the store can be backed by memory in
//! tests and by files in the CLI.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product/order IDs, prices and statuses
//! - [`cart`] - Cart lines, the cart map and the persisted [`cart::CartStore`]
//! - [`catalog`] - Products as served by the catalog endpoints
//! - [`checkout`] - Checkout form validation and order request assembly
//! - [`entry`] - Staff order entry from the dashboard
//! - [`orders`] - Order read model, local filtering and summaries
//! - [`stats`] - Dashboard statistics
//! - [`samples`] - Offline fallback data

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod entry;
pub mod orders;
pub mod samples;
pub mod stats;
pub mod types;

mod wire;

pub use types::*;
