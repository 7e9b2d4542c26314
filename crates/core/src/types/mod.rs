//! Core types for Order Desk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{PriceError, UnitPrice, format_rupees};
pub use status::*;
