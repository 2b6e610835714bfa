//! Core types for the product manager.
//!
//! This module provides type-safe wrappers for the product domain.

pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError, parse_price_input};
pub use product::{Product, ProductDraft, ProductError};
pub use status::StockStatus;
