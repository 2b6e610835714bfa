//! Product Manager Core - Shared domain types.
//!
//! This crate provides the types used by the product manager components:
//! - `admin` - The product form server (list, create, update, delete)
//! - `integration-tests` - Router and client tests
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. Persistence lives behind the admin crate's `ProductStore` seam.
//!
//! # Modules
//!
//! - [`types`] - Opaque document IDs, prices, products and drafts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
