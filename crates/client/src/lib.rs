//! Storeroom Client - Inventory API access.
//!
//! Talks to the ERP's REST API and turns filter criteria into table pages:
//!
//! - [`InventoryApiClient`] - typed wrapper over the REST endpoints
//! - [`pages`] - the sequential fetch loop behind full scans
//! - [`InventoryQuery`] - picks server or client-side pagination, caches
//!   list responses and clears them on mutation
//! - [`ClientConfig`] - settings loaded from `STOREROOM_*` environment variables

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod pages;
pub mod query;
mod variants;

pub use client::InventoryApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use pages::{VariantSource, collect_all, variant_pages};
pub use query::{InventoryQuery, InventoryView};
