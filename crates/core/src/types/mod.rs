//! Core types for Storeroom.
//!
//! This module provides the inventory domain types shared by the client and
//! the command-line front end.

pub mod id;
pub mod lenient;
pub mod page;
pub mod record;
pub mod status;
pub mod variant;

pub use id::*;
pub use page::PaginatedResponse;
pub use record::InventoryRecord;
pub use status::{StockStatus, StockStatusError};
pub use variant::*;
