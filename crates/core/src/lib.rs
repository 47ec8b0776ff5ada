//! Storeroom Core - Inventory types and query logic.
//!
//! This crate provides the pure half of the Storeroom inventory client.
//! It is shared by:
//! - `storeroom-client` - REST client, paginated fetch loop and query coordinator
//! - `storeroom-cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and functions - no I/O, no HTTP clients,
//! no async runtime. Everything here is a pure function of its inputs, which
//! keeps the filtering and pagination rules testable without a server.
//!
//! # Modules
//!
//! - [`types`] - Inventory records, derived stock status, API payloads
//! - [`filter`] - Filter criteria, server query normalization, predicates
//! - [`paginate`] - Client-side pagination of filtered results
//! - [`sort`] - Column sorting for inventory tables
//! - [`search`] - Product option deduplication for search results
//! - [`merge`] - Supplier conflict detection before merging variants

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod merge;
pub mod paginate;
pub mod search;
pub mod sort;
pub mod types;

pub use filter::{FilterCriteria, FilterForm, SALES_CEILING, SalesRange, ServerQuery, StockRange};
pub use paginate::{ITEMS_PER_PAGE, Page, PageMeta, paginate};
pub use merge::{SupplierConflict, supplier_conflicts};
pub use search::{ProductOption, unique_products};
pub use sort::{Sort, SortKey, SortKeyError, SortOrder};
pub use types::*;
