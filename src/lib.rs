//! Near-duplicate detection and reconciliation for scanned product catalogs.
//!
//! Pure scoring and decision logic lives in [`engine`] and [`util`]; [`service`]
//! runs it against a [`store::CatalogStore`] snapshot and writes the results back.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod util;
