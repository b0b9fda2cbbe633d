//! devs-core: shared library for the DEVS content platform.
//!
//! Provides:
//! - `table`: headless data table state (ordering, pinning, selection, sort, filter, paging)
//! - `editor`: rich-text editor mode switch
//! - `prefs`: persisted UI preferences with explicit load/save
//! - `analytics`: web-vitals ingestion and aggregation
//! - `content`: posts, categories, users and their table rows
//! - `validation`: form validation for authoring, profile and category forms
//! - `fmt`: shared formatting helpers (counts, dates, truncation)
//!
//! With `client` feature (default):
//! - `client`: typed GraphQL client for the external content API
//!
//! With `api` feature:
//! - `api`: JSON-serializable API types with OpenAPI schemas

pub mod analytics;
pub mod content;
pub mod editor;
pub mod fmt;
pub mod prefs;
pub mod table;
pub mod validation;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "api")]
pub mod api;

/// Crate version with the short git SHA of the build.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_SHA"));
