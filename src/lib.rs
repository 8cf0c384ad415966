//! Scholarship discovery: scrape listings, load them into a document store,
//! enrich them with structured fields extracted by a hosted language model,
//! and search, filter and analyze the collection.
//!
//! # Pipeline
//!
//! Each stage runs on its own and shares only the SQLite store:
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Scrape | [`scrape`] | JSON array of `{id, url, description}` |
//! | Load | [`scholarship::load`] | one stored document per JSON object or CSV row |
//! | Augment | [`augment`] | extracted fields merged into pending documents |
//! | Search | [`scholarship::filter`], [`web`] | filtered, sorted, paginated results |
//! | Analyze | [`analysis`] | clusters, topics and text metrics |
//!
//! # Modules
//!
//! - [`config`]: configuration from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations and health checks
//! - [`scholarship`]: the record type, store, filters, loaders and sessions
//! - [`web`]: the axum router behind `equalify serve`

pub mod analysis;
pub mod augment;
pub mod config;
pub mod db;
pub mod scholarship;
pub mod scrape;
pub mod web;
