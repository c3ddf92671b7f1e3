//! memories - admin tooling for a personal memories site
//!
//! This library crate exposes the ingestion service, the content stores and
//! the supporting configuration for the CLI and for integration testing.

pub mod auth;
pub mod config;
pub mod ingest;
pub mod storage;
pub mod store;
