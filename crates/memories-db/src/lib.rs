//! memories-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, row mapping and query modules for the site content,
//! both ordered image collections, admin users and their sessions.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
