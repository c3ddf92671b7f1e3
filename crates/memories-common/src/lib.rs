//! memories-common: shared types, IDs and errors.
//!
//! This crate is the foundational dependency for the other memories crates,
//! providing type-safe identifiers, a unified error type and the content
//! domain types that flow between the store, the database and the
//! ingestion service.

pub mod content;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use content::*;
pub use error::{Error, Result};
pub use ids::*;
