//! Database query modules.

pub mod auth;
pub mod collections;
pub mod gallery;
pub mod site_content;
pub mod slider;
pub mod users;

use memories_common::{Error, Result};
use rusqlite::{Params, Statement};

use crate::models::FromRow;

/// Run a prepared statement and collect every mapped row.
pub(crate) fn collect_rows<T: FromRow, P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<Vec<T>> {
    stmt.query_map(params, T::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))
}
