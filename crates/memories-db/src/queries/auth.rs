//! Authentication token operations.

use chrono::{DateTime, Utc};
use memories_common::{Error, Result, Session, SessionId, UserId};
use rusqlite::Connection;

use crate::models::{timestamp, FromRow};

const COLS: &str = "id, user_id, token, expires_at";

/// Create a new auth token.
pub fn create_token(
    conn: &Connection,
    user_id: UserId,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    let id = SessionId::new();

    conn.execute(
        "INSERT INTO auth_tokens (id, user_id, token, expires_at) VALUES (?1,?2,?3,?4)",
        rusqlite::params![id.to_string(), user_id.to_string(), token, timestamp(expires_at)],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Session {
        id,
        user_id,
        token: token.to_string(),
        expires_at,
    })
}

/// Look up a token by its value.
pub fn get_token(conn: &Connection, token: &str) -> Result<Option<Session>> {
    let q = format!("SELECT {COLS} FROM auth_tokens WHERE token = ?1");
    match conn.query_row(&q, [token], Session::from_row) {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Delete a specific token by value.
pub fn delete_token(conn: &Connection, token: &str) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM auth_tokens WHERE token = ?1", [token])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete all tokens that expired before `now`.
pub fn delete_expired_tokens(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM auth_tokens WHERE expires_at < ?1",
        [timestamp(now)],
    )
    .map_err(|e| Error::database(e.to_string()))
}
