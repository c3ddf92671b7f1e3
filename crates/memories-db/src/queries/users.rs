//! Admin user operations.

use memories_common::{Error, Result, UserId};
use rusqlite::Connection;

use crate::models::{now, timestamp, FromRow, User};

const COLS: &str = "id, email, password_hash, created_at";

/// Create a new user and return it.
pub fn create_user(conn: &Connection, email: &str, password_hash: &str) -> Result<User> {
    let id = UserId::new();
    let created_at = now();

    conn.execute(
        "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), email, password_hash, timestamp(created_at)],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::Conflict(format!("User '{email}' already exists"))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(User {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at,
    })
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a user by email address.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE email = ?1");
    match conn.query_row(&q, [email], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let u = create_user(&conn, "admin@example.com", "hash").unwrap();

        let found = get_user_by_id(&conn, u.id).unwrap().unwrap();
        assert_eq!(found.email, "admin@example.com");

        let by_email = get_user_by_email(&conn, "admin@example.com").unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(u.id));
    }

    #[test]
    fn duplicate_email() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_user(&conn, "dup@example.com", "h1").unwrap();
        let err = create_user(&conn, "dup@example.com", "h2").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn unknown_email() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(get_user_by_email(&conn, "nobody@example.com").unwrap().is_none());
    }
}
