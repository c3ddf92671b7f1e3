//! Admin accounts and sessions.
//!
//! Passwords are stored as bcrypt hashes. A successful login issues a random
//! bearer token recorded in `auth_tokens`; the CLI keeps it in the session
//! file so later invocations act under the same session.

use std::path::Path;

use chrono::{Duration, Utc};
use memories_common::{Error, Result, Session};
use memories_db::models::User;
use memories_db::pool::{get_conn, DbPool};
use memories_db::queries::{auth, users};
use rand::Rng;
use tracing::{debug, info};

use crate::config::AuthConfig;

/// Shortest accepted password.
const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up, login and logout against the local database.
pub struct AuthService {
    pool: DbPool,
    config: AuthConfig,
    cost: u32,
}

impl AuthService {
    pub fn new(pool: DbPool, config: AuthConfig) -> Self {
        Self {
            pool,
            config,
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor.
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Create an admin account.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hash = bcrypt::hash(password, self.cost)
            .map_err(|e| Error::Internal(format!("bcrypt error: {e}")))?;
        let conn = get_conn(&self.pool)?;
        let user = users::create_user(&conn, &email, &hash)?;

        info!(user_id = %user.id, "Created admin account");
        Ok(user)
    }

    /// Verify credentials and open a new session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email)?;
        let conn = get_conn(&self.pool)?;

        let purged = auth::delete_expired_tokens(&conn, Utc::now())?;
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let invalid = || Error::Unauthorized("Invalid credentials".into());
        let user = users::get_user_by_email(&conn, &email)?.ok_or_else(invalid)?;
        if !bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
            return Err(invalid());
        }

        let hours = self.config.session_timeout_hours;
        let expires_at = i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                Error::Validation(format!("session timeout of {hours} hours is out of range"))
            })?;
        let session = auth::create_token(&conn, user.id, &generate_token(), expires_at)?;

        info!(user_id = %user.id, expires_at = %session.expires_at, "Login successful");
        Ok(session)
    }

    /// End the session identified by `token`. Returns false if it was unknown.
    pub fn logout(&self, token: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let removed = auth::delete_token(&conn, token)?;
        debug!(removed, "Logout");
        Ok(removed)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::Validation(format!("invalid email address: {email}"))),
    }
}

/// Random 64-hex-character bearer token.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

// ---------------------------------------------------------------------------
// Session file
// ---------------------------------------------------------------------------

/// Read the saved session token, if any.
pub fn load_session_token(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_session_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token)?;
    Ok(())
}

pub fn clear_session_token(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
