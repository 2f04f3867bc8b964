//! Users, roles and sessions
//!
//! Passwords are stored as Argon2id PHC strings. Sessions are random tokens
//! with an expiry; each carries the user's current scope and at most one
//! pending flash message.

use crate::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::{Row, SqlitePool};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::UNIVERSAL_SCOPE;

const SESSION_TOKEN_LENGTH: usize = 48;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub identifier: i64,
    pub email: String,
    pub active: bool,
    pub roles: Vec<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Flash message severity, used as a CSS class by the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCategory {
    Success,
    Warning,
    Danger,
}

impl FlashCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Warning => "warning",
            FlashCategory::Danger => "danger",
        }
    }
}

impl fmt::Display for FlashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlashCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(FlashCategory::Success),
            "warning" => Ok(FlashCategory::Warning),
            "danger" => Ok(FlashCategory::Danger),
            other => Err(Error::InvalidInput(format!("Unknown flash category: {}", other))),
        }
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashCategory::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashCategory::Warning, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_identifier: i64,
    pub expires_at: i64,
    pub current_scope: String,
}

/// Hash a password using Argon2id
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Auth(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Auth(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Emails compare case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// User, role and session persistence
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with the given roles
    ///
    /// Fails with `InvalidInput` if the email is already registered.
    pub async fn create_user(&self, email: &str, password: &str, roles: &[&str]) -> Result<User> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;
        let mut tx = self.pool.begin().await?;

        let identifier: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password_hash) VALUES (?, ?) RETURNING identifier",
        )
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Error::InvalidInput(format!("Email already registered: {}", email))
            }
            e => Error::Database(e),
        })?;

        for role in roles {
            sqlx::query("INSERT INTO user_roles (user_identifier, role_name) VALUES (?, ?)")
                .bind(identifier)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!("Created user {} ({})", identifier, email);
        Ok(User {
            identifier,
            email,
            active: true,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        })
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(normalize_email(email))
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn get_user(&self, identifier: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT identifier, email, active FROM users WHERE identifier = ?")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(User {
            identifier: row.get("identifier"),
            email: row.get("email"),
            active: row.get::<i64, _>("active") != 0,
            roles: self.get_roles(identifier).await?,
        }))
    }

    async fn get_roles(&self, user_identifier: i64) -> Result<Vec<String>> {
        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT role_name FROM user_roles WHERE user_identifier = ? ORDER BY role_name",
        )
        .bind(user_identifier)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    /// Check credentials; `None` for unknown email, wrong password or inactive user
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT identifier, password_hash, active FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!("Login attempt for unknown email");
            return Ok(None);
        };

        let password_hash: String = row.get("password_hash");
        if row.get::<i64, _>("active") == 0 || !verify_password(password, &password_hash)? {
            return Ok(None);
        }

        self.get_user(row.get("identifier")).await
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, identifier: i64, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;

        let updated = sqlx::query("UPDATE users SET password_hash = ? WHERE identifier = ?")
            .bind(&password_hash)
            .bind(identifier)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", identifier)));
        }

        info!("Changed password of user {}", identifier);
        Ok(())
    }

    /// Start a session; expired sessions of any user are swept first
    pub async fn create_session(&self, user_identifier: i64, lifetime_seconds: i64) -> Result<Session> {
        let now = now_seconds();
        let swept = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if swept > 0 {
            debug!("Removed {} expired session(s)", swept);
        }

        let token = generate_session_token();
        let expires_at = now + lifetime_seconds;

        sqlx::query(
            "INSERT INTO sessions (token, user_identifier, expires_at, current_scope) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_identifier)
        .bind(expires_at)
        .bind(UNIVERSAL_SCOPE)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            token,
            user_identifier,
            expires_at,
            current_scope: UNIVERSAL_SCOPE.to_string(),
        })
    }

    /// Look up a live session; expired sessions are deleted and reported absent
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, user_identifier, expires_at, current_scope FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session = Session {
            token: row.get("token"),
            user_identifier: row.get("user_identifier"),
            expires_at: row.get("expires_at"),
            current_scope: row.get("current_scope"),
        };

        if session.expires_at <= now_seconds() {
            debug!("Session for user {} expired", session.user_identifier);
            self.delete_session(token).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_current_scope(&self, token: &str, scope: &str) -> Result<()> {
        sqlx::query("UPDATE sessions SET current_scope = ? WHERE token = ?")
            .bind(scope)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store a flash message, replacing any pending one
    pub async fn set_flash(&self, token: &str, flash: &Flash) -> Result<()> {
        sqlx::query("UPDATE sessions SET flash_category = ?, flash_message = ? WHERE token = ?")
            .bind(flash.category.as_str())
            .bind(&flash.message)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove and return the pending flash message
    pub async fn take_flash(&self, token: &str) -> Result<Option<Flash>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT flash_category, flash_message FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let flash = match row {
            Some((Some(category), Some(message))) => Flash::new(category.parse()?, message),
            _ => return Ok(None),
        };

        sqlx::query("UPDATE sessions SET flash_category = NULL, flash_message = NULL WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(flash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Passw0rd1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Passw0rd1", &hash).unwrap());
        assert!(!verify_password("passw0rd1", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("Passw0rd1", "plain-text").is_err());
    }

    #[test]
    fn test_session_tokens_are_random() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), SESSION_TOKEN_LENGTH);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.ORG "), "user@example.org");
    }

    #[test]
    fn test_flash_category_names() {
        assert_eq!("warning".parse::<FlashCategory>().unwrap(), FlashCategory::Warning);
        assert!("info".parse::<FlashCategory>().is_err());
    }
}
