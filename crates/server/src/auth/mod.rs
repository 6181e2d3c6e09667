//! Authentication Module
//!
//! Handles user registration, login, and token issuance. Access tokens are
//! short-lived JWTs; refresh tokens are opaque, stored in SQLite, and
//! rotated on every use.

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{TokenPair, User, UserInfo};

pub mod middleware;

/// JWT claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Auth manager handles all authentication
pub struct AuthManager {
    pool: SqlitePool,
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthManager {
    /// Create new auth manager and initialize its tables
    pub async fn new(
        pool: SqlitePool,
        jwt_secret: String,
        access_ttl_secs: i64,
        refresh_ttl_days: i64,
    ) -> Result<Self> {
        let manager = Self {
            pool,
            jwt_secret,
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::days(refresh_ttl_days),
        };

        manager.init_db().await?;

        info!("[Auth] Initialized (access ttl {}s)", access_ttl_secs);

        Ok(manager)
    }

    /// Initialize SQLite tables
    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT,
                is_active INTEGER DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS refresh_tokens (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Register a new user
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        // Check if username already exists
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(anyhow::anyhow!(
                "username: A user with that username already exists."
            ));
        }

        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at, is_active) VALUES (?, ?, ?, 1)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let user = User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash,
            created_at,
            last_login: None,
            is_active: true,
        };

        info!("[Auth] User registered: {}", username);

        Ok(user)
    }

    /// Login user and issue a fresh token pair
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, TokenPair)> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ? AND is_active = 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let (user_id, username, password_hash, created_at) =
            row.ok_or_else(|| anyhow::anyhow!("Invalid username or password"))?;

        let valid = verify(password, &password_hash).context("Failed to verify password")?;

        if !valid {
            warn!("[Auth] Failed login attempt for {}", username);
            return Err(anyhow::anyhow!("Invalid username or password"));
        }

        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let pair = self.issue_pair(user_id).await?;

        let user = User {
            id: user_id,
            username,
            password_hash: String::new(), // Don't return hash
            created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
            last_login: Some(now),
            is_active: true,
        };

        info!("[Auth] User logged in: {}", user.username);

        Ok((user, pair))
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// consumed even when it turns out to be expired.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT user_id, expires_at FROM refresh_tokens WHERE token = ?")
                .bind(refresh_token)
                .fetch_optional(&self.pool)
                .await?;

        let (user_id, expires_at) = row.ok_or_else(|| anyhow::anyhow!("Unknown refresh token"))?;

        sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;

        let expires: DateTime<Utc> = expires_at
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid date"))?;
        if expires <= Utc::now() {
            warn!("[Auth] Expired refresh token for user {}", user_id);
            return Err(anyhow::anyhow!("Refresh token expired"));
        }

        let pair = self.issue_pair(user_id).await?;

        info!("[Auth] Token pair rotated for user {}", user_id);

        Ok(pair)
    }

    /// Revoke a refresh token (logout)
    pub async fn revoke(&self, refresh_token: &str) -> Result<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;

        info!("[Auth] Refresh token revoked");

        Ok(())
    }

    /// Verify an access token and return the user id it was issued to
    pub fn verify_access(&self, token: &str) -> Result<i64> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .context("Invalid access token")?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .context("Invalid subject claim")?;

        Ok(user_id)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<UserInfo> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT id, username, created_at FROM users WHERE id = ? AND is_active = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id, username, created_at)) = row {
            Ok(UserInfo {
                id,
                username,
                created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
            })
        } else {
            Err(anyhow::anyhow!("User not found"))
        }
    }

    /// Issue a new access/refresh pair for the user
    async fn issue_pair(&self, user_id: i64) -> Result<TokenPair> {
        let now = Utc::now();
        let access = self.make_access_token(user_id, now)?;
        let refresh = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&refresh)
        .bind(user_id)
        .bind(now.to_rfc3339())
        .bind((now + self.refresh_ttl).to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TokenPair { access, refresh })
    }

    fn make_access_token(&self, user_id: i64, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.access_ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to sign access token")?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn test_pool(dir: &std::path::Path) -> SqlitePool {
        let options = SqliteConnectOptions::new()
            .filename(dir.join("auth_test.sqlite"))
            .create_if_missing(true);
        SqlitePoolOptions::new().connect_with(options).await.unwrap()
    }

    #[tokio::test]
    async fn access_token_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(dir.path()).await;
        let auth = AuthManager::new(pool, "secret-a".to_string(), 900, 30)
            .await
            .unwrap();

        let user = auth.register("alice", "hunter2").await.unwrap();
        let (_, pair) = auth.login("alice", "hunter2").await.unwrap();

        assert_eq!(auth.verify_access(&pair.access).unwrap(), user.id);
    }

    #[tokio::test]
    async fn access_token_rejects_wrong_secret() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(dir.path()).await;
        let auth = AuthManager::new(pool.clone(), "secret-a".to_string(), 900, 30)
            .await
            .unwrap();
        let other = AuthManager::new(pool, "secret-b".to_string(), 900, 30)
            .await
            .unwrap();

        auth.register("alice", "hunter2").await.unwrap();
        let (_, pair) = auth.login("alice", "hunter2").await.unwrap();

        assert!(other.verify_access(&pair.access).is_err());
    }

    #[tokio::test]
    async fn refresh_consumes_presented_token() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(dir.path()).await;
        let auth = AuthManager::new(pool, "secret-a".to_string(), 900, 30)
            .await
            .unwrap();

        auth.register("alice", "hunter2").await.unwrap();
        let (_, pair) = auth.login("alice", "hunter2").await.unwrap();

        let rotated = auth.refresh(&pair.refresh).await.unwrap();
        assert_ne!(rotated.refresh, pair.refresh);

        // A second use of the original token must fail
        assert!(auth.refresh(&pair.refresh).await.is_err());
        // The rotated one still works
        assert!(auth.refresh(&rotated.refresh).await.is_ok());
    }
}
