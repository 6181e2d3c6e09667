//! HTTP client for the todo API.
//!
//! Wraps reqwest with bearer credentials taken from the session store.
//! When an authenticated request comes back 401 the client refreshes the
//! token pair and retries the request exactly once; a rejected refresh
//! clears the session and surfaces [`ApiError::SessionExpired`].

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::session::{SessionStore, TokenPair};
use crate::types::{Category, CategoryPayload, Todo, TodoPayload, UserInfo};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshBody<'a> {
    refresh: &'a str,
}

/// The todo API client
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    /// Session behind an async mutex so concurrent requests share one refresh
    session: Arc<Mutex<SessionStore>>,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let session = SessionStore::open(config.session_path.clone());

        Ok(ApiClient {
            http,
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Whether a session is currently stored
    pub async fn is_logged_in(&self) -> bool {
        self.session.lock().await.is_logged_in()
    }

    /// The current token pair, if any
    pub async fn token_pair(&self) -> Option<TokenPair> {
        self.session.lock().await.pair().cloned()
    }

    // ---- auth ----

    /// Register a new account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserInfo> {
        let resp = self
            .http
            .post(self.url("register/"))
            .json(&Credentials { username, password })
            .send()
            .await?;

        expect_json(resp, StatusCode::CREATED).await
    }

    /// Exchange credentials for a token pair and store it
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("token/"))
            .json(&Credentials { username, password })
            .send()
            .await?;

        let pair: TokenPair = expect_json(resp, StatusCode::OK).await?;
        self.session.lock().await.store(pair)?;

        info!("Logged in as {}", username);

        Ok(())
    }

    /// Revoke the refresh token server-side and drop the local session.
    /// The local session is cleared even when the server is unreachable.
    pub async fn logout(&self) -> Result<()> {
        let mut session = self.session.lock().await;

        if let Some(pair) = session.pair() {
            let result = self
                .http
                .post(self.url("logout/"))
                .json(&RefreshBody {
                    refresh: &pair.refresh,
                })
                .send()
                .await;
            if let Err(e) = result {
                debug!("Logout request failed: {}", e);
            }
        }

        session.clear()
    }

    /// Fetch the account behind the current session
    pub async fn current_user(&self) -> Result<UserInfo> {
        let resp = self.send_authed(Method::GET, "me/", None).await?;
        expect_json(resp, StatusCode::OK).await
    }

    // ---- todos ----

    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        let resp = self.send_authed(Method::GET, "todos/", None).await?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo> {
        let resp = self
            .send_authed(Method::GET, &format!("todos/{id}/"), None)
            .await?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn create_todo(&self, payload: &TodoPayload) -> Result<Todo> {
        let body = serde_json::to_value(payload)?;
        let resp = self
            .send_authed(Method::POST, "todos/", Some(&body))
            .await?;
        expect_json(resp, StatusCode::CREATED).await
    }

    pub async fn update_todo(&self, id: i64, payload: &TodoPayload) -> Result<Todo> {
        let body = serde_json::to_value(payload)?;
        let resp = self
            .send_authed(Method::PUT, &format!("todos/{id}/"), Some(&body))
            .await?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn delete_todo(&self, id: i64) -> Result<()> {
        let resp = self
            .send_authed(Method::DELETE, &format!("todos/{id}/"), None)
            .await?;
        expect_empty(resp, StatusCode::NO_CONTENT).await
    }

    // ---- categories ----

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let resp = self.send_authed(Method::GET, "categories/", None).await?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category> {
        let body = serde_json::to_value(payload)?;
        let resp = self
            .send_authed(Method::POST, "categories/", Some(&body))
            .await?;
        expect_json(resp, StatusCode::CREATED).await
    }

    pub async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<Category> {
        let body = serde_json::to_value(payload)?;
        let resp = self
            .send_authed(Method::PUT, &format!("categories/{id}/"), Some(&body))
            .await?;
        expect_json(resp, StatusCode::OK).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let resp = self
            .send_authed(Method::DELETE, &format!("categories/{id}/"), None)
            .await?;
        expect_empty(resp, StatusCode::NO_CONTENT).await
    }

    // ---- internals ----

    /// Send an authenticated request, refreshing and retrying once on 401
    async fn send_authed(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let access = {
            let session = self.session.lock().await;
            session
                .pair()
                .map(|pair| pair.access.clone())
                .ok_or(ApiError::NotLoggedIn)?
        };

        let resp = self.send_raw(method.clone(), path, body, &access).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let access = self.refresh_access(&access).await?;
        self.send_raw(method, path, body, &access).await
    }

    async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        access: &str,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method, self.url(path)).bearer_auth(access);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Refresh the token pair, holding the session lock so concurrent
    /// requests share a single refresh. Returns the access token to retry
    /// with.
    async fn refresh_access(&self, stale_access: &str) -> Result<String> {
        let mut session = self.session.lock().await;

        let pair = session.pair().ok_or(ApiError::NotLoggedIn)?;
        // Another request may have refreshed while we waited for the lock
        if pair.access != stale_access {
            return Ok(pair.access.clone());
        }
        let refresh = pair.refresh.clone();

        debug!("Access token rejected, refreshing");

        let resp = self
            .http
            .post(self.url("token/refresh/"))
            .json(&RefreshBody { refresh: &refresh })
            .send()
            .await?;

        if resp.status() == StatusCode::OK {
            let pair: TokenPair = resp.json().await?;
            let access = pair.access.clone();
            session.store(pair)?;
            Ok(access)
        } else {
            // The server no longer honors our refresh token
            session.clear()?;
            Err(ApiError::SessionExpired)
        }
    }
}

async fn expect_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    expected: StatusCode,
) -> Result<T> {
    if resp.status() == expected {
        return Ok(resp.json().await?);
    }
    Err(status_error(resp).await)
}

async fn expect_empty(resp: reqwest::Response, expected: StatusCode) -> Result<()> {
    if resp.status() == expected {
        return Ok(());
    }
    Err(status_error(resp).await)
}

async fn status_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();

    if status == 404 {
        ApiError::NotFound
    } else {
        ApiError::Http { status, body }
    }
}
