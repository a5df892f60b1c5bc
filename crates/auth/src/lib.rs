//! Supabase Auth (GoTrue) client for coopbook
//!
//! Sign-up, password sign-in, current-user lookup, token refresh and sign-out.
//! The client never stores a session: every call that needs one takes the
//! token explicitly, and the caller decides where the session lives.

use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {message} (Status: {status})")]
    ApiError { message: String, status: StatusCode },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,
}

impl AuthError {
    /// The provider rejected the credentials or token (4xx).
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::ApiError { status, .. } if status.is_client_error())
    }
}

/// Authenticated user as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Tokens issued by a sign-in, sign-up or refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Unix timestamp; filled in from `expires_in` when the provider omits it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: User,
}

impl Session {
    fn stamp_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(unix_now() + self.expires_in);
        }
        self
    }

    /// True once `expires_at` has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| unix_now() >= at)
    }
}

/// Result of a sign-up. Projects with email confirmation enabled return the
/// user without a session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    PendingConfirmation(User),
}

#[derive(Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Auth client
#[derive(Debug, Clone)]
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
}

impl Auth {
    /// `url` is the project URL; requests go to `{url}/auth/v1/...`.
    pub fn new(url: &str, key: &str, http_client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Register a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, AuthError> {
        let url = format!("{}/auth/v1/signup", self.url);
        debug!("Signing up {}", email);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .json(&payload)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(session) => SignUpResponse::Session(session.stamp_expiry()),
            pending => pending,
        })
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.url);
        debug!("Signing in {}", email);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .json(&payload)
            .send()
            .await?;

        let session: Session = check_status(response).await?.json().await?;
        Ok(session.stamp_expiry())
    }

    /// Look up the user that owns `access_token`
    pub async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = format!("{}/auth/v1/user", self.url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::MissingSession);
        }
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.url);

        let payload = serde_json::json!({
            "refresh_token": refresh_token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .json(&payload)
            .send()
            .await?;

        let session: Session = check_status(response).await?.json().await?;
        Ok(session.stamp_expiry())
    }

    /// Revoke the session behind `access_token`
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    warn!("Auth request failed with {}: {}", status, error_text);

    let message = serde_json::from_str::<ErrorBody>(&error_text)
        .ok()
        .and_then(|body| {
            body.error_description
                .or(body.msg)
                .or(body.message)
                .or(body.error)
        })
        .unwrap_or(error_text);

    Err(AuthError::ApiError { message, status })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
