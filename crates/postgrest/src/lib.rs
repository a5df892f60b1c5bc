//! PostgREST client for the coopbook data layer
//!
//! This crate builds and executes single-table requests against a Supabase
//! PostgREST endpoint (`{base_url}/rest/v1/{table}`).
//!
//! # Features
//!
//! - Query API (`select`, `insert`, `update`, `delete`, `count`)
//! - Filtering (`eq`, `gte`, `lte`, `is_null`)
//! - Ordering and limits
//! - Parsed PostgREST error details (`code`, `message`, `details`, `hint`)

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_RANGE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// PostgreSQL error code raised when a row is still referenced by a foreign key.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Error body returned by PostgREST
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostgrestApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: PostgrestApiErrorDetails,
        status: StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError { message: String, status: StatusCode },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl PostgrestError {
    /// PostgreSQL / PostgREST error code, when the server sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            PostgrestError::ApiError { details, .. } => details.code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PostgrestError::ApiError { status, .. }
            | PostgrestError::UnparsedApiError { status, .. } => Some(*status),
            PostgrestError::NetworkError(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.code() == Some(FOREIGN_KEY_VIOLATION)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Request builder for one table.
///
/// Filters keep their insertion order, so several conditions on the same
/// column (`date=gte.…&date=lte.…`) are all sent.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    table: String,
    http_client: Client,
    headers: HeaderMap,
    bearer: Option<String>,
    query_params: Vec<(String, String)>,
}

impl PostgrestClient {
    /// Create a client for `table` under `{base_url}/rest/v1/`.
    pub fn new(base_url: &str, api_key: &str, table: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            http_client,
            headers: HeaderMap::new(),
            bearer: None,
            query_params: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Add a request header
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, PostgrestError> {
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header value: {}", value))
        })?;
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header name: {}", key))
        })?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Send requests on behalf of a signed-in user.
    pub fn with_auth(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// Target a non-default database schema.
    pub fn schema(self, schema_name: &str) -> Result<Self, PostgrestError> {
        self.with_header("Accept-Profile", schema_name)?
            .with_header("Content-Profile", schema_name)
    }

    /// Columns to return
    pub fn select(mut self, columns: &str) -> Self {
        self.query_params.retain(|(k, _)| k != "select");
        self.query_params
            .push(("select".to_string(), columns.to_string()));
        self
    }

    fn filter(mut self, column: &str, operator: &str, value: &str) -> Self {
        self.query_params
            .push((column.to_string(), format!("{}.{}", operator, value)));
        self
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: &str) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lte(self, column: &str, value: &str) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    /// Sort by a column. Repeated calls add secondary sort keys.
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        let term = format!("{}.{}", column, order.as_str());
        match self.query_params.iter_mut().find(|(k, _)| k == "order") {
            Some((_, existing)) => {
                existing.push(',');
                existing.push_str(&term);
            }
            None => self.query_params.push(("order".to_string(), term)),
        }
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.query_params.retain(|(k, _)| k != "limit");
        self.query_params
            .push(("limit".to_string(), count.to_string()));
        self
    }

    fn build_url(&self) -> Result<Url, PostgrestError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?;
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request_headers(&self, prefer: Option<&'static str>) -> Result<HeaderMap, PostgrestError> {
        let mut headers = self.headers.clone();
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| PostgrestError::InvalidParameters("Invalid API key".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                PostgrestError::InvalidParameters("Invalid access token".to_string())
            })?;
            headers.insert("Authorization", value);
        }
        if let Some(prefer) = prefer {
            headers.insert(
                HeaderName::from_static("prefer"),
                HeaderValue::from_static(prefer),
            );
        }
        Ok(headers)
    }

    /// Fetch matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, PostgrestError> {
        let url = self.build_url()?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .headers(self.request_headers(None)?)
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
    }

    /// Count matching rows without transferring them.
    pub async fn count(&self) -> Result<u64, PostgrestError> {
        let url = self.build_url()?;
        debug!("HEAD {} (count=exact)", url);

        let response = self
            .http_client
            .head(url)
            .headers(self.request_headers(Some("count=exact"))?)
            .send()
            .await?;

        let response = check_status(response).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                PostgrestError::DeserializationError("Missing Content-Range header".to_string())
            })?;
        parse_content_range_total(range)
    }

    /// Insert rows and return their stored representation.
    pub async fn insert<T, R>(&self, values: &T) -> Result<Vec<R>, PostgrestError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.build_url()?;
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(url)
            .headers(self.request_headers(Some("return=representation"))?)
            .json(values)
            .send()
            .await?;

        read_representation(check_status(response).await?).await
    }

    /// Update the rows selected by the current filters and return them.
    pub async fn update<T, R>(&self, values: &T) -> Result<Vec<R>, PostgrestError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if !self.has_filters() {
            return Err(PostgrestError::InvalidParameters(
                "Refusing to update without a filter".to_string(),
            ));
        }
        let url = self.build_url()?;
        debug!("PATCH {}", url);

        let response = self
            .http_client
            .patch(url)
            .headers(self.request_headers(Some("return=representation"))?)
            .json(values)
            .send()
            .await?;

        read_representation(check_status(response).await?).await
    }

    /// Delete the rows selected by the current filters and return them.
    pub async fn delete<R: DeserializeOwned>(&self) -> Result<Vec<R>, PostgrestError> {
        if !self.has_filters() {
            return Err(PostgrestError::InvalidParameters(
                "Refusing to delete without a filter".to_string(),
            ));
        }
        let url = self.build_url()?;
        debug!("DELETE {}", url);

        let response = self
            .http_client
            .delete(url)
            .headers(self.request_headers(Some("return=representation"))?)
            .send()
            .await?;

        read_representation(check_status(response).await?).await
    }

    fn has_filters(&self) -> bool {
        self.query_params
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
    }
}

async fn check_status(response: Response) -> Result<Response, PostgrestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    warn!("PostgREST request failed with {}: {}", status, error_text);

    match serde_json::from_str::<PostgrestApiErrorDetails>(&error_text) {
        Ok(details) => Err(PostgrestError::ApiError { details, status }),
        Err(_) => Err(PostgrestError::UnparsedApiError {
            message: error_text,
            status,
        }),
    }
}

async fn read_representation<R: DeserializeOwned>(
    response: Response,
) -> Result<Vec<R>, PostgrestError> {
    let body_text = response.text().await.map_err(|e| {
        PostgrestError::DeserializationError(format!("Failed to read response body: {}", e))
    })?;

    // 204 No Content, or a server configured to ignore the Prefer header.
    if body_text.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str::<Vec<R>>(&body_text)
        .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
}

/// Total from a `Content-Range` value such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(value: &str) -> Result<u64, PostgrestError> {
    let total = value.rsplit('/').next().unwrap_or_default().trim();
    total.parse::<u64>().map_err(|_| {
        PostgrestError::DeserializationError(format!("Unusable Content-Range: {}", value))
    })
}
