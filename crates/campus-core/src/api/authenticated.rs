//! Bearer-token request wrapper with single-attempt token refresh.
//!
//! Every request gets `Authorization: Bearer <access token>` when a usable
//! token is stored. A 401 on a request that has not been retried yet
//! triggers one refresh exchange and one re-issue of the request. If the
//! exchange fails both tokens are cleared and the navigator is sent to
//! the login screen.
//!
//! Concurrent requests that each receive a 401 refresh independently;
//! whichever refresh finishes last leaves its token in the store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{payload, ApiError};
use crate::auth::{is_usable_token, TokenKind, TokenStore};
use crate::models::{AuthTokens, RefreshRequest};
use crate::navigation::{Navigator, LOGIN_PATH};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoint exchanging a refresh token for a new access token
pub const REFRESH_PATH: &str = "/auth/refresh";

/// An outgoing request, kept as plain data so it can be re-issued.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: header::HeaderMap,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: header::HeaderMap::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).context("Failed to serialize request body")?);
        Ok(self)
    }

    pub fn header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether this request already went through a refresh-and-retry cycle
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Mark the request so a 401 is returned instead of triggering a refresh.
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// Check if response is successful, returning an error with body if not.
pub(crate) async fn check_response(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }
}

/// HTTP client decorator that owns the refresh-and-retry policy.
/// Clone is cheap - the connection pool, store and navigator are shared.
#[derive(Clone)]
pub struct AuthenticatedClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthenticatedClient {
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_http_client(client, base_url, tokens, navigator))
    }

    /// Wrap an existing `reqwest::Client`, sharing its connection pool.
    pub fn with_http_client(
        client: Client,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Absolute URL for an API path. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn auth_headers(request: &ApiRequest, token: Option<&str>) -> Result<header::HeaderMap> {
        let mut headers = request.headers.clone();
        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Access token is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = self.url(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(Self::auth_headers(request, token)?);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            url = %url,
            authorized = token.is_some(),
            retried = request.retried,
            "Sending request"
        );

        builder
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send {} request to {}", request.method, url))
    }

    /// Send a request, refreshing the access token once if the server rejects it.
    ///
    /// Non-401 responses are returned unchanged whatever their status, and so
    /// is a 401 on a request already marked retried. Transport errors are
    /// returned without touching the stored tokens.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Response> {
        let token = self.tokens.usable(TokenKind::Access)?;
        let response = self.send(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.retried {
            return Ok(response);
        }

        request.mark_retried();
        debug!(path = %request.path, "Access token rejected, refreshing");

        let access = match self.refresh_access_token().await {
            Ok(access) => access,
            Err(e) => {
                warn!(path = %request.path, error = %e, "Token refresh failed, ending session");
                self.end_session();
                return Err(e);
            }
        };

        self.send(&request, Some(&access)).await
    }

    /// Exchange the stored refresh token for a new access token and persist it.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = self
            .tokens
            .usable(TokenKind::Refresh)?
            .ok_or(ApiError::MissingRefreshToken)?;

        let url = self.url(REFRESH_PATH);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send token refresh request")?;

        let response = check_response(response).await?;
        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .context("Failed to read token refresh response")?;
        let tokens: AuthTokens =
            payload::decode(&text).context("Failed to parse token refresh response")?;

        if !is_usable_token(&tokens.access_token) {
            return Err(ApiError::InvalidResponse(
                "Token refresh response carried no access token".to_string(),
            )
            .into());
        }

        self.tokens
            .store_pair(&tokens.access_token, tokens.refresh_token.as_deref())
            .context("Failed to persist refreshed tokens")?;
        info!(rotated = tokens.refresh_token.is_some(), "Access token refreshed");

        Ok(tokens.access_token)
    }

    /// Clear both tokens and send the user to the login screen.
    fn end_session(&self) {
        if let Err(e) = self.tokens.clear_all() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}
