//! HTTP client for the hosted backend.
//!
//! # Responsibilities
//! - Issue REST reads and mutations over named resources with filter
//!   predicates rendered as query parameters
//! - Drive the auth endpoints (signin/signup/signout/me) and adopt
//!   returned session material into the session store
//! - Attach the bearer token from the current session where required
//!
//! # Design Decisions
//! - One attempt per method call; retries, timeouts, and caching are the
//!   gateway's concern
//! - Auth responses use the `{status, data?, error?}` envelope; REST
//!   responses are raw JSON payloads

use std::time::Duration;

use serde_json::Value;

use crate::backend::query::Filter;
use crate::backend::session::SessionStore;
use crate::backend::types::{AuthEnvelope, BackendError, BackendResult, Credentials, Session};
use crate::config::schema::BackendConfig;

/// Client for the backend's REST and auth surfaces.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    sessions: SessionStore,
}

impl BackendClient {
    /// Create a new client. Fails if the base URL does not parse.
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        config.base_url.parse::<url::Url>().map_err(|e| {
            BackendError::Transport(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sessions: SessionStore::new(),
        })
    }

    /// The session store backing this client.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn rest_url(&self, resource: &str) -> String {
        format!("{}/rest/{}", self.base_url, resource)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/{}", self.base_url, path)
    }

    fn maybe_authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.sessions.get() {
            Some(session) => req.bearer_auth(session.access_token),
            None => req,
        }
    }

    /// Read rows from `resource`, optionally projecting `columns`.
    pub async fn select(
        &self,
        resource: &str,
        columns: Option<&[String]>,
        filter: &Filter,
    ) -> BackendResult<Value> {
        let mut params = filter.to_query_params();
        if let Some(columns) = columns {
            params.push(("select".to_string(), columns.join(",")));
        }
        let req = self
            .maybe_authorize(self.http.get(self.rest_url(resource)).query(&params));
        decode_rest(req.send().await?).await
    }

    /// Insert `payload` into `resource`.
    pub async fn insert(&self, resource: &str, payload: &Value) -> BackendResult<Value> {
        let req = self.maybe_authorize(self.http.post(self.rest_url(resource)).json(payload));
        decode_rest(req.send().await?).await
    }

    /// Update rows of `resource` matching `filter` with `payload`.
    pub async fn update(
        &self,
        resource: &str,
        payload: &Value,
        filter: &Filter,
    ) -> BackendResult<Value> {
        let req = self.maybe_authorize(
            self.http
                .patch(self.rest_url(resource))
                .query(&filter.to_query_params())
                .json(payload),
        );
        decode_rest(req.send().await?).await
    }

    /// Delete rows of `resource` matching `filter`.
    pub async fn delete(&self, resource: &str, filter: &Filter) -> BackendResult<Value> {
        let req = self.maybe_authorize(
            self.http
                .delete(self.rest_url(resource))
                .query(&filter.to_query_params()),
        );
        decode_rest(req.send().await?).await
    }

    /// Sign in and adopt the returned session.
    pub async fn sign_in(&self, credentials: &Credentials) -> BackendResult<Session> {
        let data = self
            .auth_request(self.http.post(self.auth_url("signin")).json(credentials))
            .await?;
        let session: Session = serde_json::from_value(data)
            .map_err(|e| BackendError::Decode(format!("session payload: {}", e)))?;
        self.sessions.set(Some(session.clone()));
        Ok(session)
    }

    /// Sign up. Adopts session material when the backend returns it
    /// directly (no confirmation step).
    pub async fn sign_up(&self, credentials: &Credentials) -> BackendResult<Value> {
        let data = self
            .auth_request(self.http.post(self.auth_url("signup")).json(credentials))
            .await?;
        if let Ok(session) = serde_json::from_value::<Session>(data.clone()) {
            self.sessions.set(Some(session));
        }
        Ok(data)
    }

    /// Sign out remotely. Drops the local session on success; callers that
    /// must clean up regardless of the remote result clear the store
    /// themselves.
    pub async fn sign_out(&self) -> BackendResult<Value> {
        let session = self.sessions.get().ok_or(BackendError::NoSession)?;
        let result = self
            .auth_request(
                self.http
                    .post(self.auth_url("signout"))
                    .bearer_auth(session.access_token),
            )
            .await;
        if result.is_ok() {
            self.sessions.set(None);
        }
        result
    }

    /// Fetch the current user via the adopted session.
    pub async fn current_user(&self) -> BackendResult<Value> {
        let session = self.sessions.get().ok_or(BackendError::NoSession)?;
        self.auth_request(
            self.http
                .get(self.auth_url("me"))
                .bearer_auth(session.access_token),
        )
        .await
    }

    /// Whether the backend answers HTTP at all. Any response counts,
    /// including auth rejections; only transport failure is unhealthy.
    pub async fn is_healthy(&self) -> bool {
        match self.http.get(self.auth_url("me")).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Backend health probe failed");
                false
            }
        }
    }

    async fn auth_request(&self, req: reqwest::RequestBuilder) -> BackendResult<Value> {
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        parse_auth_envelope(status, &text)
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.sessions.get().is_some())
            .finish()
    }
}

fn parse_auth_envelope(status: u16, body: &str) -> BackendResult<Value> {
    let envelope: AuthEnvelope = serde_json::from_str(body)
        .map_err(|e| BackendError::Decode(format!("auth envelope: {}", e)))?;

    if envelope.status == "success" {
        Ok(envelope.data.unwrap_or(Value::Null))
    } else {
        Err(BackendError::Api {
            status,
            message: envelope
                .error
                .unwrap_or_else(|| "unknown backend error".to_string()),
        })
    }
}

async fn decode_rest(resp: reqwest::Response) -> BackendResult<Value> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<AuthEnvelope>(&text)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text.clone()
                }
            });
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}
