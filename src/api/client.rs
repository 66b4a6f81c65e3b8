//! HTTP client for the prescription backend.
//!
//! Every call goes through `ApiClient::execute`, which:
//! 1. Builds the URL from the configured base plus encoded path segments
//! 2. Attaches `Authorization: Bearer <token>` when a credential is present
//! 3. Logs status and body of every failing response before returning it
//!
//! No retries, no client-side timeout, no deduplication.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{extract_detail, ApiError};
use crate::session::SessionStore;

/// Request body variants accepted by the backend.
pub(crate) enum Payload<'a> {
    /// No body; still declared as JSON like every other call.
    Empty,
    Json(serde_json::Value),
    Form(&'a [(&'a str, &'a str)]),
}

/// Shared HTTP client. Cheap to clone; clones share the connection pool and
/// the session store.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL {trimmed:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL cannot carry paths: {trimmed}"
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("recetas-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("HTTP client setup failed: {e}")))?;

        tracing::debug!(base = %base_url, "API client created");

        Ok(Self {
            base_url,
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Base URL followed by `segments`, each percent-encoded.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest("base URL cannot carry paths".into()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn builder(&self, method: Method, url: Url, payload: Payload<'_>) -> RequestBuilder {
        let mut req = self.http.request(method, url);

        if let Some(credential) = self.session.credential() {
            match HeaderValue::from_str(&credential.bearer_header()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    req = req.header(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Stored credential is not a valid header value; sent without it"),
            }
        }

        match payload {
            Payload::Empty => req.header(CONTENT_TYPE, HeaderValue::from_static("application/json")),
            Payload::Json(body) => req.json(&body),
            Payload::Form(fields) => req.form(fields),
        }
    }

    /// Send one request and return the successful response.
    pub(crate) async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        payload: Payload<'_>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(segments)?;
        let path = url.path().to_string();
        let mut req = self.builder(method.clone(), url, payload);
        if !query.is_empty() {
            req = req.query(query);
        }

        tracing::debug!(%method, %path, "API request");

        let response = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(%method, %path, error = %e, "API request failed before a response");
                return Err(ApiError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            %method,
            %path,
            status = status.as_u16(),
            body = %body,
            "API error response"
        );
        Err(ApiError::Http {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    // ── Typed helpers ───────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.get_json_with_query(segments, &[]).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let resp = self.execute(Method::GET, segments, query, Payload::Empty).await?;
        Self::decode(resp).await
    }

    pub async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(Self::to_json(body)?);
        let resp = self.execute(Method::POST, segments, &[], payload).await?;
        Self::decode(resp).await
    }

    /// POST without a body (job triggers).
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let resp = self.execute(Method::POST, segments, &[], Payload::Empty).await?;
        Self::decode(resp).await
    }

    /// POST `application/x-www-form-urlencoded` fields.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let resp = self
            .execute(Method::POST, segments, &[], Payload::Form(fields))
            .await?;
        Self::decode(resp).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let resp = self.execute(Method::DELETE, segments, &[], Payload::Empty).await?;
        Self::decode(resp).await
    }

    /// GET an opaque binary body (generated documents).
    pub async fn get_bytes(&self, segments: &[&str]) -> Result<Vec<u8>, ApiError> {
        let resp = self.execute(Method::GET, segments, &[], Payload::Empty).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
