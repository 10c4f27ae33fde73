//! The shared request pipeline for the QC backend.
//!
//! Every backend call goes through `ApiClient::request`, which attaches the
//! session token, applies the timeout, unwraps successful bodies and handles
//! 401 centrally (clear session, redirect to login, re-raise). Call sites
//! never deal with auth headers or logout themselves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::config::PipelineConfig;
use crate::router::{Navigator, LOGIN_PATH};

use super::ApiError;

/// Marker for "no login redirect issued yet"
const NO_REDIRECT: u64 = u64::MAX;

/// Maximum length of a body excerpt in decode errors
const MAX_DECODE_EXCERPT: usize = 200;

/// Outgoing request body
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Multipart form data; the boundary content type is set by the form
    Multipart(Form),
}

/// Per-call extras
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    /// Overrides the content type chosen for the body. Ignored for multipart
    /// bodies, whose content type must carry the form boundary.
    pub content_type: Option<HeaderValue>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Request pipeline for the QC backend.
/// Clone is cheap - all clones share the connection pool, session and
/// navigator slot.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: PipelineConfig,
    session: SessionStore,
    navigator: Arc<OnceLock<Arc<dyn Navigator>>>,
    hard_redirect: Arc<Mutex<Option<String>>>,
    /// Session generation the last login redirect was issued for
    redirected_for: Arc<AtomicU64>,
}

impl ApiClient {
    /// Create the pipeline. No navigator is attached yet.
    pub fn new(config: PipelineConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::from_transport(e, config.timeout))?;

        Ok(Self {
            client,
            config,
            session,
            navigator: Arc::new(OnceLock::new()),
            hard_redirect: Arc::new(Mutex::new(None)),
            redirected_for: Arc::new(AtomicU64::new(NO_REDIRECT)),
        })
    }

    /// Attach the in-app navigation handle. Only the first call takes effect.
    pub fn set_navigator(&self, navigator: Arc<dyn Navigator>) {
        if self.navigator.set(navigator).is_err() {
            warn!("Navigator already set, ignoring");
        }
    }

    /// Take the login redirect issued while no navigator was attached.
    /// The shell treats it as a full reload of the given path.
    pub fn take_hard_redirect(&self) -> Option<String> {
        self.hard_redirect.lock().ok()?.take()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Send a request and return the decoded response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url_for(path)?;

        // The pipeline owns Authorization; a caller-supplied one is dropped.
        let mut headers = options.headers;
        if headers.remove(AUTHORIZATION).is_some() {
            debug!("Dropping caller-supplied Authorization header");
        }

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        let is_multipart = matches!(body, RequestBody::Multipart(_));
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };
        if let Some(content_type) = options.content_type {
            if is_multipart {
                debug!("Ignoring content type override for multipart body");
            } else {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, content_type);
                builder = builder.headers(headers);
            }
        }

        debug!(%method, url = %url, "Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // The body carries nothing we need, and reading it could stall.
            self.handle_auth_expired();
            return Err(ApiError::AuthExpired);
        }
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        match Self::unwrap_payload(status, &text) {
            Err(e) => {
                warn!(%method, url = %url, error = %e, "Request failed");
                Err(e)
            }
            ok => ok,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty, options).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::RequestConfig(format!("Failed to encode body: {}", e)))?;
        self.request(Method::POST, path, RequestBody::Json(value), RequestOptions::default())
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.request(
            Method::POST,
            path,
            RequestBody::Multipart(form),
            RequestOptions::default(),
        )
        .await
    }

    /// Turn a raw response into the payload or a classified error.
    /// An empty success body decodes as JSON `null`.
    pub fn unwrap_payload<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
        if !status.is_success() {
            return Err(ApiError::from_status(status, body));
        }

        let body = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(body).map_err(|e| {
            let excerpt: String = body.chars().take(MAX_DECODE_EXCERPT).collect();
            ApiError::InvalidResponse(format!("{} in body: {}", e, excerpt))
        })
    }

    /// Join a path onto the base URL. Absolute URLs are rejected so every
    /// call stays on the configured backend.
    fn url_for(&self, path: &str) -> Result<String, ApiError> {
        if path.contains("://") {
            return Err(ApiError::RequestConfig(format!(
                "Path must be relative to the API base URL: {}",
                path
            )));
        }
        let base = self.config.base_url.trim_end_matches('/');
        if path.is_empty() {
            Ok(base.to_string())
        } else if path.starts_with('/') {
            Ok(format!("{}{}", base, path))
        } else {
            Ok(format!("{}/{}", base, path))
        }
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ApiError {
        let err = ApiError::from_transport(err, self.config.timeout);
        warn!(url = %url, error = %err, "Request did not complete");
        err
    }

    /// Clear the session and send the user to login, at most once per login.
    ///
    /// Dedup is keyed on the session generation, and tokenless requests share
    /// the generation of the last login (0 before any). Once a 401 has redirected,
    /// further 401s do not push login again until a new session is set.
    fn handle_auth_expired(&self) {
        let generation = self.session.generation();
        self.session.clear_session();

        if self.redirected_for.swap(generation, Ordering::SeqCst) == generation {
            debug!("Login redirect already issued for this session");
            return;
        }

        warn!("Authorization expired, redirecting to login");
        match self.navigator.get() {
            Some(navigator) => navigator.push(LOGIN_PATH),
            None => {
                if let Ok(mut slot) = self.hard_redirect.lock() {
                    *slot = Some(LOGIN_PATH.to_string());
                }
            }
        }
    }
}
