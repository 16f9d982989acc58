// crates/auth-e2e-core/src/client.rs
// ============================================================================
// Module: Auth API Client
// Description: HTTP wrapper for the auth service signup/login/logout endpoints.
// Purpose: Turn domain operations into requests and typed response envelopes.
// Dependencies: reqwest, serde_json, url, tracing
// ============================================================================

//! ## Overview
//! [`AuthApiClient`] is a transparent pass-through: it performs no client-side
//! validation and never fails on a non-2xx status. Every reply becomes an
//! [`Envelope`] for the caller to inspect. Only transport failures (DNS,
//! refused connections, timeouts) surface as [`NetworkError`].
//!
//! Each call is appended to a shared transcript with `password` fields
//! redacted, so run reports can show exactly what was sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::header::COOKIE;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::error::ConfigError;
use crate::error::NetworkError;
use crate::error::NetworkErrorKind;
use crate::fixtures::Credentials;
use crate::fixtures::TestUser;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Readiness probe path.
pub const ROOT_PATH: &str = "/";
/// Signup endpoint path.
pub const SIGNUP_PATH: &str = "/signup";
/// Login endpoint path.
pub const LOGIN_PATH: &str = "/login";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/logout";
/// Cookie carrying the session token.
pub const JWT_COOKIE_NAME: &str = "jwt";
/// Default request/response timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Placeholder written over secrets in transcripts.
const REDACTED: &str = "[redacted]";

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Uniform wrapper around an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON object body; empty when the body is not a JSON object.
    pub body: Map<String, Value>,
    /// Cookies set by the response, by name.
    pub cookies: BTreeMap<String, String>,
    /// Raw response text.
    pub raw_body: String,
}

impl Envelope {
    /// Builds an envelope, parsing `raw_body` as a JSON object when possible.
    #[must_use]
    pub fn from_parts(status: u16, raw_body: String, cookies: BTreeMap<String, String>) -> Self {
        let body = match serde_json::from_str::<Value>(&raw_body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            status,
            body,
            cookies,
            raw_body,
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the `message` field when it is a string.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Returns the `error` field, whatever its type.
    #[must_use]
    pub fn error(&self) -> Option<&Value> {
        self.body.get("error")
    }

    /// Returns a cookie value set by the response.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Monotonic sequence within the client.
    pub sequence: u64,
    /// HTTP method.
    pub method: &'static str,
    /// Endpoint path.
    pub path: &'static str,
    /// Request body with secrets redacted.
    pub request: Option<Value>,
    /// Response status, when one was received.
    pub status: Option<u16>,
    /// Transport error, when no status was received.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the auth service endpoints.
#[derive(Debug, Clone)]
pub struct AuthApiClient {
    /// Base URL, always ending in `/`.
    base_url: Url,
    /// Underlying HTTP client.
    client: Client,
    /// Shared request transcript.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Next transcript sequence number.
    sequence: Arc<AtomicU64>,
}

impl AuthApiClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConfigError::new(format!("failed to build http client: {err}")))?;
        Ok(Self::new_with_client(base_url, client))
    }

    /// Creates a client from an existing reqwest client.
    #[must_use]
    pub fn new_with_client(base_url: Url, client: Client) -> Self {
        Self {
            base_url: normalize_base(base_url),
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a snapshot of the transcript.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Issues `GET /`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the service cannot be reached.
    pub async fn probe_root(&self) -> Result<Envelope, NetworkError> {
        let url = self.endpoint("probe", ROOT_PATH)?;
        let request = self.client.get(url.clone());
        self.dispatch("probe", "GET", ROOT_PATH, &url, request, None).await
    }

    /// Issues `POST /signup` with the user as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the service cannot be reached.
    pub async fn signup(&self, user: &TestUser) -> Result<Envelope, NetworkError> {
        let url = self.endpoint("signup", SIGNUP_PATH)?;
        let request = self.client.post(url.clone()).json(user);
        self.dispatch("signup", "POST", SIGNUP_PATH, &url, request, to_transcript_body(user)).await
    }

    /// Issues `POST /login` with the credentials as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the service cannot be reached.
    pub async fn login(&self, credentials: &Credentials) -> Result<Envelope, NetworkError> {
        let url = self.endpoint("login", LOGIN_PATH)?;
        let request = self.client.post(url.clone()).json(credentials);
        let body = to_transcript_body(credentials);
        self.dispatch("login", "POST", LOGIN_PATH, &url, request, body).await
    }

    /// Issues `POST /logout` presenting `session_token` as the `jwt` cookie.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the service cannot be reached.
    pub async fn logout(&self, session_token: &str) -> Result<Envelope, NetworkError> {
        let url = self.endpoint("logout", LOGOUT_PATH)?;
        let request =
            self.client.post(url.clone()).header(COOKIE, format!("{JWT_COOKIE_NAME}={session_token}"));
        self.dispatch("logout", "POST", LOGOUT_PATH, &url, request, None).await
    }

    /// Resolves an endpoint path against the base URL.
    fn endpoint(&self, operation: &'static str, path: &str) -> Result<Url, NetworkError> {
        self.base_url.join(path.trim_start_matches('/')).map_err(|err| NetworkError {
            operation,
            url: format!("{}{}", self.base_url, path.trim_start_matches('/')),
            kind: NetworkErrorKind::Other,
            message: format!("invalid endpoint url: {err}"),
        })
    }

    /// Sends a request and records it in the transcript.
    async fn dispatch(
        &self,
        operation: &'static str,
        method: &'static str,
        path: &'static str,
        url: &Url,
        request: RequestBuilder,
        transcript_body: Option<Value>,
    ) -> Result<Envelope, NetworkError> {
        tracing::debug!(operation, %url, "sending request");
        let outcome = match request.send().await {
            Ok(response) => read_envelope(response)
                .await
                .map_err(|err| NetworkError::from_reqwest(operation, url.as_str(), &err)),
            Err(err) => Err(NetworkError::from_reqwest(operation, url.as_str(), &err)),
        };
        match &outcome {
            Ok(envelope) => tracing::debug!(operation, status = envelope.status, "response received"),
            Err(err) => tracing::debug!(operation, error = %err, "request failed"),
        }
        self.record(method, path, transcript_body, &outcome);
        outcome
    }

    /// Appends one transcript entry.
    fn record(
        &self,
        method: &'static str,
        path: &'static str,
        request: Option<Value>,
        outcome: &Result<Envelope, NetworkError>,
    ) {
        let entry = TranscriptEntry {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            method,
            path,
            request,
            status: outcome.as_ref().ok().map(|envelope| envelope.status),
            error: outcome.as_ref().err().map(ToString::to_string),
        };
        if let Ok(mut entries) = self.transcript.lock() {
            entries.push(entry);
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the base URL path ends with `/` so relative joins keep any prefix.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Reads status, cookies, and body text into an [`Envelope`].
async fn read_envelope(response: Response) -> Result<Envelope, reqwest::Error> {
    let status = response.status().as_u16();
    let cookies = response
        .cookies()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect();
    let raw_body = response.text().await?;
    Ok(Envelope::from_parts(status, raw_body, cookies))
}

/// Serializes a request body for the transcript with secrets redacted.
fn to_transcript_body<T: Serialize>(body: &T) -> Option<Value> {
    serde_json::to_value(body).ok().map(redact_secrets)
}

/// Replaces every `password` value in a JSON tree.
pub(crate) fn redact_secrets(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if key.eq_ignore_ascii_case("password") {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact_secrets(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_secrets).collect()),
        other => other,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
