// system-tests/tests/helpers/auth_stub.rs
// ============================================================================
// Module: Auth Service Stub
// Description: In-process auth service that honors the black-box contracts.
// Purpose: Run the full scenario catalog hermetically.
// Dependencies: auth-e2e-core, axum, serde_json, tokio
// ============================================================================

//! ## Overview
//! The stub keeps users and sessions in memory and answers the four routes
//! the harness touches. Its rules mirror the contracts the catalog asserts:
//! - `POST /signup`: 400 for a malformed email or a password under 8 chars,
//!   409 for a duplicate, otherwise 201.
//! - `POST /login`: 206 with a `loginAttemptId` for 2FA users, 401 on a wrong
//!   password, otherwise 200 with `jwt` and `jwt-refresh` cookies.
//! - `POST /logout`: 400 without a `jwt` cookie, 401 for an unknown token.
//! - `GET /`: the landing page, or 503 while warm-up failures remain.

use std::collections::HashMap;
use std::collections::HashSet;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;

use auth_e2e_core::fixtures::MIN_PASSWORD_LEN;
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use url::Url;

/// Landing page carrying the elements the UI suite inspects.
const LANDING_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Auth Service</title></head>
  <body>
    <nav class="navbar">
      <a class="navbar-brand" href="/">
        <img src="/lgr_logo.png" width="25" height="25" alt="logo"> Auth Service
      </a>
    </nav>
    <main><h1>Welcome</h1></main>
  </body>
</html>
"#;

/// Knobs for one stub instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthStubOptions {
    /// Number of `GET /` probes answered with 503 before the stub is ready.
    pub warmup_failures: u32,
}

/// One request as the stub saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRequest {
    pub method: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone)]
struct StubUser {
    password: String,
    requires_2fa: bool,
}

#[derive(Clone, Default)]
struct StubState {
    users: Arc<Mutex<HashMap<String, StubUser>>>,
    sessions: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    warmup_remaining: Arc<AtomicU32>,
    counter: Arc<AtomicU64>,
}

impl StubState {
    fn record(&self, method: &'static str, path: &'static str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(StubRequest {
                method,
                path,
            });
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

/// Handle for a running stub; dropping it stops the server.
pub struct AuthStubHandle {
    base_url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    state: StubState,
}

impl AuthStubHandle {
    /// Returns the stub's base URL.
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Returns the requests seen so far.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |requests| requests.clone())
    }

    /// Returns the number of registered users.
    pub fn user_count(&self) -> usize {
        self.state.users.lock().map_or(0, |users| users.len())
    }
}

impl Drop for AuthStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Starts a stub on an ephemeral port, served from its own thread.
pub fn spawn_auth_stub(options: AuthStubOptions) -> Result<AuthStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("auth stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("auth stub listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("auth stub local addr failed: {err}"))?;
    let base_url = Url::parse(&format!("http://{addr}/"))
        .map_err(|err| format!("auth stub url invalid: {err}"))?;

    let state = StubState {
        warmup_remaining: Arc::new(AtomicU32::new(options.warmup_failures)),
        ..StubState::default()
    };
    let app = Router::new()
        .route("/", get(landing))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(AuthStubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        state,
    })
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

async fn landing(State(state): State<StubState>) -> Response {
    state.record("GET", "/");
    let warming = state
        .warmup_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if warming {
        return (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response();
    }
    Html(LANDING_HTML).into_response()
}

async fn signup(State(state): State<StubState>, body: Bytes) -> Response {
    state.record("POST", "/signup");
    let Some(body) = parse_body(&body) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Malformed request");
    };
    let email = string_field(&body, "email");
    let password = string_field(&body, "password");
    if !is_valid_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
        return error(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    let requires_2fa = body.get("requires2FA").and_then(Value::as_bool).unwrap_or(false);
    let Ok(mut users) = state.users.lock() else {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error");
    };
    if users.contains_key(email) {
        return error(StatusCode::CONFLICT, "User already exists");
    }
    users.insert(email.to_string(), StubUser {
        password: password.to_string(),
        requires_2fa,
    });
    (StatusCode::CREATED, Json(json!({"message": "User created successfully!"}))).into_response()
}

async fn login(State(state): State<StubState>, body: Bytes) -> Response {
    state.record("POST", "/login");
    let Some(body) = parse_body(&body) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Malformed request");
    };
    let email = string_field(&body, "email");
    let password = string_field(&body, "password");
    if !is_valid_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
        return error(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    let user = state.users.lock().ok().and_then(|users| users.get(email).cloned());
    let Some(user) = user.filter(|user| user.password == password) else {
        return error(StatusCode::UNAUTHORIZED, "Incorrect credentials");
    };
    if user.requires_2fa {
        let attempt = state.next_id("attempt");
        return (
            StatusCode::PARTIAL_CONTENT,
            Json(json!({"message": "2FA required", "loginAttemptId": attempt})),
        )
            .into_response();
    }

    let token = state.next_id("session");
    let refresh = state.next_id("refresh");
    if let Ok(mut sessions) = state.sessions.lock() {
        sessions.insert(token.clone());
    }
    let mut response = StatusCode::OK.into_response();
    for cookie in [
        format!("jwt={token}; Path=/; HttpOnly; SameSite=Lax"),
        format!("jwt-refresh={refresh}; Path=/; HttpOnly; SameSite=Lax"),
    ] {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => return error(StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error"),
        }
    }
    response
}

async fn logout(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("POST", "/logout");
    let Some(token) = jwt_cookie(&headers) else {
        return error(StatusCode::BAD_REQUEST, "Missing token");
    };
    let removed = state.sessions.lock().is_ok_and(|mut sessions| sessions.remove(&token));
    if !removed {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_static("jwt=; Path=/; Max-Age=0"));
    response
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

fn parse_body(bytes: &Bytes) -> Option<Value> {
    serde_json::from_slice::<Value>(bytes).ok().filter(Value::is_object)
}

fn string_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn jwt_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "jwt")
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}
