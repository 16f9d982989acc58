// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for auth E2E system-tests.
// Purpose: Provide the stub service and contexts wired to it.
// Dependencies: auth-e2e-core, axum, url
// ============================================================================

//! ## Overview
//! Helpers shared by the self-check binary. Contexts built here point at a
//! stub from [`auth_stub`] and use a short readiness budget so a broken stub
//! fails quickly.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod auth_stub;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use auth_e2e_core::AuthApiClient;
use auth_e2e_core::ReadinessPolicy;
use auth_e2e_core::RunnerPolicy;
use auth_e2e_core::ScenarioContext;
use auth_e2e_core::UserFactory;
use url::Url;

/// Request timeout for stub traffic.
pub const STUB_TIMEOUT: Duration = Duration::from_secs(5);

/// Readiness bounds tuned for an in-process target.
pub const fn fast_readiness(max_attempts: u32) -> ReadinessPolicy {
    ReadinessPolicy {
        max_attempts,
        poll_interval: Duration::from_millis(20),
    }
}

/// Runner policy with `workers` slots, no retries, and fast readiness.
pub const fn stub_policy(workers: usize) -> RunnerPolicy {
    RunnerPolicy {
        workers,
        retries: 0,
        readiness: fast_readiness(5),
    }
}

/// Builds a client against `base`.
pub fn stub_client(base: Url) -> Result<AuthApiClient, String> {
    AuthApiClient::new(base, STUB_TIMEOUT).map_err(|err| err.to_string())
}

/// Builds a scenario context against `base` with no browser.
pub fn stub_context(api: AuthApiClient, base: Url) -> Arc<ScenarioContext> {
    Arc::new(
        ScenarioContext::new(api, UserFactory::with_worker_tag("selfcheck")).with_ui_base_url(base),
    )
}

/// Returns a URL whose port refuses connections.
pub fn closed_port() -> Result<Url, String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    drop(listener);
    Url::parse(&format!("http://{addr}/")).map_err(|err| err.to_string())
}
