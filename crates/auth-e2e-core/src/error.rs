// crates/auth-e2e-core/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for readiness, transport, contract, and UI failures.
// Purpose: Separate run-fatal failures from scenario-local failures.
// Dependencies: thiserror, serde
// ============================================================================

//! ## Overview
//! Errors are split by blast radius. [`ServiceUnavailable`] and [`RunError`]
//! abort a whole run before any scenario executes. [`ScenarioFailure`] wraps
//! [`NetworkError`], [`ContractViolation`], and [`UiError`], and never leaves
//! the scenario that produced it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// The request or response exceeded the configured timeout.
    Timeout,
    /// The connection could not be established (refused, DNS, TLS).
    Connect,
    /// The response body could not be read.
    Decode,
    /// Any other transport failure, including invalid endpoint URLs.
    Other,
}

impl NetworkErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Decode => "decode",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure on an individual request.
///
/// # Invariants
/// - Only produced when the request never yielded an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} {url} failed ({kind}): {message}")]
pub struct NetworkError {
    /// Operation label (`signup`, `login`, `logout`, `probe`).
    pub operation: &'static str,
    /// Fully resolved request URL.
    pub url: String,
    /// Failure classification.
    pub kind: NetworkErrorKind,
    /// Underlying transport message.
    pub message: String,
}

impl NetworkError {
    /// Builds a [`NetworkError`] from a reqwest failure.
    #[must_use]
    pub fn from_reqwest(operation: &'static str, url: &str, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            NetworkErrorKind::Timeout
        } else if error.is_connect() {
            NetworkErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            NetworkErrorKind::Decode
        } else {
            NetworkErrorKind::Other
        };
        Self {
            operation,
            url: url.to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Contract Errors
// ============================================================================

/// Mismatch between an observed outcome and a named contract.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("contract `{contract}` violated at {check}: expected {expected}, got {actual}")]
pub struct ContractViolation {
    /// Contract name.
    pub contract: &'static str,
    /// The part of the response that was checked.
    pub check: &'static str,
    /// Expected value, rendered for humans.
    pub expected: String,
    /// Observed value, rendered for humans.
    pub actual: String,
}

// ============================================================================
// SECTION: Readiness Errors
// ============================================================================

/// The readiness gate exhausted its attempts; fatal to the entire run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error(
    "service at {base_url} unavailable after {attempts} attempts ({elapsed_ms} ms): \
     {last_observation}"
)]
pub struct ServiceUnavailable {
    /// Probed base URL.
    pub base_url: String,
    /// Number of probes issued.
    pub attempts: u32,
    /// Wall time spent in the gate.
    pub elapsed_ms: u64,
    /// Status or transport error seen on the final probe.
    pub last_observation: String,
}

// ============================================================================
// SECTION: UI Errors
// ============================================================================

/// Failures raised at the browser-automation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    /// The browser session could not be started.
    #[error("browser launch failed: {0}")]
    Launch(String),
    /// A driver command failed.
    #[error("browser driver failure: {0}")]
    Driver(String),
    /// The page raised an uncaught script error.
    #[error("uncaught page error: {0}")]
    PageScript(String),
}

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Invalid harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConfigError {
    /// Human-readable error message.
    message: String,
}

impl ConfigError {
    /// Constructs a new [`ConfigError`].
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Scenario and Run Errors
// ============================================================================

/// Scenario-local failure. Never aborts sibling scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioFailure {
    /// Transport failure.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// Contract mismatch.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// Browser boundary failure.
    #[error(transparent)]
    Ui(#[from] UiError),
    /// The scenario task panicked or was cancelled.
    #[error("scenario aborted: {0}")]
    Aborted(String),
}

impl ScenarioFailure {
    /// Returns a stable label for the failure class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Contract(_) => "contract",
            Self::Ui(_) => "ui",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Run-fatal failure.
#[derive(Debug, Error)]
pub enum RunError {
    /// The readiness gate never saw the target come up.
    #[error(transparent)]
    ServiceUnavailable(#[from] ServiceUnavailable),
    /// Configuration was invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Run artifacts could not be written.
    #[error("report write failed: {0}")]
    Report(#[from] std::io::Error),
}
