// crates/auth-e2e-core/src/contract.rs
// ============================================================================
// Module: Contract Assertions
// Description: Named expectations over response envelopes.
// Purpose: Verify externally observable outcomes per operation.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Each contract is a pure function of an [`Envelope`]. Contracts check the
//! status and the minimal body shape only, so additive fields in the service's
//! responses never break them. A mismatch yields a [`ContractViolation`] that
//! names the contract and reports expected against actual.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::client::Envelope;
use crate::client::JWT_COOKIE_NAME;
use crate::error::ContractViolation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message returned by a successful signup.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "User created successfully!";
/// Key carrying a validation error.
pub const ERROR_KEY: &str = "error";
/// Key carrying the 2FA login attempt identifier.
pub const LOGIN_ATTEMPT_ID_KEY: &str = "loginAttemptId";
/// Maximum body characters quoted in a violation.
const BODY_SNIPPET_CHARS: usize = 200;

// ============================================================================
// SECTION: Contracts
// ============================================================================

/// Requires status 201 and `body.message == "User created successfully!"`.
///
/// # Errors
///
/// Returns [`ContractViolation`] when either condition fails.
pub fn expect_successful_signup(
    envelope: &Envelope,
) -> Result<&Map<String, Value>, ContractViolation> {
    const CONTRACT: &str = "successful_signup";
    require_status(CONTRACT, envelope, 201)?;
    match envelope.body.get("message") {
        Some(Value::String(message)) if message == SIGNUP_SUCCESS_MESSAGE => Ok(&envelope.body),
        other => Err(ContractViolation {
            contract: CONTRACT,
            check: "body.message",
            expected: format!("{SIGNUP_SUCCESS_MESSAGE:?}"),
            actual: describe_field(other),
        }),
    }
}

/// Requires status 400 and a body key named `error`.
///
/// # Errors
///
/// Returns [`ContractViolation`] when either condition fails.
pub fn expect_validation_error(
    envelope: &Envelope,
) -> Result<&Map<String, Value>, ContractViolation> {
    const CONTRACT: &str = "validation_error";
    require_status(CONTRACT, envelope, 400)?;
    if envelope.body.contains_key(ERROR_KEY) {
        return Ok(&envelope.body);
    }
    Err(ContractViolation {
        contract: CONTRACT,
        check: "body.error",
        expected: "key present".to_string(),
        actual: format!("absent in {}", body_snippet(envelope)),
    })
}

/// Requires an exact status.
///
/// # Errors
///
/// Returns [`ContractViolation`] on any other status.
pub fn expect_status(envelope: &Envelope, expected: u16) -> Result<(), ContractViolation> {
    require_status("status", envelope, expected)
}

/// Requires any 4xx status and returns it.
///
/// # Errors
///
/// Returns [`ContractViolation`] on a non-4xx status.
pub fn expect_client_error(envelope: &Envelope) -> Result<u16, ContractViolation> {
    if (400..500).contains(&envelope.status) {
        return Ok(envelope.status);
    }
    Err(ContractViolation {
        contract: "client_error",
        check: "status",
        expected: "4xx".to_string(),
        actual: describe_status(envelope),
    })
}

/// Requires status 200 and a non-empty `jwt` cookie; returns the token.
///
/// # Errors
///
/// Returns [`ContractViolation`] when either condition fails.
pub fn expect_session_issued(envelope: &Envelope) -> Result<&str, ContractViolation> {
    const CONTRACT: &str = "session_issued";
    require_status(CONTRACT, envelope, 200)?;
    match envelope.cookie(JWT_COOKIE_NAME) {
        Some(token) if !token.is_empty() => Ok(token),
        Some(_) => Err(ContractViolation {
            contract: CONTRACT,
            check: "cookie.jwt",
            expected: "non-empty token".to_string(),
            actual: "empty token".to_string(),
        }),
        None => Err(ContractViolation {
            contract: CONTRACT,
            check: "cookie.jwt",
            expected: "cookie set".to_string(),
            actual: format!("cookies {:?}", envelope.cookies.keys().collect::<Vec<_>>()),
        }),
    }
}

/// Requires status 206 and a string `loginAttemptId`; returns it.
///
/// # Errors
///
/// Returns [`ContractViolation`] when either condition fails.
pub fn expect_two_factor_challenge(envelope: &Envelope) -> Result<&str, ContractViolation> {
    const CONTRACT: &str = "two_factor_challenge";
    require_status(CONTRACT, envelope, 206)?;
    match envelope.body.get(LOGIN_ATTEMPT_ID_KEY) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.as_str()),
        other => Err(ContractViolation {
            contract: CONTRACT,
            check: "body.loginAttemptId",
            expected: "non-empty string".to_string(),
            actual: describe_field(other),
        }),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn require_status(
    contract: &'static str,
    envelope: &Envelope,
    expected: u16,
) -> Result<(), ContractViolation> {
    if envelope.status == expected {
        return Ok(());
    }
    Err(ContractViolation {
        contract,
        check: "status",
        expected: expected.to_string(),
        actual: describe_status(envelope),
    })
}

fn describe_status(envelope: &Envelope) -> String {
    format!("{} with body {}", envelope.status, body_snippet(envelope))
}

fn describe_field(value: Option<&Value>) -> String {
    value.map_or_else(|| "missing".to_string(), Value::to_string)
}

fn body_snippet(envelope: &Envelope) -> String {
    if envelope.raw_body.is_empty() {
        return "<empty>".to_string();
    }
    let mut snippet: String = envelope.raw_body.chars().take(BODY_SNIPPET_CHARS).collect();
    if envelope.raw_body.chars().count() > BODY_SNIPPET_CHARS {
        snippet.push_str("...");
    }
    snippet
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
