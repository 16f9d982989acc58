// crates/auth-e2e-core/src/fixtures.rs
// ============================================================================
// Module: Test Data Generator
// Description: Collision-free synthetic users for signup and login flows.
// Purpose: Give every scenario an email no other scenario in the run uses.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Users are built as `{prefix}-{stamp}@example.com` with a fixed valid
//! password. The stamp is wall-clock milliseconds made strictly monotonic
//! across the process, so two calls inside the same millisecond still yield
//! distinct emails. Separate worker processes can add a worker tag:
//! `{prefix}-{tag}-{stamp}@example.com`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Fixture Constants
// ============================================================================

/// Prefix used when the caller supplies none.
pub const DEFAULT_PREFIX: &str = "test";
/// Domain used for every generated email.
pub const EMAIL_DOMAIN: &str = "example.com";
/// Password accepted by the service's length policy.
pub const VALID_PASSWORD: &str = "validpassword123";
/// Password below the service's minimum length.
pub const SHORT_PASSWORD: &str = "short";
/// Minimum password length enforced by the service.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Malformed emails the service must reject.
pub const INVALID_EMAILS: [&str; 3] = ["not-an-email", "missing-at.com", "@nodomain"];

/// Last stamp handed out in this process.
static LAST_STAMP_MS: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Synthetic user record sent to the signup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    /// Email, unique per run when produced by [`UserFactory`].
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Whether the account should require a second factor.
    #[serde(rename = "requires2FA")]
    pub requires_2fa: bool,
}

impl TestUser {
    /// Builds a user from explicit fields with 2FA disabled.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            requires_2fa: false,
        }
    }

    /// Returns the same user with 2FA requested.
    #[must_use]
    pub fn with_two_factor(mut self) -> Self {
        self.requires_2fa = true;
        self
    }

    /// Returns the login body for this user.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Generator for [`TestUser`] records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFactory {
    /// Optional per-process tag inserted before the stamp.
    worker_tag: Option<String>,
}

impl UserFactory {
    /// Creates a factory without a worker tag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            worker_tag: None,
        }
    }

    /// Creates a factory that tags emails with `tag`.
    #[must_use]
    pub fn with_worker_tag(tag: impl Into<String>) -> Self {
        Self {
            worker_tag: Some(tag.into()),
        }
    }

    /// Returns the worker tag, if any.
    #[must_use]
    pub fn worker_tag(&self) -> Option<&str> {
        self.worker_tag.as_deref()
    }

    /// Generates a user whose email embeds `prefix`.
    ///
    /// An empty prefix falls back to [`DEFAULT_PREFIX`], so no generated
    /// local part starts with `-`.
    #[must_use]
    pub fn generate(&self, prefix: &str) -> TestUser {
        let prefix = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
        let stamp = next_unique_stamp();
        let email = match &self.worker_tag {
            Some(tag) => format!("{prefix}-{tag}-{stamp}@{EMAIL_DOMAIN}"),
            None => format!("{prefix}-{stamp}@{EMAIL_DOMAIN}"),
        };
        TestUser::new(email, VALID_PASSWORD)
    }
}

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Generates a user with the default, untagged factory. An empty prefix
/// yields `test-<stamp>@example.com`, not `-<stamp>@example.com`.
#[must_use]
pub fn generate_test_user(prefix: &str) -> TestUser {
    UserFactory::new().generate(prefix)
}

/// Returns a wall-clock millisecond stamp strictly greater than every stamp
/// previously returned in this process.
pub fn next_unique_stamp() -> u64 {
    let now = wall_clock_millis();
    let mut previous = LAST_STAMP_MS.load(Ordering::Acquire);
    loop {
        let candidate = now.max(previous.saturating_add(1));
        match LAST_STAMP_MS.compare_exchange_weak(
            previous,
            candidate,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return candidate,
            Err(actual) => previous = actual,
        }
    }
}

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "fixtures_tests.rs"]
mod tests;
