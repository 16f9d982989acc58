// crates/auth-e2e-core/src/lib.rs
// ============================================================================
// Module: Auth E2E Core
// Description: End-to-end verification harness for an external auth service.
// Purpose: Drive signup, login, logout, and UI checks against a live target.
// Dependencies: reqwest, tokio, serde, serde_jcs, tracing, async-trait
// ============================================================================

//! ## Overview
//! The harness treats the auth service as a black box reachable over HTTP. A
//! run passes the readiness gate once, then schedules independent scenarios
//! that each generate their own users, call the API through
//! [`AuthApiClient`], and check the replies with narrow contract assertions.
//! UI scenarios go through the [`BrowserLauncher`] boundary.
//! Invariants:
//! - No scenario runs before the readiness gate has passed.
//! - Generated emails are unique within a process, even in tight loops.
//! - A failing scenario never aborts its siblings.
//! - Transcripts never carry plaintext passwords.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod fixtures;
pub mod readiness;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod suites;
pub mod ui;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::AuthApiClient;
pub use client::Envelope;
pub use client::TranscriptEntry;
pub use config::HarnessConfig;
pub use config::HarnessEnv;
pub use error::ConfigError;
pub use error::ContractViolation;
pub use error::NetworkError;
pub use error::RunError;
pub use error::ScenarioFailure;
pub use error::ServiceUnavailable;
pub use error::UiError;
pub use fixtures::Credentials;
pub use fixtures::TestUser;
pub use fixtures::UserFactory;
pub use fixtures::generate_test_user;
pub use readiness::ReadinessGate;
pub use readiness::ReadinessPolicy;
pub use readiness::wait_until_ready;
pub use report::RunArtifacts;
pub use report::RunReport;
pub use runner::Runner;
pub use runner::RunnerPolicy;
pub use scenario::Scenario;
pub use scenario::ScenarioContext;
pub use scenario::SuiteFilter;
pub use scenario::SuiteKind;
pub use scenario::Verdict;
pub use ui::BrowserLauncher;
pub use ui::BrowserSession;
pub use ui::PageErrorPolicy;
#[cfg(feature = "webdriver")]
pub use ui::WebDriverLauncher;
