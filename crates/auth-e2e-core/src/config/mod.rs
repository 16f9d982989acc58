// crates/auth-e2e-core/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the auth E2E harness.
// Purpose: Provide typed access to target URLs, timeouts, and run policy.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! typed structure shared by the runner, the API client, and the UI layer.
//! Invalid values fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::DEFAULT_APP_BASE_URL;
pub use env::DEFAULT_BASE_URL;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
