// system-tests/src/lib.rs
// ============================================================================
// Module: Auth E2E System Tests Library
// Description: Shared plumbing for the live system-test binaries.
// Purpose: Resolve the live target once and gate every suite on readiness.
// Dependencies: auth-e2e-core, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the helpers that live suites in `system-tests/tests` use
//! to reach an external auth service. Hermetic self-checks in the same
//! directory run the catalog against an in-process stub instead and only need
//! `auth-e2e-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod live;
