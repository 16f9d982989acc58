// crates/auth-e2e-core/src/readiness.rs
// ============================================================================
// Module: Readiness Gate
// Description: Bounded fixed-delay polling of the target service root.
// Purpose: Block a run until the target answers, or fail the run outright.
// Dependencies: tokio, tracing, async-trait
// ============================================================================

//! ## Overview
//! [`wait_until_ready`] issues up to `max_attempts` probes spaced
//! `poll_interval` apart. A 2xx status resolves immediately. Non-2xx statuses
//! and transport errors both count as one failed attempt. Once attempts are
//! exhausted it returns [`ServiceUnavailable`], which no layer retries.
//!
//! [`ReadinessGate`] memoizes the outcome so that callers scheduling scenarios
//! one at a time still probe the target exactly once per run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio::time::sleep;

use crate::client::AuthApiClient;
use crate::error::NetworkError;
use crate::error::ServiceUnavailable;

// ============================================================================
// SECTION: Policy and State
// ============================================================================

/// Default number of probes before the gate gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
/// Default delay between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Polling bounds for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Maximum number of probes.
    pub max_attempts: u32,
    /// Delay between consecutive probes.
    pub poll_interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Progress of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessState {
    /// Probes issued so far.
    pub attempts_made: u32,
    /// Probe budget.
    pub max_attempts: u32,
    /// Delay between probes in milliseconds.
    pub poll_interval_ms: u64,
    /// Whether a probe succeeded.
    pub ready: bool,
}

impl ReadinessState {
    fn new(policy: ReadinessPolicy) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: policy.max_attempts,
            poll_interval_ms: u64::try_from(policy.poll_interval.as_millis()).unwrap_or(u64::MAX),
            ready: false,
        }
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Something the gate can poll.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Human-readable target for logs and errors.
    fn target(&self) -> String;

    /// Issues one probe and returns the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the target cannot be reached.
    async fn probe(&self) -> Result<u16, NetworkError>;
}

#[async_trait]
impl ReadinessProbe for AuthApiClient {
    fn target(&self) -> String {
        self.base_url().to_string()
    }

    async fn probe(&self) -> Result<u16, NetworkError> {
        self.probe_root().await.map(|envelope| envelope.status)
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Polls `probe` until it reports a 2xx status or attempts run out.
///
/// # Errors
///
/// Returns [`ServiceUnavailable`] after `max_attempts` failed probes.
pub async fn wait_until_ready<P>(
    probe: &P,
    policy: ReadinessPolicy,
) -> Result<ReadinessState, ServiceUnavailable>
where
    P: ReadinessProbe + ?Sized,
{
    let started = Instant::now();
    let target = probe.target();
    let mut state = ReadinessState::new(policy);
    let mut last_observation = "no probe issued".to_string();
    while state.attempts_made < policy.max_attempts {
        if state.attempts_made > 0 {
            sleep(policy.poll_interval).await;
        }
        state.attempts_made += 1;
        match probe.probe().await {
            Ok(status) if (200..300).contains(&status) => {
                state.ready = true;
                tracing::info!(
                    target_url = %target,
                    attempt = state.attempts_made,
                    status,
                    "target is ready"
                );
                return Ok(state);
            }
            Ok(status) => {
                last_observation = format!("status {status}");
                tracing::info!(
                    target_url = %target,
                    attempt = state.attempts_made,
                    max_attempts = policy.max_attempts,
                    status,
                    "waiting for target"
                );
            }
            Err(err) => {
                tracing::info!(
                    target_url = %target,
                    attempt = state.attempts_made,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "waiting for target"
                );
                last_observation = err.to_string();
            }
        }
    }
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::error!(target_url = %target, attempts = state.attempts_made, "target never became ready");
    Err(ServiceUnavailable {
        base_url: target,
        attempts: state.attempts_made,
        elapsed_ms,
        last_observation,
    })
}

/// Run-wide barrier that evaluates the gate at most once.
#[derive(Debug)]
pub struct ReadinessGate {
    /// Polling bounds.
    policy: ReadinessPolicy,
    /// Memoized outcome.
    outcome: OnceCell<Result<ReadinessState, ServiceUnavailable>>,
}

impl ReadinessGate {
    /// Creates a gate that has not been evaluated yet.
    #[must_use]
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self {
            policy,
            outcome: OnceCell::new(),
        }
    }

    /// Returns the gate's policy.
    #[must_use]
    pub const fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    /// Evaluates the gate on first call; later calls return the same outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceUnavailable`] when the first evaluation failed.
    pub async fn pass<P>(&self, probe: &P) -> Result<ReadinessState, ServiceUnavailable>
    where
        P: ReadinessProbe + ?Sized,
    {
        self.outcome.get_or_init(|| wait_until_ready(probe, self.policy)).await.clone()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
