// crates/auth-e2e-core/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Readiness-gated, bounded-concurrency scenario execution.
// Purpose: Run a scenario selection and collect a report.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`Runner::run`] passes the readiness gate once, serially, before any
//! scenario starts. Scenarios then run as tokio tasks with at most `workers`
//! in flight. Each attempt runs in its own task, so a panicking scenario
//! becomes a [`ScenarioFailure::Aborted`] instead of tearing down the run.
//! Failed scenarios are re-run up to `retries` times. Readiness failure is
//! run-fatal and is never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::error::RunError;
use crate::error::ScenarioFailure;
use crate::readiness::ReadinessGate;
use crate::readiness::ReadinessPolicy;
use crate::report::RunReport;
use crate::report::RunTargets;
use crate::report::ScenarioRecord;
use crate::report::ScenarioStatus;
use crate::report::now_millis;
use crate::scenario::Scenario;
use crate::scenario::ScenarioContext;
use crate::scenario::Verdict;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retries per failing scenario in CI.
pub const CI_RETRIES: u32 = 2;
/// Concurrent scenarios in CI.
pub const CI_WORKERS: usize = 2;

/// Scheduling bounds for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerPolicy {
    /// Maximum scenarios in flight.
    pub workers: usize,
    /// Extra attempts per failing scenario.
    pub retries: u32,
    /// Readiness gate bounds.
    pub readiness: ReadinessPolicy,
}

impl RunnerPolicy {
    /// CI uses two workers and two retries; local runs use every core and no
    /// retries.
    #[must_use]
    pub fn for_environment(ci: bool) -> Self {
        if ci {
            return Self {
                workers: CI_WORKERS,
                retries: CI_RETRIES,
                readiness: ReadinessPolicy::default(),
            };
        }
        Self {
            workers: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            retries: 0,
            readiness: ReadinessPolicy::default(),
        }
    }

    /// Replaces the readiness bounds.
    #[must_use]
    pub const fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }
}

impl Default for RunnerPolicy {
    fn default() -> Self {
        Self::for_environment(false)
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes one run. The readiness gate is evaluated at most once per runner,
/// or once across every runner sharing it through [`Runner::with_gate`].
#[derive(Debug)]
pub struct Runner {
    policy: RunnerPolicy,
    gate: Arc<ReadinessGate>,
}

impl Runner {
    /// Creates a runner with a fresh readiness gate.
    #[must_use]
    pub fn new(policy: RunnerPolicy) -> Self {
        Self {
            policy,
            gate: Arc::new(ReadinessGate::new(policy.readiness)),
        }
    }

    /// Creates a runner that passes an existing gate; the gate keeps its own
    /// polling bounds and `policy.readiness` is ignored.
    #[must_use]
    pub const fn with_gate(policy: RunnerPolicy, gate: Arc<ReadinessGate>) -> Self {
        Self {
            policy,
            gate,
        }
    }

    /// Returns the scheduling policy.
    #[must_use]
    pub const fn policy(&self) -> &RunnerPolicy {
        &self.policy
    }

    /// Runs `scenarios` against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ServiceUnavailable`] when the readiness gate fails;
    /// no scenario runs in that case. Scenario failures are reported in the
    /// returned [`RunReport`], never as an error.
    pub async fn run(
        &self,
        context: Arc<ScenarioContext>,
        scenarios: Vec<Arc<dyn Scenario>>,
    ) -> Result<RunReport, RunError> {
        let started_at_ms = now_millis();
        let readiness = self.gate.pass(&context.api).await?;
        tracing::info!(
            scenarios = scenarios.len(),
            workers = self.policy.workers,
            retries = self.policy.retries,
            "starting run"
        );

        let semaphore = Arc::new(Semaphore::new(self.policy.workers.max(1)));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for (index, scenario) in scenarios.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let context = Arc::clone(&context);
            let retries = self.policy.retries;
            let label = (scenario.name().to_string(), scenario.suite());
            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, execute(scenario, context, retries).await)
            });
            pending.insert(handle.id(), (index, label));
        }

        let mut records = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, (index, record))) => {
                    pending.remove(&id);
                    records.push((index, record));
                }
                Err(err) => {
                    let Some((index, (name, suite))) = pending.remove(&err.id()) else {
                        continue;
                    };
                    tracing::error!(scenario = %name, error = %err, "scenario task lost");
                    records.push((index, ScenarioRecord {
                        name,
                        suite,
                        status: ScenarioStatus::Failed,
                        attempts: 0,
                        duration_ms: 0,
                        failure_kind: Some("aborted"),
                        failure: Some(err.to_string()),
                        notes: Vec::new(),
                    }));
                }
            }
        }
        records.sort_by_key(|(index, _)| *index);

        let targets = RunTargets {
            auth_base_url: context.api.base_url().to_string(),
            ui_base_url: context.ui_base_url.to_string(),
            app_base_url: context.app_base_url.as_ref().map(ToString::to_string),
        };
        let report = RunReport::new(
            targets,
            readiness,
            started_at_ms,
            now_millis(),
            records.into_iter().map(|(_, record)| record).collect(),
        );
        tracing::info!(
            passed = report.counts.passed,
            failed = report.counts.failed,
            skipped = report.counts.skipped,
            "run finished"
        );
        Ok(report)
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs one scenario with retries and folds the attempts into a record.
async fn execute(
    scenario: Arc<dyn Scenario>,
    context: Arc<ScenarioContext>,
    retries: u32,
) -> ScenarioRecord {
    let started = Instant::now();
    let mut notes = Vec::new();
    let mut attempts = 0_u32;
    let outcome = loop {
        attempts += 1;
        match attempt(Arc::clone(&scenario), Arc::clone(&context)).await {
            Ok(verdict) => break Ok(verdict),
            Err(failure) if attempts <= retries => {
                tracing::warn!(
                    scenario = scenario.name(),
                    attempt = attempts,
                    error = %failure,
                    "scenario failed; retrying"
                );
                notes.push(format!("attempt {attempts} failed: {failure}"));
            }
            Err(failure) => break Err(failure),
        }
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut record = ScenarioRecord {
        name: scenario.name().to_string(),
        suite: scenario.suite(),
        status: ScenarioStatus::Passed,
        attempts,
        duration_ms,
        failure_kind: None,
        failure: None,
        notes,
    };
    match outcome {
        Ok(Verdict::Passed(extra)) => {
            tracing::info!(scenario = %record.name, attempts, "scenario passed");
            record.notes.extend(extra);
        }
        Ok(Verdict::Skipped(reason)) => {
            tracing::info!(scenario = %record.name, reason = %reason, "scenario skipped");
            record.status = ScenarioStatus::Skipped;
            record.notes.push(reason);
        }
        Err(failure) => {
            tracing::error!(scenario = %record.name, attempts, error = %failure, "scenario failed");
            record.status = ScenarioStatus::Failed;
            record.failure_kind = Some(failure.kind());
            record.failure = Some(failure.to_string());
        }
    }
    record
}

/// Runs a single attempt in its own task so panics stay contained.
async fn attempt(
    scenario: Arc<dyn Scenario>,
    context: Arc<ScenarioContext>,
) -> Result<Verdict, ScenarioFailure> {
    let handle = tokio::spawn(async move { scenario.run(&context).await });
    match handle.await {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => Err(ScenarioFailure::Aborted("scenario panicked".to_string())),
        Err(err) => Err(ScenarioFailure::Aborted(err.to_string())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
