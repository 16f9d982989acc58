// system-tests/src/live.rs
// ============================================================================
// Module: Live Target
// Description: Environment-resolved target and a process-wide readiness gate.
// Purpose: Let every live suite in a binary share one readiness evaluation.
// Dependencies: auth-e2e-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! Live suites resolve [`HarnessConfig`] from the environment and call
//! [`LiveTarget::ensure_ready`] before doing anything else. The gate behind it
//! is stored in a `OnceLock` and handed to every [`Runner`], so a binary
//! checks the target once and a dead target costs one polling budget per
//! binary instead of one per test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

use auth_e2e_core::AuthApiClient;
use auth_e2e_core::ConfigError;
use auth_e2e_core::HarnessConfig;
use auth_e2e_core::ReadinessGate;
use auth_e2e_core::ReadinessPolicy;
use auth_e2e_core::RunArtifacts;
use auth_e2e_core::RunError;
use auth_e2e_core::RunReport;
use auth_e2e_core::Runner;
use auth_e2e_core::ScenarioContext;
use auth_e2e_core::ServiceUnavailable;
use auth_e2e_core::SuiteFilter;
use auth_e2e_core::readiness::ReadinessState;
use auth_e2e_core::report::WrittenArtifacts;
use auth_e2e_core::report::default_run_root;
use auth_e2e_core::suites;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures surfaced by live suites.
#[derive(Debug, Error)]
pub enum LiveError {
    /// Environment configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The target never became ready.
    #[error(transparent)]
    Unavailable(#[from] ServiceUnavailable),
    /// The runner aborted.
    #[error(transparent)]
    Run(#[from] RunError),
    /// The filters matched nothing.
    #[error("no scenarios match suite {filter:?} and name filter {name:?}")]
    NoScenarios {
        /// Suite filter.
        filter: SuiteFilter,
        /// Name filter.
        name: Option<String>,
    },
    /// Artifacts could not be written.
    #[error("failed to write artifacts: {0}")]
    Artifacts(#[from] std::io::Error),
}

// ============================================================================
// SECTION: Shared Gate
// ============================================================================

static GATE: OnceLock<Arc<ReadinessGate>> = OnceLock::new();

/// Returns the process-wide gate; the first caller's policy wins.
fn shared_gate(policy: ReadinessPolicy) -> Arc<ReadinessGate> {
    Arc::clone(GATE.get_or_init(|| Arc::new(ReadinessGate::new(policy))))
}

// ============================================================================
// SECTION: Live Target
// ============================================================================

/// A live auth service resolved from the environment.
#[derive(Debug, Clone)]
pub struct LiveTarget {
    config: HarnessConfig,
}

impl LiveTarget {
    /// Resolves the target from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Config`] when any variable is invalid.
    pub fn from_env() -> Result<Self, LiveError> {
        Ok(Self {
            config: HarnessConfig::load()?,
        })
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Passes the shared readiness gate.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Unavailable`] when the gate failed, now or on an
    /// earlier call in this process.
    pub async fn ensure_ready(&self) -> Result<ReadinessState, LiveError> {
        let api = self.client()?;
        Ok(shared_gate(self.config.readiness).pass(&api).await?)
    }

    /// Runs the matching scenarios and writes artifacts under `label`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError`] when the gate fails, nothing matches, or the
    /// artifacts cannot be written. Scenario failures land in the report.
    pub async fn run(
        &self,
        label: &str,
        filter: SuiteFilter,
        name_filter: Option<&str>,
    ) -> Result<(RunReport, WrittenArtifacts), LiveError> {
        self.ensure_ready().await?;
        let scenarios = suites::select(filter, name_filter);
        if scenarios.is_empty() {
            return Err(LiveError::NoScenarios {
                filter,
                name: name_filter.map(ToString::to_string),
            });
        }
        let api = self.client()?;
        let context = ScenarioContext::new(api.clone(), self.config.user_factory())
            .with_ui_base_url(self.config.base_url.clone())
            .with_app_base_url(self.config.app_base_url.clone());
        let context = attach_browser(context, &self.config);
        let runner =
            Runner::with_gate(self.config.runner_policy(), shared_gate(self.config.readiness));
        let report = runner.run(Arc::new(context), scenarios).await?;
        let root = self.run_root(label);
        let written = RunArtifacts::create(&root)?.write_run(&report, &api.transcript())?;
        tracing::info!(
            label,
            passed = report.counts.passed,
            failed = report.counts.failed,
            skipped = report.counts.skipped,
            summary = %written.summary_markdown.display(),
            "live run finished"
        );
        Ok((report, written))
    }

    fn client(&self) -> Result<AuthApiClient, ConfigError> {
        AuthApiClient::new(self.config.auth_base_url.clone(), self.config.request_timeout)
    }

    fn run_root(&self, label: &str) -> PathBuf {
        self.config.run_root.clone().unwrap_or_else(default_run_root).join(label)
    }
}

#[cfg(feature = "system-tests")]
fn attach_browser(context: ScenarioContext, config: &HarnessConfig) -> ScenarioContext {
    match &config.webdriver_url {
        Some(url) => context
            .with_browser(Arc::new(auth_e2e_core::WebDriverLauncher::new(url.clone()))),
        None => context,
    }
}

#[cfg(not(feature = "system-tests"))]
fn attach_browser(context: ScenarioContext, _config: &HarnessConfig) -> ScenarioContext {
    context
}
