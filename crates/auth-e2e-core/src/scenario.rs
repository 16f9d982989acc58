// crates/auth-e2e-core/src/scenario.rs
// ============================================================================
// Module: Scenario Model
// Description: Scenario trait, shared run context, and verdicts.
// Purpose: Give every suite one shape the runner can schedule.
// Dependencies: async-trait, serde, url
// ============================================================================

//! ## Overview
//! A [`Scenario`] is a named, independent sequence of client calls and
//! contract checks. Scenarios share nothing but a read-only
//! [`ScenarioContext`]: each one generates its own users, so any subset may run
//! concurrently and in any order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::client::AuthApiClient;
use crate::error::ScenarioFailure;
use crate::fixtures::UserFactory;
use crate::ui::BrowserLauncher;
use crate::ui::PageErrorPolicy;

// ============================================================================
// SECTION: Suites
// ============================================================================

/// Which suite a scenario belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    /// Black-box HTTP scenarios.
    Api,
    /// Browser scenarios.
    Ui,
}

impl SuiteKind {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Ui => "ui",
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suite selection for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuiteFilter {
    /// API scenarios only.
    Api,
    /// UI scenarios only.
    Ui,
    /// Everything.
    #[default]
    All,
}

impl SuiteFilter {
    /// Returns true when `kind` is selected.
    #[must_use]
    pub const fn admits(self, kind: SuiteKind) -> bool {
        matches!(
            (self, kind),
            (Self::All, _) | (Self::Api, SuiteKind::Api) | (Self::Ui, SuiteKind::Ui)
        )
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Read-only state shared by every scenario in a run.
#[derive(Clone)]
pub struct ScenarioContext {
    /// Client for the service under test.
    pub api: AuthApiClient,
    /// Generator for unique users.
    pub users: UserFactory,
    /// Page UI scenarios navigate to.
    pub ui_base_url: Url,
    /// Companion application, recorded in reports only.
    pub app_base_url: Option<Url>,
    /// Browser launcher; UI scenarios skip when absent.
    pub browser: Option<Arc<dyn BrowserLauncher>>,
    /// Handling of uncaught page-script errors.
    pub page_errors: PageErrorPolicy,
}

impl ScenarioContext {
    /// Creates an API-only context; UI scenarios navigate to the API base.
    #[must_use]
    pub fn new(api: AuthApiClient, users: UserFactory) -> Self {
        let ui_base_url = api.base_url().clone();
        Self {
            api,
            users,
            ui_base_url,
            app_base_url: None,
            browser: None,
            page_errors: PageErrorPolicy::default(),
        }
    }

    /// Sets the UI page URL.
    #[must_use]
    pub fn with_ui_base_url(mut self, url: Url) -> Self {
        self.ui_base_url = url;
        self
    }

    /// Records the companion application URL.
    #[must_use]
    pub fn with_app_base_url(mut self, url: Url) -> Self {
        self.app_base_url = Some(url);
        self
    }

    /// Attaches a browser launcher.
    #[must_use]
    pub fn with_browser(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = Some(launcher);
        self
    }

    /// Overrides the page-error policy.
    #[must_use]
    pub const fn with_page_errors(mut self, policy: PageErrorPolicy) -> Self {
        self.page_errors = policy;
        self
    }
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("api", &self.api.base_url().as_str())
            .field("ui_base_url", &self.ui_base_url.as_str())
            .field("browser", &self.browser.is_some())
            .field("page_errors", &self.page_errors)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// Non-failing outcome of a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// All checks held; notes are kept in the report.
    Passed(Vec<String>),
    /// The scenario could not run in this configuration.
    Skipped(String),
}

impl Verdict {
    /// Passed with no notes.
    #[must_use]
    pub const fn passed() -> Self {
        Self::Passed(Vec::new())
    }
}

/// One independent end-to-end scenario.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique, human-readable name.
    fn name(&self) -> &str;

    /// Owning suite.
    fn suite(&self) -> SuiteKind;

    /// Runs the scenario once.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFailure`] on the first failed call or check.
    async fn run(&self, context: &ScenarioContext) -> Result<Verdict, ScenarioFailure>;
}
