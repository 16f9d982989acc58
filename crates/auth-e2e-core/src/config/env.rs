// crates/auth-e2e-core/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for the harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, malformed URLs, and zero or
//! non-numeric limits fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::client::DEFAULT_REQUEST_TIMEOUT;
use crate::error::ConfigError;
use crate::fixtures::UserFactory;
use crate::readiness::ReadinessPolicy;
use crate::runner::RunnerPolicy;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Base URL used when neither `BASE_URL` nor `CYPRESS_BASE_URL` is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Companion application URL used when `APP_BASE_URL` is unset.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:8000";

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Target base URL.
    BaseUrl,
    /// Alias consulted when `BASE_URL` is unset.
    CypressBaseUrl,
    /// Base URL for API calls and the readiness probe.
    AuthBaseUrl,
    /// Companion application URL, recorded in reports.
    AppBaseUrl,
    /// CI mode (`true`/`false` or `1`/`0`).
    Ci,
    /// WebDriver endpoint; UI scenarios are skipped without it.
    WebDriverUrl,
    /// Request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Readiness attempt budget (positive integer).
    ReadinessAttempts,
    /// Readiness poll interval in milliseconds (positive integer).
    ReadinessIntervalMs,
    /// Artifact directory override.
    RunRoot,
    /// Uniqueness tag for emails generated by this process.
    WorkerTag,
}

impl HarnessEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 11] = [
        Self::BaseUrl,
        Self::CypressBaseUrl,
        Self::AuthBaseUrl,
        Self::AppBaseUrl,
        Self::Ci,
        Self::WebDriverUrl,
        Self::TimeoutSeconds,
        Self::ReadinessAttempts,
        Self::ReadinessIntervalMs,
        Self::RunRoot,
        Self::WorkerTag,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "BASE_URL",
            Self::CypressBaseUrl => "CYPRESS_BASE_URL",
            Self::AuthBaseUrl => "AUTH_BASE_URL",
            Self::AppBaseUrl => "APP_BASE_URL",
            Self::Ci => "CI",
            Self::WebDriverUrl => "AUTH_E2E_WEBDRIVER_URL",
            Self::TimeoutSeconds => "AUTH_E2E_TIMEOUT_SEC",
            Self::ReadinessAttempts => "AUTH_E2E_READINESS_ATTEMPTS",
            Self::ReadinessIntervalMs => "AUTH_E2E_READINESS_INTERVAL_MS",
            Self::RunRoot => "AUTH_E2E_RUN_ROOT",
            Self::WorkerTag => "AUTH_E2E_WORKER_TAG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Target base URL; UI scenarios navigate here.
    pub base_url: Url,
    /// Base URL for API calls and the readiness probe.
    pub auth_base_url: Url,
    /// Companion application URL.
    pub app_base_url: Url,
    /// CI mode toggles retry and worker defaults.
    pub ci: bool,
    /// Optional WebDriver endpoint.
    pub webdriver_url: Option<Url>,
    /// Request/response timeout for API calls.
    pub request_timeout: Duration,
    /// Readiness gate bounds.
    pub readiness: ReadinessPolicy,
    /// Optional artifact directory override.
    pub run_root: Option<PathBuf>,
    /// Optional email uniqueness tag.
    pub worker_tag: Option<String>,
}

impl HarnessConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is not valid UTF-8, is empty, or
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(read_env_strict)
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is empty or fails validation.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, ConfigError>,
    {
        let read = |key: HarnessEnv| read_nonempty(&lookup, key.as_str());
        let readiness_defaults = ReadinessPolicy::default();

        let base_url = match read(HarnessEnv::BaseUrl)? {
            Some(raw) => Some((HarnessEnv::BaseUrl, raw)),
            None => read(HarnessEnv::CypressBaseUrl)?.map(|raw| (HarnessEnv::CypressBaseUrl, raw)),
        }
        .map(|(key, raw)| parse_url(key.as_str(), &raw))
        .transpose()?
        .map_or_else(|| parse_url(HarnessEnv::BaseUrl.as_str(), DEFAULT_BASE_URL), Ok)?;
        let auth_base_url = read(HarnessEnv::AuthBaseUrl)?
            .map(|raw| parse_url(HarnessEnv::AuthBaseUrl.as_str(), &raw))
            .transpose()?
            .unwrap_or_else(|| base_url.clone());
        let app_base_url = read(HarnessEnv::AppBaseUrl)?
            .map(|raw| parse_url(HarnessEnv::AppBaseUrl.as_str(), &raw))
            .transpose()?
            .map_or_else(|| parse_url(HarnessEnv::AppBaseUrl.as_str(), DEFAULT_APP_BASE_URL), Ok)?;
        let ci = parse_ci_flag(read(HarnessEnv::Ci)?.as_deref());
        let webdriver_url = read(HarnessEnv::WebDriverUrl)?
            .map(|raw| parse_url(HarnessEnv::WebDriverUrl.as_str(), &raw))
            .transpose()?;
        let request_timeout = read(HarnessEnv::TimeoutSeconds)?
            .map(|raw| parse_positive(HarnessEnv::TimeoutSeconds.as_str(), &raw))
            .transpose()?
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);
        let max_attempts = read(HarnessEnv::ReadinessAttempts)?
            .map(|raw| parse_positive(HarnessEnv::ReadinessAttempts.as_str(), &raw))
            .transpose()?
            .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
            .unwrap_or(readiness_defaults.max_attempts);
        let poll_interval = read(HarnessEnv::ReadinessIntervalMs)?
            .map(|raw| parse_positive(HarnessEnv::ReadinessIntervalMs.as_str(), &raw))
            .transpose()?
            .map_or(readiness_defaults.poll_interval, Duration::from_millis);
        let run_root = read(HarnessEnv::RunRoot)?.map(PathBuf::from);
        let worker_tag = read(HarnessEnv::WorkerTag)?
            .map(|raw| parse_worker_tag(HarnessEnv::WorkerTag.as_str(), raw))
            .transpose()?;

        Ok(Self {
            base_url,
            auth_base_url,
            app_base_url,
            ci,
            webdriver_url,
            request_timeout,
            readiness: ReadinessPolicy {
                max_attempts,
                poll_interval,
            },
            run_root,
            worker_tag,
        })
    }

    /// Points both the UI and API at `url`.
    #[must_use]
    pub fn with_target(mut self, url: Url) -> Self {
        self.auth_base_url = url.clone();
        self.base_url = url;
        self
    }

    /// Returns the runner policy implied by CI mode and readiness bounds.
    #[must_use]
    pub fn runner_policy(&self) -> RunnerPolicy {
        RunnerPolicy::for_environment(self.ci).with_readiness(self.readiness)
    }

    /// Returns a user factory honoring the worker tag.
    #[must_use]
    pub fn user_factory(&self) -> UserFactory {
        self.worker_tag.as_ref().map_or_else(UserFactory::new, UserFactory::with_worker_tag)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::new(format!("{name} must be valid UTF-8")))
    })
}

/// Reads a variable through `lookup` and rejects empty values.
fn read_nonempty<F>(lookup: &F, name: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, ConfigError>,
{
    match lookup(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::new(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses an absolute http(s) URL.
fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|err| ConfigError::new(format!("{name} must be an absolute URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::new(format!("{name} must use http or https, not {other}"))),
    }
}

/// Parses a positive integer.
fn parse_positive(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw
        .parse()
        .map_err(|_| ConfigError::new(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(ConfigError::new(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

/// Interprets `CI` the way CI providers set it: unset, `0`, or `false`
/// (any case) means off, and any other value means on.
fn parse_ci_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value != "0" && !value.eq_ignore_ascii_case("false"))
}

/// Accepts tags safe to embed in an email local part.
fn parse_worker_tag(name: &str, raw: String) -> Result<String, ConfigError> {
    if raw.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
        return Ok(raw);
    }
    Err(ConfigError::new(format!("{name} may only contain ASCII letters, digits, '-' or '_'")))
}
