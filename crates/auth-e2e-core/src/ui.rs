// crates/auth-e2e-core/src/ui.rs
// ============================================================================
// Module: Browser Boundary
// Description: Browser session traits, page-error policy, and UI expectations.
// Purpose: Let UI scenarios drive a real browser or a scripted stand-in.
// Dependencies: async-trait, tracing, url
// ============================================================================

//! ## Overview
//! UI scenarios talk to a [`BrowserSession`] obtained from a
//! [`BrowserLauncher`]. Element lookups return [`ElementSnapshot`] values so
//! the expectations in this module stay pure and testable without a browser.
//!
//! Uncaught page-script errors are never handled implicitly. A scenario reads
//! them with [`BrowserSession::page_errors`] after its assertions and hands
//! them to [`PageErrorPolicy::apply`], which under the default
//! [`PageErrorPolicy::Suppress`] logs them and keeps them as notes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;

use crate::error::ContractViolation;
use crate::error::UiError;

#[cfg(feature = "webdriver")]
mod webdriver;

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverLauncher;

// ============================================================================
// SECTION: Page Constants
// ============================================================================

/// Navigation bar selector.
pub const NAVBAR_SELECTOR: &str = "nav.navbar";
/// Logo image selector.
pub const LOGO_SELECTOR: &str = r#"img[src="/lgr_logo.png"]"#;
/// Expected logo `width` and `height` attribute value.
pub const LOGO_DIMENSION: &str = "25";
/// Brand element selector.
pub const BRAND_SELECTOR: &str = ".navbar-brand";
/// Text the brand element must contain.
pub const BRAND_TEXT: &str = "Auth Service";

// ============================================================================
// SECTION: Session Traits
// ============================================================================

/// Observable state of one matched element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Whether the element is rendered visibly.
    pub visible: bool,
    /// Requested attributes that were present on the element.
    pub attributes: BTreeMap<String, String>,
    /// Rendered text content.
    pub text: String,
}

impl ElementSnapshot {
    /// Returns an attribute value when present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A live browser page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url` and waits for the page load.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Driver`] when navigation fails.
    async fn goto(&mut self, url: &Url) -> Result<(), UiError>;

    /// Returns snapshots of every element matching `selector`, reading the
    /// listed `attributes` from each.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Driver`] when the lookup fails.
    async fn find(
        &mut self,
        selector: &str,
        attributes: &[&str],
    ) -> Result<Vec<ElementSnapshot>, UiError>;

    /// Drains uncaught script errors observed since navigation.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Driver`] when the page cannot be queried.
    async fn page_errors(&mut self) -> Result<Vec<String>, UiError>;

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Driver`] when the driver rejects the close.
    async fn close(&mut self) -> Result<(), UiError>;
}

/// Factory for browser sessions; one session per scenario attempt.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Starts a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Launch`] when no session can be started.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, UiError>;
}

// ============================================================================
// SECTION: Page Error Policy
// ============================================================================

/// Handling of uncaught page-script errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageErrorPolicy {
    /// Log and record as notes; never fail the scenario.
    #[default]
    Suppress,
    /// Fail the scenario on the first error.
    Fail,
}

impl PageErrorPolicy {
    /// Applies the policy to `errors` collected from `page`.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::PageScript`] under [`PageErrorPolicy::Fail`] when
    /// `errors` is non-empty.
    pub fn apply(
        self,
        page: &Url,
        errors: Vec<String>,
        notes: &mut Vec<String>,
    ) -> Result<(), UiError> {
        if errors.is_empty() {
            return Ok(());
        }
        match self {
            Self::Suppress => {
                for error in errors {
                    tracing::warn!(page = %page, error = %error, "suppressed uncaught page error");
                    notes.push(format!("suppressed page error: {error}"));
                }
                Ok(())
            }
            Self::Fail => Err(UiError::PageScript(errors.join("; "))),
        }
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Requires at least one match and that the first match is visible.
///
/// # Errors
///
/// Returns [`ContractViolation`] when nothing matched or the match is hidden.
pub fn expect_visible<'a>(
    selector: &str,
    matches: &'a [ElementSnapshot],
) -> Result<&'a ElementSnapshot, ContractViolation> {
    match matches.first() {
        Some(element) if element.visible => Ok(element),
        Some(_) => Err(ContractViolation {
            contract: "ui_visible",
            check: "visibility",
            expected: format!("{selector} visible"),
            actual: "hidden".to_string(),
        }),
        None => Err(ContractViolation {
            contract: "ui_visible",
            check: "presence",
            expected: format!("{selector} present"),
            actual: "no matching element".to_string(),
        }),
    }
}

/// Requires an exact attribute value.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the attribute is missing or differs.
pub fn expect_attribute(
    selector: &str,
    element: &ElementSnapshot,
    name: &str,
    expected: &str,
) -> Result<(), ContractViolation> {
    match element.attribute(name) {
        Some(value) if value == expected => Ok(()),
        other => Err(ContractViolation {
            contract: "ui_attribute",
            check: "attribute",
            expected: format!("{selector} [{name}={expected:?}]"),
            actual: other.map_or_else(|| "missing".to_string(), |value| format!("{value:?}")),
        }),
    }
}

/// Requires the element text to contain `needle`.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the text does not contain `needle`.
pub fn expect_text_contains(
    selector: &str,
    element: &ElementSnapshot,
    needle: &str,
) -> Result<(), ContractViolation> {
    if element.text.contains(needle) {
        return Ok(());
    }
    Err(ContractViolation {
        contract: "ui_text",
        check: "text",
        expected: format!("{selector} contains {needle:?}"),
        actual: format!("{:?}", element.text),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
