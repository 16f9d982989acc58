// crates/auth-e2e-core/src/suites.rs
// ============================================================================
// Module: Scenario Catalog
// Description: The built-in signup, session, and UI scenarios.
// Purpose: Provide the catalog and filtered selections of it.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The catalog is static: the `signup` and `session` suites exercise the HTTP
//! API, the `ui` suite renders the landing page. [`select`] narrows the
//! catalog by suite and by a case-insensitive name substring.

use std::sync::Arc;

use crate::scenario::Scenario;
use crate::scenario::SuiteFilter;

mod session;
mod signup;
mod ui;

pub use session::SessionScenario;
pub use signup::SignupScenario;
pub use ui::NO_BROWSER_REASON;
pub use ui::UiScenario;

/// Returns every built-in scenario in catalog order.
#[must_use]
pub fn catalog() -> Vec<Arc<dyn Scenario>> {
    let mut all: Vec<Arc<dyn Scenario>> = Vec::new();
    all.extend(signup::scenarios().into_iter().map(|s| Arc::new(s) as Arc<dyn Scenario>));
    all.extend(session::scenarios().into_iter().map(|s| Arc::new(s) as Arc<dyn Scenario>));
    all.extend(ui::scenarios().into_iter().map(|s| Arc::new(s) as Arc<dyn Scenario>));
    all
}

/// Returns catalog scenarios admitted by `filter` whose name contains
/// `name_filter` (case-insensitive) when one is given.
#[must_use]
pub fn select(filter: SuiteFilter, name_filter: Option<&str>) -> Vec<Arc<dyn Scenario>> {
    let needle = name_filter.map(str::to_lowercase);
    catalog()
        .into_iter()
        .filter(|scenario| filter.admits(scenario.suite()))
        .filter(|scenario| {
            needle.as_deref().is_none_or(|needle| scenario.name().to_lowercase().contains(needle))
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "suites_tests.rs"]
mod tests;
