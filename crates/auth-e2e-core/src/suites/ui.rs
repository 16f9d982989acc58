// crates/auth-e2e-core/src/suites/ui.rs
// ============================================================================
// Module: UI Suite
// Description: Landing page rendering scenarios.
// Purpose: Verify the navbar, logo, and brand through a browser session.
// Dependencies: async-trait
// ============================================================================

use async_trait::async_trait;

use crate::error::ScenarioFailure;
use crate::scenario::Scenario;
use crate::scenario::ScenarioContext;
use crate::scenario::SuiteKind;
use crate::scenario::Verdict;
use crate::ui::BRAND_SELECTOR;
use crate::ui::BRAND_TEXT;
use crate::ui::BrowserSession;
use crate::ui::LOGO_DIMENSION;
use crate::ui::LOGO_SELECTOR;
use crate::ui::NAVBAR_SELECTOR;
use crate::ui::expect_attribute;
use crate::ui::expect_text_contains;
use crate::ui::expect_visible;

/// Reason recorded when no browser launcher is configured.
pub const NO_BROWSER_REASON: &str = "no browser launcher configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiCheck {
    Navbar,
    Logo,
    Brand,
}

impl UiCheck {
    const fn name(self) -> &'static str {
        match self {
            Self::Navbar => "ui shows the navbar",
            Self::Logo => "ui shows the logo at 25x25",
            Self::Brand => "ui shows the brand name",
        }
    }
}

/// A UI suite scenario.
#[derive(Debug, Clone, Copy)]
pub struct UiScenario {
    check: UiCheck,
}

/// Every UI scenario, in catalog order.
pub(crate) fn scenarios() -> Vec<UiScenario> {
    [UiCheck::Navbar, UiCheck::Logo, UiCheck::Brand]
        .into_iter()
        .map(|check| UiScenario {
            check,
        })
        .collect()
}

impl UiScenario {
    async fn verify(&self, session: &mut dyn BrowserSession) -> Result<(), ScenarioFailure> {
        match self.check {
            UiCheck::Navbar => {
                let matches = session.find(NAVBAR_SELECTOR, &[]).await?;
                expect_visible(NAVBAR_SELECTOR, &matches)?;
            }
            UiCheck::Logo => {
                let matches = session.find(LOGO_SELECTOR, &["width", "height"]).await?;
                let logo = expect_visible(LOGO_SELECTOR, &matches)?;
                expect_attribute(LOGO_SELECTOR, logo, "width", LOGO_DIMENSION)?;
                expect_attribute(LOGO_SELECTOR, logo, "height", LOGO_DIMENSION)?;
            }
            UiCheck::Brand => {
                let matches = session.find(BRAND_SELECTOR, &[]).await?;
                let brand = expect_visible(BRAND_SELECTOR, &matches)?;
                expect_text_contains(BRAND_SELECTOR, brand, BRAND_TEXT)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Scenario for UiScenario {
    fn name(&self) -> &str {
        self.check.name()
    }

    fn suite(&self) -> SuiteKind {
        SuiteKind::Ui
    }

    async fn run(&self, context: &ScenarioContext) -> Result<Verdict, ScenarioFailure> {
        let Some(launcher) = &context.browser else {
            return Ok(Verdict::Skipped(NO_BROWSER_REASON.to_string()));
        };
        let mut session = launcher.launch().await?;
        let outcome = async {
            session.goto(&context.ui_base_url).await?;
            self.verify(session.as_mut()).await?;
            let mut notes = Vec::new();
            let errors = session.page_errors().await?;
            context.page_errors.apply(&context.ui_base_url, errors, &mut notes)?;
            Ok::<_, ScenarioFailure>(notes)
        }
        .await;
        if let Err(err) = session.close().await {
            tracing::warn!(scenario = self.name(), error = %err, "browser session close failed");
        }
        outcome.map(Verdict::Passed)
    }
}
