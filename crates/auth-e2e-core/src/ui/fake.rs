// crates/auth-e2e-core/src/ui/fake.rs
// ============================================================================
// Module: Scripted Browser
// Description: In-memory browser launcher for unit tests.
// Purpose: Exercise UI scenarios without a WebDriver endpoint.
// Dependencies: async-trait
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use super::BRAND_SELECTOR;
use super::BRAND_TEXT;
use super::BrowserLauncher;
use super::BrowserSession;
use super::ElementSnapshot;
use super::LOGO_DIMENSION;
use super::LOGO_SELECTOR;
use super::NAVBAR_SELECTOR;
use crate::error::UiError;

/// Static page served by every session of a [`ScriptedLauncher`].
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedPage {
    pub(crate) elements: BTreeMap<String, Vec<ElementSnapshot>>,
    pub(crate) errors: Vec<String>,
}

impl ScriptedPage {
    /// The auth service landing page as the UI suite expects it.
    pub(crate) fn landing() -> Self {
        let mut elements = BTreeMap::new();
        elements.insert(NAVBAR_SELECTOR.to_string(), vec![visible(&[], "")]);
        elements.insert(
            LOGO_SELECTOR.to_string(),
            vec![visible(&[("width", LOGO_DIMENSION), ("height", LOGO_DIMENSION)], "")],
        );
        elements.insert(BRAND_SELECTOR.to_string(), vec![visible(&[], BRAND_TEXT)]);
        Self {
            elements,
            errors: Vec::new(),
        }
    }
}

pub(crate) fn visible(attributes: &[(&str, &str)], text: &str) -> ElementSnapshot {
    ElementSnapshot {
        visible: true,
        attributes: attributes
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect(),
        text: text.to_string(),
    }
}

/// Launcher whose sessions replay a [`ScriptedPage`] and log visits.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedLauncher {
    pub(crate) page: ScriptedPage,
    pub(crate) visits: Arc<Mutex<Vec<String>>>,
    pub(crate) closed: Arc<Mutex<u32>>,
}

impl ScriptedLauncher {
    pub(crate) fn new(page: ScriptedPage) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}

struct ScriptedSession {
    page: ScriptedPage,
    visits: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<u32>>,
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, UiError> {
        Ok(Box::new(ScriptedSession {
            page: self.page.clone(),
            visits: Arc::clone(&self.visits),
            closed: Arc::clone(&self.closed),
        }))
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn goto(&mut self, url: &Url) -> Result<(), UiError> {
        self.visits.lock().map_err(|err| UiError::Driver(err.to_string()))?.push(url.to_string());
        Ok(())
    }

    async fn find(
        &mut self,
        selector: &str,
        attributes: &[&str],
    ) -> Result<Vec<ElementSnapshot>, UiError> {
        let matches = self.page.elements.get(selector).cloned().unwrap_or_default();
        Ok(matches
            .into_iter()
            .map(|mut element| {
                element.attributes.retain(|name, _| attributes.contains(&name.as_str()));
                element
            })
            .collect())
    }

    async fn page_errors(&mut self) -> Result<Vec<String>, UiError> {
        Ok(std::mem::take(&mut self.page.errors))
    }

    async fn close(&mut self) -> Result<(), UiError> {
        *self.closed.lock().map_err(|err| UiError::Driver(err.to_string()))? += 1;
        Ok(())
    }
}
