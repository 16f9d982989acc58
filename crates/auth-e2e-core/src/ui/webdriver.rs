// crates/auth-e2e-core/src/ui/webdriver.rs
// ============================================================================
// Module: WebDriver Launcher
// Description: BrowserLauncher over a WebDriver endpoint.
// Purpose: Drive a real browser for UI scenarios.
// Dependencies: fantoccini, serde_json
// ============================================================================

//! ## Overview
//! Each launch opens a new WebDriver session with headless capabilities.
//! After navigation a small listener script is installed that records
//! `error` and `unhandledrejection` events into a page global. Errors thrown
//! before the listener is installed are not observed.

use async_trait::async_trait;
use fantoccini::Client;
use fantoccini::ClientBuilder;
use fantoccini::Locator;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use url::Url;

use super::BrowserLauncher;
use super::BrowserSession;
use super::ElementSnapshot;
use crate::error::UiError;

// ============================================================================
// SECTION: Scripts
// ============================================================================

const INSTALL_ERROR_LISTENER: &str = r"
window.__authE2eErrors = window.__authE2eErrors || [];
if (!window.__authE2eListening) {
  window.__authE2eListening = true;
  window.addEventListener('error', function (event) {
    window.__authE2eErrors.push(String(event.message));
  });
  window.addEventListener('unhandledrejection', function (event) {
    window.__authE2eErrors.push(String(event.reason));
  });
}
";

const DRAIN_ERRORS: &str = r"
var errors = window.__authE2eErrors || [];
window.__authE2eErrors = [];
return errors;
";

// ============================================================================
// SECTION: Launcher
// ============================================================================

/// Launches sessions against a WebDriver endpoint such as chromedriver.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    endpoint: Url,
}

impl WebDriverLauncher {
    /// Creates a headless launcher for `endpoint`.
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
        }
    }

    fn capabilities() -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--no-sandbox", "--disable-gpu"] }),
        );
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": ["-headless"] }));
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, UiError> {
        let client = ClientBuilder::native()
            .capabilities(Self::capabilities())
            .connect(self.endpoint.as_str())
            .await
            .map_err(|err| UiError::Launch(format!("{}: {err}", self.endpoint)))?;
        tracing::debug!(endpoint = %self.endpoint, "webdriver session started");
        Ok(Box::new(WebDriverSession {
            client,
        }))
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

struct WebDriverSession {
    client: Client,
}

fn driver_error(action: &str, err: impl std::fmt::Display) -> UiError {
    UiError::Driver(format!("{action}: {err}"))
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &Url) -> Result<(), UiError> {
        self.client.goto(url.as_str()).await.map_err(|err| driver_error("goto", err))?;
        self.client
            .execute(INSTALL_ERROR_LISTENER, Vec::new())
            .await
            .map_err(|err| driver_error("install error listener", err))?;
        Ok(())
    }

    async fn find(
        &mut self,
        selector: &str,
        attributes: &[&str],
    ) -> Result<Vec<ElementSnapshot>, UiError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|err| driver_error("find", err))?;
        let mut snapshots = Vec::with_capacity(elements.len());
        for element in elements {
            let visible =
                element.is_displayed().await.map_err(|err| driver_error("is_displayed", err))?;
            let text = element.text().await.map_err(|err| driver_error("text", err))?;
            let mut snapshot = ElementSnapshot {
                visible,
                text,
                ..ElementSnapshot::default()
            };
            for name in attributes {
                if let Some(value) =
                    element.attr(name).await.map_err(|err| driver_error("attr", err))?
                {
                    snapshot.attributes.insert((*name).to_string(), value);
                }
            }
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    async fn page_errors(&mut self) -> Result<Vec<String>, UiError> {
        let drained = self
            .client
            .execute(DRAIN_ERRORS, Vec::new())
            .await
            .map_err(|err| driver_error("read page errors", err))?;
        Ok(match drained {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn close(&mut self) -> Result<(), UiError> {
        self.client.clone().close().await.map_err(|err| driver_error("close", err))
    }
}
