use async_trait::async_trait;
use chromiumoxide::page::Page;
use hrepr_core::LoadError;
use serde_json::json;
use tracing::debug;

use crate::shared::{js, to_load_error, TimeoutConfig};

/// Inserts a script tag somewhere and reports how loading it went.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn inject(&self, src: &str) -> Result<(), LoadError>;
}

/// Injects scripts into a live Chromium page.
pub struct PageInjector {
    page: Page,
    config: TimeoutConfig,
    module: bool,
}

impl PageInjector {
    pub fn new(page: Page, config: TimeoutConfig) -> Self {
        Self { page, config, module: false }
    }

    /// Inject `<script type="module">` tags instead of classic scripts.
    pub fn modules(mut self) -> Self {
        self.module = true;
        self
    }
}

#[async_trait]
impl ScriptInjector for PageInjector {
    async fn inject(&self, src: &str) -> Result<(), LoadError> {
        let js = js::build_js_call(js::runtime::INJECT_SCRIPT, &[json!(src), json!(self.module)]);
        let timeout = self.config.script_load;

        let result = tokio::time::timeout(timeout, self.page.evaluate(js))
            .await
            .map_err(|_| LoadError::timeout(src, timeout.as_millis() as u64))?
            .map_err(|e| to_load_error(e, src))?;

        let outcome = result.value().and_then(|v| v.as_object());
        let loaded = outcome
            .and_then(|obj| obj.get("loaded"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if loaded {
            debug!(src, "script loaded in page");
            return Ok(());
        }

        let reason = outcome
            .and_then(|obj| obj.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("no load event");
        Err(LoadError::load_failed(src, reason))
    }
}
