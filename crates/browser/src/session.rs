use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use hrepr_core::{Callee, LoadError};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::injector::{PageInjector, ScriptInjector};
use crate::shared::{js, to_load_error, SessionConfig, TimeoutConfig};

/// A running Chromium instance that pages are opened in.
pub struct Session {
    browser: Browser,
    timeouts: TimeoutConfig,
    profile_dir: PathBuf,
}

impl Session {
    pub async fn launch(config: SessionConfig, timeouts: TimeoutConfig) -> Result<Self, LoadError> {
        // A fresh profile directory per instance avoids SingletonLock conflicts.
        let temp_dir = std::env::temp_dir().join(format!("hrepr-chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| LoadError::bridge(format!("Failed to create temp dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(&temp_dir);

        if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
            builder = builder.window_size(w, h);
        }
        if config.allow_file_access {
            builder = builder.arg("--allow-file-access-from-files");
        }

        let chrome_cfg = builder.build()
            .map_err(|e| LoadError::config(format!("Browser config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| LoadError::bridge(format!("Launch failed: {}", e)))?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });
        info!(headless = config.headless, "chromium launched");
        Ok(Self { browser, timeouts, profile_dir: temp_dir })
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Opens `url` in a new page and installs the page-side runtime.
    pub async fn open(&self, url: &str) -> Result<Page, LoadError> {
        let page = self.browser.new_page("about:blank").await
            .map_err(|e| LoadError::bridge(format!("New page failed: {}", e)))?;

        tokio::time::timeout(self.timeouts.navigation, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await
        .map_err(|_| LoadError::timeout(url, self.timeouts.navigation.as_millis() as u64))?
        .map_err(|e| to_load_error(e, url))?;

        install_runtime(&page).await?;
        info!(url, "page ready");
        Ok(page)
    }

    /// Chromium profile directory of this instance, removed by `close`.
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    pub fn injector(&self, page: Page) -> Arc<dyn ScriptInjector> {
        Arc::new(PageInjector::new(page, self.timeouts.clone()))
    }

    pub async fn close(mut self) -> Result<(), LoadError> {
        self.browser.close().await
            .map_err(|e| LoadError::bridge(format!("Close failed: {}", e)))?;
        let _ = self.browser.wait().await;
        std::fs::remove_dir_all(&self.profile_dir)
            .map_err(|e| LoadError::bridge(format!("Failed to remove profile dir: {}", e)))?;
        Ok(())
    }
}

/// Defines `$$HREPR` in `page` unless it already exists.
pub async fn install_runtime(page: &Page) -> Result<(), LoadError> {
    page.evaluate(js::runtime::RUNTIME).await
        .map_err(|e| LoadError::bridge(format!("Runtime install failed: {}", e)))?;
    Ok(())
}

/// Whether `$$HREPR` is defined in `page`. Navigating away drops it.
pub async fn has_runtime(page: &Page) -> Result<bool, LoadError> {
    let result = page.evaluate(js::build_js_call(js::runtime::HAS_RUNTIME, &[])).await
        .map_err(|e| LoadError::bridge(format!("Runtime check failed: {}", e)))?;
    Ok(result.value().and_then(|v| v.as_bool()).unwrap_or(false))
}

/// Hands the node `node_id` to `callee` and resolves the node's object with
/// the result. With `replace`, the node is only a placeholder and is swapped
/// for the result.
///
/// The scripts defining `callee` must be loaded first. The page runtime is
/// reinstalled when the page lost it.
pub async fn mount(
    page: &Page,
    node_id: &str,
    callee: &Callee,
    args: &[Value],
    replace: bool,
) -> Result<Value, LoadError> {
    if !has_runtime(page).await? {
        debug!(node_id, "page runtime missing, reinstalling");
        install_runtime(page).await?;
    }

    let state = page.evaluate(js::build_js_call(js::runtime::OBJECT_STATE, &[json!(node_id)])).await
        .map_err(|e| LoadError::bridge(format!("Mount lookup failed: {}", e)))?;
    let exists = state.value()
        .and_then(|v| v.get("exists"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !exists {
        return Err(LoadError::node_not_found(node_id));
    }

    let result = page.evaluate(js::build_mount(node_id, callee, args, replace)).await
        .map_err(|e| LoadError::dom(format!("Mount of {} failed: {}", node_id, e)))?;
    Ok(result.value().cloned().unwrap_or(json!({ "mounted": true })))
}
