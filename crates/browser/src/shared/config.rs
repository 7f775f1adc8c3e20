use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// How long a single script injection may take before it counts as failed
    pub script_load: Duration,
    pub navigation: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            script_load: Duration::from_millis(15000),
            navigation: Duration::from_millis(30000),
        }
    }
}

impl TimeoutConfig {
    pub fn with_script_load(mut self, ms: u64) -> Self {
        self.script_load = Duration::from_millis(ms);
        self
    }

    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            script_load: Duration::from_millis(5000),
            navigation: Duration::from_millis(10000),
        }
    }

    pub fn patient() -> Self {
        Self {
            script_load: Duration::from_millis(60000),
            navigation: Duration::from_millis(60000),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    /// Let `file://` pages fetch other local files, module scripts included
    pub allow_file_access: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: None,
            viewport_height: None,
            allow_file_access: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = TimeoutConfig::default().with_script_load(250).with_navigation(1000);
        assert_eq!(config.script_load, Duration::from_millis(250));
        assert_eq!(config.navigation, Duration::from_millis(1000));
    }

    #[test]
    fn session_config_defaults_to_headless() {
        let config: SessionConfig = serde_json::from_str(r#"{"viewport_width": 800}"#).unwrap();
        assert!(config.headless);
        assert_eq!(config.viewport_width, Some(800));
    }
}
