use crate::error::LoadError;
use serde::{Deserialize, Serialize};

/// What the loader does when a resource reports a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail every batch waiting on the resource right away.
    #[default]
    FailBatch,
    /// Re-inject recoverable failures until `max_attempts` attempts were made,
    /// then fail the waiting batches.
    Retry { max_attempts: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub failure_policy: FailurePolicy,
}

impl LoaderConfig {
    pub fn with_retries(mut self, max_attempts: u32) -> Self {
        self.failure_policy = FailurePolicy::Retry { max_attempts };
        self
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LoadError::config(format!("Invalid loader config: {}", e)))?;
        if let FailurePolicy::Retry { max_attempts: 0 } = config.failure_policy {
            return Err(LoadError::config("max_attempts must be at least 1"));
        }
        Ok(config)
    }

    /// Total number of attempts allowed for a single resource.
    pub fn max_attempts(&self) -> u32 {
        match self.failure_policy {
            FailurePolicy::FailBatch => 1,
            FailurePolicy::Retry { max_attempts } => max_attempts,
        }
    }
}
