use crate::resource::ResourceKey;
use serde::{Deserialize, Serialize};

/// Error categories for programmatic handling of load failures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The host reported a failed fetch (network error, 404, script error event)
    Network,
    /// The load did not complete in time
    Timeout,
    /// The DOM bridge could not perform an operation
    Bridge,
    /// A node lookup or DOM manipulation failed
    Dom,
    /// Invalid configuration
    Config,
    /// The producer went away before delivering a value
    Cancelled,
}

/// Structured error with context, shared by every waiter of a failed resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("[{category:?}] {message}")]
pub struct LoadError {
    pub category: ErrorCategory,
    pub message: String,
    /// The resource the failure belongs to, if any
    pub resource: Option<ResourceKey>,
    /// Whether trying again could plausibly succeed
    pub recoverable: bool,
    /// Suggested retry delay in milliseconds
    pub retry_after_ms: Option<u64>,
}

impl LoadError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            resource: None,
            recoverable: false,
            retry_after_ms: None,
        }
    }

    pub fn for_resource(mut self, resource: impl Into<ResourceKey>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    pub fn with_retry_delay(mut self, ms: u64) -> Self {
        self.retry_after_ms = Some(ms);
        self.recoverable = true;
        self
    }

    // Convenience constructors
    pub fn load_failed(resource: impl Into<ResourceKey>, reason: impl std::fmt::Display) -> Self {
        let resource = resource.into();
        Self::new(ErrorCategory::Network, format!("Failed to load {}: {}", resource, reason))
            .for_resource(resource)
            .recoverable()
    }

    pub fn timeout(resource: impl Into<ResourceKey>, after_ms: u64) -> Self {
        let resource = resource.into();
        Self::new(ErrorCategory::Timeout, format!("Loading {} timed out after {}ms", resource, after_ms))
            .for_resource(resource)
            .with_retry_delay(after_ms / 2)
    }

    pub fn bridge(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Bridge, message)
    }

    pub fn node_not_found(id: impl std::fmt::Display) -> Self {
        Self::new(ErrorCategory::Dom, format!("Node not found: {}", id))
    }

    pub fn dom(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Dom, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Cancelled, message)
    }
}
