pub mod bridge;
pub mod config;
pub mod deferred;
pub mod error;
pub mod invoke;
pub mod resource;

pub use bridge::{DomBridge, LoadHandler};
pub use config::{FailurePolicy, LoaderConfig};
pub use deferred::{deferred, Pending, Resolver};
pub use error::{ErrorCategory, LoadError};
pub use invoke::{Callee, Invocation};
pub use resource::{LoadStatus, ResourceKey};
