pub mod js;
pub mod errors;
pub mod config;

pub use config::{SessionConfig, TimeoutConfig};
pub use errors::to_load_error;
