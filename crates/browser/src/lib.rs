//! Script loading and widget mounting in a real Chromium page.

pub mod bridge;
pub mod injector;
pub mod session;
pub mod shared;

pub use bridge::{ChromiumBridge, LoadEvent, LoadEvents, ScriptElement};
pub use injector::{PageInjector, ScriptInjector};
pub use session::{has_runtime, install_runtime, mount, Session};
pub use shared::{SessionConfig, TimeoutConfig};
