//! A headless document for running the script loader and node swapping
//! without a browser.

mod document;
mod html;
mod swap;

pub use document::{Document, NodeId};
pub use swap::Replacement;
