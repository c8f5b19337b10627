//! Data models for the application
//!
//! Media assets as read from the content store, the reference queries evaluated
//! against it, and the results of scans and deletions.

mod asset;
mod reference;
mod scan;

pub use asset::*;
pub use reference::*;
pub use scan::*;
