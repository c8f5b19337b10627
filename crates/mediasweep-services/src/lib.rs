//! Mediasweep Services Layer
//!
//! Business services on top of the content store: the reference scanner that finds
//! unused attachments, the listing that turns a scan into displayable rows, and the
//! bulk deletion service. The API and CLI crates only call into this layer.

pub mod cleanup;
pub mod scanner;

pub use cleanup::service::DeletionService;
pub use scanner::listing::list_unused_media;
pub use scanner::policy::ReferencePolicy;
pub use scanner::service::ReferenceScanner;
