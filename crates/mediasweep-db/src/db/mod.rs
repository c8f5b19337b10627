//! Content store access
//!
//! [`ContentStore`] is the seam between the scanner and the WordPress database.
//! `mysql` implements it over a live install, `memory` over an in-process snapshot
//! with the same matching rules. Deletion backends live under `deleter`.
//
// Store trait and implementations
pub mod memory;
pub mod mysql;
pub mod store;
//
// Query building blocks
pub mod like;
pub mod reference_sql;
pub mod tables;
//
// Deletion backends
pub mod deleter;

pub use deleter::{create_deleter, AssetDeleter, DatabaseDeleter, RestDeleter};
pub use memory::MemoryContentStore;
pub use mysql::{connect_pool, MySqlContentStore};
pub use store::ContentStore;
pub use tables::WpTables;
