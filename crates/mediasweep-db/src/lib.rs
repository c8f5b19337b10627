//! Mediasweep Database Layer
//!
//! Access to the WordPress content store: attachment listing, the reference
//! lookups behind the scanner, and attachment deletion.

pub mod db;

pub use db::*;
