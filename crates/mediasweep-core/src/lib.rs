//! Mediasweep Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the store, service, API and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, DeleteBackend, LogFormat, StoreConfig, SweepConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AssetId, AssetRecord, DeletionReport, MediaAsset, Partition, ReferenceKind, ReferenceQuery,
    ScanResult,
};
