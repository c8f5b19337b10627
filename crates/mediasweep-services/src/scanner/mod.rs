//! Reference scanning
//!
//! An attachment is referenced when at least one [`ReferenceKind`] lookup in the
//! active [`ReferencePolicy`] matches. Anything else is unused and may be deleted.
//!
//! [`ReferenceKind`]: mediasweep_core::ReferenceKind
//! [`ReferencePolicy`]: policy::ReferencePolicy

pub mod listing;
pub mod policy;
pub mod service;
