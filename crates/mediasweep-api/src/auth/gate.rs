use mediasweep_core::AppError;

use super::models::{Actor, Capability};

/// Decides what an authenticated actor may do.
pub trait AuthorizationGate: Send + Sync {
    /// Scan the library (`manage_options`)
    fn can_read(&self, actor: &Actor) -> bool;

    /// Delete attachments (`delete_posts`)
    fn can_delete(&self, actor: &Actor) -> bool;
}

/// Grants capabilities by role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGate;

impl AuthorizationGate for RoleGate {
    fn can_read(&self, actor: &Actor) -> bool {
        actor.role.has(Capability::ManageOptions)
    }

    fn can_delete(&self, actor: &Actor) -> bool {
        actor.role.has(Capability::DeletePosts)
    }
}

/// `Err(PermissionDenied)` unless `allowed`.
pub fn require(allowed: bool, actor: &Actor) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        tracing::warn!(role = %actor.role, "Permission denied");
        Err(AppError::PermissionDenied)
    }
}
