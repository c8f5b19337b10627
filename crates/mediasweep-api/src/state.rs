//! Application state shared by every handler.

use mediasweep_db::ContentStore;
use mediasweep_infra::NonceService;
use mediasweep_services::{DeletionService, ReferenceScanner};
use std::sync::Arc;

use crate::auth::{AuthState, AuthorizationGate, RoleGate};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub scanner: ReferenceScanner,
    pub deletion: DeletionService,
    pub nonces: Arc<NonceService>,
    pub gate: Arc<dyn AuthorizationGate>,
    pub auth: Arc<AuthState>,
}

impl AppState {
    /// State with the full reference policy and role-based authorization.
    pub fn new(store: Arc<dyn ContentStore>, nonces: NonceService, auth: AuthState) -> Self {
        Self {
            store,
            scanner: ReferenceScanner::default(),
            deletion: DeletionService::new(),
            nonces: Arc::new(nonces),
            gate: Arc::new(RoleGate),
            auth: Arc::new(auth),
        }
    }

    pub fn with_gate(mut self, gate: Arc<dyn AuthorizationGate>) -> Self {
        self.gate = gate;
        self
    }
}
