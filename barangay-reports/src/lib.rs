//! Barangay resident issue reports: persistence, lifecycle, audit trail and
//! querying for a single-writer deployment.

pub mod backup;
pub mod config;
pub mod export;
pub mod models;
pub mod photo;
pub mod services;
pub mod store;

use std::sync::Arc;

use config::AppConfig;
use services::{AuditLog, PermissiveTransitions, ReportService, SessionService};
use store::EntityStore;

/// Everything a caller needs, wired over one entity store.
#[derive(Clone)]
pub struct AppState {
    pub store: EntityStore,
    pub config: AppConfig,
    pub sessions: SessionService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(store: EntityStore, config: AppConfig) -> Self {
        let audit = AuditLog::new(store.clone(), config.audit_capacity);
        let reports = ReportService::new(store.clone(), audit)
            .with_transition_policy(Arc::new(PermissiveTransitions))
            .with_max_photo_bytes(config.max_photo_bytes);
        let sessions = SessionService::new(store.clone(), config.admin_credentials());
        Self {
            store,
            config,
            sessions,
            reports,
        }
    }
}
