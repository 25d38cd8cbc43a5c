//! Whole-store snapshot for backup files.

use serde::{Deserialize, Serialize};

use barangay_shared::errors::{AppError, AppResult, ErrorCode};
use barangay_shared::types::auth::Identity;

use crate::models::{AuditLogEntry, Report, User};
use crate::services::audit_log::RingLog;
use crate::store::{EntityStore, StoreError};

pub const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub reports: Vec<Report>,
    pub session: Option<Identity>,
    pub notif: Vec<AuditLogEntry>,
    pub theme: String,
}

impl Snapshot {
    pub fn capture(store: &EntityStore) -> AppResult<Self> {
        Ok(Self {
            users: store.load()?,
            reports: store.load()?,
            session: store.session()?,
            notif: store.load()?,
            theme: store.theme()?.unwrap_or_else(|| DEFAULT_THEME.to_string()),
        })
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self).map_err(StoreError::from)?)
    }
}

/// Import payload. Every field is optional; absent and `null` both mean
/// "keep what is stored".
#[derive(Debug, Default, Deserialize)]
struct SnapshotPatch {
    #[serde(default)]
    users: Option<Vec<User>>,
    #[serde(default)]
    reports: Option<Vec<Report>>,
    #[serde(default)]
    session: Option<Identity>,
    #[serde(default)]
    notif: Option<Vec<AuditLogEntry>>,
    #[serde(default)]
    theme: Option<String>,
}

/// What a restore replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub users: Option<usize>,
    pub reports: Option<usize>,
    pub session: Option<String>,
    pub audit_entries: Option<usize>,
    pub theme: Option<String>,
}

fn invalid(reason: impl std::fmt::Display) -> AppError {
    AppError::new(ErrorCode::InvalidBackup, format!("invalid backup file: {reason}"))
}

/// Parse the whole payload first, then write the fields it carries. A
/// malformed payload leaves the store untouched.
pub fn restore(store: &EntityStore, json: &str, audit_capacity: usize) -> AppResult<RestoreSummary> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
    if !value.is_object() {
        return Err(invalid("top level must be an object"));
    }
    let patch: SnapshotPatch = serde_json::from_value(value).map_err(invalid)?;

    let mut summary = RestoreSummary::default();

    if let Some(users) = patch.users {
        store.save(&users)?;
        summary.users = Some(users.len());
    }
    if let Some(reports) = patch.reports {
        store.save(&reports)?;
        summary.reports = Some(reports.len());
    }
    if let Some(identity) = patch.session {
        store.set_session(&identity)?;
        summary.session = Some(identity.username);
    }
    if let Some(entries) = patch.notif {
        let kept = RingLog::from_newest_first(entries, audit_capacity).into_vec();
        store.save(&kept)?;
        summary.audit_entries = Some(kept.len());
    }
    if let Some(theme) = patch.theme.filter(|t| !t.is_empty()) {
        store.set_theme(&theme)?;
        summary.theme = Some(theme);
    }

    tracing::info!(
        users = ?summary.users,
        reports = ?summary.reports,
        audit_entries = ?summary.audit_entries,
        "backup restored"
    );
    Ok(summary)
}
