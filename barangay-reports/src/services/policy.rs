use serde::Serialize;

use barangay_shared::errors::{AppError, AppResult, ErrorCode};
use barangay_shared::types::auth::Identity;

use crate::models::{Report, ReportStatus};

/// Decides whether a report may move from one status to another. Every
/// status write in the lifecycle manager goes through exactly one call here.
pub trait TransitionPolicy: Send + Sync {
    fn check(&self, from: ReportStatus, to: ReportStatus) -> AppResult<()>;
}

/// Any status may be set to any other, including re-opening archived reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveTransitions;

impl TransitionPolicy for PermissiveTransitions {
    fn check(&self, _from: ReportStatus, _to: ReportStatus) -> AppResult<()> {
        Ok(())
    }
}

/// Terminal-archive policy: nothing leaves `Archived`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveIsFinal;

impl TransitionPolicy for ArchiveIsFinal {
    fn check(&self, from: ReportStatus, to: ReportStatus) -> AppResult<()> {
        if from == ReportStatus::Archived && to != ReportStatus::Archived {
            return Err(AppError::new(
                ErrorCode::InvalidTransition,
                format!("cannot move an archived report to {to}"),
            ));
        }
        Ok(())
    }
}

/// The actions a caller may take on one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ReportPermissions {
    pub view_log: bool,
    pub add_remark: bool,
    pub toggle_status: bool,
    pub request_info: bool,
    pub delete: bool,
}

impl ReportPermissions {
    pub fn resolve(identity: Option<&Identity>, report: &Report) -> Self {
        let Some(identity) = identity else {
            return Self::default();
        };

        if identity.is_admin() {
            return Self {
                view_log: true,
                add_remark: true,
                toggle_status: true,
                request_info: true,
                delete: true,
            };
        }

        let owner_pending =
            identity.username == report.reporter_username && report.status == ReportStatus::Pending;

        Self {
            view_log: true,
            delete: owner_pending,
            ..Self::default()
        }
    }
}
