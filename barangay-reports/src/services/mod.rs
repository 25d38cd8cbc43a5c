pub mod audit_log;
pub mod policy;
pub mod query;
pub mod report_service;
pub mod session_service;

pub use audit_log::AuditLog;
pub use policy::{ArchiveIsFinal, PermissiveTransitions, ReportPermissions, TransitionPolicy};
pub use query::{ReportQuery, ReportStats};
pub use report_service::{RemarkPreset, RemarkRequest, ReportDraft, ReportService};
pub use session_service::{SessionService, SignupRequest};
