use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use tokio::sync::Mutex;
use validator::Validate;

use barangay_shared::errors::{AppError, AppResult, ErrorCode};
use barangay_shared::types::auth::{require_admin, Identity};
use barangay_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{new_report_id, AuditLogEntry, RemarkEntry, Report, ReportStatus};
use crate::photo::{encode_photo, InlinePhoto, PhotoSource};
use crate::services::audit_log::AuditLog;
use crate::services::policy::{PermissiveTransitions, ReportPermissions, TransitionPolicy};
use crate::services::query::{self, ReportQuery, ReportStats};
use crate::store::EntityStore;

pub const DEFAULT_CATEGORY: &str = "Other";
pub const NO_REMARK_TEXT: &str = "(no remark text)";
pub const REMARK_SEPARATOR: &str = " — ";
pub const DEFAULT_INFO_REQUEST: &str = "Please provide clearer photos or exact landmark.";

/// Canned remark texts offered to the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemarkPreset {
    Received,
    UnderVerification,
    InProgress,
    Resolved,
    Invalid,
}

impl RemarkPreset {
    pub const ALL: [RemarkPreset; 5] = [
        RemarkPreset::Received,
        RemarkPreset::UnderVerification,
        RemarkPreset::InProgress,
        RemarkPreset::Resolved,
        RemarkPreset::Invalid,
    ];

    pub fn text(&self) -> &'static str {
        match self {
            RemarkPreset::Received => "Report received and logged for review",
            RemarkPreset::UnderVerification => "Under verification by barangay staff",
            RemarkPreset::InProgress => "In progress — maintenance on site",
            RemarkPreset::Resolved => "Resolved — cleared and verified",
            RemarkPreset::Invalid => "Invalid / insufficient evidence",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RemarkPreset::Received => "received",
            RemarkPreset::UnderVerification => "verifying",
            RemarkPreset::InProgress => "in-progress",
            RemarkPreset::Resolved => "resolved",
            RemarkPreset::Invalid => "invalid",
        }
    }

    /// Short name to preset text; anything else is used verbatim.
    pub fn resolve_text(input: &str) -> String {
        Self::ALL
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(input.trim()))
            .map(|p| p.text().to_string())
            .unwrap_or_else(|| input.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReportDraft {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(skip)]
    pub photo: Option<InlinePhoto>,
}

impl ReportDraft {
    fn normalized(self) -> Self {
        let category = self.category.trim();
        Self {
            category: if category.is_empty() { DEFAULT_CATEGORY.to_string() } else { category.to_string() },
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            photo: self.photo,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemarkRequest {
    pub preset_text: Option<String>,
    pub custom_text: Option<String>,
    pub new_status: Option<ReportStatus>,
}

impl RemarkRequest {
    /// Preset and custom fragments joined by ` — `, or `(no remark text)`.
    pub fn compose_text(&self) -> String {
        let parts: Vec<&str> = [self.preset_text.as_deref(), self.custom_text.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            NO_REMARK_TEXT.to_string()
        } else {
            parts.join(REMARK_SEPARATOR)
        }
    }
}

/// Report lifecycle manager. Enforces authorization and invariants, writes
/// through the entity store and appends to the audit log.
#[derive(Clone)]
pub struct ReportService {
    store: EntityStore,
    audit: AuditLog,
    transitions: Arc<dyn TransitionPolicy>,
    max_photo_bytes: usize,
    submit_guard: Arc<Mutex<()>>,
}

impl ReportService {
    pub fn new(store: EntityStore, audit: AuditLog) -> Self {
        Self {
            store,
            audit,
            transitions: Arc::new(PermissiveTransitions),
            max_photo_bytes: usize::MAX,
            submit_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_transition_policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.transitions = policy;
        self
    }

    pub fn with_max_photo_bytes(mut self, max_photo_bytes: usize) -> Self {
        self.max_photo_bytes = max_photo_bytes;
        self
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    fn load_all(&self) -> AppResult<Vec<Report>> {
        self.store.load()
    }

    fn not_found(report_id: &str) -> AppError {
        AppError::new(ErrorCode::ReportNotFound, format!("report {report_id} not found"))
    }

    fn position(reports: &[Report], report_id: &str) -> AppResult<usize> {
        reports
            .iter()
            .position(|r| r.id == report_id)
            .ok_or_else(|| Self::not_found(report_id))
    }

    fn check_draft(identity: Option<&Identity>, draft: ReportDraft) -> AppResult<(Identity, ReportDraft)> {
        let Some(identity) = identity else {
            return Err(AppError::new(ErrorCode::NotAuthenticated, "please log in first"));
        };
        let draft = draft.normalized();
        if draft.validate().is_err() {
            return Err(AppError::new(ErrorCode::DescriptionRequired, "complete description"));
        }
        Ok((identity.clone(), draft))
    }

    // --- Mutations ---

    pub fn submit(&self, identity: Option<&Identity>, draft: ReportDraft) -> AppResult<Report> {
        let (identity, draft) = Self::check_draft(identity, draft)?;

        let report = Report {
            id: new_report_id(),
            reporter_name: identity.name.clone(),
            reporter_username: identity.username.clone(),
            category: draft.category,
            location: draft.location,
            description: draft.description,
            photo: draft.photo.map(InlinePhoto::into_inner),
            created_at: Utc::now(),
            status: ReportStatus::Pending,
            remark_logs: Vec::new(),
        };

        let mut reports = self.load_all()?;
        reports.push(report.clone());
        self.store.save(&reports)?;

        self.audit.append(AuditLogEntry::new(
            &report.id,
            format!("Report submitted by {}", identity.username),
            "System",
        ))?;

        counter!("barangay_reports_submitted_total").increment(1);
        tracing::info!(report_id = %report.id, by = %identity.username, category = %report.category, "report submitted");
        Ok(report)
    }

    /// Validate, encode the photo, then submit. Submits through the same
    /// service are serialized so an encoding never interleaves with another
    /// submit's store write.
    pub async fn submit_with_photo(
        &self,
        identity: Option<&Identity>,
        draft: ReportDraft,
        photo: Option<PhotoSource>,
    ) -> AppResult<Report> {
        let _guard = self.submit_guard.lock().await;
        let (identity, mut draft) = Self::check_draft(identity, draft)?;

        if let Some(source) = photo {
            draft.photo = Some(encode_photo(source, self.max_photo_bytes).await?);
        }

        self.submit(Some(&identity), draft)
    }

    /// Admin shortcut: `Pending` becomes `Done`, anything else becomes `Pending`.
    pub fn toggle_quick_status(&self, identity: Option<&Identity>, report_id: &str) -> AppResult<Report> {
        let admin = require_admin(identity, "change status")?;

        let mut reports = self.load_all()?;
        let idx = Self::position(&reports, report_id)?;
        let from = reports[idx].status;
        let to = if from == ReportStatus::Pending { ReportStatus::Done } else { ReportStatus::Pending };
        self.transitions.check(from, to)?;

        reports[idx].status = to;
        let report = reports[idx].clone();
        self.store.save(&reports)?;

        self.audit.append(AuditLogEntry::new(
            report_id,
            format!("{} changed status to {}", admin.username, to),
            &admin.username,
        ))?;

        counter!("barangay_report_status_changes_total", "source" => "toggle").increment(1);
        tracing::info!(report_id, by = %admin.username, from = %from, to = %to, "status toggled");
        Ok(report)
    }

    /// Append a remark and optionally override the status.
    pub fn add_remark(&self, identity: Option<&Identity>, report_id: &str, req: RemarkRequest) -> AppResult<Report> {
        let admin = require_admin(identity, "add remarks")?;

        let mut reports = self.load_all()?;
        let idx = Self::position(&reports, report_id)?;
        if let Some(to) = req.new_status {
            self.transitions.check(reports[idx].status, to)?;
        }

        let text = req.compose_text();
        let entry = RemarkEntry {
            by_username: admin.username.clone(),
            by_name: admin.name.clone(),
            text: text.clone(),
            status_change: req.new_status,
            at: Utc::now(),
        };

        let report = &mut reports[idx];
        report.remark_logs.push(entry);
        if let Some(to) = req.new_status {
            report.status = to;
        }
        let report = report.clone();
        self.store.save(&reports)?;

        let status_note = req
            .new_status
            .map(|s| format!(" (status -> {s})"))
            .unwrap_or_default();
        self.audit.append(AuditLogEntry::new(
            report_id,
            format!("{} added remark: {text}{status_note}", admin.username),
            &admin.username,
        ))?;

        counter!("barangay_remarks_total").increment(1);
        if req.new_status.is_some() {
            counter!("barangay_report_status_changes_total", "source" => "remark").increment(1);
        }
        tracing::info!(report_id, by = %admin.username, status = %report.status, "remark added");
        Ok(report)
    }

    /// Admins may delete anything; owners only their own `Pending` reports.
    pub fn delete(&self, identity: Option<&Identity>, report_id: &str) -> AppResult<()> {
        let mut reports = self.load_all()?;
        let idx = Self::position(&reports, report_id)?;

        let identity = identity
            .filter(|id| ReportPermissions::resolve(Some(id), &reports[idx]).delete)
            .ok_or_else(|| AppError::forbidden("not authorized to delete this report"))?;

        let removed = reports.remove(idx);
        self.store.save(&reports)?;

        self.audit.append(AuditLogEntry::new(
            report_id,
            format!("{} deleted the report", identity.username),
            &identity.username,
        ))?;

        counter!("barangay_reports_deleted_total").increment(1);
        tracing::info!(report_id, by = %identity.username, status = %removed.status, "report deleted");
        Ok(())
    }

    /// Log-only: status and remarks are left untouched.
    pub fn request_more_info(
        &self,
        identity: Option<&Identity>,
        report_id: &str,
        message: &str,
    ) -> AppResult<AuditLogEntry> {
        let admin = require_admin(identity, "request more info")?;

        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::validation("request message is required"));
        }
        let reports = self.load_all()?;
        Self::position(&reports, report_id)?;

        let entry = AuditLogEntry::new(
            report_id,
            format!("Admin requested more info: {message}"),
            &admin.username,
        );
        self.audit.append(entry.clone())?;

        counter!("barangay_info_requests_total").increment(1);
        tracing::info!(report_id, by = %admin.username, "more info requested");
        Ok(entry)
    }

    // --- Reads ---

    pub fn get(&self, report_id: &str) -> AppResult<Report> {
        let reports = self.load_all()?;
        let idx = Self::position(&reports, report_id)?;
        Ok(reports[idx].clone())
    }

    /// Audit entries for a report, newest first.
    pub fn history(&self, report_id: &str) -> AppResult<Vec<AuditLogEntry>> {
        self.audit.by_report(report_id)
    }

    pub fn permissions(&self, identity: Option<&Identity>, report_id: &str) -> AppResult<ReportPermissions> {
        let report = self.get(report_id)?;
        Ok(ReportPermissions::resolve(identity, &report))
    }

    pub fn list(&self, identity: Option<&Identity>, query: &ReportQuery) -> AppResult<Vec<Report>> {
        let reports = query.apply(identity, self.load_all()?);
        tracing::debug!(count = reports.len(), "reports listed");
        Ok(reports)
    }

    pub fn list_page(
        &self,
        identity: Option<&Identity>,
        query: &ReportQuery,
        params: &PaginationParams,
    ) -> AppResult<Paginated<Report>> {
        Ok(Paginated::from_vec(self.list(identity, query)?, params))
    }

    pub fn recent(&self, limit: usize) -> AppResult<Vec<Report>> {
        Ok(query::recent(self.load_all()?, limit))
    }

    pub fn stats(&self) -> AppResult<ReportStats> {
        Ok(ReportStats::compute(&self.load_all()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::policy::ArchiveIsFinal;
    use barangay_shared::errors::ErrorKind;

    fn service() -> ReportService {
        let store = EntityStore::in_memory();
        ReportService::new(store.clone(), AuditLog::new(store, 200))
    }

    fn ana() -> Identity {
        Identity::resident("Ana Cruz", "ana")
    }

    fn ben() -> Identity {
        Identity::resident("Ben Reyes", "ben")
    }

    fn admin() -> Identity {
        Identity::admin("Barangay Admin", "barangay_admin")
    }

    fn draft(description: &str) -> ReportDraft {
        ReportDraft {
            category: "Flooding".into(),
            location: "Purok 3".into(),
            description: description.into(),
            photo: None,
        }
    }

    fn status(s: ReportStatus) -> RemarkRequest {
        RemarkRequest { new_status: Some(s), ..RemarkRequest::default() }
    }

    #[test]
    fn submit_creates_pending_report_and_audit_entry() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("  Canal overflowing  ")).unwrap();

        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.reporter_username, "ana");
        assert_eq!(report.description, "Canal overflowing");
        assert!(report.remark_logs.is_empty());
        assert_eq!(svc.get(&report.id).unwrap(), report);

        let history = svc.history(&report.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Report submitted by ana");
        assert_eq!(history[0].by_username, "System");
    }

    #[test]
    fn submit_defaults_blank_category() {
        let svc = service();
        let mut d = draft("Loose wires");
        d.category = "  ".into();
        assert_eq!(svc.submit(Some(&ana()), d).unwrap().category, DEFAULT_CATEGORY);
    }

    #[test]
    fn empty_description_creates_nothing() {
        let svc = service();
        let err = svc.submit(Some(&ana()), draft("   ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(svc.list(None, &ReportQuery::default()).unwrap().is_empty());
        assert!(svc.audit_log().entries().unwrap().is_empty());
    }

    #[test]
    fn anonymous_submit_is_rejected() {
        let svc = service();
        let err = svc.submit(None, draft("Pothole")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAuthenticated);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(svc.stats().unwrap().total, 0);
    }

    #[test]
    fn resident_cannot_delete_someone_elses_report_in_any_status() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Stray dogs")).unwrap();

        for s in ReportStatus::ALL {
            svc.add_remark(Some(&admin()), &report.id, status(s)).unwrap();
            let err = svc.delete(Some(&ben()), &report.id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Authorization);
        }
        assert!(svc.get(&report.id).is_ok());
    }

    #[test]
    fn owner_delete_depends_on_pending() {
        let svc = service();
        let first = svc.submit(Some(&ana()), draft("Broken lamp")).unwrap();
        svc.delete(Some(&ana()), &first.id).unwrap();
        assert_eq!(svc.get(&first.id).unwrap_err().kind(), ErrorKind::NotFound);

        let second = svc.submit(Some(&ana()), draft("Broken lamp again")).unwrap();
        svc.add_remark(Some(&admin()), &second.id, status(ReportStatus::InProgress)).unwrap();
        let err = svc.delete(Some(&ana()), &second.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let history = svc.history(&first.id).unwrap();
        assert_eq!(history[0].text, "ana deleted the report");
    }

    #[test]
    fn admin_deletes_unconditionally_and_missing_ids_are_not_found() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Noise")).unwrap();
        svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Archived)).unwrap();
        svc.delete(Some(&admin()), &report.id).unwrap();

        let err = svc.delete(Some(&admin()), &report.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReportNotFound);
    }

    #[test]
    fn anonymous_delete_is_forbidden() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Noise")).unwrap();
        assert_eq!(svc.delete(None, &report.id).unwrap_err().kind(), ErrorKind::Authorization);
    }

    #[test]
    fn remark_can_archive_then_reopen() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Fallen tree")).unwrap();

        let archived = svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Archived)).unwrap();
        assert_eq!(archived.status, ReportStatus::Archived);
        let reopened = svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Pending)).unwrap();
        assert_eq!(reopened.status, ReportStatus::Pending);
        assert_eq!(reopened.remark_logs.len(), 2);
    }

    #[test]
    fn remark_text_composition() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Clogged drain")).unwrap();

        let req = RemarkRequest {
            preset_text: Some(RemarkPreset::UnderVerification.text().into()),
            custom_text: Some("  team visits Monday ".into()),
            new_status: Some(ReportStatus::Urgent),
        };
        let updated = svc.add_remark(Some(&admin()), &report.id, req).unwrap();
        let entry = updated.remark_logs.last().unwrap();
        assert_eq!(entry.text, "Under verification by barangay staff — team visits Monday");
        assert_eq!(entry.status_change, Some(ReportStatus::Urgent));
        assert_eq!(entry.by_username, "barangay_admin");

        let bare = svc.add_remark(Some(&admin()), &report.id, RemarkRequest::default()).unwrap();
        assert_eq!(bare.remark_logs.last().unwrap().text, NO_REMARK_TEXT);
        assert_eq!(bare.status, ReportStatus::Urgent);

        let history = svc.history(&report.id).unwrap();
        assert_eq!(history[0].text, "barangay_admin added remark: (no remark text)");
        assert_eq!(
            history[1].text,
            "barangay_admin added remark: Under verification by barangay staff — team visits Monday (status -> Urgent)"
        );
    }

    #[test]
    fn preset_names_resolve_to_canned_text() {
        assert_eq!(RemarkPreset::resolve_text("Resolved"), "Resolved — cleared and verified");
        assert_eq!(RemarkPreset::resolve_text("crew dispatched"), "crew dispatched");
    }

    #[test]
    fn remark_requires_admin_and_existing_report() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Graffiti")).unwrap();
        assert_eq!(
            svc.add_remark(Some(&ana()), &report.id, RemarkRequest::default()).unwrap_err().kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            svc.add_remark(Some(&admin()), "r_missing", RemarkRequest::default()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(svc.get(&report.id).unwrap().remark_logs.is_empty());
    }

    #[test]
    fn quick_toggle_round_trip_and_non_inverse() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Open manhole")).unwrap();

        let done = svc.toggle_quick_status(Some(&admin()), &report.id).unwrap();
        assert_eq!(done.status, ReportStatus::Done);
        let back = svc.toggle_quick_status(Some(&admin()), &report.id).unwrap();
        assert_eq!(back.status, ReportStatus::Pending);

        svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Urgent)).unwrap();
        let toggled = svc.toggle_quick_status(Some(&admin()), &report.id).unwrap();
        assert_eq!(toggled.status, ReportStatus::Pending);

        let history = svc.history(&report.id).unwrap();
        assert_eq!(history[0].text, "barangay_admin changed status to Pending");
    }

    #[test]
    fn quick_toggle_is_admin_only() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Open manhole")).unwrap();
        assert_eq!(
            svc.toggle_quick_status(Some(&ana()), &report.id).unwrap_err().kind(),
            ErrorKind::Authorization
        );
        assert_eq!(svc.toggle_quick_status(None, &report.id).unwrap_err().kind(), ErrorKind::Authorization);
        assert_eq!(svc.get(&report.id).unwrap().status, ReportStatus::Pending);
    }

    #[test]
    fn request_info_only_touches_the_log() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Blocked road")).unwrap();

        let entry = svc.request_more_info(Some(&admin()), &report.id, DEFAULT_INFO_REQUEST).unwrap();
        assert_eq!(entry.text, format!("Admin requested more info: {DEFAULT_INFO_REQUEST}"));

        let after = svc.get(&report.id).unwrap();
        assert_eq!(after.status, ReportStatus::Pending);
        assert!(after.remark_logs.is_empty());
        assert_eq!(svc.history(&report.id).unwrap().len(), 2);

        assert_eq!(
            svc.request_more_info(Some(&ana()), &report.id, "hi").unwrap_err().kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            svc.request_more_info(Some(&admin()), &report.id, "  ").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            svc.request_more_info(Some(&admin()), "r_gone", "hi").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn stricter_policy_is_honoured_by_both_status_paths() {
        let store = EntityStore::in_memory();
        let svc = ReportService::new(store.clone(), AuditLog::new(store, 200))
            .with_transition_policy(Arc::new(ArchiveIsFinal));
        let report = svc.submit(Some(&ana()), draft("Flood")).unwrap();
        svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Archived)).unwrap();

        let err = svc.add_remark(Some(&admin()), &report.id, status(ReportStatus::Pending)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
        let err = svc.toggle_quick_status(Some(&admin()), &report.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTransition);

        let after = svc.get(&report.id).unwrap();
        assert_eq!(after.status, ReportStatus::Archived);
        assert_eq!(after.remark_logs.len(), 1);
    }

    #[test]
    fn list_page_and_stats() {
        let svc = service();
        for i in 0..5 {
            svc.submit(Some(&ana()), draft(&format!("issue {i}"))).unwrap();
        }
        let page = svc
            .list_page(Some(&ana()), &ReportQuery::default(), &PaginationParams::new(2, 2))
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        assert_eq!(svc.stats().unwrap().count(ReportStatus::Pending), 5);
        assert_eq!(svc.recent(3).unwrap().len(), 3);
    }

    #[test]
    fn permissions_reflect_ownership() {
        let svc = service();
        let report = svc.submit(Some(&ana()), draft("Leak")).unwrap();
        assert!(svc.permissions(Some(&ana()), &report.id).unwrap().delete);
        assert!(!svc.permissions(Some(&ben()), &report.id).unwrap().delete);
        assert!(svc.permissions(Some(&admin()), &report.id).unwrap().add_remark);
    }

    #[tokio::test]
    async fn submit_with_photo_stores_inline_payload() {
        let svc = service();
        let photo = PhotoSource::Bytes { bytes: b"abc".to_vec(), mime: "image/png".into() };
        let report = svc.submit_with_photo(Some(&ana()), draft("Pothole"), Some(photo)).await.unwrap();
        assert_eq!(report.photo.as_deref(), Some("data:image/png;base64,YWJj"));
    }

    #[tokio::test]
    async fn invalid_draft_fails_before_encoding() {
        let svc = service().with_max_photo_bytes(1);
        let photo = PhotoSource::Bytes { bytes: vec![0; 64], mime: "image/png".into() };
        let err = svc.submit_with_photo(Some(&ana()), draft(""), Some(photo)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DescriptionRequired);
    }

    #[tokio::test]
    async fn oversized_photo_creates_nothing() {
        let svc = service().with_max_photo_bytes(1);
        let photo = PhotoSource::Bytes { bytes: vec![0; 64], mime: "image/png".into() };
        let err = svc.submit_with_photo(Some(&ana()), draft("Pothole"), Some(photo)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PhotoTooLarge);
        assert_eq!(svc.stats().unwrap().total, 0);
    }

    #[tokio::test]
    async fn concurrent_submits_both_land() {
        let svc = service();
        let (ana, ben) = (ana(), ben());
        let (a, b) = tokio::join!(
            svc.submit_with_photo(Some(&ana), draft("one"), None),
            svc.submit_with_photo(Some(&ben), draft("two"), None),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(svc.stats().unwrap().total, 2);
    }
}
