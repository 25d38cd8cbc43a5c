use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use barangay_shared::types::auth::UserRole;

use crate::store::{Collection, Record};

// --- User ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub username: String,
    // Stored as entered. Credentials are not hashed in this system.
    #[serde(rename = "password")]
    pub password_secret: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(rename = "created", alias = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}

// --- Report ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Urgent,
    Done,
    Archived,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Pending,
        ReportStatus::InProgress,
        ReportStatus::Urgent,
        ReportStatus::Done,
        ReportStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Urgent => "Urgent",
            ReportStatus::Done => "Done",
            ReportStatus::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s.chars().filter(|c| !c.is_whitespace() && *c != '_' && *c != '-').collect();
        match folded.to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "inprogress" => Ok(ReportStatus::InProgress),
            "urgent" => Ok(ReportStatus::Urgent),
            "done" => Ok(ReportStatus::Done),
            "archived" => Ok(ReportStatus::Archived),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub reporter_name: String,
    pub reporter_username: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(rename = "date", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    #[serde(default)]
    pub remark_logs: Vec<RemarkEntry>,
}

impl Record for Report {
    const COLLECTION: Collection = Collection::Reports;
}

/// Admin annotation on a report. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkEntry {
    #[serde(rename = "by")]
    pub by_username: String,
    #[serde(rename = "name", default)]
    pub by_name: String,
    pub text: String,
    #[serde(default)]
    pub status_change: Option<ReportStatus>,
    #[serde(rename = "ts")]
    pub at: DateTime<Utc>,
}

// --- AuditLogEntry ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub report_id: String,
    pub text: String,
    #[serde(rename = "by")]
    pub by_username: String,
    #[serde(rename = "ts")]
    pub at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(report_id: impl Into<String>, text: impl Into<String>, by_username: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
            text: text.into(),
            by_username: by_username.into(),
            at: Utc::now(),
        }
    }
}

impl Record for AuditLogEntry {
    const COLLECTION: Collection = Collection::AuditLog;
}

/// `r_<unix-millis>_<6 random lowercase alphanumerics>`
pub fn new_report_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("r_{}_{}", Utc::now().timestamp_millis(), suffix)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
