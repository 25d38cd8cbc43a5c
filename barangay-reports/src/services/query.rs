use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use barangay_shared::types::auth::Identity;

use crate::models::{Report, ReportStatus};

fn date_query_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\d{4}-\d{2}-\d{2}|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec")
            .expect("date query pattern is valid")
    })
}

/// Filters over the report collection. All active filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive free text, date-aware.
    pub text: Option<String>,
    /// Only the caller's own reports.
    #[serde(default)]
    pub mine: bool,
}

impl ReportQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    fn normalized_text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    pub fn matches(&self, identity: Option<&Identity>, report: &Report) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if report.category != category {
                return false;
            }
        }

        if self.mine {
            match identity {
                Some(id) if id.username == report.reporter_username => {}
                _ => return false,
            }
        }

        match self.normalized_text() {
            Some(q) => matches_text(report, &q),
            None => true,
        }
    }

    /// Filter and sort newest first. Never touches storage.
    pub fn apply(&self, identity: Option<&Identity>, reports: Vec<Report>) -> Vec<Report> {
        let mut filtered: Vec<Report> = reports
            .into_iter()
            .filter(|r| self.matches(identity, r))
            .collect();
        sort_newest_first(&mut filtered);
        filtered
    }
}

fn matches_text(report: &Report, q: &str) -> bool {
    if date_query_pattern().is_match(q) && rendered_dates(report).iter().any(|d| d.contains(q)) {
        return true;
    }

    [
        &report.reporter_name,
        &report.reporter_username,
        &report.location,
        &report.description,
        &report.category,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(q))
}

/// `oct 20, 2025` and `2025-10-20`, lowercased, in UTC.
fn rendered_dates(report: &Report) -> [String; 2] {
    [
        report.created_at.format("%b %-d, %Y").to_string().to_lowercase(),
        report.created_at.format("%Y-%m-%d").to_string(),
    ]
}

pub fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Newest `limit` reports.
pub fn recent(mut reports: Vec<Report>, limit: usize) -> Vec<Report> {
    sort_newest_first(&mut reports);
    reports.truncate(limit);
    reports
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

impl ReportStats {
    pub fn compute(reports: &[Report]) -> Self {
        let mut by_status: BTreeMap<String, usize> = ReportStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for report in reports {
            *by_status.entry(report.status.as_str().to_string()).or_default() += 1;
        }
        Self {
            total: reports.len(),
            by_status,
        }
    }

    pub fn count(&self, status: ReportStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }
}
