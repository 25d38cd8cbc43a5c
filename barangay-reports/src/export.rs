use chrono::SecondsFormat;

use crate::models::Report;

const CSV_HEADER: &str = "id,reporterName,reporterUsername,category,location,description,date,status";

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Flat CSV projection of reports, header first, every value quoted.
pub fn reports_csv(reports: &[Report]) -> String {
    let rows = reports.iter().map(|r| {
        let date = r.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let fields: [&str; 8] = [
            &r.id,
            &r.reporter_name,
            &r.reporter_username,
            &r.category,
            &r.location,
            &r.description,
            &date,
            r.status.as_str(),
        ];
        fields.iter().map(|f| quoted(f)).collect::<Vec<_>>().join(",")
    });

    std::iter::once(CSV_HEADER.to_string())
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;
    use chrono::{TimeZone, Utc};

    fn report() -> Report {
        Report {
            id: "r_1760947200000_abc123".into(),
            reporter_name: "Ana Cruz".into(),
            reporter_username: "ana".into(),
            category: "Flooding".into(),
            location: "Purok 3, near the \"big\" acacia".into(),
            description: "Canal overflowing".into(),
            photo: Some("data:image/png;base64,YWJj".into()),
            created_at: Utc.with_ymd_and_hms(2025, 10, 20, 8, 0, 0).unwrap(),
            status: ReportStatus::InProgress,
            remark_logs: vec![],
        }
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(reports_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn row_quotes_every_field_and_doubles_inner_quotes() {
        let csv = reports_csv(&[report()]);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#""r_1760947200000_abc123","Ana Cruz","ana","Flooding","Purok 3, near the ""big"" acacia","Canal overflowing","2025-10-20T08:00:00.000Z","In Progress""#
        );
    }

    #[test]
    fn photo_is_not_exported() {
        assert!(!reports_csv(&[report()]).contains("base64"));
    }
}
