use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::settings::{BackupData, BackupFile};
use crate::models::statistics::StatisticsReport;

const CRLF: &str = "\r\n";
pub const DEFAULT_BACKUP_TYPE: &str = "full";
const BACKUP_TYPES: [&str; 3] = ["full", "data", "settings"];

/// Renders the report the statistics endpoint returns, reusing its display
/// strings so both show the same numbers.
pub fn render_csv(report: &StatisticsReport, generated_at: DateTime<Utc>) -> String {
    let stats = &report.revenue_stats;
    let mut lines = vec![
        "Travel Admin Dashboard Report".to_string(),
        format!("Date Range: {}", report.range.as_str()),
        format!("Generated on: {}", generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        String::new(),
        "Summary Statistics".to_string(),
        format!("Total Revenue,{}", stats.total_revenue_display),
        format!("Total Bookings,{}", stats.total_bookings),
        format!("New Users,{}", stats.new_users),
        format!("Average Order Value,{}", stats.avg_order_value_display),
        String::new(),
        "Top Performing Tours".to_string(),
        "Tour,Bookings,Revenue,Average Rating,Conversion Rate".to_string(),
    ];

    // Only the tour name is quoted; the currency strings keep their commas.
    lines.extend(report.top_tours.iter().map(|tour| {
        format!(
            "\"{}\",{},{},{},{}",
            tour.title, tour.bookings, tour.revenue_display, tour.rating_display, tour.conversion_rate
        )
    }));

    let mut csv = lines.join(CRLF);
    csv.push_str(CRLF);
    csv
}

pub fn csv_file_name(report: &StatisticsReport, generated_at: DateTime<Utc>) -> String {
    format!(
        "travel_report_{}_{}.csv",
        report.range.as_str(),
        generated_at.format("%Y-%m-%d")
    )
}

/// Unknown backup kinds are treated as a full backup.
pub fn backup_type(requested: Option<&str>) -> &'static str {
    let requested = requested.map(|t| t.trim().to_lowercase()).unwrap_or_default();
    BACKUP_TYPES
        .into_iter()
        .find(|t| *t == requested)
        .unwrap_or(DEFAULT_BACKUP_TYPE)
}

pub fn backup_file(backup_type: &str, generated_at: DateTime<Utc>) -> BackupFile {
    BackupFile {
        backup_type: backup_type.to_string(),
        timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        data: BackupData {
            message: "This is a simulated backup file for demo purposes.".to_string(),
        },
    }
}

pub fn backup_file_name(backup_type: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "travel_admin_{}_backup_{}.json",
        backup_type,
        generated_at.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::statistics::DateRange;
    use crate::services::statistics_service::sample_report;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 14, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let report = sample_report(DateRange::Last90Days);
        let csv = render_csv(&report, generated_at());
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], "Travel Admin Dashboard Report");
        assert_eq!(lines[1], "Date Range: 90days");
        assert_eq!(lines[2], "Generated on: 2025-04-14T08:30:00Z");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Summary Statistics");
        assert_eq!(lines[5], "Total Revenue,₫650,900,000");
        assert_eq!(lines[6], "Total Bookings,87");
        assert_eq!(lines[7], "New Users,32");
        assert_eq!(lines[8], "Average Order Value,₫7,481,609");
        assert_eq!(lines[9], "");
        assert_eq!(lines[10], "Top Performing Tours");
        assert_eq!(lines[11], "Tour,Bookings,Revenue,Average Rating,Conversion Rate");
        assert_eq!(lines[12], "\"Bali Adventure Package\",24,₫99,360,000,4.8,14.2%");
        assert_eq!(lines[16], "\"Swiss Alps Hiking\",8,₫42,320,000,4.7,8.5%");
        assert_eq!(lines[17], "");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn test_csv_matches_displayed_values() {
        let report = sample_report(DateRange::All);
        let csv = render_csv(&report, generated_at());

        assert!(csv.contains(&report.revenue_stats.total_revenue_display));
        assert!(csv.contains(&report.revenue_stats.avg_order_value_display));
        for tour in &report.top_tours {
            assert!(csv.contains(&tour.revenue_display));
        }
    }

    #[test]
    fn test_file_names() {
        let report = sample_report(DateRange::Last7Days);
        assert_eq!(csv_file_name(&report, generated_at()), "travel_report_7days_2025-04-14.csv");
        assert_eq!(
            backup_file_name("settings", generated_at()),
            "travel_admin_settings_backup_2025-04-14.json"
        );
    }

    #[test]
    fn test_backup_file() {
        assert_eq!(backup_type(Some("Data")), "data");
        assert_eq!(backup_type(Some("everything")), "full");
        assert_eq!(backup_type(None), "full");

        let file = backup_file("full", generated_at());
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "full");
        assert_eq!(json["timestamp"], "2025-04-14T08:30:00.000Z");
        assert_eq!(
            json["data"]["message"],
            "This is a simulated backup file for demo purposes."
        );
    }
}
