use std::fmt;

use crate::app::session_importer::SessionImportReport;
use crate::app::station_importer::StationImportReport;

/// What one import run did, rendered on stdout once the store is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub db_path: String,
    pub tables: Vec<&'static str>,
    pub stations: Option<StationImportReport>,
    pub station_error: Option<String>,
    pub sessions: Option<SessionImportReport>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tables ensured: {}", self.tables.join(", "))?;

        match (&self.stations, &self.station_error) {
            (Some(report), _) => writeln!(
                f,
                "Stations: {} fetched, {} written, {} skipped, {} failed ({} ports, {} pricing rows)",
                report.fetched,
                report.written,
                report.skipped,
                report.failed,
                report.ports_written,
                report.pricing_rows
            )?,
            (None, Some(error)) => writeln!(f, "Stations: import failed: {error}")?,
            (None, None) => writeln!(f, "Stations: not updated")?,
        }

        match &self.sessions {
            Some(report) => {
                writeln!(
                    f,
                    "Days: {} imported, {} failed",
                    report.days_succeeded, report.days_failed
                )?;
                for failure in &report.failures {
                    writeln!(f, "  {}: {}", failure.day, failure.message)?;
                }
                writeln!(
                    f,
                    "Sessions: {} inserted, {} already present, {} skipped, {} for unknown stations",
                    report.sessions_inserted,
                    report.sessions_already_present,
                    report.sessions_skipped,
                    report.sessions_orphaned
                )?;
                if report.truncated_station_days > 0 {
                    writeln!(
                        f,
                        "Warning: {} station-day listings hit the page cap",
                        report.truncated_station_days
                    )?;
                }
                if report.samples_inserted > 0 || report.sample_fetch_failures > 0 {
                    writeln!(
                        f,
                        "Fifteen-minute samples: {} inserted, {} fetch failures",
                        report.samples_inserted, report.sample_fetch_failures
                    )?;
                }
            }
            None => writeln!(f, "Sessions: not updated")?,
        }

        write!(f, "Completed task, saved to: {}", self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use crate::app::session_importer::{DayFailure, SessionImportReport};
    use crate::test_support::date;

    use super::RunSummary;

    #[test]
    fn ends_with_the_database_path() {
        let summary = RunSummary {
            db_path: "chargePoint.db".to_string(),
            tables: vec!["user", "station"],
            ..RunSummary::default()
        };

        let rendered = summary.to_string();

        assert!(rendered.starts_with("Tables ensured: user, station\n"));
        assert!(rendered.contains("Stations: not updated"));
        assert!(rendered.ends_with("Completed task, saved to: chargePoint.db"));
    }

    #[test]
    fn lists_failed_days() {
        let summary = RunSummary {
            db_path: "cp.db".to_string(),
            station_error: Some("timed out".to_string()),
            sessions: Some(SessionImportReport {
                days_succeeded: 4,
                days_failed: 1,
                failures: vec![DayFailure {
                    day: date(2020, 1, 2),
                    message: "simulated outage".to_string(),
                }],
                ..SessionImportReport::default()
            }),
            ..RunSummary::default()
        };

        let rendered = summary.to_string();

        assert!(rendered.contains("Stations: import failed: timed out"));
        assert!(rendered.contains("Days: 4 imported, 1 failed"));
        assert!(rendered.contains("  2020-01-02: simulated outage"));
    }
}
