use chrono::NaiveDate;
use rusqlite::Connection;

use crate::adapters::chargepoint::{ChargePointApi, Fetched};
use crate::adapters::db::{
    DbError, PAYMENT_POLICY, SAMPLE_POLICY, SESSION_POLICY, Store, USER_POLICY,
    ensure_payment_credential, ensure_user, insert_fifteen_min_sample, insert_session,
    station_exists,
};
use crate::domain::day_window::{DayWindow, ImportWindow};
use crate::domain::models::SessionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFailure {
    pub day: NaiveDate,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionImportReport {
    pub days_succeeded: usize,
    pub days_failed: usize,
    pub failures: Vec<DayFailure>,
    pub sessions_inserted: usize,
    pub sessions_already_present: usize,
    pub sessions_skipped: usize,
    pub sessions_orphaned: usize,
    pub samples_inserted: usize,
    pub sample_fetch_failures: usize,
    pub truncated_station_days: usize,
}

impl SessionImportReport {
    fn record_failure(&mut self, day: NaiveDate, message: String) {
        self.days_failed += 1;
        self.failures.push(DayFailure { day, message });
    }

    pub fn log_totals(&self) {
        tracing::info!(
            days_succeeded = self.days_succeeded,
            days_failed = self.days_failed,
            sessions_inserted = self.sessions_inserted,
            sessions_already_present = self.sessions_already_present,
            sessions_skipped = self.sessions_skipped,
            sessions_orphaned = self.sessions_orphaned,
            samples_inserted = self.samples_inserted,
            "session import finished"
        );
    }
}

enum SessionWrite {
    Inserted,
    AlreadyPresent,
    Orphaned,
}

/// Walks the window one day at a time. A failed day is recorded and the walk
/// continues with the next one.
pub fn import_sessions<C: ChargePointApi>(
    store: &Store,
    client: &C,
    window: &ImportWindow,
    station_ids: &[String],
    fine_grained: bool,
) -> SessionImportReport {
    let mut report = SessionImportReport::default();

    for day in window.days() {
        import_day(store, client, &day, station_ids, fine_grained, &mut report);
    }

    report.log_totals();
    report
}

/// Imports a single day in its own transaction and records the outcome.
pub fn import_day<C: ChargePointApi>(
    store: &Store,
    client: &C,
    day: &DayWindow,
    station_ids: &[String],
    fine_grained: bool,
    report: &mut SessionImportReport,
) {
    let day_label = day.day();
    tracing::debug!(day = %day_label, start = %day.start, end = %day.end, "importing day");

    match fetch_and_store_day(store, client, day, station_ids, fine_grained, report) {
        Ok(()) => report.days_succeeded += 1,
        Err(message) => {
            tracing::warn!(day = %day_label, error = %message, "day import failed");
            report.record_failure(day_label, message);
        }
    }
}

fn fetch_and_store_day<C: ChargePointApi>(
    store: &Store,
    client: &C,
    day: &DayWindow,
    station_ids: &[String],
    fine_grained: bool,
    report: &mut SessionImportReport,
) -> Result<(), String> {
    let batch = client
        .list_sessions(day, station_ids)
        .map_err(|error| error.to_string())?;

    for station_id in &batch.truncated_stations {
        report.truncated_station_days += 1;
        tracing::warn!(
            day = %day.day(),
            station_id = %station_id,
            "session listing hit the page cap; some sessions may be missing"
        );
    }

    let transaction = store.begin().map_err(|error| error.to_string())?;
    let written = store_day(&transaction, client, day, batch.records, fine_grained, report);
    // Rows written before a storage error are kept; the rest of the day is not.
    transaction.commit().map_err(|error| error.to_string())?;

    written.map_err(|error| error.to_string())
}

fn store_day<C: ChargePointApi>(
    connection: &Connection,
    client: &C,
    day: &DayWindow,
    records: Vec<Fetched<SessionRecord>>,
    fine_grained: bool,
    report: &mut SessionImportReport,
) -> Result<(), DbError> {
    for record in records {
        let session = match record {
            Ok(session) => session,
            Err(error) => {
                report.sessions_skipped += 1;
                tracing::warn!(day = %day.day(), error = %error, "skipping malformed session record");
                continue;
            }
        };

        match write_session(connection, &session)? {
            SessionWrite::Orphaned => {
                report.sessions_orphaned += 1;
                tracing::warn!(
                    session_id = session.session_id,
                    station_id = %session.station_id,
                    "skipping session for unknown station"
                );
                continue;
            }
            SessionWrite::Inserted => report.sessions_inserted += 1,
            SessionWrite::AlreadyPresent => report.sessions_already_present += 1,
        }

        if fine_grained {
            import_samples(connection, client, &session, report)?;
        }
    }

    Ok(())
}

fn write_session(
    connection: &Connection,
    session: &SessionRecord,
) -> Result<SessionWrite, DbError> {
    if !station_exists(connection, &session.station_id)? {
        return Ok(SessionWrite::Orphaned);
    }

    if let Some(user_id) = session.user_id {
        ensure_user(connection, user_id, USER_POLICY)?;
    }
    if let Some(credential_id) = session.credential_id.as_deref() {
        ensure_payment_credential(connection, credential_id, PAYMENT_POLICY)?;
    }

    if insert_session(connection, session, SESSION_POLICY)? {
        Ok(SessionWrite::Inserted)
    } else {
        Ok(SessionWrite::AlreadyPresent)
    }
}

/// Only storage errors propagate; a failed fetch is counted and skipped.
fn import_samples<C: ChargePointApi>(
    connection: &Connection,
    client: &C,
    session: &SessionRecord,
    report: &mut SessionImportReport,
) -> Result<(), DbError> {
    let samples = match client.list_fifteen_min_samples(session.session_id) {
        Ok(samples) => samples,
        Err(error) => {
            report.sample_fetch_failures += 1;
            tracing::warn!(
                session_id = session.session_id,
                error = %error,
                "failed to fetch fifteen-minute samples"
            );
            return Ok(());
        }
    };

    for record in samples {
        match record {
            Ok(sample) => {
                if insert_fifteen_min_sample(connection, &sample, SAMPLE_POLICY)? {
                    report.samples_inserted += 1;
                }
            }
            Err(error) => {
                tracing::warn!(
                    session_id = session.session_id,
                    error = %error,
                    "skipping malformed fifteen-minute sample"
                );
            }
        }
    }

    Ok(())
}
