use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::chargepoint::{ChargePointApi, RemoteServiceError};
use crate::adapters::db::{
    DbError, PORT_POLICY, PRICING_POLICY, STATION_POLICY, Store, insert_port, insert_pricing,
    upsert_station,
};
use crate::domain::models::StationRecord;

#[derive(Debug, Error)]
pub enum StationImportError {
    #[error("failed to list stations: {0}")]
    Remote(#[from] RemoteServiceError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationImportReport {
    pub fetched: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pricing_rows: usize,
    pub ports_written: usize,
}

#[derive(Debug, Default)]
struct StationWrite {
    pricing_rows: usize,
    ports_written: usize,
}

pub fn import_stations<C: ChargePointApi>(
    store: &Store,
    client: &C,
) -> Result<StationImportReport, StationImportError> {
    let fetched = client.list_stations()?;
    let mut report = StationImportReport {
        fetched: fetched.len(),
        ..StationImportReport::default()
    };

    for (index, record) in fetched.into_iter().enumerate() {
        let station = match record {
            Ok(station) => station,
            Err(error) => {
                report.skipped += 1;
                tracing::warn!(index, error = %error, "skipping malformed station record");
                continue;
            }
        };

        match store_station(store, &station) {
            Ok(write) => {
                report.written += 1;
                report.pricing_rows += write.pricing_rows;
                report.ports_written += write.ports_written;
            }
            Err(error) => {
                report.failed += 1;
                tracing::warn!(
                    station_id = %station.station_id,
                    error = %error,
                    "failed to store station"
                );
            }
        }
    }

    tracing::info!(
        fetched = report.fetched,
        written = report.written,
        skipped = report.skipped,
        failed = report.failed,
        pricing_rows = report.pricing_rows,
        ports_written = report.ports_written,
        "station import finished"
    );

    Ok(report)
}

/// One transaction per station: a failed port leaves no half-written station.
fn store_station(store: &Store, station: &StationRecord) -> Result<StationWrite, DbError> {
    let transaction = store.begin()?;
    let write = write_station(&transaction, station)?;
    transaction.commit()?;
    Ok(write)
}

/// Pricing first, then the station pointing at it, then its ports.
fn write_station(
    connection: &Connection,
    station: &StationRecord,
) -> Result<StationWrite, DbError> {
    let mut write = StationWrite::default();
    let mut pricing_id = None;

    for pricing in &station.pricing {
        let id = insert_pricing(connection, pricing, PRICING_POLICY)?;
        pricing_id.get_or_insert(id);
        write.pricing_rows += 1;
    }

    upsert_station(connection, station, pricing_id, STATION_POLICY)?;

    for port in &station.ports {
        if insert_port(connection, &station.station_id, port, PORT_POLICY)? {
            write.ports_written += 1;
        }
    }

    Ok(write)
}
