//! ChargePoint web-service client.
//!
//! The service speaks SOAP 1.1 with a WS-Security `UsernameToken` header.
//! Listing calls are synchronous and unpaginated; the session listing caps
//! each response at [`SESSION_PAGE_CAP`] records, so callers keep their
//! query windows narrow.

mod client;
mod convert;
mod envelope;
mod error;

pub use client::{ChargePointConfig, ChargePointSoapClient, DEFAULT_ENDPOINT};
pub use error::RemoteServiceError;

use crate::domain::day_window::DayWindow;
use crate::domain::models::{FifteenMinuteSample, SessionRecord, StationRecord};
use crate::domain::payload::RecordShapeError;

/// Maximum number of sessions the service returns for a single query.
pub const SESSION_PAGE_CAP: usize = 100;

/// One record of a listing response. A malformed record is reported on its
/// own so the rest of the batch stays usable.
pub type Fetched<T> = Result<T, RecordShapeError>;

#[derive(Debug, Default)]
pub struct SessionBatch {
    pub records: Vec<Fetched<SessionRecord>>,
    /// Stations whose response reached the page cap or announced more data.
    pub truncated_stations: Vec<String>,
}

pub trait ChargePointApi {
    fn list_stations(&self) -> Result<Vec<Fetched<StationRecord>>, RemoteServiceError>;

    fn list_sessions(
        &self,
        window: &DayWindow,
        station_ids: &[String],
    ) -> Result<SessionBatch, RemoteServiceError>;

    fn list_fifteen_min_samples(
        &self,
        session_id: i64,
    ) -> Result<Vec<Fetched<FifteenMinuteSample>>, RemoteServiceError>;
}
