use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::adapters::chargepoint::{ChargePointApi, Fetched, RemoteServiceError, SessionBatch};
use crate::adapters::db::Store;
use crate::domain::day_window::DayWindow;
use crate::domain::models::{
    FifteenMinuteSample, PortRecord, PricingRecord, SessionRecord, StationRecord,
};

pub fn temp_db_path(name: &str) -> PathBuf {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join(name);
    std::mem::forget(dir);
    path
}

pub fn open_test_store(test_name: &str, fine_grained: bool) -> Store {
    let path = temp_db_path(&format!("{test_name}.sqlite"));
    let mut store = Store::open(path.to_string_lossy().as_ref()).expect("test db should open");
    store
        .ensure_schema(fine_grained)
        .expect("test schema should be created");
    store
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn station(station_id: &str, port_numbers: &[i64]) -> StationRecord {
    StationRecord {
        station_id: station_id.to_string(),
        model: Some("CT4020-HD".to_string()),
        activation_date: Some("2014-06-25T21:09:36Z".to_string()),
        num_ports: Some(port_numbers.len() as i64),
        address: Some("1 Main St".to_string()),
        city: Some("Palo Alto".to_string()),
        state: Some("California".to_string()),
        postal_code: Some("94301".to_string()),
        ports: port_numbers
            .iter()
            .map(|port_number| PortRecord {
                port_number: *port_number,
                level: Some("L2".to_string()),
                connector: Some("J1772".to_string()),
                voltage: Some(240),
                current: Some(30),
                power_kw: Some(6.6),
            })
            .collect(),
        pricing: vec![PricingRecord {
            pricing_type: Some("Session".to_string()),
            unit_price_per_session: Some(1.5),
            ..PricingRecord::default()
        }],
    }
}

pub fn session(session_id: i64, station_id: &str, day: NaiveDate) -> SessionRecord {
    SessionRecord {
        session_id,
        station_id: station_id.to_string(),
        port_number: Some(1),
        start_time: format!("{day}T08:00:00Z"),
        end_time: Some(format!("{day}T09:00:00Z")),
        energy_kwh: Some(4.2),
        user_id: Some(1000 + session_id),
        credential_id: Some(format!("RFID-{session_id}")),
    }
}

pub fn samples(session: &SessionRecord, count: usize) -> Vec<FifteenMinuteSample> {
    (0..count)
        .map(|index| FifteenMinuteSample {
            station_id: session.station_id.clone(),
            session_id: session.session_id,
            port_number: session.port_number.unwrap_or(1),
            station_time: format!("{}T08:{:02}:00Z", &session.start_time[..10], index * 15),
            energy_consumed: Some(1.0),
            peak_power: Some(6.6),
            rolling_power_avg: Some(4.4),
        })
        .collect()
}

/// In-memory stand-in for the remote service, keyed by calendar day.
#[derive(Default)]
pub struct FakeChargePoint {
    pub stations: Vec<Fetched<StationRecord>>,
    pub fail_station_listing: bool,
    pub sessions_by_day: HashMap<NaiveDate, Vec<Fetched<SessionRecord>>>,
    pub failing_days: HashSet<NaiveDate>,
    pub truncated_days: HashSet<NaiveDate>,
    pub samples_by_session: HashMap<i64, Vec<Fetched<FifteenMinuteSample>>>,
    pub failing_sample_sessions: HashSet<i64>,
    pub session_calls: RefCell<Vec<DayWindow>>,
    pub sample_calls: RefCell<Vec<i64>>,
}

impl FakeChargePoint {
    fn failure(operation: &'static str) -> RemoteServiceError {
        RemoteServiceError::Api {
            operation,
            code: "999".to_string(),
            text: "simulated outage".to_string(),
        }
    }
}

impl ChargePointApi for FakeChargePoint {
    fn list_stations(&self) -> Result<Vec<Fetched<StationRecord>>, RemoteServiceError> {
        if self.fail_station_listing {
            return Err(Self::failure("getStations"));
        }
        Ok(self.stations.clone())
    }

    fn list_sessions(
        &self,
        window: &DayWindow,
        station_ids: &[String],
    ) -> Result<SessionBatch, RemoteServiceError> {
        self.session_calls.borrow_mut().push(*window);
        let day = window.day();

        if self.failing_days.contains(&day) {
            return Err(Self::failure("getChargingSessionData"));
        }

        let records = self
            .sessions_by_day
            .get(&day)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|record| match record {
                Ok(session) => station_ids.contains(&session.station_id),
                Err(_) => true,
            })
            .collect();
        let truncated_stations = if self.truncated_days.contains(&day) {
            station_ids.to_vec()
        } else {
            Vec::new()
        };

        Ok(SessionBatch {
            records,
            truncated_stations,
        })
    }

    fn list_fifteen_min_samples(
        &self,
        session_id: i64,
    ) -> Result<Vec<Fetched<FifteenMinuteSample>>, RemoteServiceError> {
        self.sample_calls.borrow_mut().push(session_id);

        if self.failing_sample_sessions.contains(&session_id) {
            return Err(Self::failure("get15minChargingSessionData"));
        }

        Ok(self
            .samples_by_session
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }
}
