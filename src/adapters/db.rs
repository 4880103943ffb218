use rusqlite::{Connection, OptionalExtension, Transaction, params};
use thiserror::Error;

use crate::domain::models::{
    FifteenMinuteSample, PortRecord, PricingRecord, SessionRecord, StationRecord,
};

pub const FIFTEEN_MIN_TABLE: &str = "fifteen_min_session";

/// Table definitions in foreign-key dependency order: every parent precedes
/// its children.
const CORE_TABLES: &[(&str, &str)] = &[
    (
        "user",
        r#"
CREATE TABLE IF NOT EXISTS user (
    userID INTEGER PRIMARY KEY
);
"#,
    ),
    (
        "payment",
        r#"
CREATE TABLE IF NOT EXISTS payment (
    credentialID TEXT PRIMARY KEY
);
"#,
    ),
    (
        "pricing",
        r#"
CREATE TABLE IF NOT EXISTS pricing (
    pricingID INTEGER PRIMARY KEY AUTOINCREMENT,
    Type TEXT,
    startTime TEXT,
    endTime TEXT,
    minPrice NUMERIC,
    maxPrice NUMERIC,
    initialUnitPriceDuration TEXT,
    unitPricePerHour NUMERIC,
    unitPricePerHourThereafter TEXT,
    unitPricePerSession NUMERIC,
    unitPricePerKWh NUMERIC
);
"#,
    ),
    (
        "station",
        r#"
CREATE TABLE IF NOT EXISTS station (
    stationID TEXT PRIMARY KEY,
    stationModel TEXT,
    stationActivationDate TEXT,
    numPorts INTEGER,
    Address TEXT,
    City TEXT,
    State TEXT,
    postalCode TEXT,
    pricingID INTEGER,
    FOREIGN KEY (pricingID) REFERENCES pricing(pricingID)
);
"#,
    ),
    (
        "port",
        r#"
CREATE TABLE IF NOT EXISTS port (
    portID INTEGER PRIMARY KEY,
    stationID TEXT NOT NULL,
    portNumber INTEGER NOT NULL,
    Level TEXT,
    Connector TEXT,
    Voltage INTEGER,
    Current INTEGER,
    Power NUMERIC,
    UNIQUE (stationID, portNumber),
    FOREIGN KEY (stationID) REFERENCES station(stationID)
);
"#,
    ),
    (
        "session",
        r#"
CREATE TABLE IF NOT EXISTS session (
    sessionID INTEGER PRIMARY KEY,
    startTime TEXT,
    endTime TEXT,
    Energy NUMERIC,
    stationID TEXT NOT NULL,
    userID INTEGER,
    credentialID TEXT,
    portNumber INTEGER,
    FOREIGN KEY (stationID) REFERENCES station(stationID),
    FOREIGN KEY (userID) REFERENCES user(userID),
    FOREIGN KEY (credentialID) REFERENCES payment(credentialID)
);
"#,
    ),
];

const FIFTEEN_MIN_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS fifteen_min_session (
    stationID TEXT NOT NULL,
    portNumber INTEGER NOT NULL,
    sessionID INTEGER NOT NULL,
    stationTime TEXT NOT NULL,
    energyConsumed NUMERIC,
    peakPower NUMERIC,
    rollingPowerAvg NUMERIC,
    PRIMARY KEY (stationID, sessionID, portNumber, stationTime),
    FOREIGN KEY (stationID) REFERENCES station(stationID),
    FOREIGN KEY (sessionID) REFERENCES session(sessionID)
);
"#;

const COUNTABLE_TABLES: &[&str] = &[
    "user",
    "payment",
    "pricing",
    "station",
    "port",
    "session",
    FIFTEEN_MIN_TABLE,
];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// How an insert behaves when the row's key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Update the mutable columns of the existing row.
    Refresh,
    /// Keep the existing row untouched.
    Ignore,
    /// Plain insert; the table generates its own key.
    Append,
}

impl WritePolicy {
    fn conflict_clause(self, key_columns: &str, update_columns: &[&str]) -> String {
        match self {
            WritePolicy::Refresh if !update_columns.is_empty() => {
                let assignments: Vec<String> = update_columns
                    .iter()
                    .map(|column| format!("{column} = excluded.{column}"))
                    .collect();
                format!(
                    " ON CONFLICT ({key_columns}) DO UPDATE SET {}",
                    assignments.join(", ")
                )
            }
            WritePolicy::Refresh | WritePolicy::Ignore => {
                format!(" ON CONFLICT ({key_columns}) DO NOTHING")
            }
            WritePolicy::Append => String::new(),
        }
    }
}

pub const PRICING_POLICY: WritePolicy = WritePolicy::Append;
pub const STATION_POLICY: WritePolicy = WritePolicy::Refresh;
pub const PORT_POLICY: WritePolicy = WritePolicy::Ignore;
pub const USER_POLICY: WritePolicy = WritePolicy::Ignore;
pub const PAYMENT_POLICY: WritePolicy = WritePolicy::Ignore;
pub const SESSION_POLICY: WritePolicy = WritePolicy::Ignore;
pub const SAMPLE_POLICY: WritePolicy = WritePolicy::Ignore;

/// The single connection owned by an import run. Dropping it releases the
/// file; `close` does the same but reports failures.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
}

impl Store {
    pub fn open(path: &str) -> Result<Self, DbError> {
        let connection = Connection::open(path)?;
        connection.pragma_update(None, "foreign_keys", true)?;
        // Forces a read of the header so a corrupt file fails here.
        let _: i64 = connection.pragma_query_value(None, "schema_version", |row| row.get(0))?;

        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Creates missing tables parent-first and returns the names ensured.
    pub fn ensure_schema(
        &mut self,
        include_fine_grained: bool,
    ) -> Result<Vec<&'static str>, DbError> {
        let transaction = self.connection.transaction()?;
        let mut ensured = Vec::with_capacity(CORE_TABLES.len() + 1);

        for (name, sql) in CORE_TABLES {
            transaction.execute_batch(sql)?;
            ensured.push(*name);
        }

        if include_fine_grained {
            transaction.execute_batch(FIFTEEN_MIN_TABLE_SQL)?;
            ensured.push(FIFTEEN_MIN_TABLE);
        }

        transaction.commit()?;

        Ok(ensured)
    }

    /// Opens a unit of work (one station, one day). Dropping the returned
    /// transaction without committing rolls it back.
    pub fn begin(&self) -> Result<Transaction<'_>, DbError> {
        Ok(self.connection.unchecked_transaction()?)
    }

    pub fn commit(&self) -> Result<(), DbError> {
        if !self.connection.is_autocommit() {
            self.connection.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    pub fn close(self) -> Result<(), DbError> {
        self.connection
            .close()
            .map_err(|(_, error)| DbError::from(error))
    }
}

pub fn insert_pricing(
    connection: &Connection,
    pricing: &PricingRecord,
    policy: WritePolicy,
) -> Result<i64, DbError> {
    let sql = format!(
        "INSERT INTO pricing (Type, startTime, endTime, minPrice, maxPrice, initialUnitPriceDuration, unitPricePerHour, unitPricePerHourThereafter, unitPricePerSession, unitPricePerKWh) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10){}",
        policy.conflict_clause("pricingID", &[])
    );
    connection.execute(
        &sql,
        params![
            pricing.pricing_type,
            pricing.start_time,
            pricing.end_time,
            pricing.min_price,
            pricing.max_price,
            pricing.initial_unit_price_duration,
            pricing.unit_price_per_hour,
            pricing.unit_price_per_hour_thereafter,
            pricing.unit_price_per_session,
            pricing.unit_price_per_kwh,
        ],
    )?;

    Ok(connection.last_insert_rowid())
}

pub fn upsert_station(
    connection: &Connection,
    station: &StationRecord,
    pricing_id: Option<i64>,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO station (stationID, stationModel, stationActivationDate, numPorts, Address, City, State, postalCode, pricingID) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9){}",
        policy.conflict_clause(
            "stationID",
            &[
                "stationModel",
                "stationActivationDate",
                "numPorts",
                "Address",
                "City",
                "State",
                "postalCode",
                "pricingID",
            ],
        )
    );
    let changed = connection.execute(
        &sql,
        params![
            station.station_id,
            station.model,
            station.activation_date,
            station.num_ports,
            station.address,
            station.city,
            station.state,
            station.postal_code,
            pricing_id,
        ],
    )?;

    Ok(changed > 0)
}

pub fn insert_port(
    connection: &Connection,
    station_id: &str,
    port: &PortRecord,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO port (stationID, portNumber, Level, Connector, Voltage, Current, Power) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7){}",
        policy.conflict_clause(
            "stationID, portNumber",
            &["Level", "Connector", "Voltage", "Current", "Power"],
        )
    );
    let changed = connection.execute(
        &sql,
        params![
            station_id,
            port.port_number,
            port.level,
            port.connector,
            port.voltage,
            port.current,
            port.power_kw,
        ],
    )?;

    Ok(changed > 0)
}

pub fn ensure_user(
    connection: &Connection,
    user_id: i64,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO user (userID) VALUES (?1){}",
        policy.conflict_clause("userID", &[])
    );
    let changed = connection.execute(&sql, params![user_id])?;
    Ok(changed > 0)
}

pub fn ensure_payment_credential(
    connection: &Connection,
    credential_id: &str,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO payment (credentialID) VALUES (?1){}",
        policy.conflict_clause("credentialID", &[])
    );
    let changed = connection.execute(&sql, params![credential_id])?;
    Ok(changed > 0)
}

pub fn insert_session(
    connection: &Connection,
    session: &SessionRecord,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO session (sessionID, startTime, endTime, Energy, stationID, userID, credentialID, portNumber) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8){}",
        policy.conflict_clause(
            "sessionID",
            &[
                "startTime",
                "endTime",
                "Energy",
                "stationID",
                "userID",
                "credentialID",
                "portNumber",
            ],
        )
    );
    let changed = connection.execute(
        &sql,
        params![
            session.session_id,
            session.start_time,
            session.end_time,
            session.energy_kwh,
            session.station_id,
            session.user_id,
            session.credential_id,
            session.port_number,
        ],
    )?;

    Ok(changed > 0)
}

pub fn insert_fifteen_min_sample(
    connection: &Connection,
    sample: &FifteenMinuteSample,
    policy: WritePolicy,
) -> Result<bool, DbError> {
    let sql = format!(
        "INSERT INTO fifteen_min_session (stationID, portNumber, sessionID, stationTime, energyConsumed, peakPower, rollingPowerAvg) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7){}",
        policy.conflict_clause(
            "stationID, sessionID, portNumber, stationTime",
            &["energyConsumed", "peakPower", "rollingPowerAvg"],
        )
    );
    let changed = connection.execute(
        &sql,
        params![
            sample.station_id,
            sample.port_number,
            sample.session_id,
            sample.station_time,
            sample.energy_consumed,
            sample.peak_power,
            sample.rolling_power_avg,
        ],
    )?;

    Ok(changed > 0)
}

pub fn station_exists(connection: &Connection, station_id: &str) -> Result<bool, DbError> {
    let found = connection
        .query_row(
            "SELECT 1 FROM station WHERE stationID = ?1",
            params![station_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn session_exists(connection: &Connection, session_id: i64) -> Result<bool, DbError> {
    let found = connection
        .query_row(
            "SELECT 1 FROM session WHERE sessionID = ?1",
            params![session_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn count_rows(connection: &Connection, table: &str) -> Result<i64, DbError> {
    if !COUNTABLE_TABLES.contains(&table) {
        return Err(DbError::UnknownTable(table.to_string()));
    }

    let count = connection.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}
