use crate::adapters::chargepoint::ChargePointApi;
use crate::adapters::db::Store;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::session_importer::{SessionImportReport, import_day};
use crate::app::station_importer::import_stations;
use crate::app::summary::RunSummary;
use crate::domain::run_state::{RunPhase, RunStateMachine};

/// One complete import: schema, stations, sessions, commit. The store is
/// closed on every exit path once it has been opened.
pub fn run<C: ChargePointApi>(config: &AppConfig, client: &C) -> Result<RunSummary, AppError> {
    let mut machine = RunStateMachine::new();
    let mut store = Store::open(&config.db_path).map_err(AppError::database_init)?;

    let outcome = import(&mut store, config, client, &mut machine);

    let closed = store.close();
    if let Err(error) = machine.advance(RunPhase::Closed) {
        tracing::warn!(error = %error, "run state already closed");
    }

    let summary = outcome?;
    closed.map_err(AppError::runtime)?;
    tracing::info!(db_path = %config.db_path, "database closed");

    Ok(summary)
}

fn import<C: ChargePointApi>(
    store: &mut Store,
    config: &AppConfig,
    client: &C,
    machine: &mut RunStateMachine,
) -> Result<RunSummary, AppError> {
    let tables = store
        .ensure_schema(config.record_fifteen_min)
        .map_err(AppError::database_init)?;
    machine.advance(RunPhase::SchemaReady).map_err(AppError::runtime)?;
    tracing::info!(tables = ?tables, "schema ready");

    let mut summary = RunSummary {
        db_path: config.db_path.clone(),
        tables,
        ..RunSummary::default()
    };

    if config.update_stations {
        match import_stations(store, client) {
            Ok(report) => summary.stations = Some(report),
            Err(error) => {
                tracing::error!(error = %error, "station import failed");
                summary.station_error = Some(error.to_string());
            }
        }
    } else {
        tracing::info!("station update disabled");
    }
    machine
        .advance(RunPhase::StationsImported)
        .map_err(AppError::runtime)?;

    if config.update_sessions {
        let mut report = SessionImportReport::default();
        for day in config.window.days() {
            machine
                .advance(RunPhase::ImportingDay)
                .map_err(AppError::runtime)?;
            import_day(
                store,
                client,
                &day,
                &config.station_ids,
                config.record_fifteen_min,
                &mut report,
            );
        }
        report.log_totals();
        summary.sessions = Some(report);
    } else {
        tracing::info!("session update disabled");
    }

    store.commit().map_err(AppError::runtime)?;
    machine.advance(RunPhase::Committed).map_err(AppError::runtime)?;

    Ok(summary)
}
