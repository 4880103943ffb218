mod cli;
mod config;
mod error;
mod logging;
pub mod runtime;
pub mod session_importer;
pub mod station_importer;
pub mod summary;

use clap::Parser;

use crate::adapters::chargepoint::ChargePointSoapClient;

pub use cli::Cli;
pub use config::AppConfig;
pub use error::AppError;
pub use summary::RunSummary;

pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let cli = Cli::parse();
    let config = AppConfig::from_env(cli.record_fifteen_min)?;

    tracing::info!(
        endpoint = %config.chargepoint.endpoint,
        db_path = %config.db_path,
        station_ids_path = %config.station_ids_path,
        stations = config.station_ids.len(),
        start = %config.window.start(),
        end = %config.window.end(),
        update_stations = config.update_stations,
        update_sessions = config.update_sessions,
        record_fifteen_min = config.record_fifteen_min,
        "application bootstrap initialized"
    );

    let client =
        ChargePointSoapClient::connect(config.chargepoint.clone()).map_err(AppError::authentication)?;

    let summary = runtime::run(&config, &client)?;
    println!("{summary}");

    Ok(())
}
