use crate::domain::models::{
    FifteenMinuteSample, PortRecord, PricingRecord, SessionRecord, StationRecord,
};
use crate::domain::payload::{
    optional_f64, optional_i64, optional_text, optional_timestamp, required_i64, required_text,
    required_timestamp,
};

use super::Fetched;
use super::envelope::{
    FifteenMinResponse, WirePort, WirePricing, WireSample, WireSession, WireStation,
};

/// A station with any malformed port or pricing entry is rejected whole.
pub(super) fn station_record(wire: &WireStation) -> Fetched<StationRecord> {
    let station_id = required_text("stationID", wire.station_id.as_deref())?;
    let ports = wire
        .ports
        .iter()
        .map(port_record)
        .collect::<Result<Vec<_>, _>>()?;
    let pricing = wire
        .pricing
        .iter()
        .map(pricing_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StationRecord {
        station_id,
        model: optional_text(wire.station_model.as_deref()),
        activation_date: optional_text(wire.activation_date.as_deref()),
        num_ports: optional_i64("numPorts", wire.num_ports.as_deref())?,
        address: optional_text(wire.address.as_deref()),
        city: optional_text(wire.city.as_deref()),
        state: optional_text(wire.state.as_deref()),
        postal_code: optional_text(wire.postal_code.as_deref()),
        ports,
        pricing,
    })
}

fn port_record(wire: &WirePort) -> Fetched<PortRecord> {
    Ok(PortRecord {
        port_number: required_i64("Port.portNumber", wire.port_number.as_deref())?,
        level: optional_text(wire.level.as_deref()),
        connector: optional_text(wire.connector.as_deref()),
        voltage: optional_i64("Port.Voltage", wire.voltage.as_deref())?,
        current: optional_i64("Port.Current", wire.current.as_deref())?,
        power_kw: optional_f64("Port.Power", wire.power.as_deref())?,
    })
}

fn pricing_record(wire: &WirePricing) -> Fetched<PricingRecord> {
    Ok(PricingRecord {
        pricing_type: optional_text(wire.pricing_type.as_deref()),
        start_time: optional_text(wire.start_time.as_deref()),
        end_time: optional_text(wire.end_time.as_deref()),
        min_price: optional_f64("Pricing.minPrice", wire.min_price.as_deref())?,
        max_price: optional_f64("Pricing.maxPrice", wire.max_price.as_deref())?,
        initial_unit_price_duration: optional_text(wire.initial_unit_price_duration.as_deref()),
        unit_price_per_hour: optional_f64(
            "Pricing.unitPricePerHour",
            wire.unit_price_per_hour.as_deref(),
        )?,
        unit_price_per_hour_thereafter: optional_text(
            wire.unit_price_per_hour_thereafter.as_deref(),
        ),
        unit_price_per_session: optional_f64(
            "Pricing.unitPricePerSession",
            wire.unit_price_per_session.as_deref(),
        )?,
        unit_price_per_kwh: optional_f64(
            "Pricing.unitPricePerKWh",
            wire.unit_price_per_kwh.as_deref(),
        )?,
    })
}

pub(super) fn session_record(wire: &WireSession) -> Fetched<SessionRecord> {
    Ok(SessionRecord {
        session_id: required_i64("sessionID", wire.session_id.as_deref())?,
        station_id: required_text("stationID", wire.station_id.as_deref())?,
        port_number: optional_i64("portNumber", wire.port_number.as_deref())?,
        start_time: required_timestamp("startTime", wire.start_time.as_deref())?,
        end_time: optional_timestamp("endTime", wire.end_time.as_deref())?,
        energy_kwh: optional_f64("Energy", wire.energy.as_deref())?,
        user_id: optional_i64("userID", wire.user_id.as_deref())?,
        credential_id: optional_text(wire.credential_id.as_deref()),
    })
}

/// Samples inherit station, port and session from the response header; when
/// the header is unusable every sample is reported with the same error.
pub(super) fn fifteen_min_samples(
    response: &FifteenMinResponse,
    requested_session_id: i64,
) -> Vec<Fetched<FifteenMinuteSample>> {
    let header = sample_header(response, requested_session_id);

    response
        .samples
        .iter()
        .map(|wire| {
            let (station_id, session_id, port_number) = header.clone()?;
            sample_record(wire, station_id, session_id, port_number)
        })
        .collect()
}

fn sample_header(
    response: &FifteenMinResponse,
    requested_session_id: i64,
) -> Fetched<(String, i64, i64)> {
    let station_id = required_text("stationID", response.station_id.as_deref())?;
    let session_id =
        optional_i64("sessionID", response.session_id.as_deref())?.unwrap_or(requested_session_id);
    let port_number = required_i64("portNumber", response.port_number.as_deref())?;
    Ok((station_id, session_id, port_number))
}

fn sample_record(
    wire: &WireSample,
    station_id: String,
    session_id: i64,
    port_number: i64,
) -> Fetched<FifteenMinuteSample> {
    Ok(FifteenMinuteSample {
        station_id,
        session_id,
        port_number,
        station_time: required_timestamp("stationTime", wire.station_time.as_deref())?,
        energy_consumed: optional_f64("energyConsumed", wire.energy_consumed.as_deref())?,
        peak_power: optional_f64("peakPower", wire.peak_power.as_deref())?,
        rolling_power_avg: optional_f64("rollingPowerAvg", wire.rolling_power_avg.as_deref())?,
    })
}
