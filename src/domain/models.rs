#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub station_id: String,
    pub model: Option<String>,
    pub activation_date: Option<String>,
    pub num_ports: Option<i64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub ports: Vec<PortRecord>,
    pub pricing: Vec<PricingRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortRecord {
    pub port_number: i64,
    pub level: Option<String>,
    pub connector: Option<String>,
    pub voltage: Option<i64>,
    pub current: Option<i64>,
    pub power_kw: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingRecord {
    pub pricing_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub initial_unit_price_duration: Option<String>,
    pub unit_price_per_hour: Option<f64>,
    pub unit_price_per_hour_thereafter: Option<String>,
    pub unit_price_per_session: Option<f64>,
    pub unit_price_per_kwh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: i64,
    pub station_id: String,
    pub port_number: Option<i64>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub energy_kwh: Option<f64>,
    pub user_id: Option<i64>,
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FifteenMinuteSample {
    pub station_id: String,
    pub session_id: i64,
    pub port_number: i64,
    pub station_time: String,
    pub energy_consumed: Option<f64>,
    pub peak_power: Option<f64>,
    pub rolling_power_avg: Option<f64>,
}
