use quick_xml::escape::escape;
use serde::Deserialize;

pub(super) const OP_CPN_INSTANCES: &str = "getCPNInstances";
pub(super) const OP_STATIONS: &str = "getStations";
pub(super) const OP_SESSIONS: &str = "getChargingSessionData";
pub(super) const OP_FIFTEEN_MIN: &str = "get15minChargingSessionData";

pub(super) const SUCCESS_CODE: &str = "100";

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const CHARGEPOINT_NS: &str = "urn:dictionary:com.chargepoint.webservices";
const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

pub(super) fn soap_action(operation: &str) -> String {
    format!("\"urn:provider/interface/chargepointservices/{operation}\"")
}

/// Wraps an operation payload in an envelope carrying the WS-Security
/// username token.
pub(super) fn build_envelope(
    username: &str,
    password: &str,
    operation: &str,
    payload: &str,
) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="{soap}" xmlns:urn="{cp}">"#,
            r#"<soapenv:Header>"#,
            r#"<wsse:Security xmlns:wsse="{wsse}" soapenv:mustUnderstand="1">"#,
            r#"<wsse:UsernameToken>"#,
            r#"<wsse:Username>{username}</wsse:Username>"#,
            r#"<wsse:Password Type="{password_type}">{password}</wsse:Password>"#,
            r#"</wsse:UsernameToken>"#,
            r#"</wsse:Security>"#,
            r#"</soapenv:Header>"#,
            r#"<soapenv:Body><urn:{operation}>{payload}</urn:{operation}></soapenv:Body>"#,
            r#"</soapenv:Envelope>"#,
        ),
        soap = SOAP_ENV_NS,
        cp = CHARGEPOINT_NS,
        wsse = WSSE_NS,
        password_type = PASSWORD_TEXT_TYPE,
        username = escape(username),
        password = escape(password),
        operation = operation,
        payload = payload,
    )
}

pub(super) fn element(name: &str, value: &str) -> String {
    format!("<{name}>{}</{name}>", escape(value))
}

#[derive(Debug, Deserialize)]
pub(super) struct Envelope<R> {
    #[serde(rename = "Body")]
    pub body: SoapBody<R>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SoapBody<R> {
    #[serde(rename = "$value")]
    pub content: BodyContent<R>,
}

#[derive(Debug, Deserialize)]
pub(super) enum BodyContent<R> {
    Fault(SoapFault),
    #[serde(
        rename = "getCPNInstancesResponse",
        alias = "getStationsResponse",
        alias = "getChargingSessionDataResponse",
        alias = "get15minChargingSessionDataResponse"
    )]
    Response(R),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SoapFault {
    #[serde(rename = "faultcode")]
    pub code: String,
    #[serde(rename = "faultstring")]
    pub message: String,
}

impl SoapFault {
    pub fn is_authentication(&self) -> bool {
        self.code.contains("FailedAuthentication")
            || self.code.contains("InvalidSecurity")
            || self.message.to_ascii_lowercase().contains("authenticat")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct InstancesResponse {
    #[serde(rename = "responseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "responseText")]
    pub response_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct StationsResponse {
    #[serde(rename = "responseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "responseText")]
    pub response_text: Option<String>,
    #[serde(rename = "stationData")]
    pub stations: Vec<WireStation>,
    #[serde(rename = "moreFlag")]
    pub more_flag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct WireStation {
    #[serde(rename = "stationID")]
    pub station_id: Option<String>,
    #[serde(rename = "stationModel")]
    pub station_model: Option<String>,
    #[serde(rename = "stationActivationDate")]
    pub activation_date: Option<String>,
    #[serde(rename = "numPorts")]
    pub num_ports: Option<String>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
    #[serde(rename = "Port")]
    pub ports: Vec<WirePort>,
    #[serde(rename = "Pricing")]
    pub pricing: Vec<WirePricing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct WirePort {
    #[serde(rename = "portNumber")]
    pub port_number: Option<String>,
    #[serde(rename = "Level")]
    pub level: Option<String>,
    #[serde(rename = "Connector")]
    pub connector: Option<String>,
    #[serde(rename = "Voltage")]
    pub voltage: Option<String>,
    #[serde(rename = "Current")]
    pub current: Option<String>,
    #[serde(rename = "Power")]
    pub power: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct WirePricing {
    #[serde(rename = "Type")]
    pub pricing_type: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    #[serde(rename = "initialUnitPriceDuration")]
    pub initial_unit_price_duration: Option<String>,
    #[serde(rename = "unitPricePerHour")]
    pub unit_price_per_hour: Option<String>,
    #[serde(rename = "unitPricePerHourThereafter")]
    pub unit_price_per_hour_thereafter: Option<String>,
    #[serde(rename = "unitPricePerSession")]
    pub unit_price_per_session: Option<String>,
    #[serde(rename = "unitPricePerKWh")]
    pub unit_price_per_kwh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SessionsResponse {
    #[serde(rename = "responseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "responseText")]
    pub response_text: Option<String>,
    #[serde(rename = "ChargingSessionData")]
    pub sessions: Vec<WireSession>,
    #[serde(rename = "MoreFlag")]
    pub more_flag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct WireSession {
    #[serde(rename = "stationID")]
    pub station_id: Option<String>,
    #[serde(rename = "portNumber")]
    pub port_number: Option<String>,
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    #[serde(rename = "Energy")]
    pub energy: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    #[serde(rename = "credentialID")]
    pub credential_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct FifteenMinResponse {
    #[serde(rename = "responseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "responseText")]
    pub response_text: Option<String>,
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    #[serde(rename = "stationID")]
    pub station_id: Option<String>,
    #[serde(rename = "portNumber")]
    pub port_number: Option<String>,
    #[serde(rename = "fifteenminData")]
    pub samples: Vec<WireSample>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct WireSample {
    #[serde(rename = "stationTime")]
    pub station_time: Option<String>,
    #[serde(rename = "energyConsumed")]
    pub energy_consumed: Option<String>,
    #[serde(rename = "peakPower")]
    pub peak_power: Option<String>,
    #[serde(rename = "rollingPowerAvg")]
    pub rolling_power_avg: Option<String>,
}
