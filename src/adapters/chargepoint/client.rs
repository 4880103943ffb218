use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::domain::day_window::DayWindow;
use crate::domain::models::{FifteenMinuteSample, StationRecord};
use crate::domain::payload::{flag, format_timestamp};

use super::convert::{fifteen_min_samples, session_record, station_record};
use super::envelope::{
    BodyContent, Envelope, FifteenMinResponse, InstancesResponse, OP_CPN_INSTANCES,
    OP_FIFTEEN_MIN, OP_SESSIONS, OP_STATIONS, SUCCESS_CODE, SessionsResponse, StationsResponse,
    build_envelope, element, soap_action,
};
use super::error::RemoteServiceError;
use super::{ChargePointApi, Fetched, SESSION_PAGE_CAP, SessionBatch};

pub const DEFAULT_ENDPOINT: &str =
    "https://webservices.chargepoint.com/webservices/chargepoint/services/5.0";

const ERROR_BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct ChargePointConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ChargePointSoapClient {
    http: Client,
    config: ChargePointConfig,
}

impl ChargePointSoapClient {
    /// Builds the client and proves the credentials with a cheap
    /// authenticated call, so a bad login fails here rather than mid-run.
    pub fn connect(config: ChargePointConfig) -> Result<Self, RemoteServiceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| RemoteServiceError::Http {
                operation: OP_CPN_INSTANCES,
                source,
            })?;

        let client = Self { http, config };
        let instances: InstancesResponse = client.call(OP_CPN_INSTANCES, "")?;
        tracing::info!(
            endpoint = %client.config.endpoint,
            response_code = instances.response_code.as_deref().unwrap_or("n/a"),
            "authenticated against ChargePoint API"
        );

        Ok(client)
    }

    fn call<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        payload: &str,
    ) -> Result<R, RemoteServiceError> {
        let envelope = build_envelope(
            &self.config.username,
            &self.config.password,
            operation,
            payload,
        );

        tracing::debug!(operation, endpoint = %self.config.endpoint, "sending SOAP request");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action(operation))
            .body(envelope)
            .send()
            .map_err(|source| RemoteServiceError::Http { operation, source })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|source| RemoteServiceError::Http { operation, source })?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteServiceError::Authentication {
                operation,
                message: format!("HTTP {status}"),
            });
        }

        match quick_xml::de::from_str::<Envelope<R>>(&body) {
            Ok(envelope) => match envelope.body.content {
                BodyContent::Fault(fault) if fault.is_authentication() => {
                    Err(RemoteServiceError::Authentication {
                        operation,
                        message: fault.message,
                    })
                }
                BodyContent::Fault(fault) => Err(RemoteServiceError::Fault {
                    operation,
                    code: fault.code,
                    message: fault.message,
                }),
                BodyContent::Response(reply) if status.is_success() => Ok(reply),
                BodyContent::Response(_) => Err(unexpected_status(operation, status, &body)),
            },
            Err(_) if !status.is_success() => Err(unexpected_status(operation, status, &body)),
            Err(source) => Err(RemoteServiceError::Decode { operation, source }),
        }
    }

    fn list_station_sessions(
        &self,
        window: &DayWindow,
        station_id: &str,
    ) -> Result<SessionsResponse, RemoteServiceError> {
        let payload = format!(
            "<searchQuery>{}{}{}</searchQuery>",
            element("stationID", station_id),
            element("fromTimeStamp", &format_timestamp(window.start)),
            element("toTimeStamp", &format_timestamp(window.end)),
        );
        let response: SessionsResponse = self.call(OP_SESSIONS, &payload)?;
        check_response_code(
            OP_SESSIONS,
            response.response_code.as_deref(),
            response.response_text.as_deref(),
        )?;
        Ok(response)
    }
}

impl ChargePointApi for ChargePointSoapClient {
    fn list_stations(&self) -> Result<Vec<Fetched<StationRecord>>, RemoteServiceError> {
        let response: StationsResponse = self.call(OP_STATIONS, "<searchQuery/>")?;
        check_response_code(
            OP_STATIONS,
            response.response_code.as_deref(),
            response.response_text.as_deref(),
        )?;

        if flag(response.more_flag.as_deref()) {
            tracing::warn!(
                returned = response.stations.len(),
                "station listing reports more stations than were returned"
            );
        }

        Ok(response.stations.iter().map(station_record).collect())
    }

    fn list_sessions(
        &self,
        window: &DayWindow,
        station_ids: &[String],
    ) -> Result<SessionBatch, RemoteServiceError> {
        let mut batch = SessionBatch::default();

        for station_id in station_ids {
            let response = self.list_station_sessions(window, station_id)?;
            let returned = response.sessions.len();

            if flag(response.more_flag.as_deref()) || returned >= SESSION_PAGE_CAP {
                batch.truncated_stations.push(station_id.clone());
            }

            tracing::debug!(
                station_id = %station_id,
                from = %format_timestamp(window.start),
                returned,
                "fetched charging sessions"
            );

            batch
                .records
                .extend(response.sessions.iter().map(session_record));
        }

        Ok(batch)
    }

    fn list_fifteen_min_samples(
        &self,
        session_id: i64,
    ) -> Result<Vec<Fetched<FifteenMinuteSample>>, RemoteServiceError> {
        let payload = element("sessionID", &session_id.to_string());
        let response: FifteenMinResponse = self.call(OP_FIFTEEN_MIN, &payload)?;
        check_response_code(
            OP_FIFTEEN_MIN,
            response.response_code.as_deref(),
            response.response_text.as_deref(),
        )?;

        Ok(fifteen_min_samples(&response, session_id))
    }
}

fn check_response_code(
    operation: &'static str,
    code: Option<&str>,
    text: Option<&str>,
) -> Result<(), RemoteServiceError> {
    match code.map(str::trim) {
        None | Some(SUCCESS_CODE) => Ok(()),
        Some(code) => Err(RemoteServiceError::Api {
            operation,
            code: code.to_string(),
            text: text.unwrap_or_default().to_string(),
        }),
    }
}

fn unexpected_status(operation: &'static str, status: StatusCode, body: &str) -> RemoteServiceError {
    RemoteServiceError::Status {
        operation,
        status: status.as_u16(),
        body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
    }
}
