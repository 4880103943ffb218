use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("{operation}: request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: unexpected HTTP status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{operation}: SOAP fault {code}: {message}")]
    Fault {
        operation: &'static str,
        code: String,
        message: String,
    },
    #[error("{operation}: response code {code}: {text}")]
    Api {
        operation: &'static str,
        code: String,
        text: String,
    },
    #[error("{operation}: malformed response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: quick_xml::DeError,
    },
    #[error("{operation}: authentication rejected: {message}")]
    Authentication {
        operation: &'static str,
        message: String,
    },
}

impl RemoteServiceError {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Http { operation, .. }
            | Self::Status { operation, .. }
            | Self::Fault { operation, .. }
            | Self::Api { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Authentication { operation, .. } => operation,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
