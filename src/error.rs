use reqwest::StatusCode;
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to load settings"))]
    Config {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: config::ConfigError,
    },
    #[snafu(display("Failed to build HTTP client"))]
    ClientBuild {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: reqwest::Error,
    },
    #[snafu(display("HTTP transport error"))]
    Transport {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: reqwest_middleware::Error,
    },
    #[snafu(display("Failed to read HTTP response body"))]
    Body {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: reqwest::Error,
    },
    #[snafu(display("HTTP request failed, status: '{status}', url: '{url}', body: '{body}'"))]
    FailedRequest {
        #[snafu(implicit)]
        location: Location,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[snafu(display("Flight API rejected the request, code: '{code}', message: '{message}'"))]
    Api {
        #[snafu(implicit)]
        location: Location,
        code: String,
        message: String,
    },
    #[snafu(display("Flight '{flight}' has no '{field}' timestamp"))]
    MissingTimestamp {
        #[snafu(implicit)]
        location: Location,
        flight: String,
        field: &'static str,
    },
    #[snafu(display("Flight '{flight}' reports an unrepresentable delay of {delay} minutes"))]
    DelayOutOfRange {
        #[snafu(implicit)]
        location: Location,
        flight: String,
        delay: i64,
    },
    #[snafu(display("Failed to decode flight record"))]
    Decode {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: serde_json::Error,
    },
    #[snafu(display("Invalid '{field}' timestamp '{value}'"))]
    InvalidTimestamp {
        #[snafu(implicit)]
        location: Location,
        field: &'static str,
        value: String,
        #[snafu(source)]
        error: chrono::ParseError,
    },
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::FailedRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Error::FailedRequest { body, .. } => Some(body),
            _ => None,
        }
    }
}
