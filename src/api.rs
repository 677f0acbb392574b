use crate::error::{ApiSnafu, DecodeSnafu, Result};
use crate::flight::{FlightRecord, FlightStatus};
use crate::http_client::HttpClient;
use crate::settings::ApiSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, error, instrument};

/// Filters for the flights listing. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_status: Option<FlightStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_iata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_icao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Serialize)]
struct AuthorizedQuery<'a> {
    access_key: &'a str,
    #[serde(flatten)]
    query: &'a FlightQuery,
}

#[derive(Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    data: Vec<Value>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Decoded flights alongside the records exactly as the API sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub flights: Vec<FlightRecord>,
    pub raw: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct FlightsApi {
    client: HttpClient,
    url: String,
    access_key: String,
}

impl FlightsApi {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(settings.timeout)
            .max_retries(settings.max_retries)
            .build()?;

        Ok(FlightsApi {
            client,
            url: format!("{}/flights", settings.base_url.trim_end_matches('/')),
            access_key: settings.access_key.clone(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn try_listing(&self, query: &FlightQuery) -> Result<Listing> {
        let response: FlightsResponse = self
            .client
            .get_json(
                &self.url,
                &AuthorizedQuery {
                    access_key: &self.access_key,
                    query,
                },
            )
            .await?;

        if let Some(ApiError { code, message }) = response.error {
            return ApiSnafu { code, message }.fail();
        }

        let flights = response
            .data
            .iter()
            .map(FlightRecord::deserialize)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context(DecodeSnafu)?;

        debug!(count = flights.len(), "fetched flights");
        Ok(Listing {
            flights,
            raw: response.data,
        })
    }

    pub async fn try_flights(&self, query: &FlightQuery) -> Result<Vec<FlightRecord>> {
        Ok(self.try_listing(query).await?.flights)
    }

    /// Like [`FlightsApi::try_listing`], logging any failure and returning an empty listing.
    pub async fn listing(&self, query: &FlightQuery) -> Listing {
        degrade(self.try_listing(query).await)
    }

    /// Fetches flights, logging any failure and returning an empty list in its place.
    pub async fn flights(&self, query: &FlightQuery) -> Vec<FlightRecord> {
        degrade(self.try_flights(query).await)
    }
}

fn degrade<T: Default>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        error!(status = ?e.status(), body = e.body(), "failed to fetch flights: {e}");
        T::default()
    })
}
