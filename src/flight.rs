use crate::error::{MissingTimestampSnafu, Result};
use crate::time::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    Scheduled,
    Active,
    Landed,
    Cancelled,
    Incident,
    Diverted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightIdent {
    pub number: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
}

/// One side of a flight leg as reported by the API. Timestamps are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub airport: Option<String>,
    pub iata: Option<String>,
    pub scheduled: Option<String>,
    pub estimated: Option<String>,
    pub actual: Option<String>,
    #[serde(default, deserialize_with = "delay_minutes")]
    pub delay: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub registration: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub icao24: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_date: Option<String>,
    pub flight_status: Option<FlightStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub departure: Endpoint,
    #[serde(default, deserialize_with = "nullable")]
    pub arrival: Endpoint,
    #[serde(default, deserialize_with = "nullable")]
    pub flight: FlightIdent,
    pub aircraft: Option<Aircraft>,
}

/// Timestamp fields a delay calculation can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    DepartureScheduled,
    DepartureEstimated,
    ArrivalEstimated,
}

impl TimeField {
    pub fn name(&self) -> &'static str {
        match self {
            TimeField::DepartureScheduled => "departure.scheduled",
            TimeField::DepartureEstimated => "departure.estimated",
            TimeField::ArrivalEstimated => "arrival.estimated",
        }
    }
}

impl FlightRecord {
    /// Best available identifier for display, IATA first.
    pub fn label(&self) -> &str {
        [&self.flight.iata, &self.flight.icao, &self.flight.number]
            .into_iter()
            .filter_map(|x| x.as_deref())
            .find(|x| !x.is_empty())
            .unwrap_or("unknown")
    }

    pub fn iata(&self) -> Option<&str> {
        self.flight.iata.as_deref().filter(|x| !x.is_empty())
    }

    pub fn delay(&self) -> Option<i64> {
        self.departure.delay
    }

    pub fn aircraft_icao(&self) -> Option<&str> {
        self.aircraft
            .as_ref()
            .and_then(|a| a.icao.as_deref())
            .filter(|x| !x.is_empty())
    }

    pub fn raw_time(&self, field: TimeField) -> Option<&str> {
        match field {
            TimeField::DepartureScheduled => self.departure.scheduled.as_deref(),
            TimeField::DepartureEstimated => self.departure.estimated.as_deref(),
            TimeField::ArrivalEstimated => self.arrival.estimated.as_deref(),
        }
        .filter(|x| !x.is_empty())
    }

    /// Parses `field`; absent is `MissingTimestamp`, malformed is `InvalidTimestamp`.
    pub fn time(&self, field: TimeField) -> Result<Timestamp> {
        match self.raw_time(field) {
            Some(value) => Timestamp::parse(field.name(), value),
            None => MissingTimestampSnafu {
                flight: self.label(),
                field: field.name(),
            }
            .fail(),
        }
    }

    /// Like `time`, but an absent field is `Ok(None)`.
    pub fn maybe_time(&self, field: TimeField) -> Result<Option<Timestamp>> {
        self.raw_time(field)
            .map(|value| Timestamp::parse(field.name(), value))
            .transpose()
    }
}

impl fmt::Display for FlightRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// the API has been seen sending delays both as numbers and numeric strings
fn delay_minutes<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDelay {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<RawDelay>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawDelay::Int(v)) => Ok(Some(v)),
        Some(RawDelay::Float(v)) => Ok(Some(v.trunc() as i64)),
        Some(RawDelay::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawDelay::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid delay '{s}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_parse_api_record() {
        let record: FlightRecord = serde_json::from_value(json!({
            "flight_date": "2024-05-01",
            "flight_status": "active",
            "departure": {
                "airport": "Krakow",
                "iata": "KRK",
                "scheduled": "2024-05-01T13:15:00+00:00",
                "estimated": "2024-05-01T13:15:00+00:00",
                "actual": null,
                "delay": 45
            },
            "arrival": {
                "airport": "Warsaw",
                "iata": "WAW",
                "estimated": "2024-05-01T14:00:00+00:00",
                "delay": null
            },
            "flight": {"number": "3912", "iata": "LO3912", "icao": "LOT3912"},
            "aircraft": {"registration": "SP-LII", "iata": "E195", "icao": "E195", "icao24": "48AD03"},
            "live": null
        }))
        .unwrap();

        assert_eq!(record.label(), "LO3912");
        assert_eq!(record.flight_status, Some(FlightStatus::Active));
        assert_eq!(record.delay(), Some(45));
        assert_eq!(record.arrival.delay, None);
        assert_eq!(record.aircraft_icao(), Some("E195"));
        assert_eq!(record.departure.airport.as_deref(), Some("Krakow"));
    }

    #[test]
    fn test_null_sections_and_string_delay() {
        let record: FlightRecord = serde_json::from_value(json!({
            "flight_status": "en-route",
            "departure": {"delay": "240"},
            "arrival": null,
            "flight": {"number": "7"},
            "aircraft": null
        }))
        .unwrap();

        assert_eq!(record.flight_status, Some(FlightStatus::Unknown));
        assert_eq!(record.delay(), Some(240));
        assert_eq!(record.arrival, Endpoint::default());
        assert_eq!(record.aircraft_icao(), None);
        assert_eq!(record.label(), "7");
    }

    #[test]
    fn test_invalid_delay_is_rejected() {
        let result = serde_json::from_value::<FlightRecord>(json!({
            "departure": {"delay": "soon"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_and_malformed_time() {
        let mut record = FlightRecord::default();
        record.flight.iata = Some("LO1".into());
        record.arrival.estimated = Some("not a time".into());

        assert!(matches!(
            record.time(TimeField::DepartureScheduled),
            Err(Error::MissingTimestamp { field: "departure.scheduled", .. })
        ));
        assert!(matches!(
            record.time(TimeField::ArrivalEstimated),
            Err(Error::InvalidTimestamp { field: "arrival.estimated", .. })
        ));
        assert!(matches!(record.maybe_time(TimeField::DepartureEstimated), Ok(None)));
    }
}
