use crate::api::{FlightQuery, FlightsApi};
use crate::error::Result;
use crate::flight::{FlightRecord, FlightStatus, TimeField};
use crate::time::Timestamp;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    FlightIata(String),
    AircraftIcao(String),
}

/// How the next flight is chosen among the lookup candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// The n-th candidate in the order the API returned them.
    ApiOrder(usize),
    /// The candidate with the earliest scheduled departure after the delayed flight's
    /// scheduled departure, or its estimated one when no schedule is reported.
    Earliest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextFlightLookup {
    pub key: LookupKey,
    pub status: Option<FlightStatus>,
    pub limit: u32,
    pub pick: Pick,
}

impl NextFlightLookup {
    pub fn query(&self) -> FlightQuery {
        let (flight_iata, aircraft_icao) = match &self.key {
            LookupKey::FlightIata(iata) => (Some(iata.clone()), None),
            LookupKey::AircraftIcao(icao) => (None, Some(icao.clone())),
        };
        FlightQuery {
            flight_status: self.status,
            flight_iata,
            aircraft_icao,
            limit: Some(self.limit),
        }
    }

    /// Candidates with no scheduled departure are passed over; malformed ones are errors.
    pub fn choose(
        &self,
        delayed: &FlightRecord,
        candidates: Vec<FlightRecord>,
    ) -> Result<Option<FlightRecord>> {
        match self.pick {
            Pick::ApiOrder(n) => Ok(candidates.into_iter().nth(n)),
            Pick::Earliest => {
                let after = match delayed.maybe_time(TimeField::DepartureScheduled)? {
                    Some(departure) => departure,
                    None => delayed.time(TimeField::DepartureEstimated)?,
                };
                let mut best: Option<(Timestamp, FlightRecord)> = None;
                for candidate in candidates {
                    let Some(departure) = candidate.maybe_time(TimeField::DepartureScheduled)?
                    else {
                        debug!(flight = candidate.label(), "candidate has no scheduled departure");
                        continue;
                    };
                    if departure <= after {
                        continue;
                    }
                    if best.as_ref().is_none_or(|(t, _)| departure < *t) {
                        best = Some((departure, candidate));
                    }
                }
                Ok(best.map(|(_, f)| f))
            }
        }
    }
}

/// Looks up the flight `delayed`'s aircraft operates next, if any.
pub async fn next_flight(
    api: &FlightsApi,
    delayed: &FlightRecord,
    lookup: &NextFlightLookup,
) -> Result<Option<FlightRecord>> {
    let candidates = api.flights(&lookup.query()).await;
    debug!(
        flight = delayed.label(),
        candidates = candidates.len(),
        "looking up next flight"
    );
    lookup.choose(delayed, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::tests::utils::{flight, scheduled, with_departure};
    use crate::error::Error;

    fn lookup(pick: Pick) -> NextFlightLookup {
        NextFlightLookup {
            key: LookupKey::AircraftIcao("A320".into()),
            status: Some(FlightStatus::Scheduled),
            limit: 10,
            pick,
        }
    }

    fn leg(iata: &str, departure: Option<&str>) -> FlightRecord {
        with_departure(scheduled(flight(iata, None)), departure, None)
    }

    #[test]
    fn test_query_by_key() {
        let query = lookup(Pick::Earliest).query();
        assert_eq!(query.aircraft_icao.as_deref(), Some("A320"));
        assert_eq!(query.flight_iata, None);
        assert_eq!(query.flight_status, Some(FlightStatus::Scheduled));
        assert_eq!(query.limit, Some(10));

        let query = NextFlightLookup {
            key: LookupKey::FlightIata("LO1".into()),
            status: None,
            limit: 2,
            pick: Pick::ApiOrder(1),
        }
        .query();
        assert_eq!(query.flight_iata.as_deref(), Some("LO1"));
        assert_eq!(query.aircraft_icao, None);
        assert_eq!(query.flight_status, None);
    }

    #[test]
    fn test_api_order_takes_position() {
        let delayed = leg("LO1", Some("10:00"));
        let candidates = vec![leg("LO1", Some("10:00")), leg("LO9", Some("18:00"))];

        let chosen = lookup(Pick::ApiOrder(1))
            .choose(&delayed, candidates.clone())
            .unwrap();
        assert_eq!(chosen.map(|f| f.label().to_string()), Some("LO9".into()));

        assert_eq!(lookup(Pick::ApiOrder(2)).choose(&delayed, candidates).unwrap(), None);
    }

    #[test]
    fn test_earliest_skips_past_and_unscheduled() {
        let delayed = leg("LO1", Some("10:00"));
        let candidates = vec![
            leg("LO0", Some("09:00")),
            leg("LO1", Some("10:00")),
            leg("LO7", Some("19:00")),
            leg("LOX", None),
            leg("LO3", Some("12:30")),
            leg("LO4", Some("16:00")),
        ];

        let chosen = lookup(Pick::Earliest).choose(&delayed, candidates).unwrap();

        assert_eq!(chosen.map(|f| f.label().to_string()), Some("LO3".into()));
    }

    #[test]
    fn test_earliest_without_later_flight() {
        let delayed = leg("LO1", Some("10:00"));
        let candidates = vec![leg("LO0", Some("09:00")), leg("LO1", Some("10:00"))];

        assert_eq!(lookup(Pick::Earliest).choose(&delayed, candidates).unwrap(), None);
    }

    #[test]
    fn test_earliest_falls_back_to_estimated_departure() {
        let delayed = with_departure(flight("LO1", Some(240)), None, Some("11:00"));
        let candidates = vec![leg("LO2", Some("10:30")), leg("LO3", Some("12:30"))];

        let chosen = lookup(Pick::Earliest).choose(&delayed, candidates).unwrap();

        assert_eq!(chosen.map(|f| f.label().to_string()), Some("LO3".into()));
    }

    #[test]
    fn test_earliest_needs_delayed_departure() {
        let delayed = leg("LO1", None);
        let candidates = vec![leg("LO3", Some("12:30"))];

        assert!(matches!(
            lookup(Pick::Earliest).choose(&delayed, candidates),
            Err(Error::MissingTimestamp { .. })
        ));
    }

    #[test]
    fn test_earliest_rejects_malformed_candidate() {
        let delayed = leg("LO1", Some("10:00"));
        let mut broken = leg("LO3", None);
        broken.departure.scheduled = Some("tomorrow".into());

        assert!(matches!(
            lookup(Pick::Earliest).choose(&delayed, vec![broken]),
            Err(Error::InvalidTimestamp { .. })
        ));
    }
}
