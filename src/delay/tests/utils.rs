use crate::flight::{Aircraft, Endpoint, FlightIdent, FlightRecord, FlightStatus};
use crate::time::Timestamp;
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse("test", s).unwrap()
}

/// `HH:MM` on a fixed UTC day.
pub fn at(hhmm: &str) -> String {
    format!("2024-05-01T{hhmm}:00+00:00")
}

pub fn flight(iata: &str, delay: Option<i64>) -> FlightRecord {
    FlightRecord {
        flight_date: Some("2024-05-01".into()),
        flight_status: Some(FlightStatus::Active),
        flight: FlightIdent {
            iata: Some(iata.into()),
            ..Default::default()
        },
        departure: Endpoint {
            airport: Some("Krakow".into()),
            iata: Some("KRK".into()),
            delay,
            ..Default::default()
        },
        arrival: Endpoint {
            airport: Some("Warsaw".into()),
            iata: Some("WAW".into()),
            ..Default::default()
        },
        aircraft: None,
    }
}

pub fn with_departure(
    mut record: FlightRecord,
    scheduled: Option<&str>,
    estimated: Option<&str>,
) -> FlightRecord {
    record.departure.scheduled = scheduled.map(at);
    record.departure.estimated = estimated.map(at);
    record
}

pub fn with_arrival(mut record: FlightRecord, estimated: &str) -> FlightRecord {
    record.arrival.estimated = Some(at(estimated));
    record
}

pub fn with_aircraft(mut record: FlightRecord, icao: &str) -> FlightRecord {
    record.aircraft = Some(Aircraft {
        icao: Some(icao.into()),
        ..Default::default()
    });
    record
}

pub fn scheduled(mut record: FlightRecord) -> FlightRecord {
    record.flight_status = Some(FlightStatus::Scheduled);
    record.departure.delay = None;
    record
}

pub fn arb_delay() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        Just(None),
        Just(Some(0)),
        (-30..600i64).prop_map(Some),
    ]
}

pub fn arb_flight() -> impl Strategy<Value = FlightRecord> {
    (0..1000u32, arb_delay()).prop_map(|(n, delay)| flight(&format!("LO{n}"), delay))
}
