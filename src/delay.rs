use crate::error::{DelayOutOfRangeSnafu, Result};
use crate::flight::{FlightRecord, TimeField};
use crate::time::Timestamp;
use chrono::TimeDelta;
use snafu::OptionExt;
use std::fmt;

/// Minimum departure delay, in minutes, for a flight to count as delayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Exceeds(i64),
    AtLeast(i64),
}

impl Threshold {
    pub fn admits(&self, delay: i64) -> bool {
        match self {
            Threshold::Exceeds(minutes) => delay > *minutes,
            Threshold::AtLeast(minutes) => delay >= *minutes,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Exceeds(0) => write!(f, "any delay"),
            Threshold::Exceeds(minutes) => write!(f, "more than {minutes} minutes"),
            Threshold::AtLeast(minutes) => write!(f, "{minutes} minutes or more"),
        }
    }
}

/// Keeps the records whose departure delay is present and passes `threshold`, in order.
pub fn filter_delayed<'a, I>(records: I, threshold: Threshold) -> Vec<&'a FlightRecord>
where
    I: IntoIterator<Item = &'a FlightRecord>,
{
    records
        .into_iter()
        .filter(|f| f.delay().is_some_and(|d| threshold.admits(d)))
        .collect()
}

/// Delay carried over onto an aircraft's next flight. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DelayEstimate(TimeDelta);

impl DelayEstimate {
    pub fn duration(&self) -> TimeDelta {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for DelayEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.duration().num_seconds();
        let days = secs / 86_400;
        let rest = secs % 86_400;
        match days {
            0 => {}
            1 => write!(f, "1 day, ")?,
            _ => write!(f, "{days} days, ")?,
        }
        write!(f, "{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60)
    }
}

pub fn propagated_delay(arrival: Timestamp, next_departure: Timestamp) -> DelayEstimate {
    DelayEstimate(arrival.overrun(next_departure))
}

/// Where the delayed flight's arrival time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalBasis {
    /// `arrival.estimated` as reported.
    EstimatedArrival,
    /// `departure.estimated` shifted by `departure.delay` minutes.
    DepartureOffset,
}

/// Which departure time of the next flight the arrival is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureBasis {
    Scheduled,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    pub arrival: ArrivalBasis,
    pub departure: DepartureBasis,
}

impl Propagation {
    pub const CHAIN: Propagation = Propagation {
        arrival: ArrivalBasis::EstimatedArrival,
        departure: DepartureBasis::Scheduled,
    };

    pub const SWEEP: Propagation = Propagation {
        arrival: ArrivalBasis::DepartureOffset,
        departure: DepartureBasis::Estimated,
    };

    pub fn arrival_of(&self, delayed: &FlightRecord) -> Result<Timestamp> {
        match self.arrival {
            ArrivalBasis::EstimatedArrival => delayed.time(TimeField::ArrivalEstimated),
            ArrivalBasis::DepartureOffset => {
                let departure = delayed.time(TimeField::DepartureEstimated)?;
                let delay = delayed.delay().unwrap_or(0);
                TimeDelta::try_minutes(delay)
                    .and_then(|offset| departure.checked_add(offset))
                    .context(DelayOutOfRangeSnafu {
                        flight: delayed.label(),
                        delay,
                    })
            }
        }
    }

    pub fn departure_of(&self, next: &FlightRecord) -> Result<Timestamp> {
        match self.departure {
            DepartureBasis::Scheduled => next.time(TimeField::DepartureScheduled),
            DepartureBasis::Estimated => next.time(TimeField::DepartureEstimated),
        }
    }

    pub fn estimate(&self, delayed: &FlightRecord, next: &FlightRecord) -> Result<DelayEstimate> {
        Ok(propagated_delay(
            self.arrival_of(delayed)?,
            self.departure_of(next)?,
        ))
    }
}
