use crate::api::{FlightQuery, FlightsApi};
use crate::correlate::{LookupKey, NextFlightLookup, Pick, next_flight};
use crate::delay::{DelayEstimate, Propagation, Threshold, filter_delayed};
use crate::error::Result;
use crate::flight::{FlightRecord, FlightStatus, TimeField};
use colored::Colorize;
use std::fmt;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};
use tracing::{info, warn};

/// How many candidates to request for a next-flight lookup and which one to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPlan {
    pub pick: Pick,
    pub limit: u32,
}

impl LookupPlan {
    pub fn earliest(limit: u32) -> Self {
        LookupPlan {
            pick: Pick::Earliest,
            limit,
        }
    }

    /// Lookups by flight number return the delayed leg first, so the second result is taken.
    pub fn chain_api_order() -> Self {
        LookupPlan {
            pick: Pick::ApiOrder(1),
            limit: 2,
        }
    }

    pub fn sweep_api_order() -> Self {
        LookupPlan {
            pick: Pick::ApiOrder(0),
            limit: 1,
        }
    }

    fn lookup(&self, key: LookupKey, status: Option<FlightStatus>) -> NextFlightLookup {
        NextFlightLookup {
            key,
            status,
            limit: self.limit,
            pick: self.pick,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainOptions {
    pub limit: u32,
    pub lookup: LookupPlan,
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub limit: u32,
    pub min_delay: i64,
    pub lookup: LookupPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainReport {
    NoDelayedFlights,
    NoNextFlight {
        delayed: Vec<FlightRecord>,
    },
    Correlated {
        delayed: Vec<FlightRecord>,
        next: FlightRecord,
        estimate: DelayEstimate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SweepReport {
    NoFlightData,
    Summary(SweepSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub total: usize,
    pub delayed: usize,
    pub threshold: Threshold,
    /// First record of the listing, verbatim.
    pub example: serde_json::Value,
    pub significant: Vec<SweepLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepLine {
    pub flight: FlightRecord,
    pub outcome: SweepOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Suggested { next: String, estimate: DelayEstimate },
    NoDelay { next: String },
    NoNextFlight { aircraft: String },
    /// Missing aircraft or estimated departure, nothing to correlate on.
    Uncorrelated,
}

/// Follows the first delayed active flight onto the next flight with the same number.
pub async fn chain(api: &FlightsApi, opts: &ChainOptions) -> Result<ChainReport> {
    let flights = api
        .flights(&FlightQuery {
            flight_status: Some(FlightStatus::Active),
            limit: Some(opts.limit),
            ..Default::default()
        })
        .await;

    let delayed: Vec<FlightRecord> = filter_delayed(&flights, Threshold::Exceeds(0))
        .into_iter()
        .cloned()
        .collect();

    let Some(first) = delayed.first() else {
        info!(fetched = flights.len(), "no delayed flights");
        return Ok(ChainReport::NoDelayedFlights);
    };
    info!(count = delayed.len(), flight = first.label(), "found delayed flights");

    let Some(iata) = first.iata() else {
        warn!(flight = first.label(), "delayed flight has no IATA number to look up");
        return Ok(ChainReport::NoNextFlight { delayed });
    };

    let lookup = opts
        .lookup
        .lookup(LookupKey::FlightIata(iata.to_string()), None);
    let Some(next) = next_flight(api, first, &lookup).await? else {
        return Ok(ChainReport::NoNextFlight { delayed });
    };

    let estimate = Propagation::CHAIN.estimate(first, &next)?;
    Ok(ChainReport::Correlated {
        delayed,
        next,
        estimate,
    })
}

/// Summarises delays and suggests knock-on delays for every significantly delayed flight.
pub async fn sweep(api: &FlightsApi, opts: &SweepOptions) -> Result<SweepReport> {
    let listing = api
        .listing(&FlightQuery {
            limit: Some(opts.limit),
            ..Default::default()
        })
        .await;
    let flights = &listing.flights;

    let Some(example) = listing.raw.first().cloned() else {
        return Ok(SweepReport::NoFlightData);
    };

    let threshold = Threshold::AtLeast(opts.min_delay);
    let delayed = filter_delayed(flights, Threshold::Exceeds(0)).len();
    info!(total = flights.len(), delayed, "fetched flights");

    let mut significant = vec![];
    for flight in filter_delayed(flights, threshold) {
        let outcome = match (
            flight.aircraft_icao(),
            flight.raw_time(TimeField::DepartureEstimated),
            flight.delay(),
        ) {
            (Some(aircraft), Some(_), Some(delay)) if delay != 0 => {
                correlate(api, flight, aircraft, &opts.lookup).await?
            }
            _ => SweepOutcome::Uncorrelated,
        };
        significant.push(SweepLine {
            flight: flight.clone(),
            outcome,
        });
    }

    Ok(SweepReport::Summary(SweepSummary {
        total: flights.len(),
        delayed,
        threshold,
        example,
        significant,
    }))
}

async fn correlate(
    api: &FlightsApi,
    flight: &FlightRecord,
    aircraft: &str,
    plan: &LookupPlan,
) -> Result<SweepOutcome> {
    let lookup = plan.lookup(
        LookupKey::AircraftIcao(aircraft.to_string()),
        Some(FlightStatus::Scheduled),
    );

    let Some(next) = next_flight(api, flight, &lookup).await? else {
        return Ok(SweepOutcome::NoNextFlight {
            aircraft: aircraft.to_string(),
        });
    };

    let estimate = Propagation::SWEEP.estimate(flight, &next)?;
    let next = next.label().to_string();
    Ok(if estimate.is_zero() {
        SweepOutcome::NoDelay { next }
    } else {
        SweepOutcome::Suggested { next, estimate }
    })
}

#[derive(Tabled)]
struct DelayedRow {
    #[tabled(rename = "Flight")]
    flight: String,
    #[tabled(rename = "Delay")]
    delay: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Aircraft")]
    aircraft: String,
}

impl From<&FlightRecord> for DelayedRow {
    fn from(f: &FlightRecord) -> Self {
        let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
        DelayedRow {
            flight: f.label().to_string(),
            delay: f
                .delay()
                .map(|d| format!("{d} min").yellow().to_string())
                .unwrap_or_else(|| "-".into()),
            from: or_dash(f.departure.airport.as_deref()),
            to: or_dash(f.arrival.airport.as_deref()),
            aircraft: or_dash(f.aircraft_icao()),
        }
    }
}

fn delayed_table<'a>(flights: impl IntoIterator<Item = &'a FlightRecord>) -> Table {
    let mut table = Table::new(flights.into_iter().map(DelayedRow::from));
    table.with(Style::rounded());
    table.with(Alignment::left());
    table
}

impl fmt::Display for ChainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainReport::NoDelayedFlights => writeln!(f, "No delayed flights found."),
            ChainReport::NoNextFlight { delayed } => {
                writeln!(f, "{}", delayed_table(delayed))?;
                writeln!(f, "No next flight found for this aircraft.")
            }
            ChainReport::Correlated {
                delayed,
                next,
                estimate,
            } => {
                writeln!(f, "{}", delayed_table(delayed))?;
                writeln!(f, "Next flight: {}", next.label().bold())?;
                if estimate.is_zero() {
                    writeln!(f, "{}", "No potential delay for the next flight.".green())
                } else {
                    writeln!(
                        f,
                        "Potential delay for next flight: {}",
                        estimate.to_string().red().bold()
                    )
                }
            }
        }
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepReport::NoFlightData => writeln!(f, "No flight data retrieved."),
            SweepReport::Summary(summary) => write!(f, "{summary}"),
        }
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total flights fetched: {}", self.total)?;
        writeln!(f, "Flights with any delay: {}", self.delayed)?;
        writeln!(
            f,
            "Flights delayed by {}: {}",
            self.threshold,
            self.significant.len()
        )?;

        let example = serde_json::to_string_pretty(&self.example).map_err(|_| fmt::Error)?;
        writeln!(f, "\nExample of a flight record:\n{example}")?;

        if self.significant.is_empty() {
            return writeln!(
                f,
                "\nNo flights delayed by {} found in this dataset.",
                self.threshold
            );
        }

        writeln!(f, "\nFlights delayed by {}:", self.threshold)?;
        writeln!(f, "{}", delayed_table(self.significant.iter().map(|l| &l.flight)))?;
        for line in &self.significant {
            write!(f, "{}: ", line.flight.label())?;
            match &line.outcome {
                SweepOutcome::Suggested { next, estimate } => writeln!(
                    f,
                    "Suggested delay for next flight {next}: {}",
                    estimate.to_string().red().bold()
                )?,
                SweepOutcome::NoDelay { next } => {
                    writeln!(f, "{}", format!("No delay for next flight {next}").green())?
                }
                SweepOutcome::NoNextFlight { aircraft } => {
                    writeln!(f, "No next flight found for aircraft {aircraft}")?
                }
                SweepOutcome::Uncorrelated => {
                    writeln!(f, "No aircraft or estimated departure to correlate")?
                }
            }
        }
        Ok(())
    }
}
