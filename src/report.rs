use std::fmt::Write;

use crate::{
    data::{Departure, RouteArrivals, Time},
    table::Lookup,
};

/// Shown when the stop name could not be resolved.
pub const NO_NAME: &str = "noName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Clock times, "HH:MM".
    Absolute,
    /// Whole minutes from now, "5min".
    Relative,
}

impl From<&str> for DisplayMode {
    fn from(value: &str) -> Self {
        match value {
            "relative" => DisplayMode::Relative,
            _ => DisplayMode::Absolute,
        }
    }
}

#[derive(Debug)]
pub struct Report {
    pub station: Lookup<String>,
    pub routes: RouteArrivals,
    pub unjoined_trips: usize,
}

impl Report {
    pub fn station_name(&self) -> &str {
        match &self.station {
            Lookup::Found(name) => name,
            Lookup::Absent | Lookup::UnknownColumn(_) => NO_NAME,
        }
    }

    /// One line for the station, then one per route with at most `count`
    /// departures each.
    pub fn render(&self, count: usize, mode: DisplayMode, now: Time) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "Name:\t{}", self.station_name());
        for (route_id, departures) in self.routes.iter() {
            let _ = write!(out, "{route_id}:\t");
            for departure in departures.iter().take(count) {
                let _ = write!(out, "{}, ", Self::entry(departure, mode, now));
            }
            out.push('\n');
        }
        out
    }

    fn entry(departure: &Departure, mode: DisplayMode, now: Time) -> String {
        match mode {
            DisplayMode::Absolute => departure.clock().to_owned(),
            DisplayMode::Relative => format!("{}min", departure.minutes_after(now)),
        }
    }
}
