use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{Local, Timelike};

use crate::error::TimeError;

/// Seconds since midnight of the service day.
///
/// GTFS writes post-midnight service of the same day with hours >= 24, so the
/// hour is never wrapped modulo 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(u32);

impl Time {
    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn parse(value: &str) -> Result<Self, TimeError> {
        let malformed = || TimeError::Malformed(value.to_owned());

        let mut parts = value.trim().split(':').map(|part| part.parse::<u32>());
        let (Some(Ok(hours)), Some(Ok(minutes)), Some(Ok(seconds)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        if minutes > 59 || seconds > 59 {
            return Err(malformed());
        }

        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(malformed)
    }

    /// The local wall clock, captured once per query.
    pub fn now_local() -> Self {
        Self(Local::now().time().num_seconds_from_midnight())
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Whole minutes since midnight, truncated.
    pub fn minutes(self) -> u32 {
        self.0 / 60
    }

    /// Seconds from `self` until `later`, or `None` if `later` is earlier.
    pub fn until(self, later: Time) -> Option<u32> {
        later.0.checked_sub(self.0)
    }
}

impl FromStr for Time {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            self.0 % 3600 / 60,
            self.0 % 60
        )
    }
}

/// A departure time as written in stop_times.txt, next to its parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub raw: String,
    pub time: Time,
}

impl Departure {
    pub fn parse(raw: String) -> Result<Self, TimeError> {
        let time = Time::parse(&raw)?;
        Ok(Self { raw, time })
    }

    /// The "HH:MM" prefix of the raw string.
    pub fn clock(&self) -> &str {
        match self.raw.char_indices().nth(5) {
            Some((end, _)) => &self.raw[..end],
            None => &self.raw,
        }
    }

    /// Whole minutes from `now` until this departure; negative if already gone.
    pub fn minutes_after(&self, now: Time) -> i64 {
        i64::from(self.time.minutes()) - i64::from(now.minutes())
    }
}

/// Trip id -> departures at the queried stop, in scan order.
pub type ArrivalMap = HashMap<String, Vec<Departure>>;

/// Route id -> departures, keeping the order in which routes were first seen.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteArrivals {
    routes: Vec<(String, Vec<Departure>)>,
    index: HashMap<String, usize>,
}

impl RouteArrivals {
    pub fn extend(&mut self, route_id: &str, departures: &[Departure]) {
        let position = match self.index.get(route_id) {
            Some(&position) => position,
            None => {
                self.routes.push((route_id.to_owned(), Vec::new()));
                self.index.insert(route_id.to_owned(), self.routes.len() - 1);
                self.routes.len() - 1
            }
        };
        self.routes[position].1.extend_from_slice(departures);
    }

    /// Stable sort of every route's departures by service time.
    pub fn sort(&mut self) {
        for (_, departures) in self.routes.iter_mut() {
            departures.sort_by_key(|departure| departure.time);
        }
    }

    #[cfg(test)]
    pub fn get(&self, route_id: &str) -> Option<&[Departure]> {
        self.index
            .get(route_id)
            .map(|&position| self.routes[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Departure])> {
        self.routes
            .iter()
            .map(|(route_id, departures)| (route_id.as_str(), departures.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
