use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const STOP_ID: &str = "stop_id";
pub const STOP_NAME: &str = "stop_name";
pub const DEPARTURE_TIME: &str = "departure_time";
pub const TRIP_ID: &str = "trip_id";
pub const ROUTE_ID: &str = "route_id";

#[derive(Deserialize, Debug)]
pub struct StopTime {
    pub trip_id: String,
    pub departure_time: String,
    pub stop_id: String,
}

impl StopTime {
    pub const COLUMNS: &'static [&'static str] = &[STOP_ID, DEPARTURE_TIME, TRIP_ID];
}

#[derive(Deserialize, Debug)]
pub struct Trip {
    pub route_id: String,
    pub trip_id: String,
}

impl Trip {
    pub const COLUMNS: &'static [&'static str] = &[TRIP_ID, ROUTE_ID];
}

/// The files of one static GTFS feed directory.
#[derive(Debug, Clone)]
pub struct Feed {
    dir: PathBuf,
}

impl Feed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stops(&self) -> PathBuf {
        self.dir.join("stops.txt")
    }

    pub fn stop_times(&self) -> PathBuf {
        self.dir.join("stop_times.txt")
    }

    pub fn trips(&self) -> PathBuf {
        self.dir.join("trips.txt")
    }
}
