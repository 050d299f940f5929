//! Query configuration.

use std::path::PathBuf;

use crate::{data::Time, gtfs::Feed};

/// How far ahead of "now" departures still count as upcoming.
pub const DEFAULT_HORIZON: Time = Time::from_hms(2, 0, 0);

/// Directory the feed is read from when none is given.
pub const DEFAULT_GTFS_DIR: &str = "gtfs";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding stops.txt, stop_times.txt and trips.txt.
    pub gtfs_dir: PathBuf,

    /// Departures more than this far after "now" are ignored.
    pub horizon: Time,
}

impl Config {
    pub fn new(gtfs_dir: impl Into<PathBuf>, horizon: Time) -> Self {
        Self {
            gtfs_dir: gtfs_dir.into(),
            horizon,
        }
    }

    pub fn feed(&self) -> Feed {
        Feed::new(&self.gtfs_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GTFS_DIR, DEFAULT_HORIZON)
    }
}
