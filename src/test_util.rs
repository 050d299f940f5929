use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

pub const STOPS: &str = "stop_id,stop_name\nS0,Depot\nS1,Main St\n";

pub const STOP_TIMES: &str = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T2,08:10:00,08:10:00,S1,1
T1,08:05:00,08:05:00,S1,1
T1,08:20:00,08:20:00,S0,2
";

pub const TRIPS: &str = "route_id,service_id,trip_id\nR1,WK,T1\nR1,WK,T2\n";

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A feed directory holding the three tables.
pub fn feed(stops: &str, stop_times: &str, trips: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "stops.txt", stops);
    write_file(dir.path(), "stop_times.txt", stop_times);
    write_file(dir.path(), "trips.txt", trips);
    dir
}
