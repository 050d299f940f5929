use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, data::Time, report::DisplayMode};

mod config;
mod data;
mod error;
mod gtfs;
mod query;
mod report;
mod table;
#[cfg(test)]
mod test_util;

/// Next departures per route at one GTFS stop.
#[derive(Parser, Debug)]
struct Args {
    /// stop_id to look up.
    stop_id: Option<String>,

    /// Maximum departures to show per route.
    count: Option<usize>,

    /// `relative` for minutes from now, anything else for clock times.
    mode: Option<String>,

    /// Directory holding stops.txt, stop_times.txt and trips.txt.
    #[arg(long, env = "GTFS_DIR", default_value = config::DEFAULT_GTFS_DIR)]
    gtfs_dir: PathBuf,

    /// Only show departures up to this long after now.
    #[arg(long, default_value = "02:00:00")]
    horizon: Time,

    /// Service time to query from; defaults to the local clock.
    #[arg(long)]
    now: Option<Time>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let (Some(stop_id), Some(count), Some(mode)) = (args.stop_id, args.count, args.mode) else {
        println!("Insufficient arguments");
        return ExitCode::from(2);
    };

    let now = args.now.unwrap_or_else(Time::now_local);
    let config = Config::new(args.gtfs_dir, args.horizon);

    let report = query::run(&config, &stop_id, now);
    print!("{}", report.render(count, DisplayMode::from(mode.as_str()), now));

    ExitCode::SUCCESS
}
