use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    data::*,
    error::TableError,
    gtfs::{self, StopTime, Trip},
    report::Report,
    table::{Lookup, Table},
};

/// Name of the first stop in `stops` whose id is `stop_id`.
pub fn resolve_stop_name(stops: &mut Table, stop_id: &str) -> Lookup<String> {
    if let Some(column) = [gtfs::STOP_ID, gtfs::STOP_NAME]
        .into_iter()
        .find(|column| stops.columns().get(column).is_none())
    {
        return Lookup::UnknownColumn(column.to_owned());
    }

    while let Some(row) = stops.next_row() {
        if stops.cell(&row, gtfs::STOP_ID) == Lookup::Found(stop_id) {
            return stops.cell(&row, gtfs::STOP_NAME).map(str::to_owned);
        }
    }

    Lookup::Absent
}

/// Departures at `stop_id` no earlier than `now` and at most `horizon` after
/// it, grouped by trip in table order.
///
/// Times are compared as raw service-day seconds. A post-midnight departure
/// written as 25:10:00 is never matched against a "now" of 01:00:00.
pub fn scan_arrivals(
    stop_times: &mut Table,
    stop_id: &str,
    now: Time,
    horizon: Time,
) -> Result<ArrivalMap, TableError> {
    stop_times.require(StopTime::COLUMNS)?;

    let arrivals = stop_times
        .records::<StopTime>()
        .filter(|stop_time| stop_time.stop_id == stop_id)
        .filter_map(
            |stop_time| match Departure::parse(stop_time.departure_time) {
                Ok(departure) => Some((stop_time.trip_id, departure)),
                Err(err) => {
                    warn!(trip_id = %stop_time.trip_id, %err, "skipping stop time");
                    None
                }
            },
        )
        .filter(|(_, departure)| {
            now.until(departure.time)
                .is_some_and(|wait| wait <= horizon.seconds())
        })
        .into_group_map();

    debug!(
        trips = arrivals.len(),
        skipped_rows = stop_times.skipped_rows(),
        "scanned stop times"
    );
    Ok(arrivals)
}

#[derive(Debug, Default)]
pub struct RouteJoin {
    pub routes: RouteArrivals,
    /// Trips with arrivals that never showed up in trips.txt.
    pub unjoined_trips: usize,
}

/// Moves every trip's departures onto its route, then sorts each route.
pub fn join_by_route(arrivals: &ArrivalMap, trips: &mut Table) -> Result<RouteJoin, TableError> {
    trips.require(Trip::COLUMNS)?;

    let mut routes = RouteArrivals::default();
    let mut joined = HashSet::new();
    for trip in trips.records::<Trip>() {
        if let Some(departures) = arrivals.get(&trip.trip_id) {
            routes.extend(&trip.route_id, departures);
            joined.insert(trip.trip_id);
        }
    }
    routes.sort();
    debug!(
        routes = routes.len(),
        skipped_rows = trips.skipped_rows(),
        "scanned trips"
    );

    let unjoined_trips = arrivals
        .keys()
        .filter(|trip_id| !joined.contains(*trip_id))
        .count();

    Ok(RouteJoin {
        routes,
        unjoined_trips,
    })
}

/// Runs every stage against the feed in `config`.
///
/// Each table is opened, scanned and closed before the next one. A stage that
/// fails is logged and contributes an empty result.
pub fn run(config: &Config, stop_id: &str, now: Time) -> Report {
    let feed = config.feed();
    info!(feed = %feed.dir().display(), stop_id, %now, "looking up arrivals");

    let station = match Table::open(feed.stops()) {
        Ok(mut stops) => resolve_stop_name(&mut stops, stop_id),
        Err(err) => {
            error!(error = ?err, "unable to resolve stop name");
            Lookup::Absent
        }
    };
    debug!(?station, "resolved stop name");

    let arrivals = Table::open(feed.stop_times())
        .and_then(|mut stop_times| scan_arrivals(&mut stop_times, stop_id, now, config.horizon))
        .unwrap_or_else(|err| {
            error!(error = ?err, "unable to scan arrivals");
            ArrivalMap::new()
        });

    let RouteJoin {
        routes,
        unjoined_trips,
    } = Table::open(feed.trips())
        .and_then(|mut trips| join_by_route(&arrivals, &mut trips))
        .unwrap_or_else(|err| {
            error!(error = ?err, "unable to join arrivals to routes");
            RouteJoin::default()
        });
    if routes.is_empty() {
        info!(stop_id, "no upcoming arrivals");
    }

    let report = Report {
        station,
        routes,
        unjoined_trips,
    };
    if report.unjoined_trips > 0 {
        warn!(
            unjoined_trips = report.unjoined_trips,
            "trips with arrivals are missing from trips.txt"
        );
    }
    report
}
