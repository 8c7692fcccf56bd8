//! Trip-level view of an NYCT subway feed.
//!
//! Raw `TripUpdate` entities are reduced to the handful of fields the
//! arrival board reads: route, destination and per-stop arrival times.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use tracing::{debug, info};

use crate::config::StationConfig;
use crate::fetch::FeedSource;
use crate::gtfs_rt::FeedMessage;
use crate::parser::parse_feed;

#[derive(Debug, Clone, PartialEq)]
pub struct StopUpdate {
    pub stop_id: String,
    pub arrival: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub route_id: String,
    pub destination: Option<String>,
    pub stop_updates: Vec<StopUpdate>,
}

/// Builds [`Trip`]s from every trip-update entity in `feed`.
///
/// Entities without a route id are dropped. The destination is the station
/// name of the last stop the trip reports.
pub fn trips_from_feed(feed: &FeedMessage, config: &StationConfig) -> Vec<Trip> {
    let mut trips = Vec::new();

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            continue;
        };
        let Some(route_id) = trip_update.trip.route_id.clone() else {
            continue;
        };

        let stop_updates: Vec<StopUpdate> = trip_update
            .stop_time_update
            .iter()
            .filter_map(|stu| {
                let stop_id = stu.stop_id.clone()?;
                let arrival = stu
                    .arrival
                    .as_ref()
                    .and_then(|event| event.time)
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
                    .map(|t| t.with_timezone(&Local));
                Some(StopUpdate { stop_id, arrival })
            })
            .collect();

        let destination = stop_updates
            .last()
            .and_then(|last| config.stop_name(&last.stop_id))
            .map(str::to_string);

        trips.push(Trip {
            route_id,
            destination,
            stop_updates,
        });
    }

    trips
}

/// Fetches and decodes the feed at `url` into trips.
#[tracing::instrument(skip(source, config))]
pub async fn fetch_trips(source: &dyn FeedSource, url: &str, config: &StationConfig) -> Result<Vec<Trip>> {
    let bytes = source.fetch(url).await?;
    let feed = parse_feed(&bytes)?;
    let trips = trips_from_feed(&feed, config);

    debug!(entities = feed.entity.len(), "Feed decoded");
    info!(trips = trips.len(), "Trips decoded");
    Ok(trips)
}
