//! The arrival board: next trains in each direction plus current alerts.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, SubsecRound};
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info};

use crate::alerts::{RouteAlerts, get_alerts};
use crate::config::{FeedGroup, StationConfig};
use crate::feed::{Trip, fetch_trips};
use crate::fetch::FeedSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Northbound,
    Southbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalEntry {
    pub route: String,
    pub color: String,
    pub destination: String,
    /// Local wall-clock time, serialized without an offset.
    pub arrival_time: NaiveDateTime,
    pub minutes_away: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrivalBoard {
    pub northbound: Vec<ArrivalEntry>,
    pub southbound: Vec<ArrivalEntry>,
    pub alerts: RouteAlerts,
    pub updated_at: NaiveDateTime,
}

/// Whole minutes from `now` until `arrival`, never negative.
pub fn minutes_until(arrival: DateTime<Local>, now: DateTime<Local>) -> u32 {
    let minutes = (arrival - now).num_seconds().div_euclid(60);
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Local time truncated to microseconds, the precision clients expect.
pub fn board_timestamp(at: DateTime<Local>) -> NaiveDateTime {
    at.trunc_subsecs(6).naive_local()
}

/// Arrivals being accumulated for one board, before sorting.
#[derive(Debug, Default)]
pub struct Arrivals {
    pub northbound: Vec<ArrivalEntry>,
    pub southbound: Vec<ArrivalEntry>,
}

impl Arrivals {
    fn push(&mut self, direction: Direction, entry: ArrivalEntry) {
        match direction {
            Direction::Northbound => self.northbound.push(entry),
            Direction::Southbound => self.southbound.push(entry),
        }
    }

    /// Adds every future arrival at the station from `trips`.
    ///
    /// Trips on routes outside `group` and stops other than the station's
    /// platforms are ignored. Arrivals at or before `now` are dropped.
    pub fn add_trips(
        &mut self,
        trips: &[Trip],
        group: &FeedGroup,
        config: &StationConfig,
        now: DateTime<Local>,
    ) {
        for trip in trips.iter().filter(|t| group.allows(&t.route_id)) {
            let info = config.route_info(&trip.route_id);
            let destination = trip
                .destination
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("Unknown");

            for update in trip.stop_updates.iter().filter(|u| config.is_tracked_stop(&u.stop_id)) {
                let Some(arrival) = update.arrival.filter(|a| *a > now) else {
                    continue;
                };

                let direction = if config.is_northbound(&update.stop_id) {
                    Direction::Northbound
                } else {
                    Direction::Southbound
                };

                self.push(
                    direction,
                    ArrivalEntry {
                        route: info.name.clone(),
                        color: info.color.clone(),
                        destination: destination.to_string(),
                        arrival_time: arrival.naive_local(),
                        minutes_away: minutes_until(arrival, now),
                    },
                );
            }
        }
    }

    /// Sorts each direction soonest-first and keeps the first `limit`.
    pub fn finish(mut self, limit: usize) -> (Vec<ArrivalEntry>, Vec<ArrivalEntry>) {
        for list in [&mut self.northbound, &mut self.southbound] {
            list.sort_by_key(|e| e.minutes_away);
            list.truncate(limit);
        }
        (self.northbound, self.southbound)
    }
}

/// Unwraps an upstream outcome, logging failures and substituting an empty
/// result so one bad source never hides the others.
fn or_empty<T: Default>(outcome: Result<T>, source: &str) -> T {
    outcome.unwrap_or_else(|e| {
        error!(source, error = %e, "Error fetching feed");
        T::default()
    })
}

/// Builds the arrival board from the alert feed and every feed group.
///
/// All upstream requests run concurrently; each one's failure only empties
/// its own part of the board.
#[tracing::instrument(skip_all, fields(station = %config.station_name))]
pub async fn get_arrivals(source: &dyn FeedSource, config: &StationConfig) -> ArrivalBoard {
    let now = Local::now();

    let group_fetches = config
        .feed_groups
        .iter()
        .map(|group| async move { (group, fetch_trips(source, &group.url, config).await) });

    let (alerts, group_results) = tokio::join!(
        get_alerts(source, config),
        join_all(group_fetches)
    );

    let mut arrivals = Arrivals::default();
    for (group, outcome) in group_results {
        let trips = or_empty(outcome, &group.name);
        arrivals.add_trips(&trips, group, config, now);
    }

    let (northbound, southbound) = arrivals.finish(config.max_arrivals);
    info!(
        northbound = northbound.len(),
        southbound = southbound.len(),
        "Arrival board built"
    );

    ArrivalBoard {
        northbound,
        southbound,
        alerts,
        updated_at: board_timestamp(Local::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StopUpdate;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    fn trip(route_id: &str, destination: Option<&str>, stops: &[(&str, Option<i64>)]) -> Trip {
        Trip {
            route_id: route_id.to_string(),
            destination: destination.map(str::to_string),
            stop_updates: stops
                .iter()
                .map(|(stop_id, offset)| StopUpdate {
                    stop_id: stop_id.to_string(),
                    arrival: offset.map(|secs| now() + Duration::seconds(secs)),
                })
                .collect(),
        }
    }

    fn board(trips: &[Trip], group: usize) -> (Vec<ArrivalEntry>, Vec<ArrivalEntry>) {
        let config = StationConfig::prospect_park();
        let mut arrivals = Arrivals::default();
        arrivals.add_trips(trips, &config.feed_groups[group], &config, now());
        arrivals.finish(config.max_arrivals)
    }

    #[test]
    fn test_minutes_until_floors_and_clamps() {
        let now = now();
        assert_eq!(minutes_until(now + Duration::seconds(59), now), 0);
        assert_eq!(minutes_until(now + Duration::seconds(60), now), 1);
        assert_eq!(minutes_until(now + Duration::seconds(199), now), 3);
        assert_eq!(minutes_until(now - Duration::seconds(90), now), 0);
    }

    #[test]
    fn test_board_timestamp_has_microsecond_precision() {
        let at = now() + Duration::nanoseconds(123_456_789);
        let stamp = board_timestamp(at);

        assert_eq!(stamp.and_utc().timestamp_subsec_nanos(), 123_456_000);
        assert_eq!(
            serde_json::to_value(stamp).unwrap(),
            serde_json::json!("2025-03-14T08:00:00.123456")
        );
    }

    #[test]
    fn test_b_train_northbound() {
        let (north, south) = board(&[trip("B", Some("Manhattan"), &[("D26N", Some(180))])], 0);

        assert!(south.is_empty());
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].route, "B");
        assert_eq!(north[0].color, "#FF6319");
        assert_eq!(north[0].destination, "Manhattan");
        assert_eq!(north[0].minutes_away, 3);
        assert_eq!(north[0].arrival_time, (now() + Duration::minutes(3)).naive_local());
    }

    #[test]
    fn test_arrival_at_now_is_excluded() {
        let (north, south) = board(
            &[trip("Q", None, &[("D26S", Some(0)), ("D26N", Some(-30)), ("D26N", None)])],
            1,
        );
        assert!(north.is_empty());
        assert!(south.is_empty());
    }

    #[test]
    fn test_shuttle_renders_as_s() {
        let (_, south) = board(&[trip("FS", Some("Franklin Av"), &[("D26S", Some(120))])], 0);
        assert_eq!(south[0].route, "S");
        assert_eq!(south[0].color, "#808183");
    }

    #[test]
    fn test_other_stops_and_routes_are_ignored() {
        let (north, south) = board(
            &[
                trip("B", None, &[("D28N", Some(120)), ("D26N", Some(300))]),
                trip("D", None, &[("D26N", Some(60))]),
            ],
            0,
        );
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].minutes_away, 5);
        assert!(south.is_empty());
    }

    #[test]
    fn test_missing_destination_is_unknown() {
        let (north, _) = board(
            &[
                trip("B", None, &[("D26N", Some(120))]),
                trip("B", Some(""), &[("D26N", Some(240))]),
            ],
            0,
        );
        assert!(north.iter().all(|e| e.destination == "Unknown"));
    }

    #[test]
    fn test_sorted_and_truncated_per_direction() {
        let trips: Vec<Trip> = [900, 60, 480, 300, 1200, 120, 600]
            .iter()
            .map(|secs| trip("Q", Some("96 St"), &[("D26N", Some(*secs)), ("D26S", Some(*secs + 30))]))
            .collect();

        let (north, south) = board(&trips, 1);
        let minutes: Vec<u32> = north.iter().map(|e| e.minutes_away).collect();
        assert_eq!(minutes, vec![1, 2, 5, 8, 10]);
        assert_eq!(south.len(), 5);
        assert!(south.windows(2).all(|w| w[0].minutes_away <= w[1].minutes_away));
    }

    #[test]
    fn test_or_empty_on_error() {
        let trips: Vec<Trip> = or_empty(Err(anyhow::anyhow!("timeout")), "bdfm");
        assert!(trips.is_empty());
        assert_eq!(or_empty(Ok(vec![1, 2]), "nqrw"), vec![1, 2]);
    }
}
