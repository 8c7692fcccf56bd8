//! Static station definition.
//!
//! Everything the aggregator needs to know about the station lives in a
//! [`StationConfig`] built once at startup and shared read-only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

/// Base URL for MTA GTFS-RT feeds.
pub const MTA_FEED_BASE_URL: &str = "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds";

/// Color used for routes missing from the display table.
pub const FALLBACK_COLOR: &str = "#999";

/// Parent stop ids and names of every station served by the B, Q and
/// Franklin Avenue Shuttle, including Broadway local stops Q trains use when
/// rerouted.
pub const STATION_NAMES: &[(&str, &str)] = &[
    // Concourse
    ("D03", "Bedford Park Blvd"),
    ("D04", "Kingsbridge Rd"),
    ("D05", "Fordham Rd"),
    ("D06", "182-183 Sts"),
    ("D07", "Tremont Av"),
    ("D08", "174-175 Sts"),
    ("D09", "170 St"),
    ("D10", "167 St"),
    ("D11", "161 St-Yankee Stadium"),
    ("D12", "155 St"),
    ("D13", "145 St"),
    // 8 Av / Central Park West
    ("A14", "135 St"),
    ("A15", "125 St"),
    ("A16", "116 St"),
    ("A17", "Cathedral Pkwy (110 St)"),
    ("A18", "103 St"),
    ("A19", "96 St"),
    ("A20", "86 St"),
    ("A21", "81 St-Museum of Natural History"),
    ("A22", "72 St"),
    ("A24", "59 St-Columbus Circle"),
    // 6 Av
    ("D14", "7 Av"),
    ("D15", "47-50 Sts-Rockefeller Ctr"),
    ("D16", "42 St-Bryant Pk"),
    ("D17", "34 St-Herald Sq"),
    ("D19", "14 St"),
    ("D20", "W 4 St-Wash Sq"),
    ("D21", "Broadway-Lafayette St"),
    ("D22", "Grand St"),
    // 2 Av
    ("Q05", "96 St"),
    ("Q04", "86 St"),
    ("Q03", "72 St"),
    ("B08", "Lexington Av/63 St"),
    // Broadway
    ("R14", "57 St-7 Av"),
    ("R15", "49 St"),
    ("R16", "Times Sq-42 St"),
    ("R17", "34 St-Herald Sq"),
    ("R18", "28 St"),
    ("R19", "23 St"),
    ("R20", "14 St-Union Sq"),
    ("R21", "8 St-NYU"),
    ("R22", "Prince St"),
    ("R23", "Canal St"),
    ("Q01", "Canal St"),
    ("R30", "DeKalb Av"),
    // Brighton
    ("D24", "Atlantic Av-Barclays Ctr"),
    ("D25", "7 Av"),
    ("D26", "Prospect Park"),
    ("D27", "Parkside Av"),
    ("D28", "Church Av"),
    ("D29", "Beverley Rd"),
    ("D30", "Cortelyou Rd"),
    ("D31", "Newkirk Plaza"),
    ("D32", "Avenue H"),
    ("D33", "Avenue J"),
    ("D34", "Avenue M"),
    ("D35", "Kings Hwy"),
    ("D37", "Avenue U"),
    ("D38", "Neck Rd"),
    ("D39", "Sheepshead Bay"),
    ("D40", "Brighton Beach"),
    ("D41", "Ocean Pkwy"),
    ("D42", "W 8 St-NY Aquarium"),
    ("D43", "Coney Island-Stillwell Av"),
    // Franklin Av shuttle
    ("S01", "Franklin Av"),
    ("S03", "Park Pl"),
    ("S04", "Botanic Garden"),
];

/// Display name and color of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: String,
    pub color: String,
}

impl RouteInfo {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// One upstream GTFS-RT endpoint and the routes read from it.
#[derive(Debug, Clone)]
pub struct FeedGroup {
    pub name: String,
    pub url: String,
    pub routes: HashSet<String>,
}

impl FeedGroup {
    pub fn new(name: &str, url: String, routes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            url,
            routes: routes.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn allows(&self, route_id: &str) -> bool {
        self.routes.contains(route_id)
    }
}

#[derive(Debug, Clone)]
pub struct StationConfig {
    pub station_name: String,
    /// Platform stop ids, one per direction.
    pub stop_ids: Vec<String>,
    /// Trailing stop id character marking the northbound platform.
    pub north_suffix: char,
    /// Lines advertised by the health endpoint, in display order.
    pub lines: Vec<String>,
    pub routes: HashMap<String, RouteInfo>,
    /// Upstream route ids whose alerts are collected.
    pub alert_routes: HashSet<String>,
    pub alerts_url: String,
    pub feed_groups: Vec<FeedGroup>,
    /// Station names keyed by parent stop id, used to label trip destinations.
    pub stop_names: HashMap<String, String>,
    pub request_timeout: Duration,
    pub max_arrivals: usize,
}

impl StationConfig {
    /// Prospect Park (B, Q and the Franklin Avenue Shuttle).
    pub fn prospect_park() -> Self {
        let routes = HashMap::from([
            ("B".to_string(), RouteInfo::new("B", "#FF6319")),
            ("Q".to_string(), RouteInfo::new("Q", "#FCCC0A")),
            // Franklin Avenue Shuttle is signed as "S"
            ("FS".to_string(), RouteInfo::new("S", "#808183")),
        ]);

        let stop_names = STATION_NAMES
            .iter()
            .copied()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();

        Self {
            station_name: "Prospect Park".to_string(),
            stop_ids: vec!["D26N".to_string(), "D26S".to_string()],
            north_suffix: 'N',
            lines: vec!["B".to_string(), "Q".to_string(), "S".to_string()],
            routes,
            alert_routes: ["B", "Q", "FS", "S"].iter().map(|r| r.to_string()).collect(),
            alerts_url: format!("{MTA_FEED_BASE_URL}/camsys%2Fsubway-alerts"),
            feed_groups: vec![
                FeedGroup::new("bdfm", format!("{MTA_FEED_BASE_URL}/nyct%2Fgtfs-bdfm"), &["B", "FS"]),
                FeedGroup::new("nqrw", format!("{MTA_FEED_BASE_URL}/nyct%2Fgtfs-nqrw"), &["Q"]),
            ],
            stop_names,
            request_timeout: Duration::from_secs(10),
            max_arrivals: 5,
        }
    }

    /// Display info for `route_id`, falling back to the raw id in gray.
    pub fn route_info(&self, route_id: &str) -> RouteInfo {
        self.routes
            .get(route_id)
            .cloned()
            .unwrap_or_else(|| RouteInfo::new(route_id, FALLBACK_COLOR))
    }

    /// Public-facing route code ("FS" becomes "S").
    pub fn display_code(&self, route_id: &str) -> String {
        self.routes
            .get(route_id)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| route_id.to_string())
    }

    pub fn is_tracked_stop(&self, stop_id: &str) -> bool {
        self.stop_ids.iter().any(|s| s == stop_id)
    }

    pub fn is_northbound(&self, stop_id: &str) -> bool {
        stop_id.ends_with(self.north_suffix)
    }

    /// Station name for a platform stop id such as `D40S`.
    pub fn stop_name(&self, stop_id: &str) -> Option<&str> {
        let parent = stop_id
            .strip_suffix(['N', 'S'])
            .unwrap_or(stop_id);
        self.stop_names.get(parent).map(String::as_str)
    }

    /// An empty alerts mapping with one key per advertised line.
    pub fn empty_alerts(&self) -> BTreeMap<String, Vec<String>> {
        self.lines.iter().map(|l| (l.clone(), Vec::new())).collect()
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::prospect_park()
    }
}
