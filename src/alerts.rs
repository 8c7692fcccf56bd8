//! Service alerts for the station's lines.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anyhow::Result;
use tracing::{error, info};

use crate::config::StationConfig;
use crate::fetch::FeedSource;
use crate::gtfs_rt::{Alert, FeedMessage};
use crate::parser::parse_feed;

/// Alert headers keyed by display route code.
pub type RouteAlerts = BTreeMap<String, Vec<String>>;

/// English header text of an alert, if it has one.
fn english_header(alert: &Alert) -> Option<&str> {
    alert
        .header_text
        .as_ref()?
        .translation
        .iter()
        .find(|t| t.language.as_deref() == Some("en"))
        .map(|t| t.text.as_str())
        .filter(|text| !text.is_empty())
}

/// Display codes of the tracked routes an alert informs.
fn affected_routes(alert: &Alert, config: &StationConfig) -> BTreeSet<String> {
    alert
        .informed_entity
        .iter()
        .filter_map(|informed| informed.route_id.as_deref())
        .filter(|route_id| config.alert_routes.contains(*route_id))
        .map(|route_id| config.display_code(route_id))
        .collect()
}

/// Groups the feed's alerts by tracked route.
///
/// A header is recorded once per call: once any route has claimed it, later
/// entities carrying the same text are skipped for every route.
pub fn collect_alerts(feed: &FeedMessage, config: &StationConfig) -> RouteAlerts {
    let mut alerts = config.empty_alerts();
    let mut seen_headers: HashSet<&str> = HashSet::new();

    for alert in feed.entity.iter().filter_map(|e| e.alert.as_ref()) {
        let routes = affected_routes(alert, config);
        if routes.is_empty() {
            continue;
        }

        let Some(header) = english_header(alert) else {
            continue;
        };
        if !seen_headers.insert(header) {
            continue;
        }

        for route in routes {
            alerts.entry(route).or_default().push(header.to_string());
        }
    }

    alerts
}

async fn fetch_alerts(source: &dyn FeedSource, config: &StationConfig) -> Result<RouteAlerts> {
    let bytes = source.fetch(&config.alerts_url).await?;
    let feed = parse_feed(&bytes)?;
    Ok(collect_alerts(&feed, config))
}

/// Fetches current alerts. Never fails; errors yield an empty mapping.
#[tracing::instrument(skip_all)]
pub async fn get_alerts(source: &dyn FeedSource, config: &StationConfig) -> RouteAlerts {
    match fetch_alerts(source, config).await {
        Ok(alerts) => {
            let total: usize = alerts.values().map(Vec::len).sum();
            info!(total, "Alerts collected");
            alerts
        }
        Err(e) => {
            error!(error = %e, "Error fetching alerts");
            config.empty_alerts()
        }
    }
}
