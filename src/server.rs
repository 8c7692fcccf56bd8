//! HTTP surface: a health check and the arrival board.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;

use crate::arrivals::get_arrivals;
use crate::config::StationConfig;
use crate::fetch::FeedSource;

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub config: StationConfig,
    pub source: Arc<dyn FeedSource>,
}

impl AppState {
    pub fn new(config: StationConfig, source: Arc<dyn FeedSource>) -> Self {
        Self { config, source }
    }
}

#[derive(Debug, Serialize)]
pub struct Health<'a> {
    pub status: &'static str,
    pub station: &'a str,
    pub lines: &'a [String],
}

#[actix_web::get("/")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(Health {
        status: "ok",
        station: &state.config.station_name,
        lines: &state.config.lines,
    })
}

#[actix_web::get("/arrivals")]
pub async fn arrivals(state: web::Data<AppState>) -> impl Responder {
    let board = get_arrivals(state.source.as_ref(), &state.config).await;
    HttpResponse::Ok().json(board)
}

/// Registers the service's routes on an actix app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(arrivals);
}
