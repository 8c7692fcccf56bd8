//! CLI entry point for the Prospect Park subway times service.
//!
//! `serve` runs the HTTP API; `snapshot` and `alerts` build one board (or
//! just its alerts) and print it as JSON.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use subway_times::{
    alerts::get_alerts,
    arrivals::get_arrivals,
    config::StationConfig,
    fetch::BasicClient,
    server::{self, AppState},
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_times")]
#[command(about = "Real-time subway arrivals for Prospect Park", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the arrivals API over HTTP
    Serve {
        #[arg(short, long, default_value = "0.0.0.0")]
        address: String,

        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Build the arrival board once and print it as JSON
    Snapshot,
    /// Fetch current service alerts and print them as JSON
    Alerts,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_times.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_times.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = StationConfig::prospect_park();
    let client = BasicClient::new(config.request_timeout)?;

    match cli.command {
        Commands::Serve { address, port } => {
            let state = web::Data::new(AppState::new(config, Arc::new(client)));
            info!(%address, port, station = %state.config.station_name, "Starting server");

            HttpServer::new(move || {
                App::new()
                    .wrap(Cors::permissive())
                    .app_data(state.clone())
                    .configure(server::config)
            })
            .bind((address, port))?
            .run()
            .await?;
        }
        Commands::Snapshot => {
            let board = get_arrivals(&client, &config).await;
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        Commands::Alerts => {
            let alerts = get_alerts(&client, &config).await;
            println!("{}", serde_json::to_string_pretty(&alerts)?);
        }
    }

    Ok(())
}
