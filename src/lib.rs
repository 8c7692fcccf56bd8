pub mod alerts;
pub mod arrivals;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod parser;
pub mod server;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
