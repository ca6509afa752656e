pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod heatmap;
pub mod models;
pub mod source;
pub mod state;
pub mod ui;

pub use aggregate::{AggregatedSeries, Granularity, RawRecord, aggregate, aggregate_named};
pub use app::router;
pub use config::Config;
pub use state::AppState;
