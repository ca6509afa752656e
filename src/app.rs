use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/datasets", get(handlers::get_datasets))
        .route("/api/series/:dataset", get(handlers::get_series))
        .route("/api/heatmap/:dataset", get(handlers::get_heatmap))
        .with_state(state)
}
