use crate::aggregate::{Granularity, RawRecord, aggregate_with_skipped, parse_date};
use crate::errors::AppError;
use crate::heatmap::{build_heatmap, build_heatmap_at};
use crate::models::{
    DatasetsResponse, HeatMapQuery, HeatMapResponse, SeriesQuery, SeriesResponse,
};
use crate::source::{dataset_path, list_datasets, load_table, project};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let datasets = match list_datasets(&state.config.data_dir).await {
        Ok(datasets) => datasets,
        Err(err) => {
            error!("failed to list datasets: {err}");
            Vec::new()
        }
    };
    Html(render_index(&datasets))
}

pub async fn get_datasets(State(state): State<AppState>) -> Result<Json<DatasetsResponse>, AppError> {
    let datasets = list_datasets(&state.config.data_dir).await?;
    Ok(Json(DatasetsResponse { datasets }))
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    let granularity = query
        .granularity
        .as_deref()
        .unwrap_or("daily")
        .parse::<Granularity>()?;

    let records = load_records(
        &state,
        &dataset,
        query.date_column.as_deref(),
        query.value_column.as_deref(),
    )
    .await?;

    let (series, skipped_rows) = aggregate_with_skipped(&records, granularity);
    info!(
        dataset = %dataset,
        %granularity,
        rows = records.len(),
        buckets = series.len(),
        skipped_rows,
        "aggregated series"
    );

    Ok(Json(SeriesResponse {
        dataset,
        granularity,
        labels: series.labels,
        values: series.values,
        skipped_rows,
    }))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Query(query): Query<HeatMapQuery>,
) -> Result<Json<HeatMapResponse>, AppError> {
    let reference = match query.reference.as_deref() {
        Some(text) => Some(
            parse_date(text)
                .ok_or_else(|| AppError::bad_request(format!("invalid reference date '{text}'")))?,
        ),
        None => None,
    };

    let records = load_records(
        &state,
        &dataset,
        query.date_column.as_deref(),
        query.value_column.as_deref(),
    )
    .await?;

    let heatmap = match reference {
        Some(reference) => build_heatmap_at(reference, &records),
        None => build_heatmap(&records),
    };
    info!(
        dataset = %dataset,
        month = %heatmap.month,
        year = heatmap.year,
        total = heatmap.total,
        "built heat map"
    );

    Ok(Json(heatmap))
}

async fn load_records(
    state: &AppState,
    dataset: &str,
    date_column: Option<&str>,
    value_column: Option<&str>,
) -> Result<Vec<RawRecord>, AppError> {
    let config = &state.config;
    let path = dataset_path(&config.data_dir, dataset)?;
    let table = load_table(&path).await?;
    let records = project(
        &table,
        date_column.unwrap_or(&config.date_column),
        value_column.unwrap_or(&config.value_column),
    )?;
    Ok(records)
}
