use crate::aggregate::Granularity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub granularity: Option<String>,
    pub date_column: Option<String>,
    pub value_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeatMapQuery {
    pub reference: Option<String>,
    pub date_column: Option<String>,
    pub value_column: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub dataset: String,
    pub granularity: Granularity,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub skipped_rows: usize,
}

/// Cell shading bucket for heat-map counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Empty,
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn for_count(count: u64) -> Self {
        match count {
            0 => Intensity::Empty,
            1..=20 => Intensity::Low,
            21..=40 => Intensity::Medium,
            _ => Intensity::High,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub count: u64,
    pub level: Intensity,
}

#[derive(Debug, Serialize)]
pub struct DayHours {
    pub day: u32,
    pub hours: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct HeatMapResponse {
    pub month: String,
    pub year: i32,
    pub total: u64,
    pub days: Vec<DayCell>,
    pub hourly: Vec<DayHours>,
}
