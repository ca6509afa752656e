use crate::aggregate::{RawRecord, parse_timestamp, parse_value};
use crate::models::{DayCell, DayHours, HeatMapResponse, Intensity};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use std::collections::BTreeMap;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn build_heatmap(records: &[RawRecord]) -> HeatMapResponse {
    build_heatmap_at(Local::now().date_naive(), records)
}

/// Day and hour counts for the month containing `reference`. Records outside
/// that month are ignored; date-only records count toward hour 0.
pub fn build_heatmap_at(reference: NaiveDate, records: &[RawRecord]) -> HeatMapResponse {
    let year = reference.year();
    let month = reference.month();
    let day_count = days_in_month(year, month);

    let mut daily = vec![0u64; day_count as usize];
    let mut hourly: BTreeMap<u32, [u64; 24]> = BTreeMap::new();

    for record in records {
        let Some(stamp) = parse_timestamp(&record.date) else {
            continue;
        };
        if stamp.year() != year || stamp.month() != month {
            continue;
        }

        let value = record.value.as_deref().map(parse_value).unwrap_or(0);
        let day = stamp.day();
        let slot = &mut daily[(day - 1) as usize];
        *slot = slot.saturating_add(value);

        let hours = hourly.entry(day).or_insert([0; 24]);
        let hour = &mut hours[stamp.hour() as usize];
        *hour = hour.saturating_add(value);
    }

    let days = daily
        .iter()
        .enumerate()
        .map(|(index, count)| DayCell {
            day: index as u32 + 1,
            count: *count,
            level: Intensity::for_count(*count),
        })
        .collect::<Vec<_>>();

    let total = daily.iter().fold(0u64, |acc, v| acc.saturating_add(*v));

    HeatMapResponse {
        month: MONTH_NAMES[(month - 1) as usize].to_string(),
        year,
        total,
        days,
        hourly: hourly
            .into_iter()
            .map(|(day, hours)| DayHours {
                day,
                hours: hours.to_vec(),
            })
            .collect(),
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, value: &str) -> RawRecord {
        RawRecord::new(date, value)
    }

    #[test]
    fn heatmap_has_one_cell_per_day_of_month() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(build_heatmap_at(leap, &[]).days.len(), 29);

        let plain = NaiveDate::from_ymd_opt(2023, 2, 10).unwrap();
        assert_eq!(build_heatmap_at(plain, &[]).days.len(), 28);

        let december = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let heatmap = build_heatmap_at(december, &[]);
        assert_eq!(heatmap.days.len(), 31);
        assert_eq!(heatmap.month, "December");
        assert!(heatmap.hourly.is_empty());
    }

    #[test]
    fn heatmap_counts_only_reference_month() {
        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let records = vec![
            record("2024-03-01 09:15:00", "5"),
            record("2024-03-01 09:45:00", "3"),
            record("2024-03-01 17:00:00", "30"),
            record("2024-03-31", "50"),
            record("2024-04-01 09:00:00", "100"),
            record("2023-03-01 09:00:00", "100"),
            record("garbage", "100"),
        ];

        let heatmap = build_heatmap_at(reference, &records);
        assert_eq!(heatmap.year, 2024);
        assert_eq!(heatmap.total, 88);
        assert_eq!(heatmap.days[0].count, 38);
        assert_eq!(heatmap.days[0].level, Intensity::Medium);
        assert_eq!(heatmap.days[1].level, Intensity::Empty);
        assert_eq!(heatmap.days[30].count, 50);
        assert_eq!(heatmap.days[30].level, Intensity::High);

        assert_eq!(heatmap.hourly.len(), 2);
        let first = &heatmap.hourly[0];
        assert_eq!(first.day, 1);
        assert_eq!(first.hours[9], 8);
        assert_eq!(first.hours[17], 30);
        assert_eq!(heatmap.hourly[1].day, 31);
        assert_eq!(heatmap.hourly[1].hours[0], 50);
    }

    #[test]
    fn intensity_thresholds() {
        assert_eq!(Intensity::for_count(0), Intensity::Empty);
        assert_eq!(Intensity::for_count(1), Intensity::Low);
        assert_eq!(Intensity::for_count(20), Intensity::Low);
        assert_eq!(Intensity::for_count(21), Intensity::Medium);
        assert_eq!(Intensity::for_count(40), Intensity::Medium);
        assert_eq!(Intensity::for_count(41), Intensity::High);
    }
}
