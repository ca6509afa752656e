use crate::aggregate::RawRecord;
use crate::errors::SourceError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub type CsvRow = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

pub fn is_valid_dataset_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn dataset_path(data_dir: &Path, name: &str) -> Result<PathBuf, SourceError> {
    if !is_valid_dataset_name(name) {
        return Err(SourceError::InvalidDatasetName(name.to_string()));
    }

    Ok(data_dir.join(format!("{name}.csv")))
}

pub async fn load_table(path: &Path) -> Result<CsvTable, SourceError> {
    match fs::read(path).await {
        Ok(bytes) => parse_table(&bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
            Err(SourceError::DatasetNotFound(name))
        }
        Err(err) => Err(SourceError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

pub fn parse_table(bytes: &[u8]) -> Result<CsvTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|header| String::from_utf8_lossy(header).into_owned())
        .collect();

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        // rows like ",,"
        if record.iter().all(<[u8]>::is_empty) {
            continue;
        }
        // invalid UTF-8 decodes to U+FFFD
        let row: CsvRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), String::from_utf8_lossy(cell).into_owned()))
            .collect();
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

/// Picks the date and value columns out of every row.
pub fn project(
    table: &CsvTable,
    date_column: &str,
    value_column: &str,
) -> Result<Vec<RawRecord>, SourceError> {
    for column in [date_column, value_column] {
        if !table.headers.iter().any(|header| header == column) {
            return Err(SourceError::MissingColumn(column.to_string()));
        }
    }

    Ok(table
        .rows
        .iter()
        .map(|row| RawRecord {
            date: row.get(date_column).cloned().unwrap_or_default(),
            value: row.get(value_column).cloned(),
        })
        .collect())
}

pub async fn list_datasets(data_dir: &Path) -> Result<Vec<String>, SourceError> {
    let mut entries = match fs::read_dir(data_dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("data directory {} does not exist", data_dir.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(SourceError::Io {
                path: data_dir.to_path_buf(),
                source: err,
            });
        }
    };

    let mut names = Vec::new();
    loop {
        let entry = entries.next_entry().await.map_err(|err| SourceError::Io {
            path: data_dir.to_path_buf(),
            source: err,
        })?;
        let Some(entry) = entry else {
            break;
        };
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem() {
                let name = stem.to_string_lossy().to_string();
                if is_valid_dataset_name(&name) {
                    names.push(name);
                } else {
                    debug!("ignoring {}: not a servable dataset name", path.display());
                }
            }
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::parse_value;

    const MEMBERS: &str = "date_only,member_count\n2024-01-01,10\n 2024-01-02 , 4 \n2024-01-03\n\n";

    #[test]
    fn parse_table_trims_and_skips_blank_lines() {
        let table = parse_table(MEMBERS.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["date_only", "member_count"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1]["date_only"], "2024-01-02");
        assert_eq!(table.rows[1]["member_count"], "4");
        assert!(!table.rows[2].contains_key("member_count"));
    }

    #[test]
    fn project_maps_short_rows_to_missing_values() {
        let table = parse_table(MEMBERS.as_bytes()).unwrap();
        let records = project(&table, "date_only", "member_count").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], RawRecord::new("2024-01-01", "10"));
        assert_eq!(records[2].value, None);
    }

    #[test]
    fn project_rejects_unknown_columns() {
        let table = parse_table(MEMBERS.as_bytes()).unwrap();
        let err = project(&table, "date", "member_count").unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn(column) if column == "date"));
    }

    #[test]
    fn dataset_names_cannot_escape_data_dir() {
        let dir = Path::new("data");
        assert_eq!(
            dataset_path(dir, "member_growth-2024").unwrap(),
            PathBuf::from("data/member_growth-2024.csv")
        );
        for name in ["", "../secrets", "a/b", "x.csv"] {
            assert!(matches!(
                dataset_path(dir, name),
                Err(SourceError::InvalidDatasetName(_))
            ));
        }
    }

    #[test]
    fn badly_encoded_row_does_not_drop_its_neighbours() {
        let bytes = b"date,value\n2024-01-01,5\n2024-01-02,\xff\xfe\n2024-01-03,7\n";
        let table = parse_table(bytes).unwrap();
        assert_eq!(table.rows.len(), 3);

        let records = project(&table, "date", "value").unwrap();
        assert_eq!(records[0], RawRecord::new("2024-01-01", "5"));
        assert_eq!(records[2], RawRecord::new("2024-01-03", "7"));
        assert_eq!(records[1].date, "2024-01-02");
        assert_eq!(parse_value(records[1].value.as_deref().unwrap()), 0);
    }

    #[tokio::test]
    async fn list_datasets_hides_names_that_cannot_be_served() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "community_dashboard_listing_{}_{}",
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for file in ["member growth.csv", "members.csv", "notes.txt", "bots-2024.csv"] {
            std::fs::write(dir.join(file), "date,value\n").unwrap();
        }

        let names = list_datasets(&dir).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(names, vec!["bots-2024", "members"]);
        for name in &names {
            assert!(dataset_path(&dir, name).is_ok());
        }
    }

    #[tokio::test]
    async fn load_table_reports_missing_dataset() {
        let path = std::env::temp_dir().join("community_dashboard_absent_dataset.csv");
        let err = load_table(&path).await.unwrap_err();
        assert!(
            matches!(err, SourceError::DatasetNotFound(name) if name == "community_dashboard_absent_dataset")
        );
    }

    #[tokio::test]
    async fn list_datasets_of_missing_dir_is_empty() {
        let dir = std::env::temp_dir().join("community_dashboard_no_such_dir");
        assert!(list_datasets(&dir).await.unwrap().is_empty());
    }
}
