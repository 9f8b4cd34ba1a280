//! Backup file formats: parsing import documents and rendering exports.

use crate::entities::{ImportRecord, WeightEntry};
use crate::errors::{StoreError, StoreResult};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Picks the format from the file extension, falling back to the
    /// content when the extension says nothing.
    pub fn detect(path: &Path, content: &str) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => ImportFormat::Json,
            Some("csv") => ImportFormat::Csv,
            _ => match content.trim_start().chars().next() {
                Some('[') | Some('{') => ImportFormat::Json,
                _ => ImportFormat::Csv,
            },
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImportFormat::Json => "json",
            ImportFormat::Csv => "csv",
        }
    }
}

pub fn parse_import(text: &str, format: ImportFormat) -> StoreResult<Vec<ImportRecord>> {
    match format {
        ImportFormat::Json => parse_json(text),
        ImportFormat::Csv => Ok(parse_csv(text)),
    }
}

/// The document must be a JSON array; its elements are taken as they are
/// and validated later by the merge.
pub fn parse_json(text: &str) -> StoreResult<Vec<ImportRecord>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::ImportFormat(format!("not valid JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(items.iter().map(ImportRecord::from_value).collect()),
        other => Err(StoreError::ImportFormat(format!(
            "expected an array of entries, found {}",
            json_kind(&other)
        ))),
    }
}

/// `date,weight` rows with an optional header. Rows that do not have both
/// fields come back as records the merge will skip.
pub fn parse_csv(text: &str) -> Vec<ImportRecord> {
    let mut rows = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable();

    if let Some(first) = rows.peek() {
        if parse_csv_row(first).weight.is_none() {
            rows.next();
        }
    }

    rows.map(parse_csv_row).collect()
}

fn parse_csv_row(line: &str) -> ImportRecord {
    let mut fields = split_csv_fields(line).into_iter();

    let date = fields.next().filter(|d| !d.is_empty());
    // A quoted weight may use `,` as decimal separator.
    let weight = fields
        .next()
        .and_then(|w| w.replace(',', ".").parse::<f64>().ok());

    ImportRecord { date, weight }
}

/// Splits on commas outside double quotes. Quotes are dropped and `""`
/// inside a quoted field stands for a literal quote.
fn split_csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn export_json(entries: &[WeightEntry]) -> StoreResult<String> {
    serde_json::to_string_pretty(entries).map_err(StoreError::Serialize)
}

pub fn export_csv(entries: &[WeightEntry]) -> String {
    let mut content = String::from("date,weight\n");
    for entry in entries {
        content.push_str(&format!("{},{}\n", entry.date, entry.weight));
    }
    content
}

pub fn render_export(entries: &[WeightEntry], format: ImportFormat) -> StoreResult<String> {
    match format {
        ImportFormat::Json => export_json(entries),
        ImportFormat::Csv => Ok(export_csv(entries)),
    }
}

/// `Peso_Tracker_<year>_<month>_<day>_<hour>_<minute>.<ext>`
pub fn export_file_name(now: NaiveDateTime, format: ImportFormat) -> String {
    format!(
        "Peso_Tracker_{}.{}",
        now.format("%Y_%m_%d_%H_%M"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_json_array() {
        let records =
            parse_json(r#"[{"date":"2024-01-05","weight":82.3},{"date":"2024-01-12"}]"#).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ImportRecord::new("2024-01-05", 82.3));
        assert_eq!(records[1].weight, None);
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        let err = parse_json(r#"{"date":"2024-01-05","weight":82.3}"#).unwrap_err();
        match err {
            StoreError::ImportFormat(message) => assert!(message.contains("an object")),
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(parse_json("82.3"), Err(StoreError::ImportFormat(_))));
        assert!(matches!(parse_json("[{"), Err(StoreError::ImportFormat(_))));
    }

    #[test]
    fn test_parse_csv_with_header() {
        let text = "date,weight\n2024-01-05,82.3\n\n \"2024-01-12\" , 81.8 \n";
        assert_eq!(
            parse_csv(text),
            vec![
                ImportRecord::new("2024-01-05", 82.3),
                ImportRecord::new("2024-01-12", 81.8),
            ]
        );
    }

    #[test]
    fn test_parse_csv_without_header_and_with_bad_rows() {
        let records = parse_csv("2024-01-05,82.3\n2024-01-06\n2024-01-07,heavy\n");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].validated(), Some(WeightEntry::new("2024-01-05", 82.3)));
        assert!(records[1].validated().is_none());
        assert!(records[2].validated().is_none());
    }

    #[test]
    fn test_parse_csv_keeps_quoted_commas_in_field() {
        let text = "\"date\",\"weight\"\n\"2024-01-05\",\"82,3\"\n\"2024-01-06\",\"81.9\"\n";
        assert_eq!(
            parse_csv(text),
            vec![
                ImportRecord::new("2024-01-05", 82.3),
                ImportRecord::new("2024-01-06", 81.9),
            ]
        );

        assert_eq!(
            split_csv_fields(r#""a ""b"", c",d"#),
            vec![r#"a "b", c"#.to_string(), "d".to_string()]
        );
    }

    #[test]
    fn test_parse_csv_empty() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("date,weight\n").is_empty());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ImportFormat::detect(Path::new("backup.JSON"), ""), ImportFormat::Json);
        assert_eq!(ImportFormat::detect(Path::new("backup.csv"), "[]"), ImportFormat::Csv);
        assert_eq!(ImportFormat::detect(Path::new("backup"), "  [{}]"), ImportFormat::Json);
        assert_eq!(
            ImportFormat::detect(Path::new("backup.txt"), "2024-01-05,82.3"),
            ImportFormat::Csv
        );
    }

    #[test]
    fn test_export_json_is_pretty_and_reimportable() {
        let entries = vec![
            WeightEntry::new("2024-01-05", 82.3),
            WeightEntry::new("2024-01-12", 81.8),
        ];

        let content = export_json(&entries).unwrap();
        assert!(content.starts_with("[\n  {\n    \"date\": \"2024-01-05\""));

        let records = parse_json(&content).unwrap();
        let reimported: Vec<_> = records.iter().filter_map(ImportRecord::validated).collect();
        assert_eq!(reimported, entries);
    }

    #[test]
    fn test_export_csv() {
        let entries = vec![WeightEntry::new("2024-01-05", 82.3)];
        assert_eq!(export_csv(&entries), "date,weight\n2024-01-05,82.3\n");
    }

    #[test]
    fn test_export_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();

        assert_eq!(
            export_file_name(now, ImportFormat::Json),
            "Peso_Tracker_2024_03_07_09_05.json"
        );
        assert_eq!(
            export_file_name(now, ImportFormat::Csv),
            "Peso_Tracker_2024_03_07_09_05.csv"
        );
    }
}
