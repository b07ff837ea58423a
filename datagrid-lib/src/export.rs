//! Exporter: CSV and JSON serialization through the column registry.
//!
//! Exports only ever contain the registered columns, in registry order.
//! Cells hold raw field values; display renderers are not applied, so an
//! export can be read back and written again unchanged.

use std::fmt;
use std::str::FromStr;

use csv::QuoteStyle;
use csv::ReaderBuilder;
use csv::Terminator;
use csv::WriterBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnRegistry;
use crate::error::{GridError, Result};
use crate::model::{Record, Value};
use crate::selection::Selection;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values, every field quoted.
    Csv,
    /// Pretty-printed array of objects keyed by field path.
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(GridError::config(format!("unknown export format '{}'", other))),
        }
    }
}

/// File name for an export: `<base>.<extension>`.
pub fn file_name(base: &str, format: ExportFormat) -> String {
    format!("{}.{}", base, format.extension())
}

/// Serializes rows through the column registry.
///
/// `rows` pairs each record with its row key. When `selection` is given and
/// not empty, only selected rows are exported.
pub fn export<'a, I>(
    rows: I,
    columns: &ColumnRegistry,
    format: ExportFormat,
    selection: Option<&Selection>,
) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a Record)>,
{
    let selection = selection.filter(|s| !s.is_empty());
    let records: Vec<&Record> = rows
        .into_iter()
        .filter(|(key, _)| selection.is_none_or(|s| s.is_selected(key)))
        .map(|(_, record)| record)
        .collect();

    log::debug!("Exporting {} rows as {}", records.len(), format);

    match format {
        ExportFormat::Csv => to_csv(&records, columns),
        ExportFormat::Json => to_json(&records, columns),
    }
}

/// Reads an export back into records keyed by field path.
pub fn parse(text: &str, columns: &ColumnRegistry, format: ExportFormat) -> Result<Vec<Record>> {
    match format {
        ExportFormat::Csv => from_csv(text, columns),
        ExportFormat::Json => from_json(text, columns),
    }
}

// =============================================================================
// CSV
// =============================================================================

fn to_csv(records: &[&Record], columns: &ColumnRegistry) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.title.as_str()))?;
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|c| c.value(record).and_then(Value::display_text).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GridError::Csv(csv::Error::from(e.into_error())))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    // Rows are joined by newlines, without a trailing one.
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn from_csv(text: &str, columns: &ColumnRegistry) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let titles = columns.titles();
    if headers != titles {
        return Err(GridError::ColumnMismatch {
            expected: titles,
            actual: headers,
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (column, cell) in columns.iter().zip(row.iter()) {
            record.set_path(&column.field_path, Value::from(cell));
        }
        records.push(record);
    }
    Ok(records)
}

// =============================================================================
// JSON
// =============================================================================

fn to_json(records: &[&Record], columns: &ColumnRegistry) -> Result<String> {
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| -> Result<(String, serde_json::Value)> {
                    let value = match c.value(record) {
                        Some(v) => serde_json::to_value(v)?,
                        None => serde_json::Value::Null,
                    };
                    Ok((c.field_path.clone(), value))
                })
                .collect::<Result<serde_json::Map<_, _>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_json::to_string_pretty(&rows)?)
}

fn from_json(text: &str, columns: &ColumnRegistry) -> Result<Vec<Record>> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)?;

    rows.into_iter()
        .map(|mut row| -> Result<Record> {
            let mut record = Record::new();
            for column in columns {
                let value = row.remove(&column.field_path).unwrap_or_default();
                let value: Value = serde_json::from_value(value)?;
                if !value.is_null() {
                    record.set_path(&column.field_path, value);
                }
            }
            Ok(record)
        })
        .collect()
}
