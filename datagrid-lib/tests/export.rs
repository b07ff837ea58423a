//! Export and read-back tests.

use datagrid_lib::column::{Column, ColumnRegistry};
use datagrid_lib::export::{self, ExportFormat};
use datagrid_lib::filter::{self, FilterState};
use datagrid_lib::model::{Record, Value};
use datagrid_lib::selection::Selection;
use pretty_assertions::assert_eq;

fn columns() -> ColumnRegistry {
    ColumnRegistry::new(vec![
        Column::new("name", "Name").render(|r| r.text("name").map(|n| n.to_uppercase())),
        Column::new("city", "City").path("address.city"),
        Column::new("score", "Score"),
        Column::new("active", "Active"),
        Column::new("joined", "Joined"),
    ])
    .unwrap()
}

fn records() -> Vec<(String, Record)> {
    let joined = chrono::DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z")
        .map(|dt| dt.to_utc())
        .unwrap();
    vec![
        (
            "1".to_string(),
            Record::new()
                .set("name", "Ada, \"the first\"")
                .set("address", Record::new().set("city", "London"))
                .set("score", 91.5)
                .set("active", true)
                .set("joined", joined),
        ),
        (
            "2".to_string(),
            Record::new()
                .set("name", "Multi\nline")
                .set("score", 7i64)
                .set("active", false),
        ),
        ("3".to_string(), Record::new()),
    ]
}

fn export_all(records: &[(String, Record)], format: ExportFormat) -> String {
    let rows = records.iter().map(|(k, r)| (k.as_str(), r));
    export::export(rows, &columns(), format, None).unwrap()
}

/// Parse an export, then export the parsed records again.
fn round_trip(text: &str, format: ExportFormat) -> String {
    let parsed = export::parse(text, &columns(), format).unwrap();
    let keyed: Vec<(String, Record)> = parsed
        .into_iter()
        .enumerate()
        .map(|(i, r)| (i.to_string(), r))
        .collect();
    export_all(&keyed, format)
}

#[test]
fn test_csv_layout() {
    let csv = export_all(&records(), ExportFormat::Csv);
    assert_eq!(
        csv,
        concat!(
            "\"Name\",\"City\",\"Score\",\"Active\",\"Joined\"\n",
            "\"Ada, \"\"the first\"\"\",\"London\",\"91.5\",\"true\",\"2024-03-01T09:30:00Z\"\n",
            "\"Multi\nline\",\"\",\"7\",\"false\",\"\"\n",
            "\"\",\"\",\"\",\"\",\"\"",
        )
    );
}

#[test]
fn test_csv_round_trip_is_byte_identical() {
    let csv = export_all(&records(), ExportFormat::Csv);
    assert_eq!(round_trip(&csv, ExportFormat::Csv), csv);
}

#[test]
fn test_json_layout() {
    let json = export_all(&records()[1..2], ExportFormat::Json);
    assert_eq!(
        json,
        concat!(
            "[\n",
            "  {\n",
            "    \"name\": \"Multi\\nline\",\n",
            "    \"address.city\": null,\n",
            "    \"score\": 7,\n",
            "    \"active\": false,\n",
            "    \"joined\": null\n",
            "  }\n",
            "]",
        )
    );
}

#[test]
fn test_json_round_trip_is_byte_identical() {
    let json = export_all(&records(), ExportFormat::Json);
    assert_eq!(round_trip(&json, ExportFormat::Json), json);
}

#[test]
fn test_selection_limits_export() {
    let records = records();
    let mut selection = Selection::new();
    selection.select("2", true);

    let rows = records.iter().map(|(k, r)| (k.as_str(), r));
    let csv = export::export(rows, &columns(), ExportFormat::Csv, Some(&selection)).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Multi"));
    assert!(!csv.contains("London"));
}

#[test]
fn test_empty_selection_exports_everything() {
    let records = records();
    let selection = Selection::new();
    let rows = records.iter().map(|(k, r)| (k.as_str(), r));
    let json = export::export(rows, &columns(), ExportFormat::Json, Some(&selection)).unwrap();
    assert_eq!(json, export_all(&records, ExportFormat::Json));
}

#[test]
fn test_json_round_trip_keeps_nested_field_order() {
    let columns = ColumnRegistry::new(vec![Column::new("id", "Id"), Column::new("owner", "Owner")]).unwrap();
    let owner = [
        "zeta", "alpha", "mike", "bravo", "yankee", "charlie", "xray", "delta", "whiskey", "echo",
    ]
    .iter()
    .enumerate()
    .map(|(i, field)| (field.to_string(), Value::from(i as i64)))
    .collect::<Record>();
    let records = [Record::new().set("id", "r1").set("owner", owner)];

    let json = export::export([("r1", &records[0])], &columns, ExportFormat::Json, None).unwrap();
    let owner_line = json.lines().position(|l| l.contains("\"owner\"")).unwrap();
    assert!(json.lines().nth(owner_line + 1).unwrap().contains("\"zeta\": 0"));

    let mut text = json.clone();
    for _ in 0..5 {
        let parsed = export::parse(&text, &columns, ExportFormat::Json).unwrap();
        let rows = parsed.iter().map(|r| ("r1", r));
        text = export::export(rows, &columns, ExportFormat::Json, None).unwrap();
        assert_eq!(text, json);
    }
}

#[test]
fn test_offset_timestamps_are_kept_verbatim() {
    let columns = ColumnRegistry::new(vec![Column::new("note", "Note")]).unwrap();
    let records: Vec<Record> = serde_json::from_str(r#"[{"note": "2024-05-01T10:00:00+02:00"}]"#).unwrap();
    assert_eq!(records[0].get("note"), Some(&Value::from("2024-05-01T10:00:00+02:00")));

    let rows = records.iter().map(|r| ("1", r));
    let csv = export::export(rows, &columns, ExportFormat::Csv, None).unwrap();
    assert_eq!(csv, "\"Note\"\n\"2024-05-01T10:00:00+02:00\"");

    let state = FilterState::new().with_free_text("+02:00");
    assert_eq!(filter::apply(&records, &state, &columns).len(), 1);
}
