use std::fs;

use fmap_ingest::{IngestError, SourceRecord, load_record};
use fmap_model::SourceFormat;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn loads_json_envelope_and_flattens() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("findings.json");
    fs::write(
        &path,
        r#"{"total_count": 1, "page": 1, "data": [{"title": "X", "asset": {"ip": "10.0.0.1"}}]}"#,
    )
    .unwrap();

    let source = load_record(&path, None, 0).expect("load");
    assert_eq!(source.format, SourceFormat::Json);

    let flat = source.flatten().expect("flatten");
    assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["title", "asset.ip"]);
    assert_eq!(flat.get("asset.ip"), Some(&json!("10.0.0.1")));
}

#[test]
fn loads_csv_without_extension_by_sniffing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.txt");
    fs::write(&path, "title,severity\nX,High\n").unwrap();

    let source = load_record(&path, None, 0).expect("load");
    assert_eq!(source.format, SourceFormat::Csv);
    assert_eq!(source.record.get("severity"), Some(&json!("High")));
}

#[test]
fn explicit_format_overrides_detection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.json");
    fs::write(&path, "title\nX\n").unwrap();

    assert!(matches!(
        load_record(&path, None, 0),
        Err(IngestError::JsonParse { .. })
    ));
    let source = load_record(&path, Some(SourceFormat::Csv), 0).expect("load");
    assert_eq!(source.record.get("title"), Some(&json!("X")));
}

#[test]
fn saved_record_round_trips() {
    let source = SourceRecord::parse(
        r#"{"b": 1, "a": {"c": [1, 2]}}"#,
        SourceFormat::Json,
        0,
    )
    .expect("parse");
    let text = source.to_json();
    assert_eq!(text, r#"{"b":1,"a":{"c":[1,2]}}"#);

    let restored = SourceRecord::from_saved(&text, SourceFormat::Json).expect("restore");
    assert_eq!(restored, source);
    assert_eq!(
        restored.flatten().expect("flatten"),
        source.flatten().expect("flatten")
    );
}

#[test]
fn saved_record_must_be_an_object() {
    assert!(matches!(
        SourceRecord::from_saved("[1]", SourceFormat::Json),
        Err(IngestError::NoRecord { .. })
    ));
}
