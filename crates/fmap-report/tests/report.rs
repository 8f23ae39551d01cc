use fmap_ingest::SourceRecord;
use fmap_map::{EditorEvent, EditorSession};
use fmap_model::{SourceFormat, Taxonomy};
use fmap_report::{
    ExportOutcome, FileSink, MappingTable, NarrativeDocument, document_export,
    export_with_fallback, table_export,
};

const RECORD: &str = r#"{
    "page": 1,
    "data": [{
        "title": "SQL injection in login form",
        "severity": "High",
        "description": "User input reaches the query builder unescaped.",
        "repro": "1. Open /login\n2. Submit ' OR 1=1 -- as the user name",
        "details": {
            "impact": "Full read access to the accounts table.",
            "remediation": "Use bound parameters."
        }
    }]
}"#;

fn session() -> EditorSession {
    let source = SourceRecord::parse(RECORD, SourceFormat::Json, 0).expect("parse");
    let mut session = EditorSession::new(Taxonomy::Finding);
    session.process(source.flatten().expect("flatten"));
    session
        .apply(&EditorEvent::SetFieldForKey {
            field: "Steps to Reproduce".into(),
            key: "repro".into(),
        })
        .expect("set field");
    session
        .apply(&EditorEvent::ReorderComposerEntry {
            key: "details.impact".into(),
            index: 2,
        })
        .expect("reorder");
    session
}

#[test]
fn narrative_markdown() {
    let session = session();
    let document = NarrativeDocument::new(session.render().expect("render"));
    insta::assert_snapshot!("narrative_markdown", document.to_markdown());
}

#[test]
fn table_lists_every_key_with_its_field() {
    let session = session();
    let table = MappingTable::build(session.record().expect("record"), session.state());
    let tsv = table.to_tsv();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines[0], "Key\tValue\tMapped Field");
    assert_eq!(lines[1], "title\tSQL injection in login form\tSummary");
    assert_eq!(
        lines[4],
        "repro\t1. Open /login 2. Submit ' OR 1=1 -- as the user name\tSteps to Reproduce"
    );
    assert_eq!(lines.len(), 7);
}

#[test]
fn exports_land_in_output_directory() {
    let session = session();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path());

    let table = MappingTable::build(session.record().expect("record"), session.state());
    let document = NarrativeDocument::new(session.render().expect("render"));
    for content in [
        table_export(&table).expect("table"),
        document_export(&document).expect("document"),
    ] {
        assert_eq!(
            export_with_fallback(&mut sink, &content).expect("export"),
            ExportOutcome::Rich
        );
    }

    let html = std::fs::read_to_string(dir.path().join("document.html")).expect("read");
    assert!(html.starts_with("<h3>Description</h3>"));
    assert!(html.contains("<pre>1. Open /login\n2. Submit &apos; OR 1=1 -- as the user name</pre>"));
    assert!(dir.path().join("table.txt").exists());
}
