//! Tests for fmap-model types.

use fmap_model::{FlatRecord, Multiplicity, Taxonomy, fields_for, format_value, is_known_field};
use serde_json::json;

#[test]
fn field_lookup_ignores_case() {
    let field = Taxonomy::Finding
        .field_ignore_case("  steps to reproduce ")
        .expect("field");
    assert_eq!(field.name, "Steps to Reproduce");
    assert_eq!(field.multiplicity, Multiplicity::Multi);
    assert_eq!(field.category, Some("Core"));
}

#[test]
fn taxonomies_share_some_names_but_not_contracts() {
    assert!(is_known_field(Taxonomy::Finding, "Tags"));
    assert!(is_known_field(Taxonomy::Asset, "Tags"));
    assert!(is_known_field(Taxonomy::Finding, "CVE"));
    assert!(!is_known_field(Taxonomy::Asset, "CVE"));
}

#[test]
fn taxonomy_serializes_lowercase() {
    let text = serde_json::to_string(&Taxonomy::Asset).expect("serialize");
    assert_eq!(text, "\"asset\"");
    let back: Taxonomy = serde_json::from_str("\"finding\"").expect("deserialize");
    assert_eq!(back, Taxonomy::Finding);
}

#[test]
fn groups_cover_every_field_once() {
    for taxonomy in Taxonomy::ALL {
        let names: Vec<&str> = fields_for(taxonomy)
            .into_iter()
            .flat_map(|g| g.fields.into_iter().map(|f| f.name))
            .collect();
        let expected: Vec<&str> = taxonomy.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, expected);
    }
}

#[test]
fn record_values_format_for_display() {
    let mut record = FlatRecord::new();
    record.insert("tags", json!(["a", "b"]));
    record.insert("score", json!(7.5));
    assert_eq!(format_value(record.get("tags")), "a, b");
    assert_eq!(format_value(record.get("score")), "7.5");
    assert_eq!(format_value(record.get("missing")), "N/A");
}
