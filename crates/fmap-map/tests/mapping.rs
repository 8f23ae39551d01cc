use fmap_ingest::{SourceRecord, flatten};
use fmap_map::KeyMatcher::{Contains, Exact, Prefix};
use fmap_map::{
    ASSET_ALIASES, AliasRule, Binding, EditorSession, FINDING_ALIASES, KeyMatcher, MappingState,
    PresetRepository, RepositoryError, ResolutionRule, SavedMapping, resolve_explained, seed,
};
use fmap_model::{FlatRecord, SourceFormat, Taxonomy};
use serde_json::json;
use tempfile::tempdir;

fn flat(value: serde_json::Value) -> FlatRecord {
    match value {
        serde_json::Value::Object(map) => flatten(&map).expect("flatten"),
        _ => panic!("expected object"),
    }
}

#[test]
fn scenario_scalar_and_tag_fields() {
    let record = flat(json!({"title": "X", "severity": "High", "tags": ["a", "b"]}));
    let state = seed(&record, Taxonomy::Finding);

    assert_eq!(state.binding("Summary").unwrap(), &Binding::Single("title".into()));
    assert_eq!(state.binding("Severity").unwrap(), &Binding::Single("severity".into()));
    assert_eq!(state.binding("Tags").unwrap(), &Binding::Multiple(vec!["tags".into()]));
    assert_eq!(state.bound_count(), 3);
}

#[test]
fn scenario_first_cve_wins() {
    let record = flat(json!({"cve_id": "CVE-2024-1", "vulnerability": {"cve": "CVE-2024-1"}}));
    let state = seed(&record, Taxonomy::Finding);

    assert_eq!(state.binding("CVE").unwrap(), &Binding::Single("cve_id".into()));
    assert!(state.owner_of("vulnerability.cve").is_none());
    assert_eq!(state.unmapped_keys(&record), vec!["vulnerability.cve"]);
}

#[test]
fn scenario_key_moves_from_tags_to_severity() {
    let mut state = MappingState::new(Taxonomy::Finding);
    state.bind_key("Tags", "env.labels").unwrap();
    state.bind_key("Severity", "env.labels").unwrap();

    assert!(!state.binding("Tags").unwrap().contains("env.labels"));
    assert_eq!(state.binding("Tags").unwrap(), &Binding::Unbound);
    assert_eq!(
        state.binding("Severity").unwrap(),
        &Binding::Single("env.labels".into())
    );
}

#[test]
fn scenario_switch_to_asset() {
    let record = flat(json!({"title": "X", "severity": "High"}));
    let mut session = EditorSession::new(Taxonomy::Finding);
    session.process(record);
    session.switch_taxonomy(Taxonomy::Asset);

    let fields: Vec<&str> = session.state().iter().map(|(field, _)| field.name).collect();
    let asset: Vec<&str> = Taxonomy::Asset.fields().iter().map(|f| f.name).collect();
    assert_eq!(fields, asset);
    assert!(session.state().iter().all(|(_, binding)| !binding.is_bound()));
    assert!(session.state().binding("Severity").is_err());
}

#[test]
fn envelope_record_seeds_asset_fields() {
    let source = SourceRecord::parse(
        r#"{"total_count": 2, "data": [{"hostname": "db01", "os": "Linux", "tag_list": ["prod"]}, {}]}"#,
        SourceFormat::Json,
        0,
    )
    .unwrap();
    let state = seed(&source.flatten().unwrap(), Taxonomy::Asset);

    assert_eq!(state.binding("DNS Name").unwrap().keys(), ["hostname".to_string()]);
    assert_eq!(
        state.binding("Operating System").unwrap(),
        &Binding::Single("os".into())
    );
    assert_eq!(state.binding("Tags").unwrap().keys(), ["tag_list".to_string()]);
}

/// Each row: matcher, target, and a key that only that row should catch.
type AliasRow = (KeyMatcher, &'static str, &'static str);

const FINDING_TABLE: &[AliasRow] = &[
    (Exact(&["title", "vulnerability_name"]), "Summary", "title"),
    (Exact(&["last_seen"]), "Last Seen Date", "last_seen"),
    (Exact(&["riskscore"]), "Risk Score", "riskScore"),
    (Exact(&["cve_id", "cveid"]), "CVE", "vuln.cve_id"),
    (Prefix("cve-"), "CVE", "CVE-2024-3094"),
    (Exact(&["cvss_v3_vector", "vectorstring"]), "CVSS Vector", "vectorString"),
    (Exact(&["first_found", "firstfound", "created_at"]), "Found On", "created_at"),
    (Exact(&["ip", "ip_address", "host_ip"]), "IP Addresses", "host_ip"),
    (Contains("repo_"), "Repository", "repo_url"),
    (Contains("_repo"), "Repository", "source_repo"),
    (Contains("cwe"), "CWE", "cwe_id"),
    (Exact(&["url", "endpoint"]), "URL/Endpoint", "endpoint"),
    (Exact(&["image_name"]), "Image Name", "image_name"),
    (Exact(&["tool_name", "scanner"]), "Source Tool", "scanner"),
];

const ASSET_TABLE: &[AliasRow] = &[
    (Exact(&["asset_name", "display_name"]), "Name", "display_name"),
    (Exact(&["type", "asset_type", "kind"]), "Asset Type", "kind"),
    (Exact(&["ip", "ip_address", "host_ip"]), "IP Address", "net.ip_address"),
    (Exact(&["mac", "mac_address"]), "MAC Address", "mac"),
    (Exact(&["hostname", "host_name", "fqdn", "dns"]), "DNS Name", "fqdn"),
    (Exact(&["url", "endpoint"]), "URL/Endpoint", "url"),
    (Contains("repo_"), "Repository", "repo_name"),
    (Contains("_repo"), "Repository", "git_repo"),
    (Exact(&["os", "os_name", "platform"]), "Operating System", "platform"),
    (Exact(&["env"]), "Environment", "env"),
    (Exact(&["owned_by", "owner_email"]), "Owner", "owner_email"),
    (Exact(&["provider", "cloud"]), "Cloud Provider", "cloud"),
    (Exact(&["account_id", "cloud_account_id"]), "Cloud Account", "cloud_account_id"),
    (Exact(&["last_seen"]), "Last Seen Date", "last_seen"),
];

fn assert_alias_table(taxonomy: Taxonomy, actual: &[AliasRule], expected: &[AliasRow]) {
    let rules: Vec<(KeyMatcher, &str)> =
        actual.iter().map(|rule| (rule.matcher, rule.target)).collect();
    let wanted: Vec<(KeyMatcher, &str)> = expected
        .iter()
        .map(|(matcher, target, _)| (*matcher, *target))
        .collect();
    assert_eq!(rules, wanted, "{taxonomy} alias table");

    for (index, (_, target, key)) in expected.iter().enumerate() {
        let resolution = resolve_explained(key, taxonomy)
            .unwrap_or_else(|| panic!("{taxonomy}: '{key}' did not resolve"));
        assert_eq!(resolution.field.name, *target, "{taxonomy}: '{key}'");
        assert_eq!(
            resolution.rule,
            ResolutionRule::Alias { index },
            "{taxonomy}: '{key}'"
        );
    }
}

#[test]
fn finding_alias_table_is_pinned() {
    assert_alias_table(Taxonomy::Finding, FINDING_ALIASES, FINDING_TABLE);
}

#[test]
fn asset_alias_table_is_pinned() {
    assert_alias_table(Taxonomy::Asset, ASSET_ALIASES, ASSET_TABLE);
}

#[test]
fn preset_round_trip_restores_state() {
    let dir = tempdir().unwrap();
    let repo = PresetRepository::new(dir.path().join("presets")).unwrap();

    let source = SourceRecord::parse(
        r#"{"title": "X", "description": "Long text", "ip": "10.0.0.1", "labels": ["a"]}"#,
        SourceFormat::Json,
        0,
    )
    .unwrap();
    let record = source.flatten().unwrap();
    let mut session = EditorSession::new(Taxonomy::Finding);
    session.process(record);
    session.set_field_for_key("Tags", "labels").unwrap();

    let preset = SavedMapping::new("Weekly Scan", source.format, source.to_json(), session.state());
    let path = repo.save(&preset).unwrap();
    assert!(path.ends_with("weekly_20scan.json"));
    assert!(repo.exists("WEEKLY scan"));

    let loaded = repo.load("weekly scan").unwrap().expect("preset exists");
    assert_eq!(loaded.name, "Weekly Scan");
    assert_eq!(loaded.provenance, SourceFormat::Json);
    assert_eq!(loaded.mapping, preset.mapping);

    let restored_source = SourceRecord::from_saved(&loaded.source_record, loaded.provenance).unwrap();
    let restored =
        EditorSession::restore(restored_source.flatten().unwrap(), &loaded.mapping).unwrap();
    assert_eq!(restored.state(), session.state());
    assert_eq!(restored.record(), session.record());
}

#[test]
fn preset_names_are_case_insensitive() {
    let dir = tempdir().unwrap();
    let repo = PresetRepository::new(dir.path()).unwrap();
    let state = MappingState::new(Taxonomy::Asset);

    repo.save(&SavedMapping::new("Inventory", SourceFormat::Csv, "{}", &state))
        .unwrap();
    repo.save(&SavedMapping::new("INVENTORY", SourceFormat::Csv, "{}", &state))
        .unwrap();
    repo.save(&SavedMapping::new("alpha", SourceFormat::Json, "{}", &state))
        .unwrap();

    let names: Vec<String> = repo.list().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["alpha".to_string(), "INVENTORY".to_string()]);

    assert!(repo.delete("inventory").unwrap());
    assert!(!repo.delete("inventory").unwrap());
    assert!(repo.load("Inventory").unwrap().is_none());
}

#[test]
fn preset_names_differing_in_punctuation_stay_apart() {
    let dir = tempdir().unwrap();
    let repo = PresetRepository::new(dir.path()).unwrap();
    let mut finding = MappingState::new(Taxonomy::Finding);
    finding.bind_key("Summary", "title").unwrap();
    let asset = MappingState::new(Taxonomy::Asset);

    repo.save(&SavedMapping::new("weekly scan", SourceFormat::Json, "{}", &finding))
        .unwrap();
    repo.save(&SavedMapping::new("weekly-scan", SourceFormat::Csv, "{}", &asset))
        .unwrap();
    repo.save(&SavedMapping::new("weekly_scan", SourceFormat::Csv, "{}", &asset))
        .unwrap();

    let names: Vec<String> = repo.list().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names.len(), 3);

    let loaded = repo.load("Weekly Scan").unwrap().expect("preset exists");
    assert_eq!(loaded.name, "weekly scan");
    assert_eq!(loaded.taxonomy(), Taxonomy::Finding);
    assert_eq!(loaded.mapping, finding.to_snapshot());

    assert!(repo.delete("weekly-scan").unwrap());
    assert!(repo.exists("weekly scan"));
    assert!(repo.exists("WEEKLY_SCAN"));
}

#[test]
fn corrupt_preset_is_reported_and_skipped_in_listing() {
    let dir = tempdir().unwrap();
    let repo = PresetRepository::new(dir.path()).unwrap();
    std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

    let err = repo.load("broken").unwrap_err();
    assert!(matches!(err, RepositoryError::Deserialization { .. }));
    assert!(err.user_message().contains("corrupted"));
    assert!(repo.list().unwrap().is_empty());
}
