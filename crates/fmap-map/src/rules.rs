//! Alias tables for the heuristic resolver.
//!
//! Rules are plain data, evaluated top to bottom against the case-folded last
//! segment of a key. The first matching rule wins; there is no notion of one
//! rule being more specific than another beyond its position in the table.

use fmap_model::{Taxonomy, last_segment};

/// How an alias rule inspects a key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatcher {
    /// Segment equals one of the listed spellings.
    Exact(&'static [&'static str]),
    /// Segment starts with the given text.
    Prefix(&'static str),
    /// Segment contains the given text.
    Contains(&'static str),
}

impl KeyMatcher {
    /// `segment` must already be lowercase.
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Exact(spellings) => spellings.contains(&segment),
            Self::Prefix(prefix) => segment.starts_with(prefix),
            Self::Contains(needle) => segment.contains(needle),
        }
    }
}

/// Routes matching key segments to a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasRule {
    pub matcher: KeyMatcher,
    pub target: &'static str,
}

const fn rule(matcher: KeyMatcher, target: &'static str) -> AliasRule {
    AliasRule { matcher, target }
}

use KeyMatcher::{Contains, Exact, Prefix};

pub const FINDING_ALIASES: &[AliasRule] = &[
    rule(Exact(&["title", "vulnerability_name"]), "Summary"),
    rule(Exact(&["last_seen"]), "Last Seen Date"),
    rule(Exact(&["riskscore"]), "Risk Score"),
    rule(Exact(&["cve_id", "cveid"]), "CVE"),
    rule(Prefix("cve-"), "CVE"),
    rule(Exact(&["cvss_v3_vector", "vectorstring"]), "CVSS Vector"),
    rule(Exact(&["first_found", "firstfound", "created_at"]), "Found On"),
    rule(Exact(&["ip", "ip_address", "host_ip"]), "IP Addresses"),
    rule(Contains("repo_"), "Repository"),
    rule(Contains("_repo"), "Repository"),
    rule(Contains("cwe"), "CWE"),
    rule(Exact(&["url", "endpoint"]), "URL/Endpoint"),
    rule(Exact(&["image_name"]), "Image Name"),
    rule(Exact(&["tool_name", "scanner"]), "Source Tool"),
];

pub const ASSET_ALIASES: &[AliasRule] = &[
    rule(Exact(&["asset_name", "display_name"]), "Name"),
    rule(Exact(&["type", "asset_type", "kind"]), "Asset Type"),
    rule(Exact(&["ip", "ip_address", "host_ip"]), "IP Address"),
    rule(Exact(&["mac", "mac_address"]), "MAC Address"),
    rule(Exact(&["hostname", "host_name", "fqdn", "dns"]), "DNS Name"),
    rule(Exact(&["url", "endpoint"]), "URL/Endpoint"),
    rule(Contains("repo_"), "Repository"),
    rule(Contains("_repo"), "Repository"),
    rule(Exact(&["os", "os_name", "platform"]), "Operating System"),
    rule(Exact(&["env"]), "Environment"),
    rule(Exact(&["owned_by", "owner_email"]), "Owner"),
    rule(Exact(&["provider", "cloud"]), "Cloud Provider"),
    rule(Exact(&["account_id", "cloud_account_id"]), "Cloud Account"),
    rule(Exact(&["last_seen"]), "Last Seen Date"),
];

/// Substring that routes otherwise-unmatched keys to the tag field.
pub const TAG_FALLBACK: &str = "tag";

/// Pagination and envelope keys skipped when seeding a mapping.
pub const IGNORED_KEYS: &[&str] = &[
    "total_count",
    "ids",
    "total_pages",
    "page",
    "page_size",
    "data",
];

/// Alias table of `taxonomy`.
pub fn aliases_for(taxonomy: Taxonomy) -> &'static [AliasRule] {
    match taxonomy {
        Taxonomy::Finding => FINDING_ALIASES,
        Taxonomy::Asset => ASSET_ALIASES,
    }
}

/// True if the key's last segment is a pagination/envelope key.
pub fn is_ignored_key(key: &str) -> bool {
    let segment = last_segment(key).to_lowercase();
    IGNORED_KEYS.contains(&segment.as_str())
}
