//! Target-field catalogs.
//!
//! Both catalogs are fixed at compile time. The multiplicity of a field is a
//! property of the catalog entry, never something a caller can change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Name of the pseudo-field that stands for "not mapped".
pub const NONE_FIELD: &str = "None";

/// Name of the tag field present in both catalogs.
pub const TAGS_FIELD: &str = "Tags";

/// Returns true if `name` selects the "not mapped" pseudo-field.
pub fn is_none_field(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(NONE_FIELD)
}

/// Which target catalog is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    /// Vulnerability findings.
    Finding,
    /// Inventory assets.
    Asset,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 2] = [Taxonomy::Finding, Taxonomy::Asset];

    /// Identifier used in saved presets and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finding => "finding",
            Self::Asset => "asset",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Finding => "Finding",
            Self::Asset => "Asset",
        }
    }

    /// All fields of this catalog in display order.
    pub fn fields(self) -> &'static [TargetField] {
        match self {
            Self::Finding => FINDING_FIELDS,
            Self::Asset => ASSET_FIELDS,
        }
    }

    /// Looks up a field by its exact name.
    pub fn field(self, name: &str) -> Option<&'static TargetField> {
        self.fields().iter().find(|field| field.name == name)
    }

    /// Looks up a field ignoring ASCII case and surrounding whitespace.
    pub fn field_ignore_case(self, name: &str) -> Option<&'static TargetField> {
        let name = name.trim();
        self.fields()
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Taxonomy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finding" | "findings" => Ok(Self::Finding),
            "asset" | "assets" => Ok(Self::Asset),
            other => Err(ModelError::UnknownTaxonomy(other.to_string())),
        }
    }
}

/// Whether a field accepts one source key or an ordered set of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    Single,
    Multi,
}

impl Multiplicity {
    pub fn is_multi(self) -> bool {
        matches!(self, Self::Multi)
    }
}

/// A field of a target catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetField {
    /// Field identifier as shown to users, e.g. `"Summary"`.
    pub name: &'static str,
    /// Category label. Asset fields are uncategorised.
    pub category: Option<&'static str>,
    /// Catalog this field belongs to.
    pub taxonomy: Taxonomy,
    pub multiplicity: Multiplicity,
}

impl TargetField {
    pub fn is_multi(&self) -> bool {
        self.multiplicity.is_multi()
    }
}

/// Narrative fields of the Finding catalog, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NarrativeSection {
    Description,
    StepsToReproduce,
    Remediation,
    Impact,
}

impl NarrativeSection {
    pub const ALL: [NarrativeSection; 4] = [
        NarrativeSection::Description,
        NarrativeSection::StepsToReproduce,
        NarrativeSection::Remediation,
        NarrativeSection::Impact,
    ];

    /// Name of the Finding field backing this section.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::StepsToReproduce => "Steps to Reproduce",
            Self::Remediation => "Remediation",
            Self::Impact => "Impact",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.field_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for NarrativeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

const fn finding(
    name: &'static str,
    category: &'static str,
    multiplicity: Multiplicity,
) -> TargetField {
    TargetField {
        name,
        category: Some(category),
        taxonomy: Taxonomy::Finding,
        multiplicity,
    }
}

const fn asset(name: &'static str, multiplicity: Multiplicity) -> TargetField {
    TargetField {
        name,
        category: None,
        taxonomy: Taxonomy::Asset,
        multiplicity,
    }
}

const CORE: &str = "Core";
const TOOL_DETAILS: &str = "Tool Details";
const RISK: &str = "Risk & Severity";
const STATUS: &str = "Status & Dates";
const ENVIRONMENT: &str = "Asset & Environment";

/// Finding categories in display order.
pub const FINDING_CATEGORIES: &[&str] = &[CORE, TOOL_DETAILS, RISK, STATUS, ENVIRONMENT];

use Multiplicity::{Multi, Single};

pub const FINDING_FIELDS: &[TargetField] = &[
    finding("ID", CORE, Single),
    finding("Summary", CORE, Single),
    finding("CVE", CORE, Single),
    finding("CWE", CORE, Single),
    finding("Category", CORE, Single),
    finding("Finding URL", CORE, Single),
    finding("Description", CORE, Multi),
    finding("Steps to Reproduce", CORE, Multi),
    finding("Impact", CORE, Multi),
    finding("Remediation", CORE, Multi),
    finding("Component Name", CORE, Single),
    finding("Component Affected Version", CORE, Single),
    finding("Component Fix Version", CORE, Single),
    finding(TAGS_FIELD, CORE, Multi),
    finding("Source Tool", TOOL_DETAILS, Single),
    finding("Tool Finding ID", TOOL_DETAILS, Single),
    finding("Tool Severity", TOOL_DETAILS, Single),
    finding("Tool Finding Status", TOOL_DETAILS, Single),
    finding("Tool Finding Category", TOOL_DETAILS, Single),
    finding("Fixable Using Tool", TOOL_DETAILS, Single),
    finding("Severity", RISK, Single),
    finding("Risk Score", RISK, Single),
    finding("Base Score", RISK, Single),
    finding("CVSS Vector", RISK, Single),
    finding("Exploit Maturity", RISK, Single),
    finding("Exploited", RISK, Single),
    finding("CISA KEV", RISK, Single),
    finding("Status", STATUS, Single),
    finding("Latest Tool Scan Date", STATUS, Single),
    finding("Found On", STATUS, Single),
    finding("Last Seen Date", STATUS, Single),
    finding("File Name", ENVIRONMENT, Single),
    finding("Device", ENVIRONMENT, Single),
    finding("URL/Endpoint", ENVIRONMENT, Multi),
    finding("Image Name", ENVIRONMENT, Single),
    finding("IP Addresses", ENVIRONMENT, Multi),
    finding("Repository", ENVIRONMENT, Multi),
];

pub const ASSET_FIELDS: &[TargetField] = &[
    asset("Name", Single),
    asset("Asset Type", Single),
    asset("Description", Single),
    asset("Owner", Single),
    asset("Environment", Single),
    asset("Business Unit", Single),
    asset("Criticality", Single),
    asset("Operating System", Single),
    asset("IP Address", Multi),
    asset("MAC Address", Single),
    asset("DNS Name", Multi),
    asset("URL/Endpoint", Multi),
    asset("Repository", Multi),
    asset("Cloud Provider", Single),
    asset("Cloud Account", Single),
    asset("Region", Single),
    asset("Last Seen Date", Single),
    asset(TAGS_FIELD, Multi),
];

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn field_names_are_unique_per_taxonomy() {
        for taxonomy in Taxonomy::ALL {
            let names: BTreeSet<String> = taxonomy
                .fields()
                .iter()
                .map(|f| f.name.to_ascii_lowercase())
                .collect();
            assert_eq!(names.len(), taxonomy.fields().len(), "{taxonomy}");
        }
    }

    #[test]
    fn fields_carry_their_taxonomy() {
        for taxonomy in Taxonomy::ALL {
            assert!(taxonomy.fields().iter().all(|f| f.taxonomy == taxonomy));
        }
    }

    #[test]
    fn multi_valued_fields_follow_policy() {
        let finding_multi: Vec<&str> = FINDING_FIELDS
            .iter()
            .filter(|f| f.is_multi())
            .map(|f| f.name)
            .collect();
        assert_eq!(
            finding_multi,
            vec![
                "Description",
                "Steps to Reproduce",
                "Impact",
                "Remediation",
                "Tags",
                "URL/Endpoint",
                "IP Addresses",
                "Repository",
            ]
        );

        let asset_multi: Vec<&str> = ASSET_FIELDS
            .iter()
            .filter(|f| f.is_multi())
            .map(|f| f.name)
            .collect();
        assert_eq!(
            asset_multi,
            vec!["IP Address", "DNS Name", "URL/Endpoint", "Repository", "Tags"]
        );
    }

    #[test]
    fn finding_fields_use_declared_categories() {
        for field in FINDING_FIELDS {
            let category = field.category.expect("finding fields are categorised");
            assert!(FINDING_CATEGORIES.contains(&category), "{}", field.name);
        }
        assert!(ASSET_FIELDS.iter().all(|f| f.category.is_none()));
    }

    #[test]
    fn narrative_sections_are_multi_valued_finding_fields() {
        for section in NarrativeSection::ALL {
            let field = Taxonomy::Finding
                .field(section.field_name())
                .expect("narrative field exists");
            assert!(field.is_multi());
            assert_eq!(
                NarrativeSection::from_field_name(section.field_name()),
                Some(section)
            );
        }
    }

    #[test]
    fn parses_taxonomy_identifiers() {
        assert_eq!("finding".parse::<Taxonomy>(), Ok(Taxonomy::Finding));
        assert_eq!(" Asset ".parse::<Taxonomy>(), Ok(Taxonomy::Asset));
        assert!(matches!(
            "vendor".parse::<Taxonomy>(),
            Err(ModelError::UnknownTaxonomy(_))
        ));
    }

    #[test]
    fn none_field_is_recognised_case_insensitively() {
        assert!(is_none_field("None"));
        assert!(is_none_field(" none "));
        assert!(!is_none_field("Summary"));
        assert!(Taxonomy::Finding.field(NONE_FIELD).is_none());
    }
}
