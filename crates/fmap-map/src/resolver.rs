//! Heuristic resolution of source keys to target fields.

use fmap_model::{TAGS_FIELD, TargetField, Taxonomy, last_segment};

use crate::rules::{TAG_FALLBACK, aliases_for};

/// Which resolution step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    /// The key segment equals a field name, ignoring case.
    ExactName,
    /// An alias rule matched; `index` is its position in the taxonomy's table.
    Alias { index: usize },
    /// The key segment mentions tags.
    TagFallback,
}

/// A resolved target and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub field: &'static TargetField,
    pub rule: ResolutionRule,
}

/// Proposes the target field for `key`, or `None` when nothing matches.
///
/// Only the last dot-segment of the key is considered. The result depends on
/// nothing but the key and the taxonomy.
pub fn resolve(key: &str, taxonomy: Taxonomy) -> Option<&'static TargetField> {
    resolve_explained(key, taxonomy).map(|resolution| resolution.field)
}

/// Like [`resolve`], but also reports which rule matched.
pub fn resolve_explained(key: &str, taxonomy: Taxonomy) -> Option<Resolution> {
    let segment = last_segment(key).to_lowercase();
    if segment.is_empty() {
        return None;
    }

    if let Some(field) = taxonomy.field_ignore_case(&segment) {
        return Some(Resolution {
            field,
            rule: ResolutionRule::ExactName,
        });
    }

    let alias = aliases_for(taxonomy)
        .iter()
        .enumerate()
        .filter(|(_, alias)| alias.matcher.matches(&segment))
        .find_map(|(index, alias)| {
            taxonomy.field(alias.target).map(|field| Resolution {
                field,
                rule: ResolutionRule::Alias { index },
            })
        });
    if alias.is_some() {
        return alias;
    }

    if segment.contains(TAG_FALLBACK) {
        return taxonomy.field(TAGS_FIELD).map(|field| Resolution {
            field,
            rule: ResolutionRule::TagFallback,
        });
    }

    None
}
