//! Mapping state: which source keys are bound to which target fields.
//!
//! The state always holds one [`Binding`] per field of the active taxonomy and
//! a reverse index from key to owning field. Every transition keeps both in
//! step, so a key is owned by at most one field and the shape of each binding
//! follows the field's multiplicity.

use std::collections::BTreeMap;

use fmap_model::{FlatRecord, TAGS_FIELD, TargetField, Taxonomy, is_none_field};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MappingError, Result};
use crate::rules::is_ignored_key;

/// Keys bound to one target field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    #[default]
    Unbound,
    /// Single-valued field bound to one key.
    Single(String),
    /// Multi-valued field bound to a non-empty ordered set of keys.
    Multiple(Vec<String>),
}

impl Binding {
    /// Bound keys in order; empty when unbound.
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Unbound => &[],
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multiple(keys) => keys,
        }
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::Unbound)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().iter().any(|bound| bound == key)
    }

    fn remove(&mut self, key: &str) -> bool {
        match self {
            Self::Unbound => false,
            Self::Single(bound) => {
                if bound == key {
                    *self = Self::Unbound;
                    true
                } else {
                    false
                }
            }
            Self::Multiple(keys) => {
                let before = keys.len();
                keys.retain(|bound| bound != key);
                let removed = keys.len() != before;
                if keys.is_empty() {
                    *self = Self::Unbound;
                }
                removed
            }
        }
    }
}

/// Serializable form of a [`MappingState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSnapshot {
    pub taxonomy: Taxonomy,
    /// Bound fields only, keyed by field name.
    pub bindings: BTreeMap<String, Binding>,
}

/// Counts and gaps of a mapping, as shown after processing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSummary {
    pub taxonomy: Taxonomy,
    /// Bound fields, not counting the tag field.
    pub mapped_fields: usize,
    /// All fields, not counting the tag field.
    pub total_fields: usize,
    /// Unbound fields by category, categories in catalog order.
    pub unmapped_by_category: Vec<(Option<&'static str>, Vec<&'static str>)>,
}

impl MappingSummary {
    pub fn unmapped_count(&self) -> usize {
        self.unmapped_by_category
            .iter()
            .map(|(_, fields)| fields.len())
            .sum()
    }
}

/// Bindings of the active taxonomy plus the key ownership index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingState {
    taxonomy: Taxonomy,
    bindings: BTreeMap<&'static str, Binding>,
    owners: BTreeMap<String, &'static str>,
}

impl MappingState {
    /// All fields of `taxonomy`, unbound.
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            bindings: taxonomy
                .fields()
                .iter()
                .map(|field| (field.name, Binding::Unbound))
                .collect(),
            owners: BTreeMap::new(),
        }
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy
    }

    /// Looks up a field of the active taxonomy.
    ///
    /// Names are matched ignoring ASCII case so editor input need not be
    /// exact.
    pub fn target(&self, field: &str) -> Result<&'static TargetField> {
        self.taxonomy
            .field_ignore_case(field)
            .ok_or_else(|| MappingError::UnknownField {
                taxonomy: self.taxonomy,
                field: field.to_string(),
            })
    }

    pub fn binding(&self, field: &str) -> Result<&Binding> {
        let target = self.target(field)?;
        Ok(self.binding_of(target))
    }

    pub(crate) fn binding_of(&self, target: &TargetField) -> &Binding {
        self.bindings.get(target.name).unwrap_or(&Binding::Unbound)
    }

    /// The field currently owning `key`, if any.
    pub fn owner_of(&self, key: &str) -> Option<&'static TargetField> {
        self.owners
            .get(key)
            .and_then(|name| self.taxonomy.field(name))
    }

    /// Every field of the taxonomy with its binding, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static TargetField, &Binding)> {
        self.taxonomy
            .fields()
            .iter()
            .map(|field| (field, self.binding_of(field)))
    }

    /// Number of bound fields.
    pub fn bound_count(&self) -> usize {
        self.bindings.values().filter(|b| b.is_bound()).count()
    }

    /// Keys of `record` that are neither bound nor ignored, in discovery order.
    pub fn unmapped_keys<'a>(&self, record: &'a FlatRecord) -> Vec<&'a str> {
        record
            .keys()
            .filter(|key| !self.owners.contains_key(*key) && !is_ignored_key(key))
            .collect()
    }

    /// Binds `key` to `field`, releasing any other owner of `key` first.
    ///
    /// A single-valued field drops its previous key; a multi-valued field
    /// appends `key` unless already present. Binding an already-bound pair is
    /// a no-op.
    pub fn bind_key(&mut self, field: &str, key: &str) -> Result<()> {
        let target = self.target(field)?;
        self.bind(target, key);
        Ok(())
    }

    pub(crate) fn bind(&mut self, target: &'static TargetField, key: &str) {
        match self.owners.get(key).copied() {
            Some(owner) if owner == target.name => return,
            Some(owner) => {
                debug!(key, from = owner, to = target.name, "moving key to new field");
                self.release(owner, key);
            }
            None => {}
        }

        let binding = self.bindings.entry(target.name).or_default();
        if target.is_multi() {
            match binding {
                Binding::Multiple(keys) => keys.push(key.to_string()),
                _ => *binding = Binding::Multiple(vec![key.to_string()]),
            }
        } else {
            let previous = std::mem::replace(binding, Binding::Single(key.to_string()));
            for dropped in previous.keys() {
                debug!(field = target.name, key = %dropped, "replacing bound key");
                self.owners.remove(dropped);
            }
        }
        self.owners.insert(key.to_string(), target.name);
    }

    /// Removes `key` from `field`. Returns whether anything changed.
    pub fn unbind_key(&mut self, field: &str, key: &str) -> Result<bool> {
        let target = self.target(field)?;
        if self.owners.get(key).copied() != Some(target.name) {
            return Ok(false);
        }
        self.release(target.name, key);
        Ok(true)
    }

    /// Moves `key` from `old` to `new`.
    ///
    /// Either side may be the `None` pseudo-field: `old` for a key that was
    /// unmapped, `new` to unmap it. Both names are checked before anything
    /// changes.
    pub fn reassign_field(&mut self, old: &str, new: &str, key: &str) -> Result<()> {
        let old = (!is_none_field(old)).then(|| self.target(old)).transpose()?;
        let new = (!is_none_field(new)).then(|| self.target(new)).transpose()?;
        if let Some(old) = old {
            self.unbind_key(old.name, key)?;
        }
        if let Some(new) = new {
            self.bind(new, key);
        }
        Ok(())
    }

    /// Unbinds every key of `field`, returning the released keys.
    pub fn clear_field(&mut self, field: &str) -> Result<Vec<String>> {
        let target = self.target(field)?;
        let previous = self
            .bindings
            .insert(target.name, Binding::Unbound)
            .unwrap_or_default();
        let released = previous.keys().to_vec();
        for key in &released {
            self.owners.remove(key);
        }
        Ok(released)
    }

    /// Discards every binding and starts over on `taxonomy`.
    pub fn switch_taxonomy(&mut self, taxonomy: Taxonomy) {
        *self = Self::new(taxonomy);
    }

    /// Discards every binding, keeping the taxonomy.
    pub fn reset(&mut self) {
        *self = Self::new(self.taxonomy);
    }

    fn release(&mut self, field: &'static str, key: &str) {
        if let Some(binding) = self.bindings.get_mut(field) {
            binding.remove(key);
        }
        self.owners.remove(key);
    }

    /// Bound and unbound field counts, excluding the tag field.
    pub fn summary(&self) -> MappingSummary {
        let mut mapped_fields = 0;
        let mut total_fields = 0;
        let mut unmapped_by_category: Vec<(Option<&'static str>, Vec<&'static str>)> = Vec::new();
        for (field, binding) in self.iter() {
            if field.name == TAGS_FIELD {
                continue;
            }
            total_fields += 1;
            if binding.is_bound() {
                mapped_fields += 1;
                continue;
            }
            match unmapped_by_category
                .iter_mut()
                .find(|(category, _)| *category == field.category)
            {
                Some((_, fields)) => fields.push(field.name),
                None => unmapped_by_category.push((field.category, vec![field.name])),
            }
        }
        MappingSummary {
            taxonomy: self.taxonomy,
            mapped_fields,
            total_fields,
            unmapped_by_category,
        }
    }

    /// Checks that bindings and the ownership index agree.
    ///
    /// True when every field of the taxonomy has exactly one binding whose
    /// shape fits its multiplicity, and every bound key is owned by exactly
    /// the field that holds it.
    pub fn is_consistent(&self) -> bool {
        let fields = self.taxonomy.fields();
        if self.bindings.len() != fields.len() {
            return false;
        }
        let mut seen = 0;
        for field in fields {
            let Some(binding) = self.bindings.get(field.name) else {
                return false;
            };
            let shape_ok = match binding {
                Binding::Unbound => true,
                Binding::Single(_) => !field.is_multi(),
                Binding::Multiple(keys) => field.is_multi() && !keys.is_empty(),
            };
            if !shape_ok {
                return false;
            }
            for key in binding.keys() {
                if self.owners.get(key).copied() != Some(field.name) {
                    return false;
                }
                seen += 1;
            }
        }
        seen == self.owners.len()
    }

    pub fn to_snapshot(&self) -> MappingSnapshot {
        MappingSnapshot {
            taxonomy: self.taxonomy,
            bindings: self
                .iter()
                .filter(|(_, binding)| binding.is_bound())
                .map(|(field, binding)| (field.name.to_string(), binding.clone()))
                .collect(),
        }
    }

    /// Rebuilds a state by replaying the snapshot's bindings in catalog order.
    ///
    /// A snapshot naming a field outside its taxonomy is rejected.
    pub fn from_snapshot(snapshot: &MappingSnapshot) -> Result<Self> {
        let mut state = Self::new(snapshot.taxonomy);
        for name in snapshot.bindings.keys() {
            state.target(name)?;
        }
        for field in snapshot.taxonomy.fields() {
            let Some(binding) = snapshot.bindings.get(field.name) else {
                continue;
            };
            for key in binding.keys() {
                state.bind(field, key);
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding() -> MappingState {
        MappingState::new(Taxonomy::Finding)
    }

    #[test]
    fn new_state_is_total_and_unbound() {
        let state = finding();
        assert_eq!(state.iter().count(), Taxonomy::Finding.fields().len());
        assert!(state.iter().all(|(_, binding)| !binding.is_bound()));
        assert!(state.is_consistent());
    }

    #[test]
    fn single_field_replaces_previous_key() {
        let mut state = finding();
        state.bind_key("Severity", "a").unwrap();
        state.bind_key("Severity", "b").unwrap();
        assert_eq!(state.binding("Severity").unwrap(), &Binding::Single("b".into()));
        assert!(state.owner_of("a").is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn multi_field_appends_without_duplicates() {
        let mut state = finding();
        state.bind_key("Tags", "a").unwrap();
        state.bind_key("Tags", "b").unwrap();
        state.bind_key("Tags", "a").unwrap();
        assert_eq!(
            state.binding("Tags").unwrap(),
            &Binding::Multiple(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn key_moves_between_fields() {
        let mut state = finding();
        state.bind_key("Tags", "env.labels").unwrap();
        state.bind_key("Tags", "other").unwrap();
        state.bind_key("Severity", "env.labels").unwrap();
        assert_eq!(state.binding("Tags").unwrap().keys(), ["other".to_string()]);
        assert_eq!(state.owner_of("env.labels").map(|f| f.name), Some("Severity"));
        assert!(state.is_consistent());
    }

    #[test]
    fn emptied_multi_collapses_to_unbound() {
        let mut state = finding();
        state.bind_key("Tags", "a").unwrap();
        assert!(state.unbind_key("Tags", "a").unwrap());
        assert_eq!(state.binding("Tags").unwrap(), &Binding::Unbound);
        assert!(!state.unbind_key("Tags", "a").unwrap());
    }

    #[test]
    fn unbind_single_only_when_key_matches() {
        let mut state = finding();
        state.bind_key("Summary", "title").unwrap();
        assert!(!state.unbind_key("Summary", "name").unwrap());
        assert!(state.binding("Summary").unwrap().is_bound());
        assert!(state.unbind_key("Summary", "title").unwrap());
    }

    #[test]
    fn reassign_handles_none_on_either_side() {
        let mut state = finding();
        state.reassign_field("None", "Summary", "title").unwrap();
        assert_eq!(state.owner_of("title").map(|f| f.name), Some("Summary"));
        state.reassign_field("Summary", "CVE", "title").unwrap();
        assert_eq!(state.owner_of("title").map(|f| f.name), Some("CVE"));
        state.reassign_field("CVE", "None", "title").unwrap();
        assert!(state.owner_of("title").is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn unknown_field_is_an_error_and_changes_nothing() {
        let mut state = finding();
        state.bind_key("Summary", "title").unwrap();
        let before = state.clone();
        let err = state.reassign_field("Summary", "Hostname", "title").unwrap_err();
        assert_eq!(err.field(), Some("Hostname"));
        assert_eq!(state, before);
        assert!(state.bind_key("Nope", "x").is_err());
    }

    #[test]
    fn field_names_ignore_case() {
        let mut state = finding();
        state.bind_key("steps to reproduce", "repro").unwrap();
        assert!(state.binding("Steps to Reproduce").unwrap().contains("repro"));
    }

    #[test]
    fn clear_field_releases_keys() {
        let mut state = finding();
        state.bind_key("URL/Endpoint", "a").unwrap();
        state.bind_key("URL/Endpoint", "b").unwrap();
        let released = state.clear_field("URL/Endpoint").unwrap();
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
        assert!(state.owner_of("a").is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn switch_taxonomy_starts_over() {
        let mut state = finding();
        state.bind_key("Summary", "title").unwrap();
        state.switch_taxonomy(Taxonomy::Asset);
        assert_eq!(state.taxonomy(), Taxonomy::Asset);
        assert_eq!(state.iter().count(), Taxonomy::Asset.fields().len());
        assert_eq!(state.bound_count(), 0);
        assert!(state.owner_of("title").is_none());
    }

    #[test]
    fn summary_excludes_tags() {
        let mut state = finding();
        state.bind_key("Summary", "title").unwrap();
        state.bind_key("Tags", "tags").unwrap();
        let summary = state.summary();
        let total = Taxonomy::Finding.fields().len() - 1;
        assert_eq!(summary.total_fields, total);
        assert_eq!(summary.mapped_fields, 1);
        assert_eq!(summary.unmapped_count(), total - 1);
        assert_eq!(summary.unmapped_by_category[0].0, Some("Core"));
        assert!(!summary.unmapped_by_category[0].1.contains(&"Summary"));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut state = finding();
        state.bind_key("Summary", "title").unwrap();
        state.bind_key("Tags", "b").unwrap();
        state.bind_key("Tags", "a").unwrap();
        let snapshot = state.to_snapshot();
        assert_eq!(snapshot.bindings.len(), 2);
        assert_eq!(MappingState::from_snapshot(&snapshot).unwrap(), state);
    }

    #[test]
    fn snapshot_with_foreign_field_is_rejected() {
        let mut snapshot = MappingState::new(Taxonomy::Asset).to_snapshot();
        snapshot
            .bindings
            .insert("Severity".into(), Binding::Single("x".into()));
        assert!(matches!(
            MappingState::from_snapshot(&snapshot),
            Err(MappingError::UnknownField { .. })
        ));
    }

    #[test]
    fn binding_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Binding::Single("a".into())).unwrap(), r#""a""#);
        assert_eq!(
            serde_json::to_string(&Binding::Multiple(vec!["a".into()])).unwrap(),
            r#"["a"]"#
        );
        let parsed: Binding = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(parsed.keys(), ["x".to_string(), "y".to_string()]);
    }
}
