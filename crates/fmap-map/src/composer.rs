//! Narrative document composition.
//!
//! The layout is a flat list of section headers and key entries. An entry's
//! section is never stored: it is whichever header precedes it, so moving an
//! entry past a header moves it into that section.

use std::collections::HashSet;

use fmap_model::{FlatRecord, NarrativeSection, Taxonomy, format_value, last_segment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MappingError, Result};
use crate::state::{Binding, MappingState};

/// Words rendered in upper case inside entry titles.
pub const KNOWN_ACRONYMS: &[&str] = &[
    "api", "cisa", "cvss", "dns", "fqdn", "http", "https", "ip", "kev", "mac", "os", "sla", "sql",
    "url", "uri", "uuid", "xss",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LayoutItem {
    Header(NarrativeSection),
    Entry(String),
}

/// An entry together with the section it currently falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerEntry<'a> {
    pub section: NarrativeSection,
    pub key: &'a str,
}

/// One block of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    /// A section title, the narrative field name.
    Heading(String),
    /// A key title ending in `:` and its formatted value.
    Entry { title: String, body: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerLayout {
    items: Vec<LayoutItem>,
}

impl ComposerLayout {
    /// Lays out every key bound to a narrative field.
    ///
    /// Sections appear in fixed order, each header followed by its keys in
    /// binding order. Sections without keys are left out.
    pub fn build(state: &MappingState) -> Self {
        let mut items = Vec::new();
        for section in NarrativeSection::ALL {
            let keys = narrative_keys(state, section);
            if keys.is_empty() {
                continue;
            }
            items.push(LayoutItem::Header(section));
            items.extend(keys.iter().cloned().map(LayoutItem::Entry));
        }
        Self { items }
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in layout order with their derived sections.
    pub fn entries(&self) -> Vec<ComposerEntry<'_>> {
        let mut current = None;
        let mut entries = Vec::new();
        for item in &self.items {
            match item {
                LayoutItem::Header(section) => current = Some(*section),
                LayoutItem::Entry(key) => {
                    if let Some(section) = current {
                        entries.push(ComposerEntry { section, key });
                    }
                }
            }
        }
        entries
    }

    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, LayoutItem::Entry(k) if k == key))
    }

    /// Section the entry for `key` currently falls under.
    pub fn section_of(&self, key: &str) -> Option<NarrativeSection> {
        self.entries()
            .into_iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.section)
    }

    /// Moves the entry for `key` to `new_index` and returns where it landed.
    ///
    /// The index counts headers and entries in the list with the entry
    /// removed. It is clamped to the end of the list and never placed ahead of
    /// the first header.
    pub fn move_entry(&mut self, key: &str, new_index: usize) -> Result<usize> {
        let from = self
            .position_of(key)
            .ok_or_else(|| MappingError::EntryNotFound(key.to_string()))?;
        let item = self.items.remove(from);
        let len = self.items.len();
        let index = new_index.min(len).max(1.min(len));
        self.items.insert(index, item);
        debug!(key, from, to = index, "moved composer entry");
        Ok(index)
    }

    /// Brings the layout in line with `state` while keeping manual order.
    ///
    /// Entries whose key is no longer bound to a narrative field are dropped.
    /// Newly bound keys are appended at the end of their field's section,
    /// adding the header in section order when it is missing.
    pub fn sync(&mut self, state: &MappingState) {
        let mut wanted: Vec<(NarrativeSection, &String)> = Vec::new();
        for section in NarrativeSection::ALL {
            for key in narrative_keys(state, section) {
                wanted.push((section, key));
            }
        }
        let bound: HashSet<&str> = wanted.iter().map(|(_, key)| key.as_str()).collect();
        self.items.retain(|item| match item {
            LayoutItem::Entry(key) => bound.contains(key.as_str()),
            LayoutItem::Header(_) => true,
        });

        for (section, key) in wanted {
            if self.position_of(key).is_some() {
                continue;
            }
            let end = self.section_end(section);
            self.items.insert(end, LayoutItem::Entry(key.clone()));
        }
    }

    /// Index just past the last item of `section`, inserting its header first
    /// if the layout lacks one.
    fn section_end(&mut self, section: NarrativeSection) -> usize {
        let header = self
            .items
            .iter()
            .position(|item| *item == LayoutItem::Header(section));
        let start = match header {
            Some(position) => position,
            None => {
                let position = self
                    .items
                    .iter()
                    .position(|item| matches!(item, LayoutItem::Header(other) if *other > section))
                    .unwrap_or(self.items.len());
                self.items.insert(position, LayoutItem::Header(section));
                position
            }
        };
        self.items[start + 1..]
            .iter()
            .position(|item| matches!(item, LayoutItem::Header(_)))
            .map_or(self.items.len(), |offset| start + 1 + offset)
    }

    /// Renders the layout against `record`.
    ///
    /// Headers whose section has no entries are skipped. Keys missing from the
    /// record render as `N/A`.
    pub fn render(&self, record: &FlatRecord) -> Vec<RenderedBlock> {
        let mut blocks = Vec::new();
        let mut pending = None;
        for item in &self.items {
            match item {
                LayoutItem::Header(section) => pending = Some(*section),
                LayoutItem::Entry(key) => {
                    if let Some(section) = pending.take() {
                        blocks.push(RenderedBlock::Heading(section.field_name().to_string()));
                    }
                    blocks.push(RenderedBlock::Entry {
                        title: format!("{}:", format_key_title(last_segment(key))),
                        body: format_value(record.get(key)),
                    });
                }
            }
        }
        blocks
    }
}

fn narrative_keys(state: &MappingState, section: NarrativeSection) -> &[String] {
    if state.taxonomy() != Taxonomy::Finding {
        return &[];
    }
    state
        .binding(section.field_name())
        .map(Binding::keys)
        .unwrap_or_default()
}

/// Turns a key segment into a display title.
///
/// Splits on `_`, `-`, whitespace and lower-to-upper camel case boundaries.
/// Words already in capitals are kept, known acronyms are upper-cased and
/// everything else is capitalised.
pub fn format_key_title(segment: &str) -> String {
    split_words(segment)
        .iter()
        .map(String::as_str)
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_words(segment: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in segment.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn title_word(word: &str) -> String {
    let has_letters = word.chars().any(char::is_alphabetic);
    if has_letters && word.chars().count() > 1 && !word.chars().any(char::is_lowercase) {
        return word.to_string();
    }
    let lower = word.to_lowercase();
    if KNOWN_ACRONYMS.contains(&lower.as_str()) {
        return lower.to_uppercase();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn state_with(bindings: &[(&str, &str)]) -> MappingState {
        let mut state = MappingState::new(Taxonomy::Finding);
        for (field, key) in bindings {
            state.bind_key(field, key).unwrap();
        }
        state
    }

    fn keys(layout: &ComposerLayout) -> Vec<String> {
        layout
            .items()
            .iter()
            .map(|item| match item {
                LayoutItem::Header(section) => format!("# {section}"),
                LayoutItem::Entry(key) => key.clone(),
            })
            .collect()
    }

    #[test]
    fn titles() {
        assert_eq!(format_key_title("cve_id"), "Cve Id");
        assert_eq!(format_key_title("cveID"), "Cve ID");
        assert_eq!(format_key_title("ID"), "ID");
        assert_eq!(format_key_title("url"), "URL");
        assert_eq!(format_key_title("remediationSteps"), "Remediation Steps");
        assert_eq!(format_key_title("base-score v3"), "Base Score V3");
        assert_eq!(format_key_title("x"), "X");
        assert_eq!(format_key_title(""), "");
    }

    #[test]
    fn build_orders_sections_and_skips_empty_ones() {
        let state = state_with(&[
            ("Remediation", "fix"),
            ("Description", "desc"),
            ("Description", "details.long"),
            ("Summary", "title"),
        ]);
        let layout = ComposerLayout::build(&state);
        assert_eq!(
            keys(&layout),
            vec!["# Description", "desc", "details.long", "# Remediation", "fix"]
        );
    }

    #[test]
    fn build_on_asset_state_is_empty() {
        let mut state = MappingState::new(Taxonomy::Asset);
        state.bind_key("Description", "notes").unwrap();
        assert!(ComposerLayout::build(&state).is_empty());
    }

    #[test]
    fn move_changes_derived_section() {
        let state = state_with(&[("Description", "desc"), ("Remediation", "fix")]);
        let mut layout = ComposerLayout::build(&state);
        assert_eq!(layout.section_of("desc"), Some(NarrativeSection::Description));

        let landed = layout.move_entry("desc", 3).unwrap();
        assert_eq!(landed, 3);
        assert_eq!(keys(&layout), vec!["# Description", "# Remediation", "fix", "desc"]);
        assert_eq!(layout.section_of("desc"), Some(NarrativeSection::Remediation));
    }

    #[test]
    fn move_clamps_both_ends() {
        let state = state_with(&[("Description", "a"), ("Description", "b")]);
        let mut layout = ComposerLayout::build(&state);
        assert_eq!(layout.move_entry("b", 0).unwrap(), 1);
        assert_eq!(keys(&layout), vec!["# Description", "b", "a"]);
        assert_eq!(layout.move_entry("b", 99).unwrap(), 2);
        assert_eq!(keys(&layout), vec!["# Description", "a", "b"]);
        assert!(matches!(
            layout.move_entry("missing", 1),
            Err(MappingError::EntryNotFound(_))
        ));
    }

    #[test]
    fn sync_keeps_manual_order() {
        let mut state = state_with(&[("Description", "a"), ("Description", "b")]);
        let mut layout = ComposerLayout::build(&state);
        layout.move_entry("b", 1).unwrap();

        state.bind_key("Impact", "blast").unwrap();
        state.bind_key("Description", "c").unwrap();
        state.unbind_key("Description", "a").unwrap();
        layout.sync(&state);
        assert_eq!(keys(&layout), vec!["# Description", "b", "c", "# Impact", "blast"]);

        state.bind_key("Steps to Reproduce", "steps").unwrap();
        layout.sync(&state);
        assert_eq!(
            keys(&layout),
            vec!["# Description", "b", "c", "# Steps to Reproduce", "steps", "# Impact", "blast"]
        );
    }

    #[test]
    fn render_skips_empty_sections_and_formats_values() {
        let state = state_with(&[("Description", "details.cve_id"), ("Impact", "impact")]);
        let mut layout = ComposerLayout::build(&state);
        layout.move_entry("details.cve_id", 3).unwrap();

        let mut record = FlatRecord::new();
        record.insert("details.cve_id", json!(["CVE-1", "CVE-2"]));
        let blocks = layout.render(&record);
        assert_eq!(
            blocks,
            vec![
                RenderedBlock::Heading("Impact".into()),
                RenderedBlock::Entry {
                    title: "Impact:".into(),
                    body: "N/A".into()
                },
                RenderedBlock::Entry {
                    title: "Cve Id:".into(),
                    body: "CVE-1, CVE-2".into()
                },
            ]
        );
    }
}
