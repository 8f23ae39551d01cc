//! Editor session: the record being mapped and everything derived from it.

use fmap_model::{FlatRecord, NONE_FIELD, Taxonomy};
use tracing::{debug, info};

use crate::binder::seed;
use crate::composer::{ComposerLayout, RenderedBlock};
use crate::error::{MappingError, Result};
use crate::state::{MappingSnapshot, MappingState};

/// A user edit to the mapping or the composed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Bind `key` to `field`, or unmap it when `field` is `None`.
    SetFieldForKey { field: String, key: String },
    /// Unbind every key of a field.
    ClearField(String),
    /// Move a composer entry to a new index.
    ReorderComposerEntry { key: String, index: usize },
}

/// Taxonomy, record, mapping and composer layout of one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    taxonomy: Taxonomy,
    record: Option<FlatRecord>,
    state: MappingState,
    layout: ComposerLayout,
}

impl EditorSession {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            record: None,
            state: MappingState::new(taxonomy),
            layout: ComposerLayout::default(),
        }
    }

    /// Starts over on `record`, seeding the mapping and building the layout.
    pub fn process(&mut self, record: FlatRecord) {
        self.state = seed(&record, self.taxonomy);
        self.layout = ComposerLayout::build(&self.state);
        self.record = Some(record);
    }

    /// Restores a saved mapping over its record.
    ///
    /// The layout is rebuilt from the bindings; manual entry order is not
    /// part of a snapshot.
    pub fn restore(record: FlatRecord, snapshot: &MappingSnapshot) -> Result<Self> {
        let state = MappingState::from_snapshot(snapshot)?;
        let layout = ComposerLayout::build(&state);
        info!(
            taxonomy = %snapshot.taxonomy,
            bound_fields = state.bound_count(),
            "restored mapping"
        );
        Ok(Self {
            taxonomy: snapshot.taxonomy,
            record: Some(record),
            state,
            layout,
        })
    }

    /// Switches taxonomy, leaving every field of the new one unbound.
    pub fn switch_taxonomy(&mut self, taxonomy: Taxonomy) {
        self.taxonomy = taxonomy;
        self.state.switch_taxonomy(taxonomy);
        self.layout = ComposerLayout::default();
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy
    }

    pub fn record(&self) -> Option<&FlatRecord> {
        self.record.as_ref()
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }

    pub fn layout(&self) -> &ComposerLayout {
        &self.layout
    }

    /// Applies one editor event.
    ///
    /// On error nothing has changed.
    pub fn apply(&mut self, event: &EditorEvent) -> Result<()> {
        debug!(?event, "applying editor event");
        match event {
            EditorEvent::SetFieldForKey { field, key } => self.set_field_for_key(field, key),
            EditorEvent::ClearField(field) => self.clear_field(field).map(|_| ()),
            EditorEvent::ReorderComposerEntry { key, index } => {
                self.reorder_composer_entry(key, *index).map(|_| ())
            }
        }
    }

    /// Moves `key` from its current field (if any) to `field`.
    pub fn set_field_for_key(&mut self, field: &str, key: &str) -> Result<()> {
        let record = self.record.as_ref().ok_or(MappingError::NoRecord)?;
        if !record.contains_key(key) {
            return Err(MappingError::KeyNotFound(key.to_string()));
        }
        let old = self.state.owner_of(key).map_or(NONE_FIELD, |owner| owner.name);
        self.state.reassign_field(old, field, key)?;
        self.layout.sync(&self.state);
        Ok(())
    }

    pub fn clear_field(&mut self, field: &str) -> Result<Vec<String>> {
        let released = self.state.clear_field(field)?;
        self.layout.sync(&self.state);
        Ok(released)
    }

    pub fn reorder_composer_entry(&mut self, key: &str, index: usize) -> Result<usize> {
        self.layout.move_entry(key, index)
    }

    /// Keys of the record not bound to any field.
    pub fn unmapped_keys(&self) -> Vec<&str> {
        self.record
            .as_ref()
            .map(|record| self.state.unmapped_keys(record))
            .unwrap_or_default()
    }

    /// The composed document for the current record.
    pub fn render(&self) -> Result<Vec<RenderedBlock>> {
        let record = self.record.as_ref().ok_or(MappingError::NoRecord)?;
        Ok(self.layout.render(record))
    }
}
