//! Field mapping for flattened records.
//!
//! - **Resolution**: [`resolve`] proposes a target field for a dotted key from
//!   its last segment, using exact names, the alias tables in [`rules`] and a
//!   tag fallback
//! - **State**: [`MappingState`] holds one [`Binding`] per field and keeps
//!   every key owned by at most one field
//! - **Seeding**: [`seed`] builds the initial mapping for a processed record
//! - **Composer**: [`ComposerLayout`] arranges keys bound to the narrative
//!   fields into a document
//! - **Session**: [`EditorSession`] ties record, mapping and layout together
//!   and applies [`EditorEvent`]s
//! - **Presets**: [`PresetRepository`] stores named mappings on disk

#![deny(unsafe_code)]

mod binder;
mod composer;
mod error;
mod repository;
mod resolver;
pub mod rules;
mod session;
mod state;

// === Error Types ===
pub use error::{MappingError, RepositoryError, RepositoryResult, Result};

// === Resolution ===
pub use resolver::{Resolution, ResolutionRule, resolve, resolve_explained};
pub use rules::{ASSET_ALIASES, AliasRule, FINDING_ALIASES, IGNORED_KEYS, KeyMatcher, is_ignored_key};

// === Mapping State ===
pub use binder::seed;
pub use state::{Binding, MappingSnapshot, MappingState, MappingSummary};

// === Composer ===
pub use composer::{
    ComposerEntry, ComposerLayout, KNOWN_ACRONYMS, LayoutItem, RenderedBlock, format_key_title,
};

// === Session ===
pub use session::{EditorEvent, EditorSession};

// === Presets ===
pub use repository::{PRESET_FORMAT_VERSION, PresetMetadata, PresetRepository, SavedMapping};
