//! Data model for the field mapper.
//!
//! This crate holds the types every other crate agrees on:
//!
//! - **Taxonomies**: the two fixed target-field catalogs ([`Taxonomy::Finding`]
//!   and [`Taxonomy::Asset`]) with their categories and multiplicities
//! - **Flat records**: discovered dotted-path keys and their leaf values
//! - **Value formatting**: the display text used by tables and documents

pub mod error;
pub mod record;
pub mod registry;
pub mod taxonomy;
pub mod value;

pub use error::{ModelError, Result};
pub use record::{FlatRecord, SourceFormat};
pub use registry::{FieldGroup, fields_for, is_known_field, multiplicity_of};
pub use taxonomy::{
    ASSET_FIELDS, FINDING_CATEGORIES, FINDING_FIELDS, Multiplicity, NONE_FIELD, NarrativeSection,
    TAGS_FIELD, TargetField, Taxonomy, is_none_field,
};
pub use value::{MISSING_VALUE, format_value, last_segment};
