//! Taxonomy registry queries.
//!
//! Thin lookups over the static catalogs in [`crate::taxonomy`]. Field names
//! are matched exactly here; callers that accept user input should go through
//! [`Taxonomy::field_ignore_case`] first.

use crate::taxonomy::{Multiplicity, TargetField, Taxonomy};

/// Fields of one category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    /// Category label, `None` for uncategorised catalogs.
    pub category: Option<&'static str>,
    pub fields: Vec<&'static TargetField>,
}

/// Fields of `taxonomy` grouped by category, categories in first-seen order.
pub fn fields_for(taxonomy: Taxonomy) -> Vec<FieldGroup> {
    let mut groups: Vec<FieldGroup> = Vec::new();
    for field in taxonomy.fields() {
        match groups.iter_mut().find(|g| g.category == field.category) {
            Some(group) => group.fields.push(field),
            None => groups.push(FieldGroup {
                category: field.category,
                fields: vec![field],
            }),
        }
    }
    groups
}

/// Multiplicity of `field` in `taxonomy`, `None` if the field is unknown.
pub fn multiplicity_of(taxonomy: Taxonomy, field: &str) -> Option<Multiplicity> {
    taxonomy.field(field).map(|f| f.multiplicity)
}

pub fn is_known_field(taxonomy: Taxonomy, name: &str) -> bool {
    taxonomy.field(name).is_some()
}
