//! Initial binding of a freshly processed record.

use fmap_model::{FlatRecord, Taxonomy};
use tracing::{debug, info};

use crate::resolver::resolve;
use crate::rules::is_ignored_key;
use crate::state::MappingState;

/// Seeds a mapping from the resolver's proposals.
///
/// Keys are visited in discovery order. Multi-valued fields collect every
/// matching key; single-valued fields keep the first key that resolved to
/// them. Envelope keys and keys the resolver cannot place stay unbound.
pub fn seed(record: &FlatRecord, taxonomy: Taxonomy) -> MappingState {
    let mut state = MappingState::new(taxonomy);
    let mut unresolved = 0usize;
    for key in record.keys() {
        if is_ignored_key(key) {
            continue;
        }
        let Some(field) = resolve(key, taxonomy) else {
            unresolved += 1;
            continue;
        };
        if field.is_multi() || !state.binding_of(field).is_bound() {
            state.bind(field, key);
        } else {
            debug!(key, field = field.name, "field already bound, keeping first key");
        }
    }
    info!(
        %taxonomy,
        keys = record.len(),
        bound_fields = state.bound_count(),
        unresolved,
        "seeded mapping"
    );
    state
}
