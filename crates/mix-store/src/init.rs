//! Structural initialization of scenarios against the item registry.
//!
//! `initialize` makes sure every item the scenario's scheme requires exists
//! with the registry's dimension names. It never deletes or overwrites an
//! existing item with conforming structure; empty items with divergent
//! dimension names are silently re-created, non-empty ones are a schema
//! error naming the mismatched dims.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use mix_core::{registry, MixError, MixResult, Scenario};

/// Ensure every registry item for the scenario's scheme exists with the
/// correct dimensions. Safe to call repeatedly; identical-structure messages
/// are filtered so repeated runs stay quiet.
pub fn initialize(scn: &mut Scenario) -> MixResult<()> {
    let scheme = scn.scheme();
    let items: Vec<_> = registry().items_for(scheme);
    let mut already_logged: BTreeSet<String> = BTreeSet::new();

    scn.transact("initialize scenario structure", |scn| {
        for item in items {
            match scn.item(&item.name) {
                None => {
                    debug!(item = %item.name, "initializing item");
                    scn.init_item(item)?;
                }
                Some(existing) if existing.dims() == item.dims.as_slice() => {
                    // Identical structure; log once per item at most.
                    if already_logged.insert(item.name.clone()) {
                        debug!(item = %item.name, "item exists with conforming structure");
                    }
                }
                Some(existing) if existing.is_empty() => {
                    warn!(
                        item = %item.name,
                        "empty item has divergent dimension names; re-initializing"
                    );
                    scn.drop_item(&item.name)?;
                    scn.init_item(item)?;
                }
                Some(existing) => {
                    return Err(MixError::Schema(format!(
                        "item '{}' has dimension names {:?} but the registry requires {:?}; \
                         remove or migrate the data before initializing",
                        item.name,
                        existing.dims(),
                        item.dims
                    )));
                }
            }
        }
        Ok(())
    })
}
