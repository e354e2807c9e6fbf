//! Removal of resources owned by unused types.

use log::{debug, info};

use crate::{
    metadata::store::MetadataStore,
    strip::{cleanup::CleanupStats, nodes::UnusedSet},
    Result,
};

/// Removes every resource named after an unused type (`<FullTypeName>.resources`).
///
/// Matching uses the names captured in the unused set, so this works before and after
/// the types themselves are removed. Resources that do not follow the naming convention
/// are kept.
///
/// # Errors
/// Currently infallible; returns `Result` for symmetry with the other cleanup phases.
pub fn remove_unused_resources(
    module: &mut dyn MetadataStore,
    unused: &UnusedSet,
) -> Result<CleanupStats> {
    let mut doomed = Vec::new();
    for resource in module.resources() {
        match resource.owner_name() {
            Some(owner) if unused.contains_name(&owner) => doomed.push(resource.name.clone()),
            Some(_) => {}
            None => debug!("Resource '{}' is not named after a class, keeping it", resource.name),
        }
    }

    let mut stats = CleanupStats::new();
    for name in doomed {
        if module.remove_resource(&name).is_some() {
            debug!("Removed resource '{name}'");
            stats.resources_removed += 1;
        }
    }

    info!("Resource cleanup of '{}': {}", module.name(), stats);
    Ok(stats)
}
