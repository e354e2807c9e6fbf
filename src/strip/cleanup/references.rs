//! Pruning of assembly references that nothing mentions anymore.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::{
    metadata::{
        references::ResolutionScope,
        store::MetadataStore,
        token::{TableId, Token},
    },
    strip::{
        cleanup::CleanupStats,
        edges::{attribute_edges, outgoing_edges, EdgeTarget},
    },
    Result,
};

/// Collects the assembly references mentioned by the types currently in the module and by
/// the assembly-level attributes.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the module contains dangling tokens.
pub fn mentioned_references(module: &dyn MetadataStore) -> Result<BTreeSet<Token>> {
    let mut edges = attribute_edges(module, module.module_attributes())?;
    for token in module.type_tokens() {
        edges.extend(outgoing_edges(module, token)?);
    }

    let mut mentioned = BTreeSet::new();
    for edge in edges {
        match edge.target {
            EdgeTarget::Token(token) if token.is_table(TableId::TypeRef) => {
                if let Some(ResolutionScope::AssemblyRef(assembly)) =
                    module.type_ref_root_scope(token)
                {
                    mentioned.insert(assembly);
                }
            }
            EdgeTarget::Named {
                assembly: Some(assembly),
                ..
            } => {
                if let Some(reference) = module.assembly_ref_by_name(&assembly) {
                    mentioned.insert(reference);
                }
            }
            _ => {}
        }
    }
    Ok(mentioned)
}

/// Removes every assembly reference that no surviving type mentions.
///
/// The mention set is computed over the module as it is now, so this has to run after
/// class removal to see the effect of it. The core library reference is always kept.
/// Type references, type specifications, member references and method instantiations
/// scoped to a removed reference are removed with it.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the module contains dangling tokens.
pub fn prune_unused_references(module: &mut dyn MetadataStore) -> Result<CleanupStats> {
    let mentioned = mentioned_references(&*module)?;
    let core = module.core_reference();

    let mut stats = CleanupStats::new();
    for token in module.assembly_ref_tokens() {
        if mentioned.contains(&token) || Some(token) == core {
            continue;
        }

        let name = module
            .assembly_ref(token)
            .map(|reference| reference.name.clone())
            .unwrap_or_default();
        let removal = module.remove_assembly_ref(token)?;
        debug!(
            "Removed reference '{name}' with {} dependent rows",
            removal.total()
        );

        stats.references_removed += 1;
        stats.typerefs_removed += removal.type_refs;
        stats.typespecs_removed += removal.type_specs;
        stats.memberrefs_removed += removal.member_refs;
        stats.methodspecs_removed += removal.method_specs;
    }

    info!("Reference cleanup of '{}': {}", module.name(), stats);
    Ok(stats)
}
