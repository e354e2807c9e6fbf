//! Removal of unused types.

use log::{debug, info};

use crate::{
    metadata::{
        store::MetadataStore,
        token::{TableId, Token},
    },
    strip::{
        cleanup::CleanupStats,
        edges::{outgoing_edges, EdgeTarget},
        nodes::UnusedSet,
    },
    Error, Result,
};

/// Removes every unused type still present in the module.
///
/// Types are removed deepest nested first, then in descending token order, so every
/// removal sees an intact enclosing chain. Types that are already gone are skipped, which
/// makes repeated calls with the same set a no-op.
///
/// Before anything is mutated the classification is checked against the current module:
/// an unused type must not enclose a surviving one, and no surviving type may reference
/// an unused one.
///
/// # Errors
/// Returns [`Error::InvariantViolation`] if the check fails; the module is left untouched.
pub fn remove_unused_classes(
    module: &mut dyn MetadataStore,
    unused: &UnusedSet,
) -> Result<CleanupStats> {
    verify_removal(&*module, unused)?;

    let mut order: Vec<(usize, Token)> = unused
        .iter()
        .filter(|(token, _)| module.type_def(**token).is_some())
        .map(|(token, name)| (name.depth(), *token))
        .collect();
    order.sort_unstable_by(|a, b| b.cmp(a));

    let mut stats = CleanupStats::new();
    for (_, token) in order {
        if module.type_def(token).is_none() {
            continue;
        }
        for def in module.remove_type(token)? {
            debug!("Removed type {}.{} ({})", def.namespace, def.name, def.token);
            stats.record_type(&def);
        }
    }

    info!("Class cleanup of '{}': {}", module.name(), stats);
    Ok(stats)
}

fn verify_removal(module: &dyn MetadataStore, unused: &UnusedSet) -> Result<()> {
    for token in module.type_tokens() {
        let Some(def) = module.type_def(token) else {
            continue;
        };

        if unused.contains(token) {
            if let Some(child) = def.nested_types.iter().find(|child| !unused.contains(**child)) {
                return Err(Error::InvariantViolation(format!(
                    "unused type {} encloses surviving type {}",
                    display_name(module, token),
                    display_name(module, *child)
                )));
            }
            continue;
        }

        for edge in outgoing_edges(module, token)? {
            let target = match &edge.target {
                EdgeTarget::Token(target) if target.is_table(TableId::TypeDef) => Some(*target),
                EdgeTarget::Named { assembly, name }
                    if assembly
                        .as_deref()
                        .map_or(true, |assembly| assembly.eq_ignore_ascii_case(module.name())) =>
                {
                    module.find_type(name)
                }
                _ => None,
            };

            if let Some(target) = target.filter(|target| unused.contains(*target)) {
                return Err(Error::InvariantViolation(format!(
                    "surviving type {} references unused type {} ({})",
                    display_name(module, token),
                    display_name(module, target),
                    edge.kind
                )));
            }
        }
    }
    Ok(())
}

fn display_name(module: &dyn MetadataStore, token: Token) -> String {
    module
        .type_name(token)
        .map_or_else(|| token.to_string(), |name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            builder::{ModuleBuilder, TypeBuilder},
            members::Field,
            signatures::TypeSignature,
        },
        strip::{classify, scan},
    };

    #[test]
    fn test_removal_is_idempotent() {
        let mut builder = ModuleBuilder::new("Sample");
        let a = builder.add_type(TypeBuilder::new("Sample", "A")).unwrap();
        let b = builder.add_type(TypeBuilder::new("Sample", "B")).unwrap();
        let mut module = builder.build();

        let used = scan(&module, ["Sample.A"], None).unwrap();
        let unused = classify(&module, &used).unwrap();

        let first = remove_unused_classes(&mut module, &unused).unwrap();
        assert_eq!(first.types_removed, 1);
        assert!(module.type_def(b).is_none());
        assert!(module.type_def(a).is_some());

        let second = remove_unused_classes(&mut module, &unused).unwrap();
        assert!(!second.has_changes());
    }

    #[test]
    fn test_nested_types_removed_innermost_first() {
        let mut builder = ModuleBuilder::new("Sample");
        let outer = builder.add_type(TypeBuilder::new("Sample", "Outer")).unwrap();
        let inner = builder
            .add_nested_type(outer, TypeBuilder::nested("Inner"))
            .unwrap();
        let mut module = builder.build();

        let used = scan(&module, Vec::<&str>::new(), None).unwrap();
        let unused = classify(&module, &used).unwrap();
        let stats = remove_unused_classes(&mut module, &unused).unwrap();

        assert_eq!(stats.types_removed, 2);
        assert!(module.type_def(outer).is_none());
        assert!(module.type_def(inner).is_none());
    }

    #[test]
    fn test_stale_classification_is_rejected() {
        let mut builder = ModuleBuilder::new("Sample");
        let a = builder.add_type(TypeBuilder::new("Sample", "A")).unwrap();
        let b = builder.add_type(TypeBuilder::new("Sample", "B")).unwrap();
        let mut module = builder.build();

        let used = scan(&module, ["Sample.A"], None).unwrap();
        let unused = classify(&module, &used).unwrap();

        // A starts depending on B after classification
        module
            .type_def_mut(a)
            .unwrap()
            .fields
            .push(Field::new("b", TypeSignature::Class(b)));

        let result = remove_unused_classes(&mut module, &unused);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
        assert!(module.type_def(b).is_some());
    }

    #[test]
    fn test_unused_parent_of_surviving_child_is_rejected() {
        let mut builder = ModuleBuilder::new("Sample");
        let outer = builder.add_type(TypeBuilder::new("Sample", "Outer")).unwrap();
        builder
            .add_nested_type(outer, TypeBuilder::nested("Inner"))
            .unwrap();
        let mut module = builder.build();

        let mut unused = UnusedSet::default();
        unused.insert(outer, "Sample.Outer".parse().unwrap());

        let result = remove_unused_classes(&mut module, &unused);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
        assert_eq!(module.type_count(), 3);
    }
}
