//! The classification step between mark and sweep.

use log::info;

use crate::{
    metadata::store::MetadataStore,
    strip::nodes::{UnusedSet, UsedSet},
    Error, Result,
};

/// Computes the types of the module that are not in the used set.
///
/// The names of the unused types are captured so that resource cleanup can still match
/// them after the types are gone.
///
/// # Errors
/// - [`Error::Configuration`] if the used set was computed for a different module
/// - [`Error::Malformed`] if a type's enclosing chain is broken
pub fn classify(module: &dyn MetadataStore, used: &UsedSet) -> Result<UnusedSet> {
    if used.module() != module.name() {
        return Err(Error::Configuration(format!(
            "Used set was computed for module '{}', not '{}'",
            used.module(),
            module.name()
        )));
    }

    let mut unused = UnusedSet::default();
    let tokens = module.type_tokens();
    for token in &tokens {
        if used.contains_local(*token) {
            continue;
        }

        let name = module
            .type_name(*token)
            .ok_or_else(|| malformed_error!("Type {} has a broken enclosing chain", token))?;
        unused.insert(*token, name);
    }

    info!(
        "{} of {} types in '{}' are unused",
        unused.len(),
        tokens.len(),
        module.name()
    );
    Ok(unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::builder::{ModuleBuilder, TypeBuilder},
        strip::scan,
    };

    #[test]
    fn test_partition() {
        let mut builder = ModuleBuilder::new("Sample");
        let a = builder.add_type(TypeBuilder::new("Sample", "A")).unwrap();
        let b = builder.add_type(TypeBuilder::new("Sample", "B")).unwrap();
        let module = builder.build();

        let used = scan(&module, ["Sample.A"], None).unwrap();
        let unused = classify(&module, &used).unwrap();

        assert!(!unused.contains(a));
        assert!(unused.contains(b));
        assert_eq!(unused.len() + used.local_len(), module.type_count());
        assert!(unused.contains_name(&"Sample.B".parse().unwrap()));
    }

    #[test]
    fn test_foreign_used_set_is_rejected() {
        let other = ModuleBuilder::new("Other").build();
        let module = ModuleBuilder::new("Sample").build();

        let used = scan(&other, Vec::<&str>::new(), None).unwrap();
        assert!(matches!(
            classify(&module, &used),
            Err(Error::Configuration(_))
        ));
    }
}
