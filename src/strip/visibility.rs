//! Lowering the visibility of surviving public types.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::{
    metadata::{store::MetadataStore, token::Token},
    strip::scanner::resolve_type_names,
    Result,
};

/// Makes every public type internal, except the excluded ones.
///
/// `Public` becomes `NotPublic` and `NestedPublic` becomes `NestedAssembly`; other flags are
/// preserved. Reachability plays no role, so entry points are demoted unless they are
/// excluded. Running it twice demotes nothing the second time.
///
/// # Arguments
/// * `module` - The module to rewrite
/// * `exclusions` - Full names (`Namespace.Outer/Inner`) of types that stay public
///
/// # Returns
/// The number of types demoted.
///
/// # Errors
/// Returns [`crate::Error::Configuration`] if exclusions name types that are not in the
/// module; nothing is changed in that case.
pub fn demote_visibility<I, S>(module: &mut dyn MetadataStore, exclusions: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let excluded: BTreeSet<Token> = resolve_type_names(&*module, exclusions, "exclusion")?
        .into_iter()
        .collect();

    let mut demoted = 0;
    for token in module.type_tokens() {
        let Some(def) = module.type_def(token) else {
            continue;
        };

        let visibility = def.visibility();
        if !visibility.is_public() || excluded.contains(&token) {
            continue;
        }

        debug!(
            "Demoting {}.{} from {:?} to {:?}",
            def.namespace,
            def.name,
            visibility,
            visibility.demoted()
        );
        module.set_visibility(token, visibility.demoted())?;
        demoted += 1;
    }

    info!(
        "Demoted {demoted} public types in '{}' ({} excluded)",
        module.name(),
        excluded.len()
    );
    Ok(demoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            builder::{ModuleBuilder, TypeBuilder},
            typesystem::{TypeAttributes, TypeVisibility},
        },
        Error,
    };

    #[test]
    fn test_demotion_respects_exclusions() {
        let mut builder = ModuleBuilder::new("Sample");
        let api = builder.add_type(TypeBuilder::new("Sample", "Api").public()).unwrap();
        let helper = builder
            .add_type(
                TypeBuilder::new("Sample", "Helper")
                    .public()
                    .flags(TypeAttributes::SEALED),
            )
            .unwrap();
        let nested = builder
            .add_nested_type(api, TypeBuilder::nested("Options").nested_public())
            .unwrap();
        let private = builder
            .add_nested_type(api, TypeBuilder::nested("Cache"))
            .unwrap();
        let mut module = builder.build();

        let demoted = demote_visibility(&mut module, ["Sample.Api"]).unwrap();
        assert_eq!(demoted, 2);

        let visibility = |token| module.type_def(token).unwrap().visibility();
        assert_eq!(visibility(api), TypeVisibility::Public);
        assert_eq!(visibility(helper), TypeVisibility::NotPublic);
        assert_eq!(visibility(nested), TypeVisibility::NestedAssembly);
        assert_eq!(visibility(private), TypeVisibility::NestedPrivate);
        assert!(module
            .type_def(helper)
            .unwrap()
            .flags
            .contains(TypeAttributes::SEALED));
    }

    #[test]
    fn test_demotion_is_idempotent() {
        let mut builder = ModuleBuilder::new("Sample");
        builder.add_type(TypeBuilder::new("Sample", "Api").public()).unwrap();
        let mut module = builder.build();

        assert_eq!(demote_visibility(&mut module, Vec::<&str>::new()).unwrap(), 1);
        assert_eq!(demote_visibility(&mut module, Vec::<&str>::new()).unwrap(), 0);
    }

    #[test]
    fn test_unknown_exclusion_changes_nothing() {
        let mut builder = ModuleBuilder::new("Sample");
        let api = builder.add_type(TypeBuilder::new("Sample", "Api").public()).unwrap();
        let mut module = builder.build();

        let result = demote_visibility(&mut module, ["Sample.Missing"]);
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(module.type_def(api).unwrap().is_public());
    }
}
