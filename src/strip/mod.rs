//! Mark-sweep stripping of a CIL module.
//!
//! The pipeline has two halves. The mark phase ([`scan`]) walks the type graph from the
//! entry points and records every reachable type, following edges into dependency modules
//! when a resolver is available. [`classify`] turns the result into the set of unused
//! types of the primary module. The sweep phase ([`remove_unused_classes`],
//! [`remove_unused_resources`], [`prune_unused_references`]) removes them, and
//! [`demote_visibility`] locks down what remains.
//!
//! # Architecture
//!
//! Every phase is a free function over `&dyn MetadataStore`, so hosts can drive them one at
//! a time. [`Stripper`] wraps them with the caller's configuration and carries the scan and
//! classification results between calls.
//!
//! ```text
//! entry points ─► scan ─► UsedSet ─► classify ─► UnusedSet ─┬─► remove_unused_classes
//!                  │                                         ├─► remove_unused_resources
//!             resolver                                       │
//!                                                            └─► prune_unused_references
//! ```
//!
//! # Examples
//!
//! ```rust
//! use ilstrip::prelude::*;
//!
//! let mut builder = ModuleBuilder::new("Sample");
//! builder.add_type(TypeBuilder::new("Sample", "Program").public())?;
//! builder.add_type(TypeBuilder::new("Sample", "Leftover").public())?;
//!
//! let mut stripper = Stripper::new(builder.build())
//!     .with_entry_points(["Sample.Program"])
//!     .with_demotion(true);
//! let stats = stripper.run_all()?;
//!
//! assert_eq!(stats.types_removed, 1);
//! assert_eq!(stats.types_demoted, 1);
//! # Ok::<(), ilstrip::Error>(())
//! ```

use std::{collections::BTreeSet, sync::Arc};

use log::info;

use crate::{
    metadata::{module::ModuleDefinition, store::MetadataStore, typesystem::TypeName},
    resolver::AssemblyResolver,
    Error, Result,
};

mod classify;
mod cleanup;
mod edges;
mod nodes;
mod scanner;
mod visibility;

pub use classify::classify;
pub use cleanup::{
    mentioned_references, prune_unused_references, remove_unused_classes,
    remove_unused_resources, CleanupStats,
};
pub use edges::{attribute_edges, hierarchy_edges, outgoing_edges, Edge, EdgeKind, EdgeTarget};
pub use nodes::{TypeNode, UnusedSet, UsedSet};
pub use scanner::{scan, ScanStats};
use scanner::resolve_type_names;
pub use visibility::demote_visibility;

/// The stripping pipeline for one module.
///
/// Holds the module, the entry points and exclusions, an optional resolver for dependency
/// modules, and the results of the last scan and classification. Changing the entry points
/// or the resolver discards those results.
///
/// Exclusions are checked against the module before the scan, so a misspelled name fails
/// before anything is removed. An exclusion naming a type that the class cleanup removed is
/// ignored by [`Stripper::make_not_public`].
///
/// # Examples
///
/// ```rust
/// use ilstrip::prelude::*;
///
/// let mut builder = ModuleBuilder::new("Sample");
/// builder.add_type(TypeBuilder::new("Sample", "Program"))?;
/// builder.add_type(TypeBuilder::new("Sample", "Unused"))?;
///
/// let mut stripper = Stripper::new(builder.build());
/// stripper.add_entry_point("Sample.Program");
/// stripper.scan_used_classes()?;
/// stripper.scan_unused_classes()?;
///
/// let doomed: Vec<String> = stripper
///     .unused_type_names()?
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(doomed, ["Sample.Unused"]);
/// # Ok::<(), ilstrip::Error>(())
/// ```
pub struct Stripper<S: MetadataStore = ModuleDefinition> {
    module: S,
    resolver: Option<Arc<dyn AssemblyResolver>>,
    entry_points: BTreeSet<String>,
    exclusions: BTreeSet<String>,
    demote: bool,
    used: Option<UsedSet>,
    unused: Option<UnusedSet>,
    /// Types removed by [`Stripper::cleanup_unused_classes`]
    removed: BTreeSet<TypeName>,
}

impl<S: MetadataStore> Stripper<S> {
    /// Creates a pipeline without entry points, exclusions or resolver.
    pub fn new(module: S) -> Self {
        Stripper {
            module,
            resolver: None,
            entry_points: BTreeSet::new(),
            exclusions: BTreeSet::new(),
            demote: false,
            used: None,
            unused: None,
            removed: BTreeSet::new(),
        }
    }

    /// Sets the resolver used to follow references into dependency modules.
    ///
    /// Without one, edges leaving the primary module are counted but not followed.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn AssemblyResolver>) -> Self {
        self.resolver = Some(resolver);
        self.invalidate();
        self
    }

    /// Adds entry points by full name (`Namespace.Outer/Inner`).
    #[must_use]
    pub fn with_entry_points<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.entry_points.extend(names.into_iter().map(Into::into));
        self.invalidate();
        self
    }

    /// Adds exclusions for [`Stripper::make_not_public`].
    #[must_use]
    pub fn with_exclusions<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.exclusions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Makes [`Stripper::run_all`] demote public types as its last step.
    #[must_use]
    pub fn with_demotion(mut self, demote: bool) -> Self {
        self.demote = demote;
        self
    }

    /// Adds an entry point by full name.
    pub fn add_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_points.insert(name.into());
        self.invalidate();
        self
    }

    /// Adds a type that keeps its public visibility.
    pub fn add_exclusion(&mut self, name: impl Into<String>) -> &mut Self {
        self.exclusions.insert(name.into());
        self
    }

    /// Configured entry points
    #[must_use]
    pub fn entry_points(&self) -> &BTreeSet<String> {
        &self.entry_points
    }

    /// Configured exclusions
    #[must_use]
    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.exclusions
    }

    /// Computes the used set from the entry points.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if an exclusion names no type of the module, or see
    /// [`scan`].
    pub fn scan_used_classes(&mut self) -> Result<&UsedSet> {
        resolve_type_names(&self.module, self.live_exclusions(), "exclusion")?;

        let used = scan(
            &self.module,
            &self.entry_points,
            self.resolver.as_deref(),
        )?;

        self.unused = None;
        Ok(self.used.insert(used))
    }

    /// Computes the unused set from the last scan.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if [`Stripper::scan_used_classes`] has not run.
    pub fn scan_unused_classes(&mut self) -> Result<&UnusedSet> {
        let used = self.used.as_ref().ok_or_else(|| {
            Error::Configuration("scan_used_classes must run before scan_unused_classes".into())
        })?;
        let unused = classify(&self.module, used)?;
        Ok(self.unused.insert(unused))
    }

    /// Removes the unused types.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if [`Stripper::scan_unused_classes`] has not run,
    /// or see [`remove_unused_classes`].
    pub fn cleanup_unused_classes(&mut self) -> Result<CleanupStats> {
        let unused = require_unused(self.unused.as_ref(), "cleanup_unused_classes")?;
        let stats = remove_unused_classes(&mut self.module, unused)?;
        self.removed.extend(unused.names().cloned());
        Ok(stats)
    }

    /// Removes the resources owned by unused types.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if [`Stripper::scan_unused_classes`] has not run.
    pub fn cleanup_unused_resources(&mut self) -> Result<CleanupStats> {
        let unused = require_unused(self.unused.as_ref(), "cleanup_unused_resources")?;
        remove_unused_resources(&mut self.module, unused)
    }

    /// Removes assembly references no remaining type mentions.
    ///
    /// Works on the module as it is; run it after [`Stripper::cleanup_unused_classes`].
    ///
    /// # Errors
    /// See [`prune_unused_references`].
    pub fn cleanup_unused_references(&mut self) -> Result<CleanupStats> {
        prune_unused_references(&mut self.module)
    }

    /// Demotes every public type except the exclusions and returns how many changed.
    ///
    /// # Errors
    /// See [`demote_visibility`].
    pub fn make_not_public(&mut self) -> Result<usize> {
        let exclusions: Vec<String> = self.live_exclusions().map(str::to_string).collect();
        demote_visibility(&mut self.module, exclusions)
    }

    /// Runs scan, classification, class, resource and reference cleanup in that order,
    /// followed by demotion if enabled.
    ///
    /// # Errors
    /// Propagates the first failing phase; earlier phases stay applied. Unknown entry points
    /// and exclusions fail the scan, before the module is modified.
    pub fn run_all(&mut self) -> Result<CleanupStats> {
        self.scan_used_classes()?;
        self.scan_unused_classes()?;

        let mut stats = self.cleanup_unused_classes()?;
        stats.merge(&self.cleanup_unused_resources()?);
        stats.merge(&self.cleanup_unused_references()?);
        if self.demote {
            stats.types_demoted += self.make_not_public()?;
        }

        info!("Stripped '{}': {}", self.module.name(), stats);
        Ok(stats)
    }

    /// Result of the last [`Stripper::scan_used_classes`]
    #[must_use]
    pub fn used(&self) -> Option<&UsedSet> {
        self.used.as_ref()
    }

    /// Result of the last [`Stripper::scan_unused_classes`]
    #[must_use]
    pub fn unused(&self) -> Option<&UnusedSet> {
        self.unused.as_ref()
    }

    /// Names of the types the class cleanup removes, sorted.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if [`Stripper::scan_unused_classes`] has not run.
    pub fn unused_type_names(&self) -> Result<Vec<TypeName>> {
        Ok(require_unused(self.unused.as_ref(), "unused_type_names")?
            .names()
            .cloned()
            .collect())
    }

    /// The module being stripped
    #[must_use]
    pub fn module(&self) -> &S {
        &self.module
    }

    /// Mutable access to the module; discards the scan results.
    pub fn module_mut(&mut self) -> &mut S {
        self.invalidate();
        &mut self.module
    }

    /// Returns the stripped module, e.g. for serialization.
    pub fn into_module(self) -> S {
        self.module
    }

    /// Exclusions, without the names of types this pipeline has removed
    fn live_exclusions(&self) -> impl Iterator<Item = &str> {
        self.exclusions.iter().map(String::as_str).filter(move |name| {
            !name.parse::<TypeName>().is_ok_and(|parsed| {
                self.removed.contains(&parsed) && self.module.find_type(&parsed).is_none()
            })
        })
    }

    fn invalidate(&mut self) {
        self.used = None;
        self.unused = None;
    }
}

fn require_unused<'a>(unused: Option<&'a UnusedSet>, phase: &str) -> Result<&'a UnusedSet> {
    unused.ok_or_else(|| {
        Error::Configuration(format!("scan_unused_classes must run before {phase}"))
    })
}
